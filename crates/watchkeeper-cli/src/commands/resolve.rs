use crate::output::{Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;
use uuid::Uuid;
use watchlist_core::{remove_movie, RequestOutcome, ResolveOutcome, ResolveQuery};
use watchlist_models::MediaType;

pub async fn run_resolve(
    uuid: Uuid,
    title: Option<String>,
    year: Option<i32>,
    media_type: Option<MediaType>,
    request: bool,
    output: &Output,
) -> Result<()> {
    let config = super::load_config()?;
    let request = request || config.overseerr.as_ref().is_some_and(|o| o.request_on_resolve) && config.is_overseerr_enabled();
    let orchestrator = super::build_orchestrator(&config, None)?;

    let query = ResolveQuery { title, year, media_type };
    let outcome = orchestrator
        .resolve_unknown(uuid, query, request)
        .await
        .map_err(|e| eyre!("Failed to resolve {}: {}", uuid, e))?;

    if output.format() != OutputFormat::Human {
        output.json(&serde_json::to_value(&outcome).unwrap_or_default());
        return Ok(());
    }

    match outcome {
        ResolveOutcome::Resolved { record, request, .. } => {
            let year = record.release_year.map(|y| format!(" ({})", y)).unwrap_or_default();
            output.success(format!("Resolved '{}' as {}{} [tmdb {}]", record.google_title, record.title, year, record.id));
            if let Some(request) = request {
                print_request_outcome(&request, output);
            }
            Ok(())
        }
        ResolveOutcome::NoResults => {
            output.warn("No results for that search. Try a different title, year or media type.");
            Ok(())
        }
        ResolveOutcome::NotFound => Err(eyre!("No record with uuid {}", uuid)),
    }
}

pub async fn run_request(uuid: Uuid, output: &Output) -> Result<()> {
    let config = super::load_config()?;
    let orchestrator = super::build_orchestrator(&config, None)?;
    if !orchestrator.can_request() {
        return Err(eyre!("Overseerr is not enabled. Run 'watchkeeper config overseerr --url <URL> --enabled true' first"));
    }

    let outcome = orchestrator
        .request(uuid)
        .await
        .map_err(|e| eyre!("Failed to request {}: {}", uuid, e))?;

    if output.format() != OutputFormat::Human {
        output.json(&serde_json::to_value(&outcome).unwrap_or_default());
        return Ok(());
    }
    print_request_outcome(&outcome, output);
    match outcome {
        RequestOutcome::NotFound => Err(eyre!("No record with uuid {}", uuid)),
        _ => Ok(()),
    }
}

pub async fn run_dismiss(uuid: Uuid, output: &Output) -> Result<()> {
    let cache = super::open_cache()?;
    let removed = remove_movie(&cache, uuid).map_err(|e| eyre!("Failed to update unknown list: {}", e))?;

    match output.format() {
        OutputFormat::Human if removed => output.success(format!("Dismissed {}", uuid)),
        OutputFormat::Human => output.warn(format!("{} is not on the unknown list", uuid)),
        OutputFormat::Json | OutputFormat::JsonPretty => output.json(&json!({ "uuid": uuid, "removed": removed })),
    }
    Ok(())
}

fn print_request_outcome(outcome: &RequestOutcome, output: &Output) {
    match outcome {
        RequestOutcome::Requested => output.success("Requested on Overseerr"),
        RequestOutcome::NotConfirmed => output.warn("Not requested: only confirmed movies and series can be requested"),
        RequestOutcome::NotConfigured => output.warn("Not requested: Overseerr is not enabled"),
        RequestOutcome::NotFound => output.warn("Not requested: record not found"),
        RequestOutcome::Failed { error } => output.error(format!("Request failed: {}", error)),
    }
}
