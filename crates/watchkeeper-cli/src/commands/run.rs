use super::progress::{is_interactive, ProgressObserver};
use crate::output::{Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use std::sync::Arc;
use tracing::info;
use watchlist_core::{FanoutObserver, RunObserver, RunOptions, RunSummary, TracingObserver};

pub async fn run_once(skip_cache: bool, dry_run: bool, output: &Output) -> Result<()> {
    let config = super::load_config()?;

    let show_progress = is_interactive() && output.format() == OutputFormat::Human && !output.is_quiet();
    if !show_progress {
        info!(
            operation = "ui_init",
            mode = "non_interactive",
            "Running in non-interactive mode - progress bars disabled, using structured logging"
        );
    }
    let mut observers: Vec<Arc<dyn RunObserver>> = vec![Arc::new(TracingObserver)];
    if show_progress {
        observers.push(Arc::new(ProgressObserver::new()));
    }
    let orchestrator = super::build_orchestrator(&config, Some(Arc::new(FanoutObserver::new(observers))))?;

    let summary = orchestrator
        .run(RunOptions { dry_run, skip_cache })
        .await
        .map_err(|e| eyre!("Watchlist run failed: {}", e))?;

    print_summary(&summary, output);
    Ok(())
}

pub fn print_summary(summary: &RunSummary, output: &Output) {
    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return;
            }
            if summary.kept_previous {
                output.warn(format!(
                    "The listing came back empty; kept the stored watchlist ({} records)",
                    summary.records
                ));
                return;
            }

            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Run Summary").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
                Cell::new(""),
            ]);
            table.add_row(vec![Cell::new("Scraped titles"), Cell::new(summary.scraped)]);
            table.add_row(vec![Cell::new("From cache"), Cell::new(summary.cache_hits)]);
            table.add_row(vec![Cell::new("Looked up"), Cell::new(summary.looked_up)]);
            table.add_row(vec![Cell::new("Unmatched"), Cell::new(summary.unmatched)]);
            table.add_row(vec![Cell::new("Duplicates"), Cell::new(summary.duplicates)]);
            table.add_row(vec![Cell::new("Watchlist records"), Cell::new(summary.records)]);
            table.add_row(vec![Cell::new("Unknown records"), Cell::new(summary.unknowns)]);
            table.add_row(vec![
                Cell::new("Duration"),
                Cell::new(format!("{:.1}s", summary.duration_ms as f64 / 1000.0)),
            ]);
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);

            if summary.dry_run {
                println!("{}", "Dry run: nothing was written".bright_black());
            } else {
                output.success("Watchlist updated");
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&serde_json::to_value(summary).unwrap_or_default());
        }
    }
}
