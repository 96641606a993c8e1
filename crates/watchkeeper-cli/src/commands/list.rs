use crate::output::{Output, OutputFormat};
use chrono::{DateTime, Utc};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Color, Table};
use owo_colors::OwoColorize;
use watchlist_core::{paginate, search_records};
use watchlist_models::{MediaRecord, UnknownState};

pub async fn run_list(search: Option<String>, page: usize, per_page: usize, output: &Output) -> Result<()> {
    let cache = super::open_cache()?;
    let document = cache
        .load_watchlist()
        .map_err(|e| eyre!("Failed to load watchlist: {}", e))?;

    let records = match search.as_deref() {
        Some(query) => search_records(&document.data, query),
        None => document.data,
    };
    let page = paginate(&records, page, per_page);

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if page.total_items == 0 {
                output.info("The watchlist is empty. Run 'watchkeeper run' to build it.");
                return Ok(());
            }
            println!("{}", records_table(&page.items, Utc::now(), false));
            println!(
                "{}",
                format!(
                    "Page {}/{} - {} records - generated {}",
                    page.page,
                    page.total_pages,
                    page.total_items,
                    relative_time(document.generated, Utc::now())
                )
                .bright_black()
            );
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&serde_json::to_value(&page).unwrap_or_default());
        }
    }
    Ok(())
}

pub async fn run_unknowns(output: &Output) -> Result<()> {
    let cache = super::open_cache()?;
    let document = cache
        .load_unknowns()
        .map_err(|e| eyre!("Failed to load unknown list: {}", e))?;

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if document.data.is_empty() {
                output.success("No unknown records");
                return Ok(());
            }
            println!("{}", records_table(&document.data, Utc::now(), true));
            output.info(format!(
                "{} unknown records. Fix one with 'watchkeeper resolve <uuid> --title ...' or drop it with 'watchkeeper dismiss <uuid>'.",
                document.data.len()
            ));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&serde_json::to_value(&document).unwrap_or_default());
        }
    }
    Ok(())
}

fn records_table(records: &[MediaRecord], now: DateTime<Utc>, with_uuid: bool) -> Table {
    let mut header = vec![
        Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Year").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Type").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Status").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Added").add_attribute(comfy_table::Attribute::Bold),
    ];
    if with_uuid {
        header.insert(0, Cell::new("UUID").add_attribute(comfy_table::Attribute::Bold));
    }

    let mut table = Table::new();
    table.set_header(header);
    for record in records {
        let mut row = vec![
            Cell::new(title_cell(record)),
            Cell::new(record.release_year.map(|y| y.to_string()).unwrap_or_default()),
            Cell::new(record.media_type.map(|t| t.as_str()).unwrap_or("-")),
            status_cell(record),
            Cell::new(relative_time(record.date_added, now)),
        ];
        if with_uuid {
            row.insert(0, Cell::new(record.uuid));
        }
        table.add_row(row);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

/// The resolved title, with the scraped label when the two differ.
fn title_cell(record: &MediaRecord) -> String {
    if record.title.is_empty() || record.title == record.google_title {
        record.google_title.clone()
    } else {
        format!("{} ({})", record.title, record.google_title)
    }
}

fn status_cell(record: &MediaRecord) -> Cell {
    match (record.unknown_state, record.status.overseerr, record.is_resolved()) {
        (Some(UnknownState::Duplicate), _, _) => Cell::new("duplicate").fg(Color::Yellow),
        (Some(UnknownState::Unmatched), _, _) => Cell::new("unmatched").fg(Color::Red),
        (None, true, _) => Cell::new("requested").fg(Color::Cyan),
        (None, false, true) => Cell::new("matched").fg(Color::Green),
        (None, false, false) => Cell::new("unconfirmed").fg(Color::Yellow),
    }
}

/// "just now", "5 minutes ago", "3 days ago". Future instants read as "just now".
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let (value, unit) = match seconds {
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 86_400 * 30 => (s / 86_400, "day"),
        s if s < 86_400 * 365 => (s / (86_400 * 30), "month"),
        s => (s / (86_400 * 365), "year"),
    };
    if value == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", value, unit)
    }
}
