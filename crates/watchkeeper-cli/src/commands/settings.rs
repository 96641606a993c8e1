use crate::output::{Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use serde_json::Value;
use watchlist_core::{load_settings, save_settings};
use watchlist_models::Settings;

pub async fn show_settings(output: &Output) -> Result<()> {
    let cache = super::open_cache()?;
    let settings = load_settings(&cache).map_err(|e| eyre!("Failed to load settings: {}", e))?;
    print_settings(&settings, output);
    Ok(())
}

pub async fn set_settings(pairs: Vec<String>, output: &Output) -> Result<()> {
    let changes = parse_pairs(&pairs)?;
    let cache = super::open_cache()?;
    let settings = save_settings(&cache, changes).map_err(|e| eyre!("Failed to save settings: {}", e))?;
    output.success(format!("Saved {} setting(s)", pairs.len()));
    print_settings(&settings, output);
    Ok(())
}

fn print_settings(settings: &Settings, output: &Output) {
    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return;
            }
            if settings.is_empty() {
                output.info("No settings stored");
                return;
            }
            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Key").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").add_attribute(comfy_table::Attribute::Bold),
            ]);
            for (key, value) in settings {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                table.add_row(vec![Cell::new(key), Cell::new(value)]);
            }
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&Value::Object(settings.clone()));
        }
    }
}

/// `KEY=VALUE` pairs into a settings map. JSON values keep their type;
/// anything that does not parse is stored as a string.
fn parse_pairs(pairs: &[String]) -> Result<Settings> {
    let mut settings = Settings::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| eyre!("Expected KEY=VALUE, got '{}'", pair))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(eyre!("Empty key in '{}'", pair));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        settings.insert(key.to_string(), value);
    }
    Ok(settings)
}
