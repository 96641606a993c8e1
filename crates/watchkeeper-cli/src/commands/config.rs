use crate::output::{Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use watchlist_config::{Config, CredentialStore, OverseerrConfig, PathManager};

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, output).await,
        crate::ConfigCommands::Tmdb { token } => configure_tmdb(token, output).await,
        crate::ConfigCommands::Overseerr { url, api_key, enabled } => {
            configure_overseerr(url, api_key, enabled, output).await
        }
        crate::ConfigCommands::Google { url, max_pages } => configure_google(url, max_pages, output).await,
    }
}

async fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Configuration will be created automatically when you run 'watchkeeper config google' or 'watchkeeper config tmdb'.");
        return Ok(());
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let credentials = super::load_credentials(&path_manager)?;
    let secret = |value: Option<&String>| {
        let value = value.map(String::as_str).unwrap_or_default();
        if full {
            value.to_string()
        } else {
            mask_string(value)
        }
    };

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            println!("\n{}", "╔════════════════════════════════════════════════════════════╗".bright_white());
            println!("{} {}", "║".bright_white(), "Configuration".bright_cyan().bold());
            println!("{}", "╚════════════════════════════════════════════════════════════╝".bright_white());
            println!();

            let mut info_table = Table::new();
            info_table.set_header(vec![
                Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
                Cell::new(config_file.display().to_string()),
            ]);
            info_table.add_row(vec![
                Cell::new("Cache Directory"),
                Cell::new(path_manager.cache_dir().display().to_string()),
            ]);
            print_table(info_table);

            let mut google_table = section_table("Google Watchlist");
            google_table.add_row(vec![
                Cell::new("List URL"),
                Cell::new(if config.google.watchlist_url.is_empty() {
                    "<not set>".to_string()
                } else {
                    config.google.watchlist_url.clone()
                }),
            ]);
            google_table.add_row(vec![Cell::new("Max Pages"), Cell::new(config.google.max_pages)]);
            print_table(google_table);

            let mut tmdb_table = section_table("TMDB");
            tmdb_table.add_row(vec![Cell::new("API Token"), Cell::new(secret(credentials.get_tmdb_api_token()))]);
            tmdb_table.add_row(vec![Cell::new("Language"), Cell::new(&config.tmdb.language)]);
            tmdb_table.add_row(vec![Cell::new("Include Adult"), Cell::new(check_mark(config.tmdb.include_adult))]);
            print_table(tmdb_table);

            if let Some(overseerr) = &config.overseerr {
                let mut overseerr_table = section_table("Overseerr");
                overseerr_table.add_row(vec![Cell::new("Enabled"), Cell::new(check_mark(overseerr.enabled))]);
                overseerr_table.add_row(vec![Cell::new("URL"), Cell::new(&overseerr.url)]);
                overseerr_table.add_row(vec![
                    Cell::new("API Key"),
                    Cell::new(secret(credentials.get_overseerr_api_key())),
                ]);
                overseerr_table.add_row(vec![
                    Cell::new("Request On Resolve"),
                    Cell::new(check_mark(overseerr.request_on_resolve)),
                ]);
                print_table(overseerr_table);
            } else {
                println!("{}", "Overseerr: Not configured".bright_black());
                println!();
            }

            let mut collector_table = section_table("Collector");
            collector_table.add_row(vec![Cell::new("Batch Size"), Cell::new(config.collector.batch_size)]);
            collector_table.add_row(vec![
                Cell::new("Batch Delay"),
                Cell::new(format!("{}ms", config.collector.batch_delay_ms)),
            ]);
            collector_table.add_row(vec![
                Cell::new("Lookup Timeout"),
                Cell::new(format!("{}s", config.collector.lookup_timeout_secs)),
            ]);
            collector_table.add_row(vec![Cell::new("Skip Cache"), Cell::new(check_mark(config.collector.skip_cache))]);
            print_table(collector_table);

            let scheduler = config.scheduler_or_default();
            let mut scheduler_table = section_table("Scheduler");
            scheduler_table.add_row(vec![Cell::new("Schedule"), Cell::new(&scheduler.schedule)]);
            scheduler_table.add_row(vec![Cell::new("Run On Startup"), Cell::new(check_mark(scheduler.run_on_startup))]);
            print_table(scheduler_table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let mut value = serde_json::to_value(&config).unwrap_or_default();
            value["credentials"] = json!({
                "tmdb_api_token": secret(credentials.get_tmdb_api_token()),
                "overseerr_api_key": secret(credentials.get_overseerr_api_key()),
            });
            output.json(&value);
        }
    }

    Ok(())
}

async fn configure_tmdb(token_arg: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create configuration directories: {}", e))?;

    print_section_header("TMDB API Setup", output);
    output.println("");
    print_instruction_list(
        &[
            "Create a free account at https://www.themoviedb.org",
            "Open Settings > API and request an API key",
            "Copy the 'API Read Access Token' (the long bearer token, not the short key)",
        ],
        output,
    );
    output.println("");

    let token = match token_arg {
        Some(token) => token,
        None => prompt_secret("TMDB API Read Access Token")?,
    };
    validate_token(&token).map_err(|e| eyre!("{}", e))?;

    let mut credentials = load_stored_credentials(&path_manager)?;
    credentials.set_tmdb_api_token(token);
    credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;

    // Make sure a config file exists so 'config show' has something to show
    let config = load_or_default(&path_manager, output)?;
    save(&config, &path_manager)?;

    output.success("TMDB token saved!");
    Ok(())
}

async fn configure_overseerr(
    url_arg: Option<String>,
    api_key_arg: Option<String>,
    enabled_arg: Option<bool>,
    output: &Output,
) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create configuration directories: {}", e))?;
    let mut config = load_or_default(&path_manager, output)?;

    print_section_header("Overseerr Setup", output);

    let overseerr = config.overseerr.get_or_insert_with(|| OverseerrConfig {
        enabled: true,
        url: String::new(),
        request_on_resolve: true,
    });
    if let Some(url) = url_arg {
        validate_url(&url).map_err(|e| eyre!("{}", e))?;
        overseerr.url = url.trim_end_matches('/').to_string();
    }
    if let Some(enabled) = enabled_arg {
        overseerr.enabled = enabled;
    }
    if overseerr.enabled && overseerr.url.is_empty() {
        return Err(eyre!("Overseerr URL is required. Pass --url http://overseerr:5055"));
    }

    let mut credentials = load_stored_credentials(&path_manager)?;
    let api_key = match api_key_arg {
        Some(key) => Some(key),
        None if credentials.get_overseerr_api_key().is_none() && overseerr.enabled => {
            output.println("The API key is under Settings > General in Overseerr.");
            Some(prompt_secret("Overseerr API Key")?)
        }
        None => None,
    };
    if let Some(key) = api_key {
        validate_token(&key).map_err(|e| eyre!("{}", e))?;
        credentials.set_overseerr_api_key(key);
        credentials
            .save()
            .map_err(|e| eyre!("Failed to save credentials: {}", e))?;
    }

    save(&config, &path_manager)?;
    output.success("Overseerr configuration saved!");
    Ok(())
}

async fn configure_google(url_arg: Option<String>, max_pages_arg: Option<u32>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create configuration directories: {}", e))?;
    let mut config = load_or_default(&path_manager, output)?;

    if url_arg.is_none() && max_pages_arg.is_none() {
        print_section_header("Google Watchlist Setup", output);
        output.println("");
        print_instruction_list(
            &[
                "Open your watch-later list in Google search (Saved > Watchlist)",
                "Share the list and copy the public link",
                "Run: watchkeeper config google --url <LINK>",
            ],
            output,
        );
        return Ok(());
    }

    if let Some(url) = url_arg {
        validate_url(&url).map_err(|e| eyre!("{}", e))?;
        config.google.watchlist_url = url;
    }
    if let Some(max_pages) = max_pages_arg {
        if max_pages == 0 {
            return Err(eyre!("--max-pages must be at least 1"));
        }
        config.google.max_pages = max_pages;
    }

    save(&config, &path_manager)?;
    output.success("Google watchlist configuration saved!");
    Ok(())
}

fn load_or_default(path_manager: &PathManager, output: &Output) -> Result<Config> {
    let config_file = path_manager.config_file();
    if config_file.exists() {
        Config::load_from_file(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))
    } else {
        output.info("Configuration file not found. Creating default configuration...");
        Ok(Config::default())
    }
}

fn save(config: &Config, path_manager: &PathManager) -> Result<()> {
    let config_file = path_manager.config_file();
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))
}

/// Credentials as stored on disk, without environment overrides, so saving
/// never writes an environment value back.
fn load_stored_credentials(path_manager: &PathManager) -> Result<CredentialStore> {
    let mut store = CredentialStore::new(path_manager.credentials_file());
    store
        .load()
        .map_err(|e| eyre!("Failed to load credentials: {}", e))?;
    Ok(store)
}

fn prompt_secret(prompt: &str) -> Result<String> {
    rpassword::prompt_password(format!("{}: ", prompt)).map_err(|e| eyre!("Failed to read input: {}", e))
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    if s.len() <= 4 {
        return "*".repeat(s.len());
    }
    let chars: Vec<char> = s.chars().collect();
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

fn check_mark(value: bool) -> String {
    if value {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

fn validate_token(input: &str) -> Result<(), &'static str> {
    if input.trim().is_empty() {
        return Err("Token cannot be empty");
    }
    if input.trim().len() < 16 {
        return Err("Token seems too short. Please verify it's correct.");
    }
    Ok(())
}

fn validate_url(input: &str) -> Result<(), &'static str> {
    if !input.starts_with("http://") && !input.starts_with("https://") {
        return Err("URL must start with http:// or https://");
    }
    Ok(())
}

fn section_table(title: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![Cell::new(title)
        .fg(comfy_table::Color::Cyan)
        .add_attribute(comfy_table::Attribute::Bold)]);
    table
}

fn print_table(mut table: Table) {
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);
    println!();
}

fn print_section_header(title: &str, output: &Output) {
    output.println("");
    output.println(format!("{}", title.bold().bright_cyan()));
    output.println(format!("{}", "─".repeat(title.len()).bright_cyan()));
}

fn print_instruction_list(items: &[&str], output: &Output) {
    for (idx, item) in items.iter().enumerate() {
        output.println(format!("  {}. {}", idx + 1, item));
    }
}
