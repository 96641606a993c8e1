use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, config, daemon, list, resolve, run, settings};
use uuid::Uuid;
use watchlist_models::MediaType;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "watchkeeper")]
#[command(about = "Watchkeeper - Turn a saved watch-later list into a clean, resolved watchlist")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape, resolve and reconcile the watchlist (one-time run)
    #[command(long_about = "Scrape the saved watch-later list, resolve every title against TMDB in small batches, reconcile against the cached watchlist and write both the watchlist and the unknown list.")]
    Run {
        /// Ignore cached records for this run
        #[arg(long, action = ArgAction::SetTrue)]
        skip_cache: bool,

        /// Compute everything but write nothing
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Show the cached watchlist
    #[command(long_about = "Show the cached watchlist, optionally filtered by a case-insensitive search over titles and paginated.")]
    List {
        /// Only show records whose title or scraped label contains this text
        #[arg(long, value_name = "QUERY")]
        search: Option<String>,

        /// Page to show (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Records per page
        #[arg(long, default_value_t = 25)]
        per_page: usize,
    },
    /// Show the unknown list (unmatched and ambiguous records)
    Unknowns,
    /// Re-resolve a single record with a corrected title, year or type
    #[command(long_about = "Look a record up again. Without corrections an ambiguous duplicate is retried with the next-best candidate. With --request a confirmed movie or series is forwarded to Overseerr straight away.")]
    Resolve {
        /// Record uuid
        uuid: Uuid,

        /// Corrected title to search for
        #[arg(long)]
        title: Option<String>,

        /// Release year to narrow the search
        #[arg(long)]
        year: Option<i32>,

        /// Media type to search as
        #[arg(long, value_parser = parse_media_type)]
        media_type: Option<MediaType>,

        /// Send a media request once the record is confirmed
        #[arg(long, action = ArgAction::SetTrue)]
        request: bool,
    },
    /// Send a media request to Overseerr for a confirmed record
    Request {
        /// Record uuid
        uuid: Uuid,
    },
    /// Remove a record from the unknown list
    Dismiss {
        /// Record uuid
        uuid: Uuid,
    },
    /// Show or change the stored settings document
    Settings {
        #[command(subcommand)]
        cmd: SettingsCommands,
    },
    /// Run as daemon with internal scheduler
    #[command(long_about = "Run Watchkeeper in the foreground with an internal cron scheduler that performs a full run on every tick. A run is performed on startup unless --no-startup-run is specified.")]
    Daemon {
        /// Cron schedule expression with seconds (e.g., '0 0 */6 * * *' for every 6 hours)
        #[arg(long, value_name = "SCHEDULE")]
        schedule: Option<String>,

        /// Skip the run on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_run: bool,
    },
    /// Configure credentials and settings
    #[command(long_about = "Manage configuration and credentials for Watchkeeper. Use subcommands to view the configuration or set up the Google list, TMDB and Overseerr.")]
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Clear cached data
    #[command(long_about = "Clear cached documents or stored credentials. Use --cache to remove the watchlist, unknown list and settings documents, --credentials to remove stored tokens, or --all to clear everything.")]
    Clear {
        /// Clear cache and credentials
        #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["cache", "credentials"])]
        all: bool,

        /// Clear cached documents
        #[arg(long, action = ArgAction::SetTrue)]
        cache: bool,

        /// Clear stored credentials
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Print the settings document
    Show,
    /// Merge KEY=VALUE pairs into the settings document
    #[command(long_about = "Merge KEY=VALUE pairs into the settings document. Values that parse as JSON (numbers, booleans, objects) are stored as such, anything else is stored as a string.")]
    Set {
        #[arg(value_name = "KEY=VALUE", required = true)]
        pairs: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    #[command(long_about = "Display the current configuration. Tokens and API keys are masked. Use --full to show them.")]
    Show {
        /// Show full configuration including masked secrets
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Configure the TMDB API read access token
    Tmdb {
        /// TMDB API read access token (if not provided, will prompt)
        #[arg(long)]
        token: Option<String>,
    },

    /// Configure Overseerr
    Overseerr {
        /// Overseerr base URL, e.g. http://overseerr:5055
        #[arg(long)]
        url: Option<String>,

        /// Overseerr API key (if not provided, will prompt)
        #[arg(long)]
        api_key: Option<String>,

        /// Enable or disable requests
        #[arg(long)]
        enabled: Option<bool>,
    },

    /// Configure the Google watch-later list
    Google {
        /// Shared list URL
        #[arg(long)]
        url: Option<String>,

        /// Listing pages fetched per run
        #[arg(long)]
        max_pages: Option<u32>,
    },
}

fn parse_media_type(value: &str) -> Result<MediaType, String> {
    MediaType::parse(value).ok_or_else(|| format!("Invalid media type: {}. Use 'movie', 'tv' or 'person'", value))
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // The daemon logs to a rolling file; everything else logs to stderr
    let log_file = match cli.command {
        Commands::Daemon { .. } => Some(watchlist_config::PathManager::default().daemon_log_file()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Run { skip_cache, dry_run } => run::run_once(skip_cache, dry_run, &output).await,
        Commands::List { search, page, per_page } => list::run_list(search, page, per_page, &output).await,
        Commands::Unknowns => list::run_unknowns(&output).await,
        Commands::Resolve {
            uuid,
            title,
            year,
            media_type,
            request,
        } => resolve::run_resolve(uuid, title, year, media_type, request, &output).await,
        Commands::Request { uuid } => resolve::run_request(uuid, &output).await,
        Commands::Dismiss { uuid } => resolve::run_dismiss(uuid, &output).await,
        Commands::Settings { cmd } => match cmd {
            SettingsCommands::Show => settings::show_settings(&output).await,
            SettingsCommands::Set { pairs } => settings::set_settings(pairs, &output).await,
        },
        Commands::Daemon {
            schedule,
            no_startup_run,
        } => {
            let config = commands::load_config()?;
            daemon::run_daemon(config, schedule, no_startup_run, &output).await
        }
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
        Commands::Clear { all, cache, credentials } => clear::run_clear(all, cache, credentials, &output).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve_command() {
        let cli = Cli::try_parse_from([
            "watchkeeper",
            "resolve",
            "6f1c2a8e-8d1b-4c55-9d43-1b2f1f0c7a10",
            "--title",
            "Dune",
            "--year",
            "2021",
            "--media-type",
            "movie",
            "--request",
        ])
        .unwrap();

        match cli.command {
            Commands::Resolve {
                title,
                year,
                media_type,
                request,
                ..
            } => {
                assert_eq!(title.as_deref(), Some("Dune"));
                assert_eq!(year, Some(2021));
                assert_eq!(media_type, Some(MediaType::Movie));
                assert!(request);
            }
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_rejects_bad_media_type_and_uuid() {
        assert!(Cli::try_parse_from(["watchkeeper", "resolve", "not-a-uuid"]).is_err());
        assert!(Cli::try_parse_from([
            "watchkeeper",
            "resolve",
            "6f1c2a8e-8d1b-4c55-9d43-1b2f1f0c7a10",
            "--media-type",
            "podcast",
        ])
        .is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["watchkeeper", "run", "--dry-run", "-vv", "--output", "json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, output::OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Run { dry_run: true, skip_cache: false }));
    }

    #[test]
    fn test_clear_all_conflicts_with_cache() {
        assert!(Cli::try_parse_from(["watchkeeper", "clear", "--all", "--cache"]).is_err());
    }
}
