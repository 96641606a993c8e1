use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Default filter for the `-v` count. `RUST_LOG` wins unless `--quiet` is set.
fn filter_directive(verbose_level: u8, quiet: bool) -> &'static str {
    match (quiet, verbose_level) {
        (true, _) => "error",
        (false, 0) => "info",
        // -v: debug, but hyper's connection chatter stays at warn
        (false, 1) => "debug,hyper::proto::h1=warn,hyper::client::pool=warn",
        (false, _) => "trace",
    }
}

/// JSON when `RUST_LOG_JSON=true`, or by default when stdout is not a terminal (Docker).
fn use_json(env_value: Option<String>, stdout_is_terminal: bool) -> bool {
    env_value.map(|v| v == "true").unwrap_or(!stdout_is_terminal)
}

/// Daily rolling appender named after the file stem, e.g. `watchkeeper.2026-01-17`.
fn rolling_appender(log_path: &Path) -> Result<RollingFileAppender> {
    let log_dir = log_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Log file path has no parent directory"))?;
    std::fs::create_dir_all(log_dir)?;
    let log_prefix = log_path
        .file_stem()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;
    Ok(RollingFileAppender::new(Rotation::DAILY, log_dir, log_prefix))
}

/// Install the global subscriber. With `log_file` set (the daemon) records go
/// to a rolling file, otherwise to stderr so stdout stays free for output.
pub fn init_logging_with_file(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let directive = filter_directive(verbose_level, quiet);
    let filter = if quiet {
        EnvFilter::new(directive)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
    };
    let json = use_json(std::env::var("RUST_LOG_JSON").ok(), io::stdout().is_terminal());
    let registry = Registry::default().with(filter);

    match (log_file, json) {
        (Some(path), true) => {
            let layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(rolling_appender(&path)?);
            registry.with(layer).init();
        }
        (Some(path), false) => {
            let layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(rolling_appender(&path)?);
            registry.with(layer).init();
        }
        (None, true) => {
            let layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(io::stderr);
            registry.with(layer).init();
        }
        (None, false) => {
            let layer = fmt::layer().with_timer(ChronoUtc::rfc_3339()).with_writer(io::stderr);
            registry.with(layer).init();
        }
    }

    Ok(())
}
