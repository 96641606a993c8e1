use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub overseerr: Option<OverseerrConfig>,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
}

/// Where the watch-later list is scraped from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default)]
    pub watchlist_url: String,
    /// Listing pages fetched per run
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub include_adult: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverseerrConfig {
    pub enabled: bool,
    pub url: String,
    /// Forward a record as soon as a manual re-resolve confirms it
    #[serde(default = "default_true")]
    pub request_on_resolve: bool,
}

/// Tuning for the batch collector. The batches exist only to respect the
/// lookup service's rate limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// Per-lookup timeout; 0 disables it
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,
    /// Ignore cached records on every run
    #[serde(default)]
    pub skip_cache: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Six-field cron expression (seconds first)
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

fn default_true() -> bool {
    true
}

fn default_max_pages() -> u32 {
    6
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_delay_ms() -> u64 {
    25
}

fn default_lookup_timeout_secs() -> u64 {
    30
}

fn default_schedule() -> String {
    "0 0 */6 * * *".to_string() // Every 6 hours
}

pub fn default_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        schedule: default_schedule(),
        run_on_startup: default_true(),
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            watchlist_url: String::new(),
            max_pages: default_max_pages(),
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            include_adult: false,
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            lookup_timeout_secs: default_lookup_timeout_secs(),
            skip_cache: false,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if present (defaults otherwise) and apply environment
    /// overrides. This is the only place the process environment is read.
    pub fn load(path: &PathBuf) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            debug!("Config file {} not found, using defaults", path.display());
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `GOOGLE_WATCHLIST_URL`, `OVERSEERR_URL` and `SKIP_CACHE` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GOOGLE_WATCHLIST_URL").filter(|v| !v.is_empty()) {
            self.google.watchlist_url = url;
        }
        if let Some(url) = lookup("OVERSEERR_URL").filter(|v| !v.is_empty()) {
            match self.overseerr.as_mut() {
                Some(overseerr) => overseerr.url = url,
                None => {
                    self.overseerr = Some(OverseerrConfig {
                        enabled: true,
                        url,
                        request_on_resolve: default_true(),
                    })
                }
            }
        }
        if let Some(skip) = lookup("SKIP_CACHE") {
            self.collector.skip_cache = matches!(skip.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.google.watchlist_url.is_empty() {
            return Err(anyhow::anyhow!("google.watchlist_url is required"));
        }
        if !self.google.watchlist_url.starts_with("http://") && !self.google.watchlist_url.starts_with("https://") {
            return Err(anyhow::anyhow!("google.watchlist_url must be an http(s) URL"));
        }
        if self.google.max_pages == 0 {
            return Err(anyhow::anyhow!("google.max_pages must be at least 1"));
        }
        if self.collector.batch_size == 0 {
            return Err(anyhow::anyhow!("collector.batch_size must be at least 1"));
        }
        if let Some(overseerr) = &self.overseerr {
            if overseerr.enabled && overseerr.url.is_empty() {
                return Err(anyhow::anyhow!("Overseerr is enabled but url is not configured"));
            }
        }
        Ok(())
    }

    pub fn is_overseerr_enabled(&self) -> bool {
        self.overseerr
            .as_ref()
            .map(|o| o.enabled && !o.url.is_empty())
            .unwrap_or(false)
    }

    pub fn scheduler_or_default(&self) -> SchedulerConfig {
        self.scheduler.clone().unwrap_or_else(default_scheduler_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    fn configured() -> Config {
        Config {
            google: GoogleConfig {
                watchlist_url: "https://www.google.com/interests/saved/list/abc".to_string(),
                max_pages: 6,
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let mut config = configured();
        config.overseerr = Some(OverseerrConfig {
            enabled: true,
            url: "http://overseerr.local:5055".to_string(),
            request_on_resolve: false,
        });
        config.collector.batch_size = 3;

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.google.watchlist_url, config.google.watchlist_url);
        assert_eq!(loaded.collector.batch_size, 3);
        assert_eq!(loaded.collector.batch_delay_ms, 25);
        assert!(!loaded.overseerr.unwrap().request_on_resolve);
    }

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.google.max_pages, 6);
        assert_eq!(config.collector.batch_size, 5);
        assert_eq!(config.collector.batch_delay_ms, 25);
        assert_eq!(config.tmdb.language, "en-US");
        assert!(!config.collector.skip_cache);
        assert!(config.overseerr.is_none());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config = configured();
        assert!(config.validate().is_ok());

        config.collector.batch_size = 0;
        assert!(config.validate().is_err());

        config = configured();
        config.overseerr = Some(OverseerrConfig {
            enabled: true,
            url: String::new(),
            request_on_resolve: true,
        });
        assert!(config.validate().is_err());
        assert!(!config.is_overseerr_enabled());
    }

    #[test]
    fn test_apply_overrides() {
        let env: HashMap<&str, &str> = [
            ("GOOGLE_WATCHLIST_URL", "https://example.com/list"),
            ("OVERSEERR_URL", "http://overseerr:5055"),
            ("SKIP_CACHE", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.google.watchlist_url, "https://example.com/list");
        assert!(config.is_overseerr_enabled());
        assert!(config.collector.skip_cache);
    }

    #[test]
    fn test_overrides_leave_unset_values_alone() {
        let mut config = configured();
        config.apply_overrides(|_| None);
        assert_eq!(config.google.watchlist_url, configured().google.watchlist_url);
        assert!(!config.collector.skip_cache);
    }
}
