pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{default_scheduler_config, CollectorConfig, Config, GoogleConfig, OverseerrConfig, SchedulerConfig, TmdbConfig};
pub use credentials::CredentialStore;
pub use paths::{container_base_path, PathManager};
