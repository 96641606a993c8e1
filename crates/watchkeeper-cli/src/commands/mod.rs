pub mod clear;
pub mod config;
pub mod daemon;
pub mod list;
pub mod progress;
pub mod resolve;
pub mod run;
pub mod settings;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::sync::Arc;
use watchlist_config::{Config, CredentialStore, PathManager};
use watchlist_core::{CacheManager, RunObserver, RunOrchestrator};
use watchlist_sources::SourceFactory;

/// Load `config.toml` (defaults when missing) with environment overrides applied.
pub fn load_config() -> Result<Config> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    Config::load(&config_file).map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))
}

pub fn load_credentials(path_manager: &PathManager) -> Result<CredentialStore> {
    let mut store = CredentialStore::new(path_manager.credentials_file());
    store
        .load()
        .map_err(|e| eyre!("Failed to load credentials: {}", e))?;
    store.apply_env_overrides();
    Ok(store)
}

pub fn open_cache() -> Result<CacheManager> {
    let path_manager = PathManager::default();
    CacheManager::from_paths(&path_manager)
        .map_err(|e| eyre!("Failed to open cache at {}: {}", path_manager.cache_dir().display(), e))
}

/// Wire the collaborators for `config` and build an orchestrator over the on-disk cache.
pub fn build_orchestrator(config: &Config, observer: Option<Arc<dyn RunObserver>>) -> Result<RunOrchestrator> {
    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration: {}", e))?;

    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create data directories: {}", e))?;

    let credentials = load_credentials(&path_manager)?;
    let collaborators = SourceFactory::build(config, &credentials).map_err(|e| eyre!("{}", e))?;
    let cache = CacheManager::from_paths(&path_manager)
        .map_err(|e| eyre!("Failed to open cache at {}: {}", path_manager.cache_dir().display(), e))?;

    let orchestrator = RunOrchestrator::from_config(config, collaborators, cache);
    Ok(match observer {
        Some(observer) => orchestrator.with_observer(observer),
        None => orchestrator,
    })
}
