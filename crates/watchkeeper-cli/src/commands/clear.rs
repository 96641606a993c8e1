use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs;
use watchlist_config::PathManager;
use watchlist_core::CacheManager;

pub async fn run_clear(all: bool, cache: bool, credentials: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();

    if all {
        clear_cache(&path_manager, output)?;
        clear_credentials(&path_manager, output)?;
        output.success("All cached documents and credentials cleared");
        return Ok(());
    }

    let mut cleared_anything = false;

    if cache {
        clear_cache(&path_manager, output)?;
        cleared_anything = true;
    }

    if credentials {
        clear_credentials(&path_manager, output)?;
        cleared_anything = true;
    }

    if !cleared_anything {
        output.warn("No clear option specified. Use --cache, --credentials, or --all");
        output.println("\nExample: watchkeeper clear --cache");
    }

    Ok(())
}

fn clear_cache(path_manager: &PathManager, output: &Output) -> Result<()> {
    let cache_dir = path_manager.cache_dir();
    if !cache_dir.exists() {
        output.info("No cache found to clear");
        return Ok(());
    }

    let cache = CacheManager::from_paths(path_manager)
        .map_err(|e| eyre!("Failed to open cache at {}: {}", cache_dir.display(), e))?;
    cache
        .clear()
        .map_err(|e| eyre!("Failed to clear cache at {}: {}", cache_dir.display(), e))?;
    output.success(format!("Cleared watchlist, unknown list and settings: {}", cache_dir.display()));
    Ok(())
}

fn clear_credentials(path_manager: &PathManager, output: &Output) -> Result<()> {
    let credentials_file = path_manager.credentials_file();

    if credentials_file.exists() {
        fs::remove_file(&credentials_file)
            .map_err(|e| eyre!("Failed to remove credentials file at {}: {}", credentials_file.display(), e))?;
        output.success(format!("Cleared credentials: {}", credentials_file.display()));
    } else {
        output.info("No credentials file found to clear");
    }

    Ok(())
}
