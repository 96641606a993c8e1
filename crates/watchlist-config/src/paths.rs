use anyhow::Result;
use std::path::{Path, PathBuf};

const BASE_PATH_ENV: &str = "WATCHKEEPER_BASE_PATH";
const DEFAULT_CONTAINER_BASE: &str = "/app";

/// Base directory inside the container image, `$WATCHKEEPER_BASE_PATH` or `/app`.
pub fn container_base_path() -> PathBuf {
    container_base_from(|key| std::env::var(key).ok())
}

fn container_base_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup(BASE_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTAINER_BASE))
}

/// Where config, credentials, cache documents and daemon logs live.
///
/// Layout under a base: `config.toml`, `credentials.toml`, `data/cache/*.json`
/// and `logs/watchkeeper.*`.
pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    /// Per-user layout under the platform config dir (`~/.config/watchkeeper`).
    pub fn new() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("watchkeeper");
        Ok(Self::with_base(base))
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self {
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
            config_dir: base,
        }
    }

    pub fn from_docker_env() -> Self {
        Self::with_base(container_base_path())
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("credentials.toml")
    }

    pub fn daemon_log_file(&self) -> PathBuf {
        self.log_dir.join("watchkeeper.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [self.config_dir.clone(), self.log_dir.clone(), self.cache_dir()] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl Default for PathManager {
    /// Container layout when the image's base directory exists, else per-user.
    fn default() -> Self {
        if container_base_path().exists() {
            return Self::from_docker_env();
        }
        Self::new().unwrap_or_else(|_| Self::from_docker_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_base() {
        let paths = PathManager::with_base(PathBuf::from("/srv/watchkeeper"));
        assert_eq!(paths.config_file(), PathBuf::from("/srv/watchkeeper/config.toml"));
        assert_eq!(paths.credentials_file(), PathBuf::from("/srv/watchkeeper/credentials.toml"));
        assert_eq!(paths.cache_dir(), PathBuf::from("/srv/watchkeeper/data/cache"));
        assert_eq!(paths.daemon_log_file(), PathBuf::from("/srv/watchkeeper/logs/watchkeeper.log"));
    }

    #[test]
    fn test_container_base_override() {
        assert_eq!(container_base_from(|_| None), PathBuf::from("/app"));
        assert_eq!(container_base_from(|_| Some(String::new())), PathBuf::from("/app"));
        assert_eq!(
            container_base_from(|_| Some("/data/wk".to_string())),
            PathBuf::from("/data/wk")
        );
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::with_base(dir.path().join("wk"));
        paths.ensure_directories().unwrap();
        assert!(paths.cache_dir().is_dir());
        assert!(paths.log_dir().is_dir());
        assert!(paths.config_dir().is_dir());
    }
}
