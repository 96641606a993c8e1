use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const TMDB_API_TOKEN: &str = "tmdb_api_token";
const OVERSEERR_API_KEY: &str = "overseerr_api_key";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
    // Values taken from the environment; consulted first, never written back
    overrides: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
            overrides: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Pick up `TMDB_API_TOKEN` and `OVERSEERR_API_KEY` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (env_key, key) in [("TMDB_API_TOKEN", TMDB_API_TOKEN), ("OVERSEERR_API_KEY", OVERSEERR_API_KEY)] {
            if let Some(value) = lookup(env_key).filter(|v| !v.is_empty()) {
                self.overrides.insert(key.to_string(), value);
            }
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.overrides.get(key).or_else(|| self.credentials.get(key))
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    pub fn get_tmdb_api_token(&self) -> Option<&String> {
        self.get(TMDB_API_TOKEN)
    }

    pub fn set_tmdb_api_token(&mut self, token: String) {
        self.set(TMDB_API_TOKEN.to_string(), token);
    }

    pub fn get_overseerr_api_key(&self) -> Option<&String> {
        self.get(OVERSEERR_API_KEY)
    }

    pub fn set_overseerr_api_key(&mut self, key: String) {
        self.set(OVERSEERR_API_KEY.to_string(), key);
    }
}
