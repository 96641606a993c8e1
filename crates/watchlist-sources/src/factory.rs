//! Builds the collaborators a run needs from configuration and credentials.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use watchlist_config::{Config, CredentialStore};

use crate::google::GoogleWatchlistScraper;
use crate::overseerr::OverseerrClient;
use crate::tmdb::TmdbClient;
use crate::traits::{MediaRequester, MetadataLookup, TitleSource};

/// The external collaborators wired for one configuration.
#[derive(Clone)]
pub struct Collaborators {
    pub titles: Arc<dyn TitleSource>,
    pub lookup: Arc<dyn MetadataLookup>,
    /// `None` when no request service is enabled
    pub requester: Option<Arc<dyn MediaRequester>>,
}

pub struct SourceFactory;

impl SourceFactory {
    pub fn title_source(config: &Config) -> Result<Arc<dyn TitleSource>> {
        if config.google.watchlist_url.is_empty() {
            return Err(anyhow!(
                "Google watchlist URL not configured. Run 'watchkeeper config google --url <URL>' first"
            ));
        }
        Ok(Arc::new(GoogleWatchlistScraper::new(
            config.google.watchlist_url.clone(),
            config.google.max_pages,
        )))
    }

    pub fn metadata_lookup(config: &Config, credentials: &CredentialStore) -> Result<Arc<dyn MetadataLookup>> {
        let token = credentials
            .get_tmdb_api_token()
            .ok_or_else(|| anyhow!("TMDB API token not found in credentials. Run 'watchkeeper config tmdb' first"))?
            .clone();
        Ok(Arc::new(TmdbClient::new(
            token,
            config.tmdb.language.clone(),
            config.tmdb.include_adult,
        )))
    }

    /// Request service, if enabled. Enabled without an API key is an error.
    pub fn requester(config: &Config, credentials: &CredentialStore) -> Result<Option<Arc<dyn MediaRequester>>> {
        let Some(overseerr) = config.overseerr.as_ref().filter(|_| config.is_overseerr_enabled()) else {
            return Ok(None);
        };
        let api_key = credentials
            .get_overseerr_api_key()
            .ok_or_else(|| anyhow!("Overseerr API key not found in credentials. Run 'watchkeeper config overseerr' first"))?
            .clone();
        Ok(Some(Arc::new(OverseerrClient::new(overseerr.url.clone(), api_key))))
    }

    pub fn build(config: &Config, credentials: &CredentialStore) -> Result<Collaborators> {
        Ok(Collaborators {
            titles: Self::title_source(config)?,
            lookup: Self::metadata_lookup(config, credentials)?,
            requester: Self::requester(config, credentials)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use watchlist_config::OverseerrConfig;

    fn credentials() -> CredentialStore {
        let mut store = CredentialStore::new(PathBuf::from("/nonexistent/credentials.toml"));
        store.set_tmdb_api_token("token".to_string());
        store
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.google.watchlist_url = "https://www.google.com/interests/saved/list/abc".to_string();
        config
    }

    #[test]
    fn test_build_without_overseerr() {
        let collaborators = SourceFactory::build(&config(), &credentials()).unwrap();
        assert_eq!(collaborators.titles.source_name(), "google");
        assert_eq!(collaborators.lookup.provider_name(), "tmdb");
        assert!(collaborators.requester.is_none());
    }

    #[test]
    fn test_missing_tmdb_token() {
        let store = CredentialStore::new(PathBuf::from("/nonexistent/credentials.toml"));
        assert!(SourceFactory::build(&config(), &store).is_err());
    }

    #[test]
    fn test_overseerr_requires_key() {
        let mut config = config();
        config.overseerr = Some(OverseerrConfig {
            enabled: true,
            url: "http://overseerr:5055".to_string(),
            request_on_resolve: true,
        });
        assert!(SourceFactory::requester(&config, &credentials()).is_err());

        let mut store = credentials();
        store.set_overseerr_api_key("key".to_string());
        let requester = SourceFactory::requester(&config, &store).unwrap();
        assert_eq!(requester.unwrap().service_name(), "overseerr");
    }
}
