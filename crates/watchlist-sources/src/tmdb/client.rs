use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;
use watchlist_models::MediaType;

use crate::error::SourceError;
use crate::tmdb::api::{release_year, SearchResponse};
use crate::traits::{LookupQuery, LookupResult, MetadataLookup};

pub const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";

pub fn create_tmdb_client() -> Client {
    Client::builder()
        .user_agent(concat!("watchkeeper/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// TMDB search API, authenticated with a v4 read access token.
#[derive(Clone)]
pub struct TmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_token: String,
    language: String,
    include_adult: bool,
}

impl TmdbClient {
    pub fn new(api_token: String, language: String, include_adult: bool) -> Self {
        Self {
            client: Arc::new(create_tmdb_client()),
            base_url: TMDB_API_BASE.to_string(),
            api_token,
            language,
            include_adult,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn search_url(&self, scope: Option<MediaType>) -> String {
        let endpoint = match scope {
            Some(MediaType::Movie) => "movie",
            Some(MediaType::Tv) => "tv",
            Some(MediaType::Person) => "person",
            None => "multi",
        };
        format!("{}/search/{}", self.base_url, endpoint)
    }

    fn query_params(&self, query: &LookupQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("include_adult", self.include_adult.to_string()),
            ("language", self.language.clone()),
            ("page", "1".to_string()),
            ("query", query.title.clone()),
        ];
        if let Some(year) = query.year {
            match query.media_type {
                Some(MediaType::Movie) => params.push(("year", year.to_string())),
                Some(MediaType::Tv) => params.push(("first_air_date_year", year.to_string())),
                _ => {}
            }
        }
        params
    }
}

/// `/search/multi` has no year parameter, so a year hint narrows the ranked
/// results locally. If nothing matches the year the unfiltered list is kept.
pub(crate) fn filter_by_year(results: Vec<LookupResult>, year: Option<i32>) -> Vec<LookupResult> {
    let Some(year) = year else {
        return results;
    };
    let matching: Vec<LookupResult> = results
        .iter()
        .filter(|r| r.release_date.as_deref().and_then(release_year) == Some(year))
        .cloned()
        .collect();
    if matching.is_empty() {
        results
    } else {
        matching
    }
}

#[async_trait]
impl MetadataLookup for TmdbClient {
    fn provider_name(&self) -> &str {
        "tmdb"
    }

    async fn search(&self, query: &LookupQuery) -> Result<Vec<LookupResult>, SourceError> {
        if self.api_token.is_empty() {
            return Err(SourceError::not_configured("TMDB API token"));
        }

        let response = self
            .client
            .get(self.search_url(query.media_type))
            .bearer_auth(&self.api_token)
            .header("Accept", "application/json")
            .query(&self.query_params(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                service: "tmdb",
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| SourceError::Parse {
            service: "tmdb",
            message: e.to_string(),
        })?;

        let results: Vec<LookupResult> = parsed
            .results
            .into_iter()
            .map(|hit| hit.into_lookup_result(query.media_type))
            .collect();
        debug!(query = %query.title, results = results.len(), "TMDB search");

        if query.media_type.is_none() {
            Ok(filter_by_year(results, query.year))
        } else {
            Ok(results)
        }
    }
}
