use async_trait::async_trait;
use watchlist_models::MediaType;

use crate::error::SourceError;

/// Yields the raw watch-later labels in presentation order.
///
/// Implementations absorb their own transport failures: a page that cannot be
/// fetched is skipped, so the caller may see fewer titles but never an error.
#[async_trait]
pub trait TitleSource: Send + Sync {
    fn source_name(&self) -> &str;

    async fn scrape_titles(&self) -> Vec<String>;
}

/// Search query sent to the metadata database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupQuery {
    pub title: String,
    /// `None` searches every media type
    pub media_type: Option<MediaType>,
    pub year: Option<i32>,
}

impl LookupQuery {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// One candidate returned by a search, in the provider's ranking order.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult {
    pub id: u64,
    pub title: String,
    pub release_date: Option<String>,
    pub media_type: Option<MediaType>,
    pub poster_url: Option<String>,
}

#[async_trait]
pub trait MetadataLookup: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Ranked candidates for `query`. An empty vector means no match.
    async fn search(&self, query: &LookupQuery) -> Result<Vec<LookupResult>, SourceError>;
}

/// Media request service (Overseerr and compatible forks).
#[async_trait]
pub trait MediaRequester: Send + Sync {
    fn service_name(&self) -> &str;

    async fn request_media(&self, id: u64, media_type: MediaType) -> Result<(), SourceError>;
}
