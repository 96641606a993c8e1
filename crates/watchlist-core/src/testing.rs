//! In-memory collaborators shared by the unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;
use watchlist_models::{now_millis, MediaRecord, MediaStatus, MediaType, UnknownState};
use watchlist_sources::{LookupQuery, LookupResult, MediaRequester, MetadataLookup, SourceError, TitleSource};

pub fn lookup_result(id: u64, title: &str, date: Option<&str>, media_type: MediaType) -> LookupResult {
    LookupResult {
        id,
        title: title.to_string(),
        release_date: date.map(str::to_string),
        media_type: Some(media_type),
        poster_url: None,
    }
}

/// A confirmed record for `google_title`.
pub fn resolved(id: u64, google_title: &str) -> MediaRecord {
    MediaRecord {
        uuid: Uuid::new_v4(),
        id,
        title: google_title.to_string(),
        google_title: google_title.to_string(),
        release_date: None,
        release_year: None,
        media_type: Some(MediaType::Movie),
        poster_img: None,
        date_added: now_millis(),
        status: MediaStatus::matched(),
        unknown_state: None,
        google_search_url: None,
    }
}

/// An unmatched record for `google_title`.
pub fn unmatched(google_title: &str) -> MediaRecord {
    MediaRecord {
        id: 0,
        media_type: None,
        status: MediaStatus::unmatched(),
        unknown_state: Some(UnknownState::Unmatched),
        ..resolved(0, google_title)
    }
}

/// Lookup answering from a fixed table keyed by query title.
#[derive(Default)]
pub struct FakeLookup {
    results: HashMap<String, Vec<LookupResult>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    queries: Mutex<Vec<LookupQuery>>,
}

impl FakeLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, title: &str, results: Vec<LookupResult>) -> Self {
        self.results.insert(title.to_string(), results);
        self
    }

    pub fn failing_on(mut self, title: &str) -> Self {
        self.failing.insert(title.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queries(&self) -> Vec<LookupQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn query_titles(&self) -> Vec<String> {
        self.queries().into_iter().map(|q| q.title).collect()
    }
}

#[async_trait]
impl MetadataLookup for FakeLookup {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn search(&self, query: &LookupQuery) -> Result<Vec<LookupResult>, SourceError> {
        self.queries.lock().unwrap().push(query.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&query.title) {
            return Err(SourceError::Status {
                service: "fake",
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(self.results.get(&query.title).cloned().unwrap_or_default())
    }
}

pub struct FakeTitles {
    titles: Vec<String>,
}

impl FakeTitles {
    pub fn new(titles: &[&str]) -> Self {
        Self {
            titles: titles.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[async_trait]
impl TitleSource for FakeTitles {
    fn source_name(&self) -> &str {
        "fake"
    }

    async fn scrape_titles(&self) -> Vec<String> {
        self.titles.clone()
    }
}

#[derive(Default)]
pub struct FakeRequester {
    fail: bool,
    requests: Mutex<Vec<(u64, MediaType)>>,
}

impl FakeRequester {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<(u64, MediaType)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaRequester for FakeRequester {
    fn service_name(&self) -> &str {
        "fake"
    }

    async fn request_media(&self, id: u64, media_type: MediaType) -> Result<(), SourceError> {
        if self.fail {
            return Err(SourceError::Status {
                service: "fake",
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.requests.lock().unwrap().push((id, media_type));
        Ok(())
    }
}
