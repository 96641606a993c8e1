use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use watchlist_models::{now_millis, MediaRecord, MediaStatus, MediaType, UnknownState};
use watchlist_sources::{release_year, LookupQuery, LookupResult, MetadataLookup, SourceError};

const GOOGLE_SEARCH_URL: &str = "https://google.ca/search?q=";

/// Scoping and identity carried into a lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveHint {
    /// Reused by the produced record, fallback included
    pub uuid: Option<Uuid>,
    pub media_type: Option<MediaType>,
    pub release_year: Option<i32>,
}

/// Turns a scraped title into a [`MediaRecord`] with one metadata lookup.
#[derive(Clone)]
pub struct Resolver {
    lookup: Arc<dyn MetadataLookup>,
    timeout: Option<Duration>,
}

impl Resolver {
    pub fn new(lookup: Arc<dyn MetadataLookup>) -> Self {
        Self { lookup, timeout: None }
    }

    /// Bound each lookup; an elapsed lookup counts as a transport failure.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn provider_name(&self) -> &str {
        self.lookup.provider_name()
    }

    /// Resolve `raw_title`, degrading to a fallback record on any failure.
    pub async fn resolve(&self, raw_title: &str, hint: &ResolveHint, rank: usize) -> MediaRecord {
        self.resolve_reporting(raw_title, hint, rank).await.0
    }

    /// Like [`Resolver::resolve`], also handing back the lookup error that
    /// produced a fallback record, if any.
    pub async fn resolve_reporting(
        &self,
        raw_title: &str,
        hint: &ResolveHint,
        rank: usize,
    ) -> (MediaRecord, Option<SourceError>) {
        match self.candidate(raw_title, hint, rank).await {
            Ok(Some(record)) => (record, None),
            Ok(None) => (fallback_record(raw_title, hint), None),
            Err(e) => (fallback_record(raw_title, hint), Some(e)),
        }
    }

    /// The candidate at `rank`, or `None` when the search came back with
    /// fewer results.
    pub async fn candidate(
        &self,
        raw_title: &str,
        hint: &ResolveHint,
        rank: usize,
    ) -> Result<Option<MediaRecord>, SourceError> {
        let query = LookupQuery {
            title: raw_title.to_string(),
            media_type: hint.media_type,
            year: hint.release_year,
        };

        let results = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.lookup.search(&query))
                .await
                .map_err(|_| SourceError::Timeout(limit))??,
            None => self.lookup.search(&query).await?,
        };

        Ok(results
            .into_iter()
            .nth(rank)
            .map(|result| matched_record(raw_title, hint, result)))
    }
}

/// Record for a title the metadata database could not place.
pub fn fallback_record(raw_title: &str, hint: &ResolveHint) -> MediaRecord {
    MediaRecord {
        uuid: hint.uuid.unwrap_or_else(Uuid::new_v4),
        id: 0,
        title: raw_title.to_string(),
        google_title: raw_title.to_string(),
        release_date: None,
        release_year: None,
        media_type: None,
        poster_img: None,
        date_added: now_millis(),
        status: MediaStatus::unmatched(),
        unknown_state: Some(UnknownState::Unmatched),
        google_search_url: Some(google_search_url(raw_title)),
    }
}

fn matched_record(raw_title: &str, hint: &ResolveHint, result: LookupResult) -> MediaRecord {
    let year = result.release_date.as_deref().and_then(release_year);
    let search_terms = match (year, result.media_type) {
        (Some(year), _) => format!("{} ({})", result.title, year),
        (None, Some(media_type)) => format!("{} ({})", result.title, media_type),
        (None, None) => result.title.clone(),
    };

    MediaRecord {
        uuid: hint.uuid.unwrap_or_else(Uuid::new_v4),
        id: result.id,
        title: result.title,
        google_title: raw_title.to_string(),
        release_date: result.release_date,
        release_year: year,
        media_type: result.media_type,
        poster_img: result.poster_url,
        date_added: now_millis(),
        status: MediaStatus::matched(),
        unknown_state: None,
        google_search_url: Some(google_search_url(&search_terms)),
    }
}

fn google_search_url(terms: &str) -> String {
    format!("{}{}", GOOGLE_SEARCH_URL, urlencoding::encode(terms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeLookup, lookup_result};

    #[tokio::test]
    async fn test_resolve_maps_first_result() {
        let lookup = FakeLookup::new().with_results(
            "Dune",
            vec![
                lookup_result(438631, "Dune", Some("2021-09-15"), MediaType::Movie),
                lookup_result(841, "Dune", Some("1984-12-14"), MediaType::Movie),
            ],
        );
        let resolver = Resolver::new(Arc::new(lookup));

        let record = resolver.resolve("Dune", &ResolveHint::default(), 0).await;
        assert_eq!(record.id, 438631);
        assert_eq!(record.google_title, "Dune");
        assert_eq!(record.release_year, Some(2021));
        assert_eq!(record.media_type, Some(MediaType::Movie));
        assert_eq!(record.status, MediaStatus::matched());
        assert_eq!(record.unknown_state, None);
        assert_eq!(
            record.google_search_url.as_deref(),
            Some("https://google.ca/search?q=Dune%20%282021%29")
        );
    }

    #[tokio::test]
    async fn test_resolve_rank_one_picks_next_candidate() {
        let lookup = FakeLookup::new().with_results(
            "Dune",
            vec![
                lookup_result(438631, "Dune", Some("2021-09-15"), MediaType::Movie),
                lookup_result(841, "Dune", Some("1984-12-14"), MediaType::Movie),
            ],
        );
        let resolver = Resolver::new(Arc::new(lookup));

        let record = resolver.resolve("Dune", &ResolveHint::default(), 1).await;
        assert_eq!(record.id, 841);
        assert_eq!(record.release_year, Some(1984));
    }

    #[tokio::test]
    async fn test_rank_out_of_range_falls_back() {
        let lookup = FakeLookup::new().with_results(
            "Dune",
            vec![lookup_result(438631, "Dune", Some("2021-09-15"), MediaType::Movie)],
        );
        let resolver = Resolver::new(Arc::new(lookup));

        let record = resolver.resolve("Dune", &ResolveHint::default(), 1).await;
        assert_eq!(record.id, 0);
        assert_eq!(record.unknown_state, Some(UnknownState::Unmatched));
    }

    #[tokio::test]
    async fn test_empty_results_fall_back_reusing_uuid() {
        let resolver = Resolver::new(Arc::new(FakeLookup::new()));
        let uuid = Uuid::new_v4();
        let hint = ResolveHint {
            uuid: Some(uuid),
            ..ResolveHint::default()
        };

        let record = resolver.resolve("Some Obscure Short", &hint, 0).await;
        assert_eq!(record.uuid, uuid);
        assert_eq!(record.id, 0);
        assert_eq!(record.media_type, None);
        assert_eq!(record.status, MediaStatus::unmatched());
        assert_eq!(record.unknown_state, Some(UnknownState::Unmatched));
        assert_eq!(record.google_title, "Some Obscure Short");
    }

    #[tokio::test]
    async fn test_failure_falls_back_and_reports() {
        let lookup = FakeLookup::new().failing_on("Dune");
        let resolver = Resolver::new(Arc::new(lookup));

        let (record, error) = resolver.resolve_reporting("Dune", &ResolveHint::default(), 0).await;
        assert_eq!(record.id, 0);
        assert!(error.is_some());
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let lookup = FakeLookup::new()
            .with_results("Dune", vec![lookup_result(1, "Dune", None, MediaType::Movie)])
            .with_delay(Duration::from_millis(200));
        let resolver = Resolver::new(Arc::new(lookup)).with_timeout(Some(Duration::from_millis(10)));

        let (record, error) = resolver.resolve_reporting("Dune", &ResolveHint::default(), 0).await;
        assert_eq!(record.id, 0);
        assert!(matches!(error, Some(SourceError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_hint_scopes_the_query() {
        let lookup = Arc::new(FakeLookup::new());
        let resolver = Resolver::new(lookup.clone());
        let hint = ResolveHint {
            uuid: None,
            media_type: Some(MediaType::Tv),
            release_year: Some(2011),
        };

        resolver.resolve("Game of Thrones", &hint, 0).await;

        let queries = lookup.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].media_type, Some(MediaType::Tv));
        assert_eq!(queries[0].year, Some(2011));
    }

    #[test]
    fn test_search_url_without_year_uses_media_type() {
        let record = matched_record(
            "Cosmos",
            &ResolveHint::default(),
            lookup_result(1, "Cosmos", None, MediaType::Tv),
        );
        assert_eq!(
            record.google_search_url.as_deref(),
            Some("https://google.ca/search?q=Cosmos%20%28tv%29")
        );
    }
}
