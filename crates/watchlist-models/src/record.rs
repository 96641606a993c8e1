use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::media::MediaType;
use crate::status::{MediaStatus, StatusPatch};

/// Why a record sits in the unknown list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UnknownState {
    /// The scraped title appears more than once and the match is not confirmed
    Duplicate,
    /// The lookup failed or returned nothing
    Unmatched,
}

/// One watchlist entry.
///
/// `uuid` is minted on the first resolution attempt and is the join key for
/// every point update. `google_title` is the scraped label and the grouping
/// anchor; `title` is whatever the metadata database resolved it to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    /// Metadata database id, `0` while unresolved
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    pub google_title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub poster_img: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds", default = "crate::document::now_millis")]
    pub date_added: DateTime<Utc>,
    #[serde(default)]
    pub status: MediaStatus,
    #[serde(default)]
    pub unknown_state: Option<UnknownState>,
    #[serde(default)]
    pub google_search_url: Option<String>,
}

impl MediaRecord {
    /// `known && tmdb`
    pub fn is_resolved(&self) -> bool {
        self.status.is_confirmed()
    }

    /// Membership predicate of the unknown list.
    pub fn is_unknown(&self) -> bool {
        !self.status.known || !self.status.tmdb || self.unknown_state.is_some()
    }

    /// A record can be forwarded to the request service once it is confirmed
    /// and points at a real movie or series.
    pub fn is_requestable(&self) -> bool {
        self.is_resolved()
            && self.id != 0
            && self.media_type.map(|t| t.is_requestable()).unwrap_or(false)
    }

    /// Merge `patch` into this record. Scalars replace wholesale, `status`
    /// merges flag by flag.
    pub fn apply_patch(&mut self, patch: &RecordPatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(release_date) = &patch.release_date {
            self.release_date = release_date.clone();
        }
        if let Some(release_year) = patch.release_year {
            self.release_year = release_year;
        }
        if let Some(media_type) = patch.media_type {
            self.media_type = media_type;
        }
        if let Some(poster_img) = &patch.poster_img {
            self.poster_img = poster_img.clone();
        }
        if let Some(status) = &patch.status {
            self.status.apply(status);
        }
        if let Some(unknown_state) = patch.unknown_state {
            self.unknown_state = unknown_state;
        }
        if let Some(google_search_url) = &patch.google_search_url {
            self.google_search_url = google_search_url.clone();
        }
    }
}

/// Partial update addressed to a record by uuid.
///
/// Nullable fields are doubly optional: `None` leaves the field alone,
/// `Some(None)` clears it. Identity fields (`uuid`, `google_title`,
/// `date_added`) are not patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub release_date: Option<Option<String>>,
    pub release_year: Option<Option<i32>>,
    pub media_type: Option<Option<MediaType>>,
    pub poster_img: Option<Option<String>>,
    pub status: Option<StatusPatch>,
    pub unknown_state: Option<Option<UnknownState>>,
    pub google_search_url: Option<Option<String>>,
}

impl RecordPatch {
    pub fn status(status: StatusPatch) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Patch that copies the resolved metadata of `record` while leaving the
    /// identity of the target untouched.
    pub fn resolved_from(record: &MediaRecord) -> Self {
        Self {
            id: Some(record.id),
            title: Some(record.title.clone()),
            release_date: Some(record.release_date.clone()),
            release_year: Some(record.release_year),
            media_type: Some(record.media_type),
            poster_img: Some(record.poster_img.clone()),
            status: Some(StatusPatch {
                known: Some(record.status.known),
                tmdb: Some(record.status.tmdb),
                overseerr: None,
            }),
            unknown_state: Some(record.unknown_state),
            google_search_url: Some(record.google_search_url.clone()),
        }
    }
}
