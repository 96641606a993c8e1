use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::MediaRecord;

/// The current instant at the precision timestamps are persisted with.
///
/// `dateAdded` and `generated` are stored as epoch milliseconds, so anything
/// stamped in memory is truncated to match what a reload returns.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Envelope shared by every persisted cache document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document<T> {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub generated: DateTime<Utc>,
    pub data: T,
}

impl<T> Document<T> {
    /// Wrap `data`, stamping it with the current time.
    pub fn new(data: T) -> Self {
        Self {
            generated: now_millis(),
            data,
        }
    }
}

impl<T: Default> Default for Document<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Watchlist and unknown-list documents
pub type RecordDocument = Document<Vec<MediaRecord>>;

/// Opaque key-value application settings
pub type Settings = Map<String, Value>;

pub type SettingsDocument = Document<Settings>;
