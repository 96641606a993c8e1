use serde::{Deserialize, Serialize};

/// Three independent confidence flags carried by every record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaStatus {
    /// The match is believed to be the right title
    #[serde(default)]
    pub known: bool,
    /// The metadata database returned a match
    #[serde(default)]
    pub tmdb: bool,
    /// A media request was sent successfully
    #[serde(default)]
    pub overseerr: bool,
}

impl MediaStatus {
    pub fn unmatched() -> Self {
        Self::default()
    }

    pub fn matched() -> Self {
        Self {
            known: true,
            tmdb: true,
            overseerr: false,
        }
    }

    /// Both confidence flags set
    pub fn is_confirmed(&self) -> bool {
        self.known && self.tmdb
    }

    pub fn apply(&mut self, patch: &StatusPatch) {
        if let Some(known) = patch.known {
            self.known = known;
        }
        if let Some(tmdb) = patch.tmdb {
            self.tmdb = tmdb;
        }
        if let Some(overseerr) = patch.overseerr {
            self.overseerr = overseerr;
        }
    }
}

/// Partial status update, merged flag by flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusPatch {
    pub known: Option<bool>,
    pub tmdb: Option<bool>,
    pub overseerr: Option<bool>,
}

impl StatusPatch {
    pub fn is_empty(&self) -> bool {
        self.known.is_none() && self.tmdb.is_none() && self.overseerr.is_none()
    }
}

impl From<MediaStatus> for StatusPatch {
    fn from(status: MediaStatus) -> Self {
        Self {
            known: Some(status.known),
            tmdb: Some(status.tmdb),
            overseerr: Some(status.overseerr),
        }
    }
}
