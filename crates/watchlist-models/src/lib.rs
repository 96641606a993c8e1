pub mod document;
pub mod media;
pub mod record;
pub mod status;

pub use document::{now_millis, Document, RecordDocument, Settings, SettingsDocument};
pub use media::MediaType;
pub use record::{MediaRecord, RecordPatch, UnknownState};
pub use status::{MediaStatus, StatusPatch};
