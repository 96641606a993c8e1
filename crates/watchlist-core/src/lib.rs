pub mod collector;
pub mod disambiguation;
pub mod merge;
pub mod observer;
pub mod operations;
pub mod orchestrator;
pub mod reconcile;
pub mod resolver;
pub mod slug;
pub mod store;
pub mod unknowns;

#[cfg(test)]
mod testing;

pub use collector::{CollectStats, Collected, Collector, CollectorOptions};
pub use disambiguation::{Disambiguation, LookupPlan, NextBestCandidate, ResolveQuery};
pub use merge::overlay;
pub use observer::{FanoutObserver, RecordingObserver, RunEvent, RunObserver, TracingObserver};
pub use operations::{
    find_record, load_settings, paginate, remove_movie, save_settings, search_records, update_movie, Page,
    UpdateOutcome,
};
pub use orchestrator::{RequestOutcome, ResolveOutcome, RunOptions, RunOrchestrator, RunSummary};
pub use reconcile::{count_duplicates, ReconcileOptions, Reconciler};
pub use resolver::{fallback_record, ResolveHint, Resolver};
pub use slug::slug;
pub use store::{CacheManager, DocumentStore, FileStore, MemoryStore, SETTINGS_KEY, UNKNOWNS_KEY, WATCHLIST_KEY};
pub use unknowns::project_unknown;
