//! Run progress reporting.
//!
//! The core never prints. It emits [`RunEvent`]s and lets the caller decide
//! how to surface them.

use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::orchestrator::RunSummary;

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    RunStarted { dry_run: bool },
    Scraped { titles: usize },
    BatchStarted { index: usize, total: usize, size: usize },
    CacheHit { title: String },
    LookupFinished { title: String, matched: bool },
    LookupFailed { title: String, error: String },
    BatchFinished { index: usize, total: usize },
    Reconciled { records: usize, duplicates: usize },
    DocumentWritten { key: String, records: usize },
    RunFinished { summary: RunSummary },
}

pub trait RunObserver: Send + Sync {
    fn on_event(&self, event: &RunEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_event(&self, event: &RunEvent) {
        match event {
            RunEvent::RunStarted { dry_run } => {
                info!(operation = "run_start", dry_run, "Starting watchlist run");
            }
            RunEvent::Scraped { titles } => {
                info!(operation = "scrape", titles, "Scraped {} titles", titles);
            }
            RunEvent::BatchStarted { index, total, size } => {
                debug!(operation = "collect_batch", batch = index + 1, total, size, "Collecting batch");
            }
            RunEvent::CacheHit { title } => {
                debug!(operation = "collect", title = %title, "Skipping cached");
            }
            RunEvent::LookupFinished { title, matched } => {
                debug!(operation = "collect", title = %title, matched, "Looked up");
            }
            RunEvent::LookupFailed { title, error } => {
                warn!(operation = "lookup", title = %title, error = %error, "Lookup failed, using fallback record");
            }
            RunEvent::BatchFinished { .. } => {}
            RunEvent::Reconciled { records, duplicates } => {
                info!(operation = "reconcile", records, duplicates, "Reconciled watchlist");
            }
            RunEvent::DocumentWritten { key, records } => {
                info!(operation = "write", document = %key, records, "Wrote document");
            }
            RunEvent::RunFinished { summary } => {
                info!(
                    operation = "run_complete",
                    scraped = summary.scraped,
                    looked_up = summary.looked_up,
                    cache_hits = summary.cache_hits,
                    unknowns = summary.unknowns,
                    duration_ms = summary.duration_ms,
                    "Run complete"
                );
            }
        }
    }
}

/// Forwards each event to several observers.
pub struct FanoutObserver {
    observers: Vec<Arc<dyn RunObserver>>,
}

impl FanoutObserver {
    pub fn new(observers: Vec<Arc<dyn RunObserver>>) -> Self {
        Self { observers }
    }
}

impl RunObserver for FanoutObserver {
    fn on_event(&self, event: &RunEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RunEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl RunObserver for RecordingObserver {
    fn on_event(&self, event: &RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
