use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;
use watchlist_config::Config;
use watchlist_models::{MediaRecord, RecordPatch, StatusPatch};
use watchlist_sources::{Collaborators, MediaRequester, TitleSource};

use crate::collector::{Collector, CollectorOptions};
use crate::disambiguation::{Disambiguation, NextBestCandidate, ResolveQuery};
use crate::observer::{RunEvent, RunObserver, TracingObserver};
use crate::operations::{find_record, remove_movie, update_movie, UpdateOutcome};
use crate::reconcile::{count_duplicates, ReconcileOptions, Reconciler};
use crate::resolver::Resolver;
use crate::store::{CacheManager, UNKNOWNS_KEY, WATCHLIST_KEY};
use crate::unknowns::project_unknown;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Compute everything, write nothing
    pub dry_run: bool,
    /// Bypass the cache for this run on top of the configured setting
    pub skip_cache: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub scraped: usize,
    pub cache_hits: usize,
    pub looked_up: usize,
    pub unmatched: usize,
    pub duplicates: usize,
    pub records: usize,
    pub unknowns: usize,
    pub dry_run: bool,
    /// The scrape came back empty and the stored documents were kept
    pub kept_previous: bool,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RequestOutcome {
    Requested,
    /// The record is not a confirmed movie or series
    NotConfirmed,
    NotConfigured,
    NotFound,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolveOutcome {
    Resolved {
        record: MediaRecord,
        update: UpdateOutcome,
        request: Option<RequestOutcome>,
    },
    /// The lookup found nothing at the requested rank
    NoResults,
    NotFound,
}

/// Drives full runs and the manual flows against one cache.
///
/// Every operation holds the same async lock, so a run and a point update
/// never interleave their read-modify-write cycles.
pub struct RunOrchestrator {
    titles: Arc<dyn TitleSource>,
    resolver: Resolver,
    requester: Option<Arc<dyn MediaRequester>>,
    cache: CacheManager,
    collector_options: CollectorOptions,
    reconcile_options: ReconcileOptions,
    observer: Arc<dyn RunObserver>,
    disambiguation: Arc<dyn Disambiguation>,
    lock: Mutex<()>,
}

impl RunOrchestrator {
    pub fn new(collaborators: Collaborators, cache: CacheManager) -> Self {
        Self {
            titles: collaborators.titles,
            resolver: Resolver::new(collaborators.lookup),
            requester: collaborators.requester,
            cache,
            collector_options: CollectorOptions::default(),
            reconcile_options: ReconcileOptions::default(),
            observer: Arc::new(TracingObserver),
            disambiguation: Arc::new(NextBestCandidate),
            lock: Mutex::new(()),
        }
    }

    /// Orchestrator tuned by the `[collector]` section of `config`.
    pub fn from_config(config: &Config, collaborators: Collaborators, cache: CacheManager) -> Self {
        let timeout = Duration::from_secs(config.collector.lookup_timeout_secs);
        Self::new(collaborators, cache)
            .with_collector_options(CollectorOptions::from_config(&config.collector))
            .with_reconcile_options(ReconcileOptions::from_config(&config.collector))
            .with_lookup_timeout(Some(timeout))
    }

    /// `None` or zero lets lookups run unbounded.
    pub fn with_lookup_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.resolver = self.resolver.with_timeout(timeout);
        self
    }

    pub fn with_collector_options(mut self, options: CollectorOptions) -> Self {
        self.collector_options = options;
        self
    }

    pub fn with_reconcile_options(mut self, options: ReconcileOptions) -> Self {
        self.reconcile_options = options;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_disambiguation(mut self, disambiguation: Arc<dyn Disambiguation>) -> Self {
        self.disambiguation = disambiguation;
        self
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn can_request(&self) -> bool {
        self.requester.is_some()
    }

    /// Scrape, collect, reconcile, then write the watchlist and its unknowns.
    pub async fn run(&self, options: RunOptions) -> Result<RunSummary> {
        let _guard = self.lock.lock().await;
        let start = Instant::now();
        self.observer.on_event(&RunEvent::RunStarted {
            dry_run: options.dry_run,
        });

        let cached = self.cache.load_watchlist()?.data;
        let titles = self.titles.scrape_titles().await;
        self.observer.on_event(&RunEvent::Scraped { titles: titles.len() });

        let mut summary = RunSummary {
            scraped: titles.len(),
            dry_run: options.dry_run,
            ..RunSummary::default()
        };

        if titles.is_empty() && !cached.is_empty() {
            warn!(
                operation = "run",
                cached = cached.len(),
                "Scrape returned no titles, keeping the stored watchlist"
            );
            summary.kept_previous = true;
            summary.records = cached.len();
            summary.unknowns = project_unknown(&cached).len();
            summary.duration_ms = start.elapsed().as_millis() as u64;
            self.observer.on_event(&RunEvent::RunFinished {
                summary: summary.clone(),
            });
            return Ok(summary);
        }

        let skip_cache = options.skip_cache || self.collector_options.skip_cache;
        let collector = Collector::new(
            self.resolver.clone(),
            CollectorOptions {
                skip_cache,
                ..self.collector_options.clone()
            },
        )
        .with_observer(self.observer.clone());
        let collected = collector.collect_with_stats(&titles, &cached).await;

        let reconciler = Reconciler::new(ReconcileOptions {
            skip_cache: skip_cache || self.reconcile_options.skip_cache,
        });
        let watchlist = reconciler.reconcile(collected.records, &cached);
        let unknowns = project_unknown(&watchlist);

        summary.cache_hits = collected.stats.cache_hits;
        summary.looked_up = collected.stats.looked_up;
        summary.unmatched = collected.stats.unmatched;
        summary.duplicates = count_duplicates(&watchlist);
        summary.records = watchlist.len();
        summary.unknowns = unknowns.len();
        self.observer.on_event(&RunEvent::Reconciled {
            records: summary.records,
            duplicates: summary.duplicates,
        });

        if !options.dry_run {
            self.cache.save_watchlist(&watchlist)?;
            self.observer.on_event(&RunEvent::DocumentWritten {
                key: WATCHLIST_KEY.to_string(),
                records: watchlist.len(),
            });
            self.cache.save_unknowns(&unknowns)?;
            self.observer.on_event(&RunEvent::DocumentWritten {
                key: UNKNOWNS_KEY.to_string(),
                records: unknowns.len(),
            });
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        self.observer.on_event(&RunEvent::RunFinished {
            summary: summary.clone(),
        });
        Ok(summary)
    }

    /// Re-resolve one record by hand and, when found, confirm it in both
    /// documents and take it off the unknown list.
    pub async fn resolve_unknown(&self, uuid: Uuid, query: ResolveQuery, request: bool) -> Result<ResolveOutcome> {
        let _guard = self.lock.lock().await;

        let Some(record) = find_record(&self.cache, uuid)? else {
            return Ok(ResolveOutcome::NotFound);
        };

        let plan = self.disambiguation.plan(&record, &query);
        info!(
            operation = "resolve",
            uuid = %uuid,
            title = %plan.title,
            rank = plan.rank,
            "Re-resolving record"
        );

        let found = match self.resolver.candidate(&plan.title, &plan.hint, plan.rank).await {
            Ok(Some(found)) => found,
            Ok(None) => return Ok(ResolveOutcome::NoResults),
            Err(e) => {
                warn!(operation = "resolve", uuid = %uuid, kind = e.category(), error = %e, "Lookup failed");
                return Ok(ResolveOutcome::NoResults);
            }
        };

        let patch = RecordPatch::resolved_from(&found);
        let update = update_movie(&self.cache, uuid, &patch)?;
        remove_movie(&self.cache, uuid)?;

        let mut resolved = record;
        resolved.apply_patch(&patch);

        let request = if request {
            Some(self.request_locked(uuid).await?)
        } else {
            None
        };
        if let Some(RequestOutcome::Requested) = request {
            resolved.status.overseerr = true;
        }

        Ok(ResolveOutcome::Resolved {
            record: resolved,
            update,
            request,
        })
    }

    /// Forward a confirmed record to the request service.
    pub async fn request(&self, uuid: Uuid) -> Result<RequestOutcome> {
        let _guard = self.lock.lock().await;
        self.request_locked(uuid).await
    }

    /// Take a record off the unknown list without resolving it.
    pub async fn dismiss(&self, uuid: Uuid) -> Result<bool> {
        let _guard = self.lock.lock().await;
        remove_movie(&self.cache, uuid)
    }

    async fn request_locked(&self, uuid: Uuid) -> Result<RequestOutcome> {
        let Some(requester) = self.requester.as_ref() else {
            return Ok(RequestOutcome::NotConfigured);
        };
        let Some(record) = find_record(&self.cache, uuid)? else {
            return Ok(RequestOutcome::NotFound);
        };
        let Some(media_type) = record.media_type.filter(|_| record.is_requestable()) else {
            return Ok(RequestOutcome::NotConfirmed);
        };

        match requester.request_media(record.id, media_type).await {
            Ok(()) => {
                update_movie(
                    &self.cache,
                    uuid,
                    &RecordPatch::status(StatusPatch {
                        overseerr: Some(true),
                        ..StatusPatch::default()
                    }),
                )?;
                Ok(RequestOutcome::Requested)
            }
            Err(e) => {
                warn!(
                    operation = "request",
                    uuid = %uuid,
                    service = requester.service_name(),
                    error = %e,
                    "Media request failed"
                );
                Ok(RequestOutcome::Failed { error: e.to_string() })
            }
        }
    }
}
