use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use watchlist_config::CollectorConfig;
use watchlist_models::MediaRecord;

use crate::observer::{RunEvent, RunObserver, TracingObserver};
use crate::resolver::{ResolveHint, Resolver};
use crate::slug::slug;

#[derive(Debug, Clone, PartialEq)]
pub struct CollectorOptions {
    pub batch_size: usize,
    /// Pause between consecutive batches
    pub batch_delay: Duration,
    /// Resolve every title even when the cache knows it
    pub skip_cache: bool,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self::from_config(&CollectorConfig::default())
    }
}

impl CollectorOptions {
    pub fn from_config(config: &CollectorConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            batch_delay: Duration::from_millis(config.batch_delay_ms),
            skip_cache: config.skip_cache,
        }
    }
}

/// Counters for one collection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub cache_hits: usize,
    pub looked_up: usize,
    pub unmatched: usize,
}

#[derive(Debug, Clone)]
pub struct Collected {
    pub records: Vec<MediaRecord>,
    pub stats: CollectStats,
}

enum Outcome {
    Cached(MediaRecord),
    Resolved(MediaRecord),
}

/// Turns scraped titles into records, reusing cached records where possible
/// and resolving the rest in rate-limited batches.
pub struct Collector {
    resolver: Resolver,
    options: CollectorOptions,
    observer: Arc<dyn RunObserver>,
}

impl Collector {
    pub fn new(resolver: Resolver, options: CollectorOptions) -> Self {
        Self {
            resolver,
            options,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// One record per title, in input order.
    pub async fn collect(&self, raw_titles: &[String], cached: &[MediaRecord]) -> Vec<MediaRecord> {
        self.collect_with_stats(raw_titles, cached).await.records
    }

    pub async fn collect_with_stats(&self, raw_titles: &[String], cached: &[MediaRecord]) -> Collected {
        // Later occurrences of a slug overwrite earlier ones
        let cache: HashMap<String, &MediaRecord> = if self.options.skip_cache {
            HashMap::new()
        } else {
            cached.iter().map(|record| (slug(&record.google_title), record)).collect()
        };

        let batch_size = self.options.batch_size.max(1);
        let total = raw_titles.len().div_ceil(batch_size);
        let mut records = Vec::with_capacity(raw_titles.len());
        let mut stats = CollectStats::default();

        for (index, batch) in raw_titles.chunks(batch_size).enumerate() {
            if index > 0 && !self.options.batch_delay.is_zero() {
                tokio::time::sleep(self.options.batch_delay).await;
            }
            self.observer.on_event(&RunEvent::BatchStarted {
                index,
                total,
                size: batch.len(),
            });

            let lookups = batch.iter().map(|title| self.collect_one(title, &cache));
            for outcome in join_all(lookups).await {
                match outcome {
                    Outcome::Cached(record) => {
                        stats.cache_hits += 1;
                        records.push(record);
                    }
                    Outcome::Resolved(record) => {
                        stats.looked_up += 1;
                        if !record.status.tmdb {
                            stats.unmatched += 1;
                        }
                        records.push(record);
                    }
                }
            }

            self.observer.on_event(&RunEvent::BatchFinished { index, total });
        }

        Collected { records, stats }
    }

    async fn collect_one(&self, title: &str, cache: &HashMap<String, &MediaRecord>) -> Outcome {
        if let Some(record) = cache.get(&slug(title)) {
            self.observer.on_event(&RunEvent::CacheHit {
                title: title.to_string(),
            });
            return Outcome::Cached((*record).clone());
        }

        let (record, error) = self.resolver.resolve_reporting(title, &ResolveHint::default(), 0).await;
        match error {
            Some(e) => self.observer.on_event(&RunEvent::LookupFailed {
                title: title.to_string(),
                error: e.to_string(),
            }),
            None => self.observer.on_event(&RunEvent::LookupFinished {
                title: title.to_string(),
                matched: record.status.tmdb,
            }),
        }
        Outcome::Resolved(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;
    use crate::testing::{lookup_result, resolved, FakeLookup};
    use watchlist_models::MediaType;

    fn titles(titles: &[&str]) -> Vec<String> {
        titles.iter().map(|t| t.to_string()).collect()
    }

    fn options(batch_size: usize, skip_cache: bool) -> CollectorOptions {
        CollectorOptions {
            batch_size,
            batch_delay: Duration::ZERO,
            skip_cache,
        }
    }

    fn lookup() -> FakeLookup {
        FakeLookup::new()
            .with_results("Dune", vec![lookup_result(438631, "Dune", Some("2021-09-15"), MediaType::Movie)])
            .with_results("Heat", vec![lookup_result(949, "Heat", Some("1995-12-15"), MediaType::Movie)])
            .with_results("Alien", vec![lookup_result(348, "Alien", Some("1979-05-25"), MediaType::Movie)])
    }

    #[tokio::test]
    async fn test_output_follows_input_order_across_batches() {
        let collector = Collector::new(Resolver::new(Arc::new(lookup())), options(2, false));

        let records = collector
            .collect(&titles(&["Heat", "Unknown Thing", "Dune", "Alien", "Heat"]), &[])
            .await;

        let google_titles: Vec<&str> = records.iter().map(|r| r.google_title.as_str()).collect();
        assert_eq!(google_titles, vec!["Heat", "Unknown Thing", "Dune", "Alien", "Heat"]);
        assert_eq!(records[1].id, 0);
        assert_eq!(records[2].id, 438631);
    }

    #[tokio::test]
    async fn test_cache_hit_reuses_record_verbatim() {
        let fake = Arc::new(lookup());
        let collector = Collector::new(Resolver::new(fake.clone()), options(5, false));
        let mut cached = resolved(42, "Dune");
        cached.title = "Dune: Part One".to_string();

        let collected = collector.collect_with_stats(&titles(&["dune", "Heat"]), &[cached.clone()]).await;

        assert_eq!(collected.records[0], cached);
        assert_eq!(collected.stats.cache_hits, 1);
        assert_eq!(collected.stats.looked_up, 1);
        assert_eq!(fake.query_titles(), vec!["Heat"]);
    }

    #[tokio::test]
    async fn test_last_cached_occurrence_wins() {
        let collector = Collector::new(Resolver::new(Arc::new(lookup())), options(5, false));
        let first = resolved(1, "Dune");
        let second = resolved(2, "Dune");

        let records = collector.collect(&titles(&["Dune"]), &[first, second.clone()]).await;
        assert_eq!(records, vec![second]);
    }

    #[tokio::test]
    async fn test_skip_cache_resolves_everything() {
        let fake = Arc::new(lookup());
        let collector = Collector::new(Resolver::new(fake.clone()), options(5, true));

        let collected = collector
            .collect_with_stats(&titles(&["Dune"]), &[resolved(42, "Dune")])
            .await;

        assert_eq!(collected.records[0].id, 438631);
        assert_eq!(collected.stats.cache_hits, 0);
        assert_eq!(fake.query_titles(), vec!["Dune"]);
    }

    #[tokio::test]
    async fn test_failures_become_fallback_records() {
        let fake = FakeLookup::new().failing_on("Dune");
        let observer = Arc::new(RecordingObserver::default());
        let collector =
            Collector::new(Resolver::new(Arc::new(fake)), options(5, false)).with_observer(observer.clone());

        let collected = collector.collect_with_stats(&titles(&["Dune"]), &[]).await;

        assert_eq!(collected.records.len(), 1);
        assert_eq!(collected.records[0].id, 0);
        assert_eq!(collected.stats.unmatched, 1);
        assert!(observer
            .events()
            .iter()
            .any(|e| matches!(e, RunEvent::LookupFailed { title, .. } if title == "Dune")));
    }

    #[tokio::test]
    async fn test_batches_are_reported() {
        let observer = Arc::new(RecordingObserver::default());
        let collector = Collector::new(Resolver::new(Arc::new(lookup())), options(2, false))
            .with_observer(observer.clone());

        collector.collect(&titles(&["Dune", "Heat", "Alien"]), &[]).await;

        let batches: Vec<(usize, usize)> = observer
            .events()
            .iter()
            .filter_map(|e| match e {
                RunEvent::BatchStarted { index, size, .. } => Some((*index, *size)),
                _ => None,
            })
            .collect();
        assert_eq!(batches, vec![(0, 2), (1, 1)]);
    }

    #[test]
    fn test_options_from_config() {
        let options = CollectorOptions::from_config(&CollectorConfig {
            batch_size: 0,
            batch_delay_ms: 25,
            lookup_timeout_secs: 30,
            skip_cache: true,
        });
        assert_eq!(options.batch_size, 1);
        assert_eq!(options.batch_delay, Duration::from_millis(25));
        assert!(options.skip_cache);
    }
}
