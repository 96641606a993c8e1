//! Merge of freshly collected records with the stored watchlist.
//!
//! Records are bucketed by `slug(google_title)`. Within a bucket the n-th
//! fresh occurrence is paired with the n-th cached occurrence, which assumes
//! the listing keeps repeated titles in a stable order between runs.

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use watchlist_config::CollectorConfig;
use watchlist_models::{MediaRecord, UnknownState};

use crate::merge::overlay;
use crate::slug::slug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Return the fresh records untouched
    pub skip_cache: bool,
}

impl ReconcileOptions {
    pub fn from_config(config: &CollectorConfig) -> Self {
        Self {
            skip_cache: config.skip_cache,
        }
    }
}

/// Slug buckets in order of first appearance.
struct Buckets<T> {
    index: HashMap<String, usize>,
    groups: Vec<(String, Vec<T>)>,
}

impl<T> Buckets<T> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    fn push(&mut self, key: String, item: T) {
        match self.index.get(&key) {
            Some(&position) => self.groups[position].1.push(item),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![item]));
            }
        }
    }

    fn get(&self, key: &str) -> Option<&[T]> {
        self.index.get(key).map(|&position| self.groups[position].1.as_slice())
    }
}

impl<T: Borrow<MediaRecord>> Buckets<T> {
    fn by_slug(records: impl IntoIterator<Item = T>) -> Self {
        let mut buckets = Self::new();
        for record in records {
            let key = slug(&record.borrow().google_title);
            buckets.push(key, record);
        }
        buckets
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    /// Reconcile `fresh` against `cached`.
    ///
    /// Cached records win over their paired fresh occurrence. Every member of
    /// a bucket with more than one occurrence that is not itself confirmed is
    /// demoted to an unknown duplicate. Output follows the fresh buckets in
    /// order of first appearance.
    pub fn reconcile(&self, fresh: Vec<MediaRecord>, cached: &[MediaRecord]) -> Vec<MediaRecord> {
        if self.options.skip_cache {
            return fresh;
        }

        let cached_buckets = Buckets::by_slug(cached.iter());
        let fresh_buckets = Buckets::by_slug(fresh);

        let mut emitted: HashSet<Uuid> = HashSet::new();
        let mut merged = Vec::new();

        for (key, occurrences) in fresh_buckets.groups {
            let cached_group = cached_buckets.get(&key).unwrap_or(&[]);
            let mut group: Vec<MediaRecord> = Vec::with_capacity(occurrences.len());

            for (position, occurrence) in occurrences.into_iter().enumerate() {
                let mut record = match cached_group.get(position) {
                    Some(cached) => overlay(occurrence, cached),
                    None => occurrence,
                };
                // A cache hit can hand the same stored record to a new repeat
                // of its title; uuids stay unique per occurrence and derive
                // from the shared one so equal inputs give equal output.
                if !emitted.insert(record.uuid) {
                    record.uuid = derived_uuid(&record.uuid, position, &mut emitted);
                }
                group.push(record);
            }

            // Overlaid records keep their bucket: cached members share its slug
            if group.len() > 1 {
                for record in group.iter_mut().filter(|r| !r.is_resolved()) {
                    record.status.known = false;
                    record.unknown_state = Some(UnknownState::Duplicate);
                }
            }
            merged.extend(group);
        }

        merged
    }
}

/// Name-based uuid in the namespace of `shared`, salted with the bucket
/// position and bumped until it is unused.
fn derived_uuid(shared: &Uuid, position: usize, emitted: &mut HashSet<Uuid>) -> Uuid {
    let mut salt = position;
    loop {
        let candidate = Uuid::new_v5(shared, salt.to_string().as_bytes());
        if emitted.insert(candidate) {
            return candidate;
        }
        salt += 1;
    }
}

/// Number of records flagged as duplicates.
pub fn count_duplicates(records: &[MediaRecord]) -> usize {
    records
        .iter()
        .filter(|r| r.unknown_state == Some(UnknownState::Duplicate))
        .count()
}
