//! Point updates against the stored documents, plus listing helpers.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;
use watchlist_models::{MediaRecord, RecordPatch, Settings};

use crate::slug::slug;
use crate::store::CacheManager;

/// Which documents held the addressed record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub watchlist: bool,
    pub unknowns: bool,
}

impl UpdateOutcome {
    pub fn matched_any(&self) -> bool {
        self.watchlist || self.unknowns
    }
}

fn patch_in_place(records: &mut [MediaRecord], uuid: Uuid, patch: &RecordPatch) -> bool {
    match records.iter_mut().find(|r| r.uuid == uuid) {
        Some(record) => {
            record.apply_patch(patch);
            true
        }
        None => false,
    }
}

/// Apply `patch` to the record with `uuid` in both the watchlist and the
/// unknown list. Each document is handled on its own; a document without the
/// record is left as it was.
pub fn update_movie(cache: &CacheManager, uuid: Uuid, patch: &RecordPatch) -> Result<UpdateOutcome> {
    let mut watchlist = cache.load_watchlist()?.data;
    let mut unknowns = cache.load_unknowns()?.data;

    let outcome = UpdateOutcome {
        watchlist: patch_in_place(&mut watchlist, uuid, patch),
        unknowns: patch_in_place(&mut unknowns, uuid, patch),
    };

    cache.save_watchlist(&watchlist)?;
    cache.save_unknowns(&unknowns)?;

    debug!(
        operation = "update_movie",
        uuid = %uuid,
        watchlist = outcome.watchlist,
        unknowns = outcome.unknowns,
        "Updated record"
    );
    Ok(outcome)
}

/// Drop the record with `uuid` from the unknown list. The watchlist keeps it.
/// Returns whether anything was removed.
pub fn remove_movie(cache: &CacheManager, uuid: Uuid) -> Result<bool> {
    let mut unknowns = cache.load_unknowns()?.data;
    let before = unknowns.len();
    unknowns.retain(|r| r.uuid != uuid);
    let removed = unknowns.len() != before;

    cache.save_unknowns(&unknowns)?;
    info!(operation = "remove_movie", uuid = %uuid, removed, "Removed record from unknowns");
    Ok(removed)
}

pub fn load_settings(cache: &CacheManager) -> Result<Settings> {
    Ok(cache.load_settings()?.data)
}

/// Merge `changes` into the stored settings; keys not mentioned survive.
pub fn save_settings(cache: &CacheManager, changes: Settings) -> Result<Settings> {
    let mut settings = cache.load_settings()?.data;
    settings.extend(changes);
    let document = cache.save_settings(settings)?;
    Ok(document.data)
}

/// Look a record up by uuid in the watchlist, then the unknown list.
pub fn find_record(cache: &CacheManager, uuid: Uuid) -> Result<Option<MediaRecord>> {
    if let Some(record) = cache.load_watchlist()?.data.into_iter().find(|r| r.uuid == uuid) {
        return Ok(Some(record));
    }
    Ok(cache.load_unknowns()?.data.into_iter().find(|r| r.uuid == uuid))
}

/// Records whose title or scraped title contains `query`, compared by slug.
/// A blank query matches everything.
pub fn search_records(records: &[MediaRecord], query: &str) -> Vec<MediaRecord> {
    let needle = slug(query);
    if needle.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| slug(&r.title).contains(&needle) || slug(&r.google_title).contains(&needle))
        .cloned()
        .collect()
}

/// One page of a listing. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * per_page;

    Page {
        items: items.iter().skip(start).take(per_page).cloned().collect(),
        page,
        per_page,
        total_items,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{resolved, unmatched};
    use serde_json::json;
    use watchlist_models::{StatusPatch, UnknownState};

    fn seeded() -> (CacheManager, MediaRecord, MediaRecord) {
        let cache = CacheManager::in_memory();
        let known = resolved(949, "Heat");
        let unknown = unmatched("Mystery");
        cache.save_watchlist(&[known.clone(), unknown.clone()]).unwrap();
        cache.save_unknowns(&[unknown.clone()]).unwrap();
        (cache, known, unknown)
    }

    #[test]
    fn test_update_touches_both_documents() {
        let (cache, _, unknown) = seeded();
        let patch = RecordPatch {
            id: Some(77),
            unknown_state: Some(None),
            status: Some(StatusPatch {
                known: Some(true),
                tmdb: Some(true),
                overseerr: None,
            }),
            ..RecordPatch::default()
        };

        let outcome = update_movie(&cache, unknown.uuid, &patch).unwrap();
        assert_eq!(outcome, UpdateOutcome { watchlist: true, unknowns: true });

        let watchlist = cache.load_watchlist().unwrap().data;
        let unknowns = cache.load_unknowns().unwrap().data;
        assert_eq!(watchlist[1].id, 77);
        assert_eq!(unknowns[0].id, 77);
        assert!(watchlist[1].is_resolved());
        assert_eq!(watchlist[1].date_added, unknown.date_added);
    }

    #[test]
    fn test_update_is_independent_per_document() {
        let (cache, known, _) = seeded();

        let outcome = update_movie(
            &cache,
            known.uuid,
            &RecordPatch::status(StatusPatch {
                overseerr: Some(true),
                ..StatusPatch::default()
            }),
        )
        .unwrap();

        assert_eq!(outcome, UpdateOutcome { watchlist: true, unknowns: false });
        let watchlist = cache.load_watchlist().unwrap().data;
        assert!(watchlist[0].status.overseerr);
        assert!(watchlist[0].status.known);
        assert_eq!(cache.load_unknowns().unwrap().data.len(), 1);
    }

    #[test]
    fn test_update_unknown_uuid_is_a_no_op() {
        let (cache, known, unknown) = seeded();

        let outcome = update_movie(&cache, Uuid::new_v4(), &RecordPatch::default()).unwrap();
        assert!(!outcome.matched_any());
        assert_eq!(cache.load_watchlist().unwrap().data, vec![known, unknown.clone()]);
        assert_eq!(cache.load_unknowns().unwrap().data, vec![unknown]);
    }

    #[test]
    fn test_remove_only_touches_unknowns() {
        let (cache, _, unknown) = seeded();

        assert!(remove_movie(&cache, unknown.uuid).unwrap());
        assert!(cache.load_unknowns().unwrap().data.is_empty());
        assert_eq!(cache.load_watchlist().unwrap().data.len(), 2);
        assert!(!remove_movie(&cache, unknown.uuid).unwrap());
    }

    #[test]
    fn test_find_record() {
        let (cache, known, _) = seeded();
        assert_eq!(find_record(&cache, known.uuid).unwrap(), Some(known));
        assert_eq!(find_record(&cache, Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn test_save_settings_merges_keys() {
        let cache = CacheManager::in_memory();
        let mut first = Settings::new();
        first.insert("perPage".to_string(), json!(24));
        first.insert("theme".to_string(), json!("dark"));
        save_settings(&cache, first).unwrap();

        let mut second = Settings::new();
        second.insert("perPage".to_string(), json!(48));
        let merged = save_settings(&cache, second).unwrap();

        assert_eq!(merged["perPage"], json!(48));
        assert_eq!(merged["theme"], json!("dark"));
        assert_eq!(load_settings(&cache).unwrap(), merged);
    }

    #[test]
    fn test_search_records() {
        let mut dune = resolved(438631, "dune part one");
        dune.title = "Dune".to_string();
        let mut dup = unmatched("Dune");
        dup.unknown_state = Some(UnknownState::Duplicate);
        let records = vec![dune, resolved(949, "Heat"), dup];

        let hits = search_records(&records, "DUNE!");
        assert_eq!(hits.len(), 2);
        assert_eq!(search_records(&records, "part one").len(), 1);
        assert_eq!(search_records(&records, "  ").len(), 3);
        assert!(search_records(&records, "alien").is_empty());
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=25).collect();

        let page = paginate(&items, 3, 10);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 25);

        let clamped = paginate(&items, 9, 10);
        assert_eq!(clamped.page, 3);

        let first = paginate(&items, 0, 10);
        assert_eq!(first.page, 1);
        assert_eq!(first.items.len(), 10);

        let empty = paginate::<u32>(&[], 1, 10);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
    }
}
