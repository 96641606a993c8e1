use watchlist_models::{MediaRecord, MediaType, UnknownState};

use crate::resolver::ResolveHint;
use crate::slug::slug;

/// What the user typed when re-resolving a record. Empty fields mean "keep
/// what the record has".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveQuery {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub media_type: Option<MediaType>,
}

impl ResolveQuery {
    /// Whether the query asks for anything the record does not already say.
    pub fn changes(&self, record: &MediaRecord) -> bool {
        let title_changed = self
            .title
            .as_deref()
            .map(|t| slug(t) != slug(&record.google_title))
            .unwrap_or(false);
        let year_changed = self.year.map(|y| Some(y) != record.release_year).unwrap_or(false);
        let type_changed = self
            .media_type
            .map(|t| Some(t) != record.media_type)
            .unwrap_or(false);
        title_changed || year_changed || type_changed
    }
}

/// A single lookup to perform for a manual re-resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupPlan {
    pub title: String,
    pub hint: ResolveHint,
    pub rank: usize,
}

/// Decides how a manual re-resolve queries the metadata database.
pub trait Disambiguation: Send + Sync {
    fn plan(&self, record: &MediaRecord, query: &ResolveQuery) -> LookupPlan;
}

/// Re-resolving an untouched duplicate takes the second search result on the
/// plain scraped title. Everything else searches with the user's input,
/// falling back to the stored record, and takes the top result.
#[derive(Debug, Default, Clone, Copy)]
pub struct NextBestCandidate;

impl Disambiguation for NextBestCandidate {
    fn plan(&self, record: &MediaRecord, query: &ResolveQuery) -> LookupPlan {
        let hint_uuid = Some(record.uuid);

        if record.unknown_state == Some(UnknownState::Duplicate) && !query.changes(record) {
            return LookupPlan {
                title: record.google_title.clone(),
                hint: ResolveHint {
                    uuid: hint_uuid,
                    media_type: None,
                    release_year: None,
                },
                rank: 1,
            };
        }

        // A person match is never what a watchlist meant, so it does not scope the search
        let stored_type = record.media_type.filter(|t| t.is_requestable());
        LookupPlan {
            title: query
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| record.google_title.clone()),
            hint: ResolveHint {
                uuid: hint_uuid,
                media_type: query.media_type.or(stored_type),
                release_year: query.year.or(record.release_year),
            },
            rank: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{resolved, unmatched};

    fn duplicate() -> MediaRecord {
        let mut record = resolved(438631, "Dune");
        record.status.known = false;
        record.release_year = Some(2021);
        record.unknown_state = Some(UnknownState::Duplicate);
        record
    }

    #[test]
    fn test_untouched_duplicate_takes_rank_one() {
        let record = duplicate();
        let plan = NextBestCandidate.plan(&record, &ResolveQuery::default());

        assert_eq!(plan.rank, 1);
        assert_eq!(plan.title, "Dune");
        assert_eq!(plan.hint.uuid, Some(record.uuid));
        assert_eq!(plan.hint.release_year, None);
    }

    #[test]
    fn test_restating_the_title_is_not_a_change() {
        let query = ResolveQuery {
            title: Some("dune".to_string()),
            year: Some(2021),
            ..ResolveQuery::default()
        };
        assert_eq!(NextBestCandidate.plan(&duplicate(), &query).rank, 1);
    }

    #[test]
    fn test_changed_query_takes_top_result() {
        let query = ResolveQuery {
            year: Some(1984),
            ..ResolveQuery::default()
        };
        let plan = NextBestCandidate.plan(&duplicate(), &query);

        assert_eq!(plan.rank, 0);
        assert_eq!(plan.title, "Dune");
        assert_eq!(plan.hint.release_year, Some(1984));
        assert_eq!(plan.hint.media_type, Some(MediaType::Movie));
    }

    #[test]
    fn test_unmatched_record_uses_user_input() {
        let record = unmatched("Mystery Title");
        let query = ResolveQuery {
            title: Some("The Mystery".to_string()),
            year: Some(2020),
            media_type: Some(MediaType::Tv),
        };
        let plan = NextBestCandidate.plan(&record, &query);

        assert_eq!(plan.rank, 0);
        assert_eq!(plan.title, "The Mystery");
        assert_eq!(plan.hint.media_type, Some(MediaType::Tv));
        assert_eq!(plan.hint.release_year, Some(2020));
    }

    #[test]
    fn test_person_match_does_not_scope() {
        let mut record = resolved(31, "Big");
        record.media_type = Some(MediaType::Person);
        let plan = NextBestCandidate.plan(&record, &ResolveQuery::default());
        assert_eq!(plan.hint.media_type, None);
    }
}
