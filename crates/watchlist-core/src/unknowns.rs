use watchlist_models::MediaRecord;

/// The unknown list: every record that is unconfirmed or flagged, in order.
pub fn project_unknown(watchlist: &[MediaRecord]) -> Vec<MediaRecord> {
    watchlist.iter().filter(|r| r.is_unknown()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{resolved, unmatched};
    use watchlist_models::UnknownState;

    #[test]
    fn test_projection_keeps_order() {
        let mut flagged = resolved(3, "Alien");
        flagged.unknown_state = Some(UnknownState::Duplicate);
        let mut unconfirmed = resolved(4, "Heat");
        unconfirmed.status.known = false;

        let watchlist = vec![
            unmatched("Mystery"),
            resolved(1, "Dune"),
            flagged.clone(),
            unconfirmed.clone(),
        ];
        let unknowns = project_unknown(&watchlist);

        assert_eq!(unknowns.len(), 3);
        assert_eq!(unknowns[0].google_title, "Mystery");
        assert_eq!(unknowns[1], flagged);
        assert_eq!(unknowns[2], unconfirmed);
    }

    #[test]
    fn test_projection_of_empty_watchlist() {
        assert!(project_unknown(&[]).is_empty());
    }
}
