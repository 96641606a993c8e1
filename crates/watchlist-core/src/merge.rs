use watchlist_models::MediaRecord;

/// Lay a cached record over a freshly collected one.
///
/// The cached record wins, so manual corrections, `uuid` and `date_added`
/// survive a run. Two fields are the exception: `poster_img` and
/// `google_search_url` fall back to the fresh value when the cached one is
/// null, so a record cached before either existed picks it up. A non-null
/// cached value is never replaced.
pub fn overlay(fresh: MediaRecord, cached: &MediaRecord) -> MediaRecord {
    let mut merged = cached.clone();
    if merged.poster_img.is_none() {
        merged.poster_img = fresh.poster_img;
    }
    if merged.google_search_url.is_none() {
        merged.google_search_url = fresh.google_search_url;
    }
    merged
}
