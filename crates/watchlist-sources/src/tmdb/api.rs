use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use watchlist_models::MediaType;

use crate::traits::LookupResult;

pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// One hit from `/search/{multi,movie,tv}`. Movies carry `title` and
/// `release_date`, series carry `name` and `first_air_date`, people carry
/// `name` and `profile_path`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub media_type: Option<String>,
    pub poster_path: Option<String>,
    pub profile_path: Option<String>,
}

impl SearchResult {
    pub fn display_title(&self) -> String {
        non_empty(self.title.as_deref())
            .or_else(|| non_empty(self.name.as_deref()))
            .unwrap_or_default()
            .to_string()
    }

    pub fn date(&self) -> Option<String> {
        non_empty(self.release_date.as_deref())
            .or_else(|| non_empty(self.first_air_date.as_deref()))
            .map(str::to_string)
    }

    /// Typed result. Scoped searches omit `media_type`, so the search scope
    /// stands in for it.
    pub fn into_lookup_result(self, scope: Option<MediaType>) -> LookupResult {
        let media_type = self
            .media_type
            .as_deref()
            .and_then(MediaType::parse)
            .or(scope);
        let poster_url = non_empty(self.poster_path.as_deref())
            .or_else(|| non_empty(self.profile_path.as_deref()))
            .map(|path| format!("{}{}", POSTER_BASE_URL, path));

        LookupResult {
            id: self.id,
            title: self.display_title(),
            release_date: self.date(),
            media_type,
            poster_url,
        }
    }
}

/// Year of a TMDB date string (`YYYY-MM-DD`). Partial dates fall back to
/// their leading four digits.
pub fn release_year(date: &str) -> Option<i32> {
    let date = date.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(parsed.year());
    }
    date.get(..4).and_then(|year| year.parse().ok())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_year() {
        assert_eq!(release_year("2021-10-22"), Some(2021));
        assert_eq!(release_year("1999"), Some(1999));
        assert_eq!(release_year(""), None);
        assert_eq!(release_year("soon"), None);
    }

    #[test]
    fn test_movie_result_mapping() {
        let json = r#"{"results":[{"id":438631,"title":"Dune","release_date":"2021-09-15",
            "media_type":"movie","poster_path":"/d5NXSklXo0qyIYkgV94XAgMIckC.jpg"}]}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let result = response.results.into_iter().next().unwrap().into_lookup_result(None);

        assert_eq!(result.id, 438631);
        assert_eq!(result.title, "Dune");
        assert_eq!(result.release_date.as_deref(), Some("2021-09-15"));
        assert_eq!(result.media_type, Some(MediaType::Movie));
        assert_eq!(
            result.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/d5NXSklXo0qyIYkgV94XAgMIckC.jpg")
        );
    }

    #[test]
    fn test_tv_result_uses_name_and_scope() {
        let json = r#"{"id":1399,"name":"Game of Thrones","first_air_date":"2011-04-17",
            "release_date":"","poster_path":null}"#;
        let hit: SearchResult = serde_json::from_str(json).unwrap();
        let result = hit.into_lookup_result(Some(MediaType::Tv));

        assert_eq!(result.title, "Game of Thrones");
        assert_eq!(result.release_date.as_deref(), Some("2011-04-17"));
        assert_eq!(result.media_type, Some(MediaType::Tv));
        assert_eq!(result.poster_url, None);
    }

    #[test]
    fn test_person_result_uses_profile() {
        let json = r#"{"id":31,"name":"Tom Hanks","media_type":"person","profile_path":"/x.jpg"}"#;
        let hit: SearchResult = serde_json::from_str(json).unwrap();
        let result = hit.into_lookup_result(None);

        assert_eq!(result.media_type, Some(MediaType::Person));
        assert_eq!(result.release_date, None);
        assert_eq!(result.poster_url.as_deref(), Some("https://image.tmdb.org/t/p/w500/x.jpg"));
    }

    #[test]
    fn test_missing_results_field() {
        let response: SearchResponse = serde_json::from_str(r#"{"page":1}"#).unwrap();
        assert!(response.results.is_empty());
    }
}
