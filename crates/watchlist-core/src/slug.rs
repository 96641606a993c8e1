use regex::Regex;
use std::sync::LazyLock;

static STRIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s_-]+").unwrap());

/// Normalized grouping key for a title.
///
/// Two titles belong to the same group iff their slugs are equal. The empty
/// string is a valid key. `\w` is Unicode-aware, so letters outside ASCII
/// are kept and a non-Latin title never collapses to an empty slug.
pub fn slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = STRIP_RE.replace_all(lowered.trim(), "");
    let hyphenated = SEPARATOR_RE.replace_all(&stripped, "-");
    hyphenated.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_basic() {
        assert_eq!(slug("The Dark Knight"), "the-dark-knight");
        assert_eq!(slug("  Spider-Man: Into the Spider-Verse  "), "spider-man-into-the-spider-verse");
        assert_eq!(slug("snake_case__title"), "snake-case-title");
    }

    #[test]
    fn test_slug_punctuation_is_ignored() {
        assert_eq!(slug("The Dark Knight: Part 2!"), slug("the dark knight part 2"));
        assert_eq!(slug("WALL-E (2008)"), "wall-e-2008");
    }

    #[test]
    fn test_slug_degenerate_inputs() {
        assert_eq!(slug(""), "");
        assert_eq!(slug("!!!"), "");
        assert_eq!(slug("- -"), "");
    }

    #[test]
    fn test_slug_keeps_unicode_letters() {
        assert_eq!(slug("Amélie"), "amélie");
        assert_eq!(slug("Crouching Tiger, Hidden Dragon (臥虎藏龍)"), "crouching-tiger-hidden-dragon-臥虎藏龍");
    }

    #[test]
    fn test_slug_of_non_latin_titles_is_not_empty() {
        assert_eq!(slug("千と千尋の神隠し"), "千と千尋の神隠し");
        assert_eq!(slug("Брат 2"), "брат-2");
        assert_ne!(slug("千と千尋の神隠し"), slug("となりのトトロ"));
    }
}
