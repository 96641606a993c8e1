use scraper::{Html, Selector};

/// Anchors carrying a label inside the saved-items grid containers.
const GRID_ANCHORS: &str = "[data-hveid] a[aria-label]";

/// Labels of every `<a aria-label="…">` nested in a `data-hveid` container,
/// in document order with entities decoded. Links outside the grid are page
/// chrome and are ignored.
pub fn extract_labels(html: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(GRID_ANCHORS) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    let labels = document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("aria-label"))
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .collect();
    labels
}

/// Fold one page of labels into the running list.
///
/// Google serves the last page again once the listing runs out, so a page that
/// starts with the previous page's first label (or reaches it) ends the
/// listing. Returns `true` when the page contributed new items.
pub fn append_page(items: &mut Vec<String>, prev_first: &mut Option<String>, labels: Vec<String>) -> bool {
    let mut page_items = Vec::new();
    for label in labels {
        if prev_first.as_deref() == Some(label.as_str()) {
            break;
        }
        page_items.push(label);
    }

    match page_items.first() {
        Some(first) if prev_first.as_deref() != Some(first.as_str()) => {
            *prev_first = Some(first.clone());
            items.extend(page_items);
            true
        }
        _ => false,
    }
}
