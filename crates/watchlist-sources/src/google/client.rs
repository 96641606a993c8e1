use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::google::parser::{append_page, extract_labels};
use crate::traits::TitleSource;

/// Scrapes a public Google "watch later" list page by page.
pub struct GoogleWatchlistScraper {
    client: Client,
    watchlist_url: String,
    max_pages: u32,
}

impl GoogleWatchlistScraper {
    pub fn new(watchlist_url: String, max_pages: u32) -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0")
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            watchlist_url,
            max_pages,
        }
    }

    fn page_url(&self, page: u32) -> String {
        let separator = if self.watchlist_url.contains('?') { '&' } else { '?' };
        format!("{}{}pageNumber={}", self.watchlist_url, separator, page)
    }

    async fn fetch_page(&self, page: u32) -> Result<String, SourceError> {
        let response = self.client.get(self.page_url(page)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                service: "google",
                status: status.as_u16(),
                body: String::new(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl TitleSource for GoogleWatchlistScraper {
    fn source_name(&self) -> &str {
        "google"
    }

    async fn scrape_titles(&self) -> Vec<String> {
        info!(operation = "scrape_start", url = %self.watchlist_url, "Scraping Google watchlist");

        let mut items = Vec::new();
        let mut prev_first: Option<String> = None;

        for page in 1..=self.max_pages {
            let html = match self.fetch_page(page).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(operation = "scrape_page_error", page, error = %e, "Failed to fetch watchlist page");
                    continue;
                }
            };

            let labels = extract_labels(&html);
            if append_page(&mut items, &mut prev_first, labels) {
                debug!(page, first = prev_first.as_deref().unwrap_or_default(), "Scraped watchlist page");
            }
        }

        info!(operation = "scrape_complete", items = items.len(), "Scraped {} items", items.len());
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url() {
        let scraper = GoogleWatchlistScraper::new("https://www.google.com/interests/saved/list/abc".to_string(), 6);
        assert_eq!(scraper.page_url(2), "https://www.google.com/interests/saved/list/abc?pageNumber=2");

        let scraper = GoogleWatchlistScraper::new("https://www.google.com/list?hl=en".to_string(), 6);
        assert_eq!(scraper.page_url(1), "https://www.google.com/list?hl=en&pageNumber=1");
    }
}
