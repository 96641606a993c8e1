pub mod client;
pub mod parser;

pub use client::GoogleWatchlistScraper;
pub use parser::{append_page, extract_labels};
