use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use watchlist_core::{RunEvent, RunObserver};

/// Batch progress for interactive terminals.
pub struct ProgressObserver {
    _multi: MultiProgress,
    overall: ProgressBar,
    spinner: ProgressBar,
}

impl ProgressObserver {
    pub fn new() -> Self {
        let multi = MultiProgress::new();

        let overall = multi.add(ProgressBar::new(0));
        overall.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} batches {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        overall.set_message("Scraping watchlist...");

        let spinner = multi.add(ProgressBar::new_spinner());
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        Self {
            _multi: multi,
            overall,
            spinner,
        }
    }
}

impl RunObserver for ProgressObserver {
    fn on_event(&self, event: &RunEvent) {
        match event {
            RunEvent::RunStarted { .. } => {
                self.spinner.set_message("Fetching listing pages");
            }
            RunEvent::Scraped { titles } => {
                self.overall.set_message(format!("{} titles", titles));
            }
            RunEvent::BatchStarted { total, .. } => {
                self.overall.set_length(*total as u64);
            }
            RunEvent::CacheHit { title } => {
                self.spinner.set_message(format!("Cached: {}", title));
            }
            RunEvent::LookupFinished { title, matched } => {
                let verb = if *matched { "Matched" } else { "No match" };
                self.spinner.set_message(format!("{}: {}", verb, title));
            }
            RunEvent::LookupFailed { title, .. } => {
                self.spinner.set_message(format!("Lookup failed: {}", title));
            }
            RunEvent::BatchFinished { .. } => {
                self.overall.inc(1);
            }
            RunEvent::Reconciled { records, duplicates } => {
                self.spinner
                    .set_message(format!("Reconciled {} records ({} duplicates)", records, duplicates));
            }
            RunEvent::DocumentWritten { key, .. } => {
                self.spinner.set_message(format!("Wrote {}", key));
            }
            RunEvent::RunFinished { .. } => {
                self.overall.finish_with_message("done");
                self.spinner.finish_and_clear();
            }
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
