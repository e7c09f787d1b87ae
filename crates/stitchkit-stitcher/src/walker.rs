//! `top`/`skip` pagination over Stitcher list endpoints

use indicatif::ProgressBar;
use serde_json::Value;
use stitchkit_core::FetchError;

use crate::site::Site;

/// Fetches one page as JSON.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}

/// Live HTTP with retry and backoff.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpPages;

impl PageSource for HttpPages {
    fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        stitchkit_core::retry_with_backoff(url, &ProgressBar::hidden(), || {
            stitchkit_core::get_json(url)
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    pub pages: usize,
    pub records: usize,
    pub failed_pages: usize,
    /// Stopped early on a shutdown request
    pub interrupted: bool,
}

pub struct PageWalker<S = HttpPages> {
    source: S,
    site: Site,
    top: usize,
    max_records: usize,
    pb: ProgressBar,
}

impl PageWalker<HttpPages> {
    pub fn new(site: Site) -> Self {
        Self::with_source(site, HttpPages)
    }
}

impl<S: PageSource> PageWalker<S> {
    pub fn with_source(site: Site, source: S) -> Self {
        Self {
            source,
            site,
            top: 10,
            max_records: 300_000,
            pb: ProgressBar::hidden(),
        }
    }

    /// Page size
    pub fn top(mut self, top: usize) -> Self {
        self.top = top.max(1);
        self
    }

    /// Stop once `skip` reaches this
    pub fn max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    pub fn progress(mut self, pb: ProgressBar) -> Self {
        self.pb = pb;
        self
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Feed every record under `path` to `visit`.
    ///
    /// Ends on an empty `contents` page, at `max_records`, or on shutdown.
    /// A response without `contents` is a single record and also ends the
    /// walk. Pages that still fail after retries are logged and skipped.
    pub fn walk(&self, path: &str, mut visit: impl FnMut(&Value)) -> WalkSummary {
        let mut summary = WalkSummary::default();
        let mut skip = 0;

        while skip < self.max_records {
            if stitchkit_core::is_shutdown_requested() {
                log::warn!("Shutdown requested, stopping walk of {path} at skip={skip}");
                summary.interrupted = true;
                break;
            }
            let url = self.site.url(&format!("{path}?top={}&skip={skip}", self.top));
            log::debug!("{url}");

            match self.source.fetch(&url) {
                Err(e) => {
                    log::error!("failed: {url}: {e}");
                    summary.failed_pages += 1;
                }
                Ok(page) => {
                    summary.pages += 1;
                    match page.get("contents") {
                        Some(Value::Array(records)) if records.is_empty() => break,
                        Some(Value::Array(records)) => {
                            for record in records {
                                visit(record);
                            }
                            summary.records += records.len();
                        }
                        _ => {
                            visit(&page);
                            summary.records += 1;
                            break;
                        }
                    }
                }
            }
            self.pb.set_message(format!(
                "{path}: {} records",
                stitchkit_core::fmt_num(summary.records)
            ));
            skip += self.top;
        }
        summary
    }
}
