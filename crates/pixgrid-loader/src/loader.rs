#![forbid(unsafe_code)]

//! Keeps a [`SpatialIndex`] in step with the hosted cell table.
//!
//! # Full Reload
//!
//! [`GridDataLoader::full_reload`] pages through the [`CellSource`] on a
//! worker thread until a short page arrives. The whole scan is bounded by
//! `reload_timeout`, retries and backoff waits included; retryable failures
//! are retried per the [`RetryPolicy`] while time remains. Only when a scan completes is the index cleared and
//! repopulated with the owned rows, so a failed reload leaves the previous
//! contents in place.
//!
//! # Incremental Patches
//!
//! [`GridDataLoader::apply_change`] applies one realtime event: an upsert of
//! an owned row adds it, an upsert of an unowned row or a delete removes the
//! coordinate. [`GridDataLoader::apply_pending`] drains a [`ChangeFeed`] in
//! arrival order.
//!
//! # Cancellation
//!
//! [`GridDataLoader::cancel`] aborts an in-flight reload at the next page
//! boundary or backoff wait. Cancellation is permanent for that loader.

use std::sync::Arc;

use pixgrid_index::{Cell, SpatialIndex};
use tracing::{debug, info, trace, warn};
use web_time::{Duration, Instant};

use crate::cancellation::{CancellationSource, CancellationToken};
use crate::error::{LoadError, Result};
use crate::feed::{ChangeEvent, ChangeFeed};
use crate::retry::{RetryPolicy, run_with_timeout};
use crate::source::CellSource;

/// Loader settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Rows per page (default: 1000). Zero is treated as one.
    pub page_size: usize,
    /// Bound on one complete paginated scan (default: 30s).
    pub reload_timeout: Duration,
    /// Retry schedule for retryable failures (default: 2 retries, exponential from 500ms).
    pub retry: RetryPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            reload_timeout: Duration::from_millis(30_000),
            retry: RetryPolicy::default(),
        }
    }
}

/// Summary of a successful reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadReport {
    /// Rows returned by the source.
    pub fetched: usize,
    /// Owned rows written to the index.
    pub indexed: usize,
    /// Pages requested in the successful attempt.
    pub pages: usize,
    /// Attempts made, the successful one included.
    pub attempts: u32,
    /// Wall time across all attempts.
    pub elapsed: Duration,
}

/// What [`GridDataLoader::apply_change`] did to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// An owned row was inserted or overwritten.
    Indexed,
    /// A coordinate was removed.
    Removed,
    /// Nothing was indexed at the coordinate; no change.
    Unchanged,
}

/// Fetches cells into a [`SpatialIndex`].
pub struct GridDataLoader {
    source: Arc<dyn CellSource>,
    config: LoaderConfig,
    cancel: CancellationSource,
}

impl std::fmt::Debug for GridDataLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridDataLoader")
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl GridDataLoader {
    /// Create a loader over `source`.
    pub fn new(source: Arc<dyn CellSource>, config: LoaderConfig) -> Self {
        Self {
            source,
            config,
            cancel: CancellationSource::new(),
        }
    }

    /// Configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// A token that observes this loader's cancellation.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.token()
    }

    /// Abort any in-flight and future reloads.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Clear and repopulate `index` from the source.
    ///
    /// On error the index is left untouched.
    pub fn full_reload(&self, index: &mut SpatialIndex) -> Result<ReloadReport> {
        let started = Instant::now();
        let token = self.cancel.token();
        let retry = &self.config.retry;
        info!(page_size = self.config.page_size, "grid reload started");

        // One deadline covers every attempt and every backoff wait.
        let timeout = self.config.reload_timeout;
        let deadline = started + timeout;
        let mut attempt = 0u32;
        let (cells, pages) = loop {
            if token.is_cancelled() {
                return Err(LoadError::Cancelled);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(
                    attempts = attempt,
                    timeout_ms = timeout.as_millis() as u64,
                    "grid reload timed out"
                );
                return Err(LoadError::Timeout { after: timeout });
            }
            match self.scan_once(&token, remaining) {
                Ok(scan) => break scan,
                Err(LoadError::Timeout { .. }) => {
                    warn!(
                        attempts = attempt + 1,
                        timeout_ms = timeout.as_millis() as u64,
                        "grid reload timed out"
                    );
                    return Err(LoadError::Timeout { after: timeout });
                }
                Err(err) if err.is_retryable() && attempt < retry.max_retries => {
                    let delay = retry.delay(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "grid reload failed; retrying"
                    );
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if token.wait_timeout(delay.min(remaining)) {
                        return Err(LoadError::Cancelled);
                    }
                    attempt += 1;
                }
                Err(err) => {
                    warn!(attempts = attempt + 1, error = %err, "grid reload failed");
                    return Err(err);
                }
            }
        };

        let fetched = cells.len();
        index.clear();
        index.extend(cells.into_iter().filter(Cell::is_owned));
        let report = ReloadReport {
            fetched,
            indexed: index.len(),
            pages,
            attempts: attempt + 1,
            elapsed: started.elapsed(),
        };
        info!(
            fetched = report.fetched,
            indexed = report.indexed,
            pages = report.pages,
            attempts = report.attempts,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "grid reload finished"
        );
        Ok(report)
    }

    /// Apply one realtime change.
    pub fn apply_change(&self, index: &mut SpatialIndex, event: ChangeEvent) -> PatchOutcome {
        trace!(kind = event.kind_name(), "applying change");
        match event {
            ChangeEvent::Upsert(cell) if cell.is_owned() => {
                index.add(cell);
                PatchOutcome::Indexed
            }
            ChangeEvent::Upsert(cell) => removed(index.remove(cell.x, cell.y)),
            ChangeEvent::Delete { x, y } => removed(index.remove(x, y)),
        }
    }

    /// Apply every queued change in arrival order. Returns how many were
    /// applied.
    pub fn apply_pending(&self, index: &mut SpatialIndex, feed: &mut ChangeFeed) -> usize {
        let events = feed.drain();
        let count = events.len();
        for event in events {
            self.apply_change(index, event);
        }
        if count > 0 {
            debug!(count, indexed = index.len(), "applied realtime changes");
        }
        count
    }

    /// One paginated scan, bounded by `timeout`.
    fn scan_once(
        &self,
        outer: &CancellationToken,
        timeout: Duration,
    ) -> Result<(Vec<Cell>, usize)> {
        let source = Arc::clone(&self.source);
        let page_size = self.config.page_size.max(1);
        let outer = outer.clone();
        let abandon = CancellationSource::new();
        let abandoned = abandon.token();

        let result = run_with_timeout(timeout, move || {
            let mut cells = Vec::new();
            let mut pages = 0;
            loop {
                if outer.is_cancelled() || abandoned.is_cancelled() {
                    return Err(LoadError::Cancelled);
                }
                let page = source.fetch_page(cells.len(), page_size)?;
                pages += 1;
                let short = page.len() < page_size;
                debug!(page = pages, rows = page.len(), "fetched page");
                cells.extend(page);
                if short {
                    return Ok((cells, pages));
                }
            }
        });

        if result.is_err() {
            // Stop an abandoned worker at its next page boundary.
            abandon.cancel();
        }
        result
    }
}

fn removed(existed: bool) -> PatchOutcome {
    if existed {
        PatchOutcome::Removed
    } else {
        PatchOutcome::Unchanged
    }
}
