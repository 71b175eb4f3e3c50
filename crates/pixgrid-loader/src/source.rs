#![forbid(unsafe_code)]

//! Where cell rows come from.
//!
//! [`CellSource`] is the narrow seam to the hosted cell table: offset/limit
//! pagination and nothing else. [`MemoryCellSource`] keeps rows in process
//! for tests, demos, and offline hosts.

use std::sync::{Mutex, MutexGuard};

use pixgrid_index::Cell;
use web_time::Duration;

use crate::error::{LoadError, Result};

/// Paginated read access to the cell table.
///
/// Implementations must return rows in a stable order so consecutive pages
/// neither skip nor repeat rows. A page shorter than `limit` ends the scan.
pub trait CellSource: Send + Sync {
    /// Fetch up to `limit` rows starting at row `offset`.
    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Cell>>;
}

impl<S: CellSource + ?Sized> CellSource for std::sync::Arc<S> {
    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Cell>> {
        (**self).fetch_page(offset, limit)
    }
}

/// In-process cell table.
///
/// Rows are served in insertion order. Failures and latency can be injected
/// to exercise the loader's retry and timeout paths.
#[derive(Debug, Default)]
pub struct MemoryCellSource {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<Cell>,
    failures: Vec<LoadError>,
    latency: Duration,
    fetches: usize,
}

impl MemoryCellSource {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding `rows`.
    pub fn with_rows(rows: impl IntoIterator<Item = Cell>) -> Self {
        let source = Self::new();
        source.lock().rows.extend(rows);
        source
    }

    /// Insert or replace the row at the cell's coordinate.
    pub fn upsert(&self, cell: Cell) {
        let mut state = self.lock();
        match state.rows.iter_mut().find(|row| row.coord() == cell.coord()) {
            Some(row) => *row = cell,
            None => state.rows.push(cell),
        }
    }

    /// Delete the row at `(x, y)`. Returns `true` if it existed.
    pub fn delete(&self, x: i32, y: i32) -> bool {
        let mut state = self.lock();
        let before = state.rows.len();
        state.rows.retain(|row| (row.x, row.y) != (x, y));
        state.rows.len() != before
    }

    /// Fail the next fetches with these errors, in order.
    pub fn fail_next(&self, errors: impl IntoIterator<Item = LoadError>) {
        let mut state = self.lock();
        let mut errors: Vec<_> = errors.into_iter().collect();
        // Stored reversed so `pop` yields them in order.
        errors.reverse();
        errors.append(&mut state.failures);
        state.failures = errors;
    }

    /// Sleep this long inside every fetch.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().rows.is_empty()
    }

    /// Number of `fetch_page` calls so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.lock().fetches
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CellSource for MemoryCellSource {
    fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Cell>> {
        let latency = {
            let mut state = self.lock();
            state.fetches += 1;
            if let Some(err) = state.failures.pop() {
                return Err(err);
            }
            state.latency
        };
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }
        let state = self.lock();
        Ok(state.rows.iter().skip(offset).take(limit).cloned().collect())
    }
}
