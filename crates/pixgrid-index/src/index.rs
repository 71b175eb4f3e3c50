#![forbid(unsafe_code)]

//! Chunked spatial index over owned cells.
//!
//! Two structures are kept side by side:
//!
//! - **Direct map**: `(x, y) → cell`, authoritative, one entry per
//!   coordinate.
//! - **Chunk buckets**: `ChunkKey → [cell]`, used for range queries.
//!
//! # Invariants
//!
//! 1. A coordinate has at most one direct-map entry; re-adding overwrites.
//! 2. Every direct-map entry has a matching bucket entry in chunk
//!    `floor(coord / chunk_size)`.
//! 3. Buckets are never empty; the last removal deletes the bucket.
//!
//! # Stale Entries
//!
//! Overwriting a coordinate appends a second bucket entry instead of
//! replacing the first. [`query`](SpatialIndex::query) is a broad phase and
//! returns those stale entries along with everything else in the touched
//! chunks. [`query_exact`](SpatialIndex::query_exact) resolves through the
//! direct map. [`remove`](SpatialIndex::remove) and
//! [`rechunk`](SpatialIndex::rechunk) drop stale entries.
//!
//! # Usage
//!
//! ```
//! use pixgrid_index::{Cell, SpatialIndex};
//!
//! let mut index = SpatialIndex::new();
//! index.add(Cell::new("a", 5, 5).with_owner("u1"));
//! assert!(index.has(5, 5));
//! assert_eq!(index.query(0, 0, 10, 10).len(), 1);
//! ```

use std::sync::Arc;

use pixgrid_core::geometry::{CellCoord, CellRect};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::cell::Cell;
use crate::chunk::{ChunkKey, DEFAULT_CHUNK_SIZE, clamp_size};

/// Index statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStats {
    /// Distinct coordinates in the direct map.
    pub cells: usize,
    /// Non-empty chunk buckets.
    pub chunks: usize,
    /// Total bucket entries, stale ones included.
    pub bucket_entries: usize,
    /// Bucket entries shadowed by a later overwrite.
    pub stale_entries: usize,
    /// Chunk edge length.
    pub chunk_size: u32,
}

/// Chunked spatial index.
#[derive(Clone)]
pub struct SpatialIndex {
    direct: FxHashMap<CellCoord, Arc<Cell>>,
    chunks: FxHashMap<ChunkKey, Vec<Arc<Cell>>>,
    chunk_size: u32,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("cells", &self.direct.len())
            .field("chunks", &self.chunks.len())
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl SpatialIndex {
    /// Create an empty index with the default chunk size (32).
    #[must_use]
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Create an empty index. A chunk size of 0 is treated as 1.
    #[must_use]
    pub fn with_chunk_size(chunk_size: u32) -> Self {
        Self {
            direct: FxHashMap::default(),
            chunks: FxHashMap::default(),
            chunk_size: chunk_size.max(1),
        }
    }

    // --- Mutation ------------------------------------------------------------

    /// Remove everything.
    pub fn clear(&mut self) {
        self.direct.clear();
        self.chunks.clear();
    }

    /// Insert or overwrite the cell at its coordinate.
    pub fn add(&mut self, cell: Cell) {
        let coord = cell.coord();
        let key = self.chunk_of(coord.x, coord.y);
        let cell = Arc::new(cell);
        self.chunks.entry(key).or_default().push(Arc::clone(&cell));
        self.direct.insert(coord, cell);
    }

    /// Add every cell from an iterator.
    pub fn extend<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Cell>,
    {
        for cell in cells {
            self.add(cell);
        }
    }

    /// Remove the cell at `(x, y)` and every bucket entry at that coordinate.
    ///
    /// Returns `true` if the coordinate was indexed.
    pub fn remove(&mut self, x: i32, y: i32) -> bool {
        let coord = CellCoord::new(x, y);
        let existed = self.direct.remove(&coord).is_some();
        let key = self.chunk_of(x, y);
        if let Some(bucket) = self.chunks.get_mut(&key) {
            bucket.retain(|cell| cell.coord() != coord);
            if bucket.is_empty() {
                self.chunks.remove(&key);
            }
        }
        existed
    }

    /// Rebuild the buckets from the direct map with a new chunk size.
    ///
    /// Also drops stale bucket entries.
    pub fn rechunk(&mut self, chunk_size: u32) {
        self.chunk_size = chunk_size.max(1);
        self.chunks.clear();
        for (coord, cell) in &self.direct {
            self.chunks
                .entry(ChunkKey::containing(*coord, self.chunk_size))
                .or_default()
                .push(Arc::clone(cell));
        }
        tracing::debug!(
            cells = self.direct.len(),
            chunks = self.chunks.len(),
            chunk_size = self.chunk_size,
            "spatial index rebuilt"
        );
    }

    // --- Point lookups -------------------------------------------------------

    /// Cell at `(x, y)`.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.direct.get(&CellCoord::new(x, y)).map(Arc::as_ref)
    }

    /// Whether `(x, y)` is indexed.
    #[must_use]
    pub fn has(&self, x: i32, y: i32) -> bool {
        self.direct.contains_key(&CellCoord::new(x, y))
    }

    /// Every indexed cell, in no particular order.
    #[must_use]
    pub fn get_all(&self) -> Vec<&Cell> {
        self.direct.values().map(Arc::as_ref).collect()
    }

    // --- Range queries -------------------------------------------------------

    /// Broad-phase range query.
    ///
    /// Returns every bucket entry of every chunk intersecting
    /// `[x, x + width) × [y, y + height)`. The result is a superset: it may
    /// hold cells outside the rectangle and stale duplicates. An empty
    /// rectangle yields nothing.
    #[must_use]
    pub fn query(&self, x: i32, y: i32, width: u32, height: u32) -> Vec<&Cell> {
        let mut out = Vec::new();
        let Some((lo, hi)) = self.chunk_span(x, y, width, height) else {
            return out;
        };

        let span = (i64::from(hi.cx) - i64::from(lo.cx) + 1)
            .saturating_mul(i64::from(hi.cy) - i64::from(lo.cy) + 1);
        let in_span = |key: &ChunkKey| {
            (lo.cx..=hi.cx).contains(&key.cx) && (lo.cy..=hi.cy).contains(&key.cy)
        };

        if span > self.chunks.len() as i64 {
            // Fewer buckets than chunks in range: scan the buckets.
            for (key, bucket) in &self.chunks {
                if in_span(key) {
                    out.extend(bucket.iter().map(Arc::as_ref));
                }
            }
        } else {
            for cy in lo.cy..=hi.cy {
                for cx in lo.cx..=hi.cx {
                    if let Some(bucket) = self.chunks.get(&ChunkKey::new(cx, cy)) {
                        out.extend(bucket.iter().map(Arc::as_ref));
                    }
                }
            }
        }
        out
    }

    /// Exact range query: current cells inside `rect`, one per coordinate.
    #[must_use]
    pub fn query_exact(&self, rect: CellRect) -> Vec<&Cell> {
        let mut seen = FxHashSet::default();
        self.query(rect.x, rect.y, rect.width, rect.height)
            .into_iter()
            .filter(|cell| rect.contains(cell.coord()) && seen.insert(cell.coord()))
            .filter_map(|cell| self.get(cell.x, cell.y))
            .collect()
    }

    // --- Introspection -------------------------------------------------------

    /// Chunk edge length.
    #[inline]
    #[must_use]
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Chunk containing `(x, y)`.
    #[inline]
    #[must_use]
    pub fn chunk_of(&self, x: i32, y: i32) -> ChunkKey {
        ChunkKey::containing(CellCoord::new(x, y), self.chunk_size)
    }

    /// Entries of one bucket, if it exists.
    #[must_use]
    pub fn bucket(&self, key: ChunkKey) -> Option<impl Iterator<Item = &Cell> + '_> {
        self.chunks
            .get(&key)
            .map(|bucket| bucket.iter().map(Arc::as_ref))
    }

    /// Number of non-empty buckets.
    #[inline]
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of indexed coordinates.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.direct.len()
    }

    /// Whether nothing is indexed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty()
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        let bucket_entries = self.chunks.values().map(Vec::len).sum();
        IndexStats {
            cells: self.direct.len(),
            chunks: self.chunks.len(),
            bucket_entries,
            stale_entries: bucket_entries.saturating_sub(self.direct.len()),
            chunk_size: self.chunk_size,
        }
    }

    /// Inclusive chunk range covering a non-empty rectangle.
    fn chunk_span(&self, x: i32, y: i32, width: u32, height: u32) -> Option<(ChunkKey, ChunkKey)> {
        if width == 0 || height == 0 {
            return None;
        }
        let size = i64::from(clamp_size(self.chunk_size));
        let last = |start: i32, len: u32| {
            let end = i64::from(start) + i64::from(len) - 1;
            // Clamped into i32 range, so the narrowing cannot truncate.
            end.div_euclid(size)
                .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
        };
        let lo = self.chunk_of(x, y);
        let hi = ChunkKey::new(last(x, width), last(y, height));
        Some((lo, hi))
    }
}
