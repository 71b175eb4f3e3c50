#![forbid(unsafe_code)]

//! Chunk addressing.
//!
//! A chunk is a `size × size` square of cells. Chunk coordinates use floor
//! division, so `(-1, -1)` lives in chunk `(-1, -1)` rather than `(0, 0)`.

use std::fmt;

use pixgrid_core::geometry::CellCoord;

/// Default chunk edge length in cells.
pub const DEFAULT_CHUNK_SIZE: u32 = 32;

/// Identifies one chunk bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    /// Chunk column.
    pub cx: i32,
    /// Chunk row.
    pub cy: i32,
}

impl ChunkKey {
    /// Create a key.
    #[inline]
    #[must_use]
    pub const fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }

    /// Chunk containing `coord` for the given chunk size (treated as at
    /// least 1).
    #[inline]
    #[must_use]
    pub fn containing(coord: CellCoord, size: u32) -> Self {
        let size = clamp_size(size);
        Self::new(coord.x.div_euclid(size), coord.y.div_euclid(size))
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.cx, self.cy)
    }
}

/// Chunk size as a positive `i32`.
#[inline]
pub(crate) fn clamp_size(size: u32) -> i32 {
    i32::try_from(size.max(1)).unwrap_or(i32::MAX)
}
