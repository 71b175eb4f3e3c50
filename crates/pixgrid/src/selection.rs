#![forbid(unsafe_code)]

//! Click-to-select over unowned cells.
//!
//! # Invariants
//!
//! - Only coordinates inside the grid are ever selected.
//! - A coordinate owned in the index at click time is never selected;
//!   [`Selection::prune_owned`] removes coordinates bought since.
//! - Iteration order is row-major (`y`, then `x`) because coordinates are
//!   kept in a `BTreeSet` keyed on `(y, x)`.

use std::collections::BTreeSet;

use pixgrid_core::geometry::{CellCoord, CellRect};
use pixgrid_core::viewport::GridGeometry;
use pixgrid_index::SpatialIndex;

/// What a click did to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// The cell was added.
    Selected(CellCoord),
    /// The cell was already selected and was removed.
    Deselected(CellCoord),
    /// The cell is owned; nothing was selected. Carries the owner's link,
    /// if any, for the host to open.
    OwnedCellClicked {
        /// Clicked coordinate.
        coord: CellCoord,
        /// Destination link of the owned cell.
        link_url: Option<String>,
    },
    /// The coordinate lies outside the grid.
    OutOfBounds(CellCoord),
}

/// Set of selected, purchasable coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    // (y, x) so the natural order is row-major.
    cells: BTreeSet<(i32, i32)>,
}

impl Selection {
    /// Empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a click at `coord`.
    pub fn click(
        &mut self,
        coord: CellCoord,
        grid: &GridGeometry,
        index: &SpatialIndex,
    ) -> SelectionChange {
        if !grid.contains(coord) {
            return SelectionChange::OutOfBounds(coord);
        }
        if let Some(cell) = index.get(coord.x, coord.y) {
            return SelectionChange::OwnedCellClicked {
                coord,
                link_url: cell.link_url.clone(),
            };
        }
        if self.cells.remove(&(coord.y, coord.x)) {
            SelectionChange::Deselected(coord)
        } else {
            self.cells.insert((coord.y, coord.x));
            SelectionChange::Selected(coord)
        }
    }

    /// Whether `coord` is selected.
    #[inline]
    #[must_use]
    pub fn contains(&self, coord: CellCoord) -> bool {
        self.cells.contains(&(coord.y, coord.x))
    }

    /// Number of selected cells.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether nothing is selected.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Drop every selected cell.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Selected coordinates in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().map(|&(y, x)| CellCoord::new(x, y))
    }

    /// Smallest rectangle covering the selection. Empty when nothing is
    /// selected.
    #[must_use]
    pub fn bounds(&self) -> CellRect {
        let mut iter = self.iter();
        let Some(first) = iter.next() else {
            return CellRect::default();
        };
        iter.fold(CellRect::new(first.x, first.y, 1, 1), |rect, coord| {
            rect.including(coord)
        })
    }

    /// Remove coordinates that are now owned. Returns how many were dropped.
    pub fn prune_owned(&mut self, index: &SpatialIndex) -> usize {
        let before = self.cells.len();
        self.cells.retain(|&(y, x)| !index.has(x, y));
        let dropped = before - self.cells.len();
        if dropped > 0 {
            tracing::debug!(dropped, remaining = self.cells.len(), "selection pruned");
        }
        dropped
    }
}
