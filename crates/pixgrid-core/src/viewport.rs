#![forbid(unsafe_code)]

//! Viewport state and the screen ↔ grid mapping.
//!
//! # Invariants
//!
//! 1. `zoom` stays within the configured `[min_zoom, max_zoom]`; the
//!    controller only stores values that went through [`clamp_zoom`].
//! 2. Every committed offset went through [`clamp_offset`], so the grid never
//!    exposes more than `buffer` pixels of empty space past a container edge
//!    in the direction of travel.
//! 3. A screen point maps to `floor((p - offset) / (cell_size * zoom))`.

use crate::geometry::{CellCoord, CellRect, Point, Size};

/// Static description of the grid being displayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// Edge length of one cell at zoom 1.0, in pixels.
    pub cell_size: f64,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            columns: 150,
            rows: 150,
            cell_size: 10.0,
        }
    }
}

impl GridGeometry {
    /// Create a grid description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, cell_size: f64) -> Self {
        Self {
            columns,
            rows,
            cell_size,
        }
    }

    /// All cells of the grid.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> CellRect {
        CellRect::new(0, 0, self.columns, self.rows)
    }

    /// Whether a coordinate lies on the grid.
    #[inline]
    #[must_use]
    pub const fn contains(&self, coord: CellCoord) -> bool {
        self.bounds().contains(coord)
    }

    /// Rendered size of the whole grid at the given zoom.
    #[must_use]
    pub fn extent(&self, zoom: f64) -> Size {
        let pitch = self.cell_size * zoom;
        Size::new(
            f64::from(self.columns) * pitch,
            f64::from(self.rows) * pitch,
        )
    }
}

/// Viewport: pan offset, zoom, and container size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Screen-space translation applied to the grid.
    pub offset: Point,
    /// Zoom factor.
    pub zoom: f64,
    /// Container size in pixels.
    pub container: Size,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            offset: Point::ZERO,
            zoom: 1.0,
            container: Size::default(),
        }
    }
}

impl ViewportState {
    /// On-screen edge length of one cell.
    #[inline]
    #[must_use]
    pub fn cell_pitch(&self, grid: &GridGeometry) -> f64 {
        grid.cell_size * self.zoom
    }

    /// Grid coordinate under a screen point. Not bounds-checked.
    ///
    /// Returns `None` when the cell pitch is degenerate or the result does
    /// not fit in an `i32`.
    #[must_use]
    pub fn screen_to_cell(&self, point: Point, grid: &GridGeometry) -> Option<CellCoord> {
        let pitch = self.cell_pitch(grid);
        if !(pitch.is_finite() && pitch > 0.0) {
            return None;
        }
        let x = ((point.x - self.offset.x) / pitch).floor();
        let y = ((point.y - self.offset.y) / pitch).floor();
        Some(CellCoord::new(to_i32(x)?, to_i32(y)?))
    }

    /// Screen position of a cell's top-left corner.
    #[must_use]
    pub fn cell_to_screen(&self, coord: CellCoord, grid: &GridGeometry) -> Point {
        let pitch = self.cell_pitch(grid);
        Point::new(
            self.offset.x + f64::from(coord.x) * pitch,
            self.offset.y + f64::from(coord.y) * pitch,
        )
    }

    /// Grid cells at least partially covered by the container, clipped to
    /// the grid.
    #[must_use]
    pub fn visible_cells(&self, grid: &GridGeometry) -> CellRect {
        let pitch = self.cell_pitch(grid);
        if !(pitch.is_finite() && pitch > 0.0) || self.container.is_empty() {
            return CellRect::default();
        }
        let x0 = (-self.offset.x / pitch).floor();
        let y0 = (-self.offset.y / pitch).floor();
        let x1 = ((self.container.width - self.offset.x) / pitch).ceil();
        let y1 = ((self.container.height - self.offset.y) / pitch).ceil();

        // `as` saturates, so far-off offsets still produce a valid span.
        CellRect::from_span(x0 as i32, y0 as i32, x1 as i32, y1 as i32)
            .intersection_opt(&grid.bounds())
            .unwrap_or_default()
    }
}

fn to_i32(v: f64) -> Option<i32> {
    if v.is_finite() && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX) {
        Some(v as i32)
    } else {
        None
    }
}

/// Clamp one axis of a candidate offset.
///
/// The allowed range is `[container - extent + buffer, container - buffer]`.
/// When the grid is so small that the range inverts, the upper bound wins.
#[must_use]
pub fn clamp_axis(value: f64, container: f64, extent: f64, buffer: f64) -> f64 {
    let lo = container - extent + buffer;
    let hi = container - buffer;
    value.max(lo).min(hi)
}

/// Clamp a candidate offset so the grid stays roughly within view.
#[must_use]
pub fn clamp_offset(candidate: Point, container: Size, extent: Size, buffer: f64) -> Point {
    Point::new(
        clamp_axis(candidate.x, container.width, extent.width, buffer),
        clamp_axis(candidate.y, container.height, extent.height, buffer),
    )
}

/// Clamp a zoom value to `[min, max]`. Non-finite input maps to `min`.
#[must_use]
pub fn clamp_zoom(zoom: f64, min: f64, max: f64) -> f64 {
    if zoom.is_finite() {
        zoom.max(min).min(max)
    } else {
        min
    }
}
