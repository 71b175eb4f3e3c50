#![forbid(unsafe_code)]

//! One grid view: index, interaction controller, and selection.
//!
//! [`GridSurface`] is what a renderer holds. It owns the [`SpatialIndex`]
//! (written only through [`GridSurface::reload`], [`GridSurface::sync`], or
//! [`GridSurface::index_mut`]) and the [`GridInteractionController`], and
//! turns click outcomes into [`Selection`] changes.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut surface = GridSurface::new(&config);
//! host.run(surface.mount(container).commands);
//! surface.reload(&loader)?;
//!
//! // per input
//! let out = surface.handle(&event, Instant::now());
//! host.run(out.dispatch.commands);
//! if let Some(change) = out.selection { ui.show(change) }
//!
//! // per frame
//! for cell in surface.visible_cells() { draw(cell) }
//! ```
//!
//! Zoom stays owned by the caller: a `ProposeZoom` command is applied by
//! calling [`GridSurface::set_zoom`] when the owner accepts it.

use pixgrid_core::event::InputEvent;
use pixgrid_core::geometry::{Point, Size};
use pixgrid_core::interaction::{Dispatch, GridInteractionController, ReleaseOutcome};
use pixgrid_index::{Cell, SpatialIndex};
use pixgrid_loader::{ChangeFeed, GridDataLoader, ReloadReport};
use web_time::Instant;

use crate::config::SurfaceConfig;
use crate::error::Result;
use crate::selection::{Selection, SelectionChange};

/// Output of [`GridSurface::handle`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceDispatch {
    /// Controller output, for the host.
    pub dispatch: Dispatch,
    /// Selection change, when the event completed a click.
    pub selection: Option<SelectionChange>,
}

/// A mounted (or mountable) grid view.
#[derive(Debug)]
pub struct GridSurface {
    index: SpatialIndex,
    controller: GridInteractionController,
    selection: Selection,
}

impl GridSurface {
    /// Build an empty surface from configuration.
    #[must_use]
    pub fn new(config: &SurfaceConfig) -> Self {
        Self::from_parts(
            SpatialIndex::with_chunk_size(config.index.chunk_size),
            GridInteractionController::new(config.to_interaction_config()),
        )
    }

    /// Assemble from an existing index and controller.
    #[must_use]
    pub fn from_parts(index: SpatialIndex, controller: GridInteractionController) -> Self {
        Self {
            index,
            controller,
            selection: Selection::new(),
        }
    }

    // --- Lifecycle -----------------------------------------------------------

    /// See [`GridInteractionController::mount`].
    pub fn mount(&mut self, container: Size) -> Dispatch {
        self.controller.mount(container)
    }

    /// See [`GridInteractionController::unmount`].
    pub fn unmount(&mut self) -> Dispatch {
        self.controller.unmount()
    }

    /// See [`GridInteractionController::resize`].
    pub fn resize(&mut self, container: Size) -> Dispatch {
        self.controller.resize(container)
    }

    /// Adopt a zoom, typically one proposed by an earlier dispatch.
    pub fn set_zoom(&mut self, zoom: f64) -> Dispatch {
        self.controller.set_zoom(zoom)
    }

    /// Toggle view-only mode.
    pub fn set_enabled(&mut self, enabled: bool) -> Dispatch {
        self.controller.set_enabled(enabled)
    }

    // --- Input ---------------------------------------------------------------

    /// Forward an input event and apply any click to the selection.
    pub fn handle(&mut self, event: &InputEvent, now: Instant) -> SurfaceDispatch {
        let dispatch = self.controller.handle(event, now);
        let selection = match dispatch.outcome {
            Some(ReleaseOutcome::Click { cell }) => {
                let change = self
                    .selection
                    .click(cell, &self.controller.config().grid, &self.index);
                tracing::debug!(x = cell.x, y = cell.y, ?change, "cell clicked");
                Some(change)
            }
            _ => None,
        };
        SurfaceDispatch {
            dispatch,
            selection,
        }
    }

    /// See [`GridInteractionController::on_frame`].
    pub fn on_frame(&mut self) -> Dispatch {
        self.controller.on_frame()
    }

    /// See [`GridInteractionController::on_timer`].
    pub fn on_timer(&mut self, now: Instant) -> Dispatch {
        self.controller.on_timer(now)
    }

    // --- Data ----------------------------------------------------------------

    /// Full reload through `loader`, then drop selected cells that turned
    /// out to be owned. On failure the index and selection are untouched.
    pub fn reload(&mut self, loader: &GridDataLoader) -> Result<ReloadReport> {
        let report = loader.full_reload(&mut self.index)?;
        self.selection.prune_owned(&self.index);
        Ok(report)
    }

    /// Apply every queued realtime change, then prune the selection.
    /// Returns the number of events applied.
    pub fn sync(&mut self, loader: &GridDataLoader, feed: &mut ChangeFeed) -> usize {
        let applied = loader.apply_pending(&mut self.index, feed);
        if applied > 0 {
            self.selection.prune_owned(&self.index);
        }
        applied
    }

    // --- Queries -------------------------------------------------------------

    /// Owned cells inside the viewport, one per coordinate.
    #[must_use]
    pub fn visible_cells(&self) -> Vec<&Cell> {
        let rect = self.controller.visible_cells();
        if rect.is_empty() {
            return Vec::new();
        }
        self.index.query_exact(rect)
    }

    /// Record of the debounced hovered cell, if it is owned.
    #[must_use]
    pub fn hovered_cell(&self) -> Option<&Cell> {
        let coord = self.controller.hovered()?;
        self.index.get(coord.x, coord.y)
    }

    /// Owned cell under a screen point.
    #[must_use]
    pub fn cell_at(&self, point: Point) -> Option<&Cell> {
        let coord = self.controller.screen_to_cell(point)?;
        self.index.get(coord.x, coord.y)
    }

    // --- Accessors -----------------------------------------------------------

    /// Owned cells currently indexed.
    #[inline]
    #[must_use]
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Mutable index, for callers driving the loader themselves.
    #[inline]
    pub fn index_mut(&mut self) -> &mut SpatialIndex {
        &mut self.index
    }

    /// Interaction controller, for viewport and hover queries.
    #[inline]
    #[must_use]
    pub fn controller(&self) -> &GridInteractionController {
        &self.controller
    }

    /// Cells picked for purchase.
    #[inline]
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Mutable selection, for clearing it after checkout.
    #[inline]
    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }
}
