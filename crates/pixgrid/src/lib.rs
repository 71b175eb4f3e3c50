#![forbid(unsafe_code)]

//! pixgrid public facade crate.
//!
//! Re-exports the interaction, index, and loader crates and adds the pieces
//! a host needs to put a grid on screen: [`SurfaceConfig`] loaded from TOML
//! or JSON, a [`GridSurface`] composing index, controller, and
//! [`Selection`], a top-level [`Error`], and optional subscriber setup in
//! [`logging`].
//!
//! ```rust,ignore
//! use pixgrid::{GridDataLoader, GridSurface, SurfaceConfig};
//!
//! let config = SurfaceConfig::from_toml_file("pixgrid.toml")?.validated()?;
//! let loader = GridDataLoader::new(source, config.to_loader_config());
//! let mut surface = GridSurface::new(&config);
//! surface.mount(Size::new(800.0, 600.0));
//! surface.reload(&loader)?;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod selection;
pub mod surface;

// --- Core re-exports -------------------------------------------------------

pub use pixgrid_core::event::{
    InputEvent, Modifiers, PointerButton, PointerEvent, PointerEventKind, TouchEvent, TouchPhase,
    TouchPoint, WheelEvent,
};
pub use pixgrid_core::geometry::{CellCoord, CellRect, Point, Size};
pub use pixgrid_core::interaction::{
    Dispatch, GestureState, GridInteractionController, HostCommand, InteractionConfig,
    ReleaseOutcome, VIEW_ONLY_ADVISORY,
};
pub use pixgrid_core::viewport::{GridGeometry, ViewportState};

// --- Index re-exports ------------------------------------------------------

pub use pixgrid_index::{Cell, ChunkKey, DEFAULT_CHUNK_SIZE, IndexStats, SpatialIndex};

// --- Loader re-exports -----------------------------------------------------

pub use pixgrid_loader::{
    BackoffStrategy, CancellationToken, CellSource, ChangeEvent, ChangeFeed, ChangePublisher,
    GridDataLoader, LoadError, LoaderConfig, MemoryCellSource, PatchOutcome, ReloadReport,
    RetryPolicy, feed,
};

// --- Facade ----------------------------------------------------------------

pub use config::{ConfigError, SurfaceConfig};
pub use error::{Error, Recovery, Result};
pub use logging::LogFormat;
pub use selection::{Selection, SelectionChange};
pub use surface::{GridSurface, SurfaceDispatch};
