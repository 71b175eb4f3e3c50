#![forbid(unsafe_code)]

//! Surface configuration as data.
//!
//! Every tunable of the grid surface lives in one [`SurfaceConfig`] that can
//! be loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # pixgrid.toml
//! [grid]
//! width = 200
//! height = 120
//!
//! [interaction]
//! max_zoom = 8.0
//! hover_delay_ms = 100
//! ```
//!
//! ```rust,ignore
//! let config = SurfaceConfig::from_toml_file("pixgrid.toml")?.validated()?;
//! ```
//!
//! # Defaults
//!
//! Missing keys fall back to the component defaults, so
//! `SurfaceConfig::default()` behaves exactly like
//! `InteractionConfig::default()`, `LoaderConfig::default()`, and
//! `SpatialIndex::new()`.

use std::path::Path;

use pixgrid_core::interaction::InteractionConfig;
use pixgrid_core::viewport::GridGeometry;
use pixgrid_index::DEFAULT_CHUNK_SIZE;
use pixgrid_loader::{LoaderConfig, RetryPolicy};
use serde::{Deserialize, Serialize};
use web_time::Duration;

// ---------------------------------------------------------------------------
// Top-level SurfaceConfig
// ---------------------------------------------------------------------------

/// Complete configuration for a [`GridSurface`](crate::GridSurface) and its
/// loader.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Grid dimensions.
    pub grid: GridSection,
    /// Spatial index tuning.
    pub index: IndexSection,
    /// Pan, zoom, and hover behaviour.
    pub interaction: InteractionSection,
    /// Reload and retry behaviour.
    pub loader: LoaderSection,
}

impl SurfaceConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check every value is usable. An empty list means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.grid.width == 0 || self.grid.height == 0 {
            errors.push(format!(
                "grid.width and grid.height must be > 0, got {}x{}",
                self.grid.width, self.grid.height
            ));
        }
        if !(self.grid.cell_size.is_finite() && self.grid.cell_size > 0.0) {
            errors.push(format!(
                "grid.cell_size must be a positive number, got {}",
                self.grid.cell_size
            ));
        }

        if self.index.chunk_size == 0 {
            errors.push("index.chunk_size must be > 0".into());
        }

        let ix = &self.interaction;
        if !(ix.min_zoom.is_finite() && ix.min_zoom > 0.0) {
            errors.push(format!("interaction.min_zoom must be > 0, got {}", ix.min_zoom));
        }
        if !(ix.max_zoom.is_finite() && ix.max_zoom >= ix.min_zoom) {
            errors.push(format!(
                "interaction.max_zoom must be >= min_zoom ({}), got {}",
                ix.min_zoom, ix.max_zoom
            ));
        }
        if !(ix.zoom_factor.is_finite() && ix.zoom_factor > 1.0) {
            errors.push(format!(
                "interaction.zoom_factor must be > 1, got {}",
                ix.zoom_factor
            ));
        }
        if !(ix.pan_buffer.is_finite() && ix.pan_buffer >= 0.0) {
            errors.push(format!(
                "interaction.pan_buffer must be >= 0, got {}",
                ix.pan_buffer
            ));
        }
        if !(ix.drag_threshold.is_finite() && ix.drag_threshold >= 0.0) {
            errors.push(format!(
                "interaction.drag_threshold must be >= 0, got {}",
                ix.drag_threshold
            ));
        }

        if self.loader.page_size == 0 {
            errors.push("loader.page_size must be > 0".into());
        }
        if self.loader.reload_timeout_ms == 0 {
            errors.push("loader.reload_timeout_ms must be > 0".into());
        }

        errors
    }

    /// Return `self` if [`validate`](Self::validate) finds nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Grid geometry for the controller.
    #[must_use]
    pub fn to_grid_geometry(&self) -> GridGeometry {
        GridGeometry::new(self.grid.width, self.grid.height, self.grid.cell_size)
    }

    /// Build an [`InteractionConfig`].
    #[must_use]
    pub fn to_interaction_config(&self) -> InteractionConfig {
        let ix = &self.interaction;
        InteractionConfig {
            grid: self.to_grid_geometry(),
            min_zoom: ix.min_zoom,
            max_zoom: ix.max_zoom,
            zoom_factor: ix.zoom_factor,
            pan_buffer: ix.pan_buffer,
            hover_delay: Duration::from_millis(ix.hover_delay_ms),
            drag_threshold: ix.drag_threshold,
            advisory_cooldown: Duration::from_millis(ix.advisory_cooldown_ms),
        }
    }

    /// Build a [`LoaderConfig`].
    #[must_use]
    pub fn to_loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            page_size: self.loader.page_size,
            reload_timeout: Duration::from_millis(self.loader.reload_timeout_ms),
            retry: RetryPolicy::exponential(self.loader.max_retries, self.loader.retry_base_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// `[grid]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSection {
    /// Columns (default: 150).
    pub width: u32,
    /// Rows (default: 150).
    pub height: u32,
    /// Cell edge in pixels at zoom 1.0 (default: 10).
    pub cell_size: f64,
}

impl Default for GridSection {
    fn default() -> Self {
        let grid = GridGeometry::default();
        Self {
            width: grid.columns,
            height: grid.rows,
            cell_size: grid.cell_size,
        }
    }
}

/// `[index]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSection {
    /// Chunk edge in cells (default: 32).
    pub chunk_size: u32,
}

impl Default for IndexSection {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// `[interaction]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSection {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_factor: f64,
    pub pan_buffer: f64,
    pub hover_delay_ms: u64,
    pub drag_threshold: f64,
    pub advisory_cooldown_ms: u64,
}

impl Default for InteractionSection {
    fn default() -> Self {
        let d = InteractionConfig::default();
        Self {
            min_zoom: d.min_zoom,
            max_zoom: d.max_zoom,
            zoom_factor: d.zoom_factor,
            pan_buffer: d.pan_buffer,
            hover_delay_ms: d.hover_delay.as_millis() as u64,
            drag_threshold: d.drag_threshold,
            advisory_cooldown_ms: d.advisory_cooldown.as_millis() as u64,
        }
    }
}

/// `[loader]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSection {
    /// Rows per page (default: 1000).
    pub page_size: usize,
    /// Bound on one full scan (default: 30000).
    pub reload_timeout_ms: u64,
    /// Retries after the first attempt (default: 2).
    pub max_retries: u32,
    /// First backoff delay; doubles per retry (default: 500).
    pub retry_base_ms: u64,
}

impl Default for LoaderSection {
    fn default() -> Self {
        let d = LoaderConfig::default();
        Self {
            page_size: d.page_size,
            reload_timeout_ms: d.reload_timeout.as_millis() as u64,
            max_retries: d.retry.max_retries,
            retry_base_ms: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from loading a [`SurfaceConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// Reading the file failed.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Parsed, but [`SurfaceConfig::validate`] found problems.
    Invalid(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Invalid(errors) => write!(f, "invalid configuration: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}
