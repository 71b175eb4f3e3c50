#![forbid(unsafe_code)]

//! Loading and live-patching pixgrid cell data.
//!
//! # Role in pixgrid
//! `pixgrid-loader` is the only writer of the
//! [`SpatialIndex`](pixgrid_index::SpatialIndex). It bulk-loads the cell
//! table through a [`CellSource`], then keeps the index current by applying
//! realtime [`ChangeEvent`]s from a [`ChangeFeed`].
//!
//! # Primary responsibilities
//! - **CellSource**: paginated reads from the hosted table.
//! - **ChangeFeed**: ordered realtime events, decoded from JSON payloads.
//! - **GridDataLoader**: full reload with timeout, retry, and cancellation;
//!   per-event index patches.
//! - **LoadError**: retryability and user-facing notices. Failures never
//!   reach the index or the interaction controller.

pub mod cancellation;
pub mod error;
pub mod feed;
pub mod loader;
pub mod retry;
pub mod source;

pub use cancellation::{CancellationSource, CancellationToken};
pub use error::{LoadError, Result};
pub use feed::{ChangeEvent, ChangeFeed, ChangePublisher};
pub use loader::{GridDataLoader, LoaderConfig, PatchOutcome, ReloadReport};
pub use retry::{BackoffStrategy, RetryPolicy};
pub use source::{CellSource, MemoryCellSource};
