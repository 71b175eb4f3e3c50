#![forbid(unsafe_code)]

//! Chunked spatial index over owned grid cells.
//!
//! # Role in pixgrid
//! `pixgrid-index` is the in-memory cache the renderer queries each frame.
//! It is derived from the hosted cell table: the loader clears and
//! repopulates it on a full reload and patches it per realtime change. It is
//! never persisted.
//!
//! # Primary responsibilities
//! - **Cell**: the table row, decodable with serde.
//! - **ChunkKey**: floor-division chunk addressing.
//! - **SpatialIndex**: point lookups through a direct map, broad-phase range
//!   queries through chunk buckets.

pub mod cell;
pub mod chunk;
pub mod index;

pub use cell::Cell;
pub use chunk::{ChunkKey, DEFAULT_CHUNK_SIZE};
pub use index::{IndexStats, SpatialIndex};
