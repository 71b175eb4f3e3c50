#![forbid(unsafe_code)]

//! Core: input events, geometry, scheduling primitives, and the grid
//! interaction state machine.
//!
//! # Role in pixgrid
//! `pixgrid-core` is the input layer. It normalizes pointer, wheel, and touch
//! input into [`event::InputEvent`] values and drives the
//! [`interaction::GridInteractionController`], which owns the viewport
//! (offset, zoom, container size) and reports what the host should do next
//! as [`interaction::HostCommand`]s.
//!
//! # Primary responsibilities
//! - **InputEvent**: canonical pointer / wheel / touch / focus events in
//!   container-relative screen pixels.
//! - **Geometry**: screen-space points and sizes, grid-space coordinates and
//!   rectangles.
//! - **Scheduling**: host-agnostic "next frame", "delayed callback", and
//!   cooldown primitives.
//! - **Viewport**: screen ↔ grid conversion plus pan and zoom clamping.
//!
//! # How it fits in the system
//! The controller never touches cell data. It hands a grid-space
//! [`geometry::CellRect`] to the rendering layer, which queries
//! `pixgrid-index` with it. Time is always passed in by the caller, so every
//! transition is deterministic under test.

pub mod event;
pub mod geometry;
pub mod interaction;
pub mod schedule;
pub mod viewport;
