#![forbid(unsafe_code)]

//! Core: unit types, pointer input, and logging for Gridboard.
//!
//! # Role in Gridboard
//! `gridboard-core` owns the vocabulary shared by the layout engine and its
//! hosts. It keeps grid coordinates and pixel coordinates as distinct types so
//! that a pixel value can never be fed where a cell count is expected.
//!
//! # Primary responsibilities
//! - **Geometry**: [`geometry::GridRect`] (1-indexed cells), [`geometry::PixelRect`],
//!   and [`geometry::CellSize`], with explicit conversions between them.
//! - **Events**: pointer positions and the eight resize handles.
//! - **Logging**: `tracing` macros behind the `tracing` feature, no-ops otherwise.

pub mod event;
pub mod geometry;
pub mod logging;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, trace, warn};
