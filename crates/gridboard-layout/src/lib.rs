#![forbid(unsafe_code)]

//! Grid layout engine for Gridboard.
//!
//! Leaves first:
//!
//! - [`placement`]: bounds and overlap validation.
//! - [`pack`]: deterministic first-fit re-flow of a whole layout.
//! - [`insert`]: first-fit, re-pack, then shrink-to-fit for one new widget.
//! - [`density`]: cell-size rescaling followed by a re-pack.
//! - [`interaction`]: the drag/resize state machine.
//! - [`history`]: bounded undo/redo snapshots.
//! - [`engine`]: the [`LayoutEngine`] context object tying them together.

pub mod config;
pub mod density;
pub mod document;
pub mod engine;
pub mod error;
pub mod history;
pub mod insert;
pub mod interaction;
pub mod pack;
pub mod placement;
pub mod preset;
pub mod widget;

pub use config::EngineConfig;
pub use density::{RescaleOutcome, RescaleWarning, Rescaler, rescale};
pub use document::{DASHBOARD_VERSION, DashboardDocument, ImportReport, ImportWarning};
pub use engine::{LayoutEngine, LoadOutcome};
pub use error::{DocumentError, LayoutError, Result};
pub use history::{DEFAULT_HISTORY_CAPACITY, LayoutHistory, SnapshotHistory};
pub use insert::{InsertPlan, InsertStrategy, InsertionPlanner, ShrinkAxis};
pub use interaction::{
    InteractionController, InteractionEffect, InteractionEvent, InteractionNoopReason,
    InteractionState, InteractionTransition,
};
pub use pack::{Packer, auto_sort};
pub use placement::{LayoutConflict, PlacementError, can_place, check_placement, layout_conflicts};
pub use preset::SizePreset;
pub use widget::{MINIMIZED_ROW_SPAN, Settings, Widget, WidgetId, WidgetKind};
