//! Engine configuration.

use gridboard_core::geometry::{CellSize, GridSize, PixelSize};
use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::widget::MINIMIZED_ROW_SPAN;

/// Default cell edge in pixels.
pub const DEFAULT_CELL_PX: u16 = 30;

/// Tunables for a [`LayoutEngine`](crate::engine::LayoutEngine).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub cell_size: CellSize,
    pub viewport: PixelSize,
    pub history_capacity: usize,
    pub minimized_row_span: u16,
    /// Empty cells kept around other widgets during placement.
    pub placement_buffer: u16,
    pub mobile_layout: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cell_size: CellSize::new(DEFAULT_CELL_PX).unwrap_or(CellSize::MIN),
            viewport: PixelSize::new(1440.0, 900.0),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            minimized_row_span: MINIMIZED_ROW_SPAN,
            placement_buffer: 0,
            mobile_layout: false,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn cell_size(mut self, cell: CellSize) -> Self {
        self.cell_size = cell;
        self
    }

    #[must_use]
    pub fn viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = PixelSize::new(width, height);
        self
    }

    #[must_use]
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn minimized_row_span(mut self, span: u16) -> Self {
        self.minimized_row_span = span.max(1);
        self
    }

    #[must_use]
    pub fn placement_buffer(mut self, buffer: u16) -> Self {
        self.placement_buffer = buffer;
        self
    }

    #[must_use]
    pub fn mobile_layout(mut self, mobile: bool) -> Self {
        self.mobile_layout = mobile;
        self
    }

    /// Grid derived from the viewport at the configured density.
    #[must_use]
    pub fn grid(&self) -> GridSize {
        GridSize::from_viewport(self.viewport, self.cell_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_a_desktop_dashboard() {
        let config = EngineConfig::default();
        assert_eq!(config.cell_size.px(), 30);
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.minimized_row_span, 1);
        assert_eq!(config.grid(), GridSize::new(48, 30));
    }

    #[test]
    fn builder_clamps_degenerate_values() {
        let config = EngineConfig::new().history_capacity(0).minimized_row_span(0);
        assert_eq!(config.history_capacity, 1);
        assert_eq!(config.minimized_row_span, 1);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"cellSize": 20, "mobileLayout": true}"#).expect("parse");
        assert_eq!(config.cell_size.px(), 20);
        assert!(config.mobile_layout);
        assert_eq!(config.grid(), GridSize::new(72, 45));
    }
}
