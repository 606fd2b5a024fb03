//! Widget model: identity, type, geometry, floors, and minimize state.

use std::fmt;

use gridboard_core::geometry::{CellSize, GridRect, GridSize, PixelSize};
use serde::{Deserialize, Serialize};

use crate::preset::SizePreset;

/// Opaque per-widget settings object. The engine only ever shallow-merges it.
pub type Settings = serde_json::Map<String, serde_json::Value>;

/// Row span forced onto a minimized widget unless configured otherwise.
pub const MINIMIZED_ROW_SPAN: u16 = 1;

/// Stable widget identifier, unique within a registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `type + timestamp`, the identifier scheme for freshly added widgets.
    #[must_use]
    pub fn generate(kind: WidgetKind, timestamp_ms: u64) -> Self {
        Self(format!("{}{timestamp_ms}", kind.as_str()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Closed set of widget types hosted by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Weather,
    Notes,
    Calculator,
    Chat,
    Slideshow,
}

impl WidgetKind {
    pub const ALL: [Self; 5] = [
        Self::Weather,
        Self::Notes,
        Self::Calculator,
        Self::Chat,
        Self::Slideshow,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Notes => "notes",
            Self::Calculator => "calculator",
            Self::Chat => "chat",
            Self::Slideshow => "slideshow",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw))
    }

    /// Title shown when none was provided.
    #[must_use]
    pub const fn default_title(self) -> &'static str {
        match self {
            Self::Weather => "Weather",
            Self::Notes => "Notes",
            Self::Calculator => "Calculator",
            Self::Chat => "Chat",
            Self::Slideshow => "Photos",
        }
    }

    /// Smallest pixel footprint the content can render into.
    #[must_use]
    pub const fn min_size_px(self) -> PixelSize {
        match self {
            Self::Weather | Self::Notes => PixelSize::new(240.0, 180.0),
            Self::Calculator => PixelSize::new(210.0, 300.0),
            Self::Chat => PixelSize::new(300.0, 300.0),
            Self::Slideshow => PixelSize::new(300.0, 240.0),
        }
    }

    #[must_use]
    pub const fn default_preset(self) -> SizePreset {
        match self {
            Self::Weather | Self::Notes => SizePreset::Medium,
            Self::Calculator | Self::Chat => SizePreset::Tall,
            Self::Slideshow => SizePreset::Large,
        }
    }

    /// Grid floor for this type at a given density: `max(1, round(minPx / cellPx))`.
    #[must_use]
    pub fn min_spans(self, cell: CellSize) -> (u16, u16) {
        let min = self.min_size_px();
        (
            cells_at_least_one(cell.cells_for_px(min.width)),
            cells_at_least_one(cell.cells_for_px(min.height)),
        )
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn cells_at_least_one(cells: i32) -> u16 {
    cells.clamp(1, i32::from(u16::MAX)) as u16
}

/// A positioned, sized, typed entity on the dashboard grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: WidgetId,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub title: String,
    pub col_start: u16,
    pub row_start: u16,
    pub col_span: u16,
    pub row_span: u16,
    pub min_col_span: u16,
    pub min_row_span: u16,
    #[serde(default)]
    pub is_minimized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_row_span: Option<u16>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub container_settings: Settings,
}

impl Widget {
    /// Create a widget at `rect` with an explicit floor.
    #[must_use]
    pub fn new(id: impl Into<WidgetId>, kind: WidgetKind, rect: GridRect, floor: (u16, u16)) -> Self {
        Self {
            id: id.into(),
            kind,
            title: kind.default_title().to_string(),
            col_start: rect.col,
            row_start: rect.row,
            col_span: rect.col_span,
            row_span: rect.row_span,
            min_col_span: floor.0.max(1),
            min_row_span: floor.1.max(1),
            is_minimized: false,
            original_row_span: None,
            settings: Settings::new(),
            container_settings: Settings::new(),
        }
    }

    /// Create a widget of `kind` sized by `preset` at the given density.
    ///
    /// The widget is anchored at (1, 1); callers place it through the planner.
    #[must_use]
    pub fn from_preset(
        id: impl Into<WidgetId>,
        kind: WidgetKind,
        preset: SizePreset,
        cell: CellSize,
    ) -> Self {
        let floor = kind.min_spans(cell);
        let (cols, rows) = preset.spans(cell, floor);
        Self::new(id, kind, GridRect::new(1, 1, cols, rows), floor)
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub const fn rect(&self) -> GridRect {
        GridRect::new(self.col_start, self.row_start, self.col_span, self.row_span)
    }

    pub fn set_rect(&mut self, rect: GridRect) {
        self.col_start = rect.col;
        self.row_start = rect.row;
        self.col_span = rect.col_span;
        self.row_span = rect.row_span;
    }

    pub fn set_origin(&mut self, col: u16, row: u16) {
        self.col_start = col;
        self.row_start = row;
    }

    /// Effective row floor: the current span while minimized, the type floor otherwise.
    #[must_use]
    pub fn row_floor(&self) -> u16 {
        if self.is_minimized {
            self.row_span.max(1)
        } else {
            self.min_row_span.max(1)
        }
    }

    #[must_use]
    pub fn col_floor(&self) -> u16 {
        self.min_col_span.max(1)
    }

    /// Spans clamped up to the floor. Packing never shrinks below this.
    #[must_use]
    pub fn floored_spans(&self) -> (u16, u16) {
        (
            self.col_span.max(self.col_floor()),
            self.row_span.max(self.row_floor()),
        )
    }

    #[must_use]
    pub fn meets_floor(&self) -> bool {
        self.col_span >= self.col_floor() && self.row_span >= self.row_floor()
    }

    /// Cover the whole grid, never dropping below the floor.
    pub fn fill_grid(&mut self, grid: GridSize) {
        self.set_rect(GridRect::new(
            1,
            1,
            grid.cols.max(self.min_col_span),
            grid.rows.max(self.min_row_span),
        ));
    }

    /// Whether this widget can give up a cell on at least one axis.
    #[must_use]
    pub fn is_donor(&self) -> bool {
        self.col_span > self.col_floor() || (!self.is_minimized && self.row_span > self.row_floor())
    }

    /// Collapse to `minimized_span` rows, remembering the current row span.
    ///
    /// Returns `false` if the widget was already minimized.
    pub fn minimize(&mut self, minimized_span: u16) -> bool {
        if self.is_minimized {
            return false;
        }
        self.original_row_span = Some(self.row_span);
        self.row_span = minimized_span.max(1);
        self.is_minimized = true;
        true
    }

    /// Restore the pre-minimize row span verbatim.
    ///
    /// Returns `false` if the widget was not minimized.
    pub fn restore(&mut self) -> bool {
        if !self.is_minimized {
            return false;
        }
        if let Some(span) = self.original_row_span.take() {
            self.row_span = span;
        } else {
            self.row_span = self.row_span.max(self.min_row_span);
        }
        self.is_minimized = false;
        true
    }

    /// Shallow-merge `patch` into the settings object; keys in `patch` win.
    pub fn merge_settings(&mut self, patch: Settings) {
        for (key, value) in patch {
            self.settings.insert(key, value);
        }
    }
}
