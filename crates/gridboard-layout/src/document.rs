//! Persisted dashboard documents and import normalization.
//!
//! A saved dashboard is `{dashboardVersion, widgets[], cellSize, isMobileLayout}`.
//! Exports add an optional `shared` companion object. The header is strict:
//! a bad version, density or view mode rejects the whole document. Widget
//! entries are repaired one by one on both load and import, so a single
//! damaged entry never costs the user the rest of the layout.

use gridboard_core::geometry::{CellSize, GridRect, GridSize};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DocumentError;
use crate::insert::InsertionPlanner;
use crate::pack::Packer;
use crate::preset::SizePreset;
use crate::widget::{MINIMIZED_ROW_SPAN, Settings, Widget, WidgetId, WidgetKind};

/// Schema version written by this crate.
pub const DASHBOARD_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDocument {
    pub dashboard_version: u32,
    pub widgets: Vec<Widget>,
    pub cell_size: CellSize,
    #[serde(default)]
    pub is_mobile_layout: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<Value>,
}

impl DashboardDocument {
    #[must_use]
    pub fn new(widgets: Vec<Widget>, cell_size: CellSize, is_mobile_layout: bool) -> Self {
        Self {
            dashboard_version: DASHBOARD_VERSION,
            widgets,
            cell_size,
            is_mobile_layout,
            shared: None,
        }
    }

    #[must_use]
    pub fn with_shared(mut self, shared: Option<Value>) -> Self {
        self.shared = shared;
        self
    }

    /// Parse a saved document, repairing widget entries individually.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Self::from_json_with_report(json, MINIMIZED_ROW_SPAN).map(|(document, _)| document)
    }

    /// Like [`from_json`](Self::from_json), also returning what was repaired.
    ///
    /// Floors are recomputed at the document's own cell size. Regenerated ids
    /// use [`LOAD_ID_STAMP`] as their timestamp.
    pub fn from_json_with_report(
        json: &str,
        minimized_row_span: u16,
    ) -> Result<(Self, ImportReport), DocumentError> {
        let value: Value = serde_json::from_str(json)?;
        let header = DocumentHeader::deserialize(&value)?;
        let (entries, shared) = split_payload(value)?;
        let (widgets, report) = normalize_entries(
            &entries,
            ImportContext {
                cell: header.cell_size,
                minimized_row_span,
                now_ms: LOAD_ID_STAMP,
            },
        );
        let document = Self {
            dashboard_version: header.dashboard_version,
            widgets,
            cell_size: header.cell_size,
            is_mobile_layout: header.is_mobile_layout,
            shared,
        };
        Ok((document, report))
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject documents written by another schema version or for the other view mode.
    pub fn check_compatible(&self, mobile_layout: bool) -> Result<(), DocumentError> {
        if self.dashboard_version != DASHBOARD_VERSION {
            return Err(DocumentError::Version {
                found: self.dashboard_version,
                expected: DASHBOARD_VERSION,
            });
        }
        if self.is_mobile_layout != mobile_layout {
            return Err(DocumentError::ViewMode {
                saved: view_mode_name(self.is_mobile_layout),
                active: view_mode_name(mobile_layout),
            });
        }
        Ok(())
    }
}

/// Timestamp for ids regenerated while loading a saved document.
pub const LOAD_ID_STAMP: u64 = 0;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentHeader {
    dashboard_version: u32,
    cell_size: CellSize,
    #[serde(default)]
    is_mobile_layout: bool,
}

const fn view_mode_name(mobile: bool) -> &'static str {
    if mobile { "mobile" } else { "desktop" }
}

/// One repair applied while importing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportWarning {
    NotAnObject { index: usize },
    UnknownType { index: usize, found: String },
    RegeneratedId { index: usize, id: WidgetId },
    UnknownPreset { index: usize, found: String },
}

/// Outcome of an import, before placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub accepted: usize,
    pub dropped: usize,
    /// Whether the normalized set had to be auto-sorted to fit.
    pub sorted: bool,
    pub warnings: Vec<ImportWarning>,
}

/// Inputs the normalizer needs from the running engine.
#[derive(Debug, Clone, Copy)]
pub struct ImportContext {
    pub cell: CellSize,
    pub minimized_row_span: u16,
    /// Timestamp used for regenerated ids.
    pub now_ms: u64,
}

/// Normalized import payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImport {
    pub widgets: Vec<Widget>,
    pub shared: Option<Value>,
    pub report: ImportReport,
}

/// Parse and repair an import payload.
///
/// Accepts a full document object or a bare widget array. Only a payload that
/// is not JSON, or has no widget array at all, is an error.
pub fn normalize_import(json: &str, ctx: ImportContext) -> Result<NormalizedImport, DocumentError> {
    let value: Value = serde_json::from_str(json)?;
    let (entries, shared) = split_payload(value)?;
    let (widgets, report) = normalize_entries(&entries, ctx);
    Ok(NormalizedImport {
        widgets,
        shared,
        report,
    })
}

/// Widget entries and companion data of a document object or bare array.
fn split_payload(value: Value) -> Result<(Vec<Value>, Option<Value>), DocumentError> {
    match value {
        Value::Array(entries) => Ok((entries, None)),
        Value::Object(mut object) => {
            let shared = object.remove("shared");
            match object.remove("widgets") {
                Some(Value::Array(entries)) => Ok((entries, shared)),
                _ => Err(DocumentError::MissingWidgets),
            }
        }
        _ => Err(DocumentError::MissingWidgets),
    }
}

fn normalize_entries(entries: &[Value], ctx: ImportContext) -> (Vec<Widget>, ImportReport) {
    let mut report = ImportReport::default();
    let mut taken = FxHashSet::default();
    let mut widgets = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match normalize_entry(index, entry, ctx, &mut taken, &mut report.warnings) {
            Some(widget) => widgets.push(widget),
            None => report.dropped += 1,
        }
    }
    report.accepted = widgets.len();
    for warning in &report.warnings {
        gridboard_core::warn!(?warning, "repaired a widget entry");
    }
    (widgets, report)
}

/// Enforce unique ids and type floors on already-typed widgets.
///
/// Duplicates after the first get a fresh `type + timestamp` id. Floors are
/// recomputed for `cell` and spans raised to meet them.
#[must_use]
pub fn repair_widgets(widgets: Vec<Widget>, cell: CellSize, now_ms: u64) -> Vec<Widget> {
    let mut taken = FxHashSet::default();
    widgets
        .into_iter()
        .map(|mut widget| {
            if taken.contains(&widget.id) {
                let id = unique_id(widget.kind, now_ms, &taken);
                gridboard_core::debug!(duplicate = %widget.id, %id, "regenerated widget id");
                widget.id = id;
            }
            taken.insert(widget.id.clone());

            let (min_cols, min_rows) = widget.kind.min_spans(cell);
            widget.min_col_span = min_cols;
            widget.min_row_span = min_rows;
            widget.col_start = widget.col_start.max(1);
            widget.row_start = widget.row_start.max(1);
            widget.col_span = widget.col_span.max(min_cols);
            if widget.is_minimized {
                widget.row_span = widget.row_span.max(1);
                widget.original_row_span = Some(widget.original_row_span.unwrap_or(min_rows).max(min_rows));
            } else {
                widget.row_span = widget.row_span.max(min_rows);
            }
            widget
        })
        .collect()
}

/// `type + timestamp`, bumping the timestamp until the id is free.
pub fn unique_id(kind: WidgetKind, now_ms: u64, taken: &FxHashSet<WidgetId>) -> WidgetId {
    let mut stamp = now_ms;
    loop {
        let id = WidgetId::generate(kind, stamp);
        if !taken.contains(&id) {
            return id;
        }
        stamp = stamp.wrapping_add(1);
    }
}

fn positive_u16(object: &Map<String, Value>, key: &str) -> Option<u16> {
    object
        .get(key)
        .and_then(Value::as_u64)
        .filter(|value| *value >= 1)
        .and_then(|value| u16::try_from(value).ok())
}

fn settings_object(object: &Map<String, Value>, key: &str) -> Settings {
    match object.get(key) {
        Some(Value::Object(settings)) => settings.clone(),
        _ => Settings::new(),
    }
}

fn normalize_entry(
    index: usize,
    entry: &Value,
    ctx: ImportContext,
    taken: &mut FxHashSet<WidgetId>,
    warnings: &mut Vec<ImportWarning>,
) -> Option<Widget> {
    let Some(object) = entry.as_object() else {
        warnings.push(ImportWarning::NotAnObject { index });
        return None;
    };

    let raw_type = object.get("type").and_then(Value::as_str).unwrap_or_default();
    let Some(kind) = WidgetKind::parse(raw_type) else {
        warnings.push(ImportWarning::UnknownType {
            index,
            found: raw_type.to_string(),
        });
        return None;
    };

    let id = match object.get("id").and_then(Value::as_str) {
        Some(raw) if !raw.trim().is_empty() && !taken.contains(&WidgetId::new(raw)) => WidgetId::new(raw),
        _ => {
            let id = unique_id(kind, ctx.now_ms, taken);
            warnings.push(ImportWarning::RegeneratedId {
                index,
                id: id.clone(),
            });
            id
        }
    };
    taken.insert(id.clone());

    let floor = kind.min_spans(ctx.cell);
    let preset = match object.get("sizePreset").and_then(Value::as_str) {
        Some(raw) => {
            let parsed = SizePreset::parse(raw);
            if parsed.is_none() {
                warnings.push(ImportWarning::UnknownPreset {
                    index,
                    found: raw.to_string(),
                });
            }
            parsed
        }
        None => None,
    };
    let spans = match (
        preset,
        positive_u16(object, "colSpan"),
        positive_u16(object, "rowSpan"),
    ) {
        (Some(preset), _, _) => preset.spans(ctx.cell, floor),
        (None, Some(cols), Some(rows)) => (cols.max(floor.0), rows.max(floor.1)),
        _ => kind.default_preset().spans(ctx.cell, floor),
    };

    let title = object
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(kind.default_title());

    let mut widget = Widget::new(
        id,
        kind,
        GridRect::new(
            positive_u16(object, "colStart").unwrap_or(1),
            positive_u16(object, "rowStart").unwrap_or(1),
            spans.0,
            spans.1,
        ),
        floor,
    )
    .with_title(title);
    widget.settings = settings_object(object, "settings");
    widget.container_settings = settings_object(object, "containerSettings");

    if object.get("isMinimized").and_then(Value::as_bool) == Some(true) {
        let saved = positive_u16(object, "originalRowSpan").unwrap_or(spans.1);
        widget.minimize(ctx.minimized_row_span);
        widget.original_row_span = Some(saved.max(floor.1));
    }
    Some(widget)
}

/// Built-in starting layout for a view mode.
///
/// Desktop places weather, notes and calculator through the planner, skipping
/// any that do not fit. Mobile is a single weather widget covering the grid.
#[must_use]
pub fn default_widgets(cell: CellSize, grid: GridSize, mobile_layout: bool) -> Vec<Widget> {
    let id = |kind: WidgetKind| WidgetId::new(format!("{kind}-default"));

    if mobile_layout {
        let mut weather = Widget::from_preset(
            id(WidgetKind::Weather),
            WidgetKind::Weather,
            SizePreset::Medium,
            cell,
        );
        if !grid.is_unknown() {
            weather.fill_grid(grid);
        }
        return vec![weather];
    }

    let planner = InsertionPlanner::new(Packer::new(grid));
    let mut layout = Vec::new();
    for (kind, preset) in [
        (WidgetKind::Weather, SizePreset::Medium),
        (WidgetKind::Notes, SizePreset::Medium),
        (WidgetKind::Calculator, SizePreset::Small),
    ] {
        let widget = Widget::from_preset(id(kind), kind, preset, cell);
        match planner.insert(&layout, widget) {
            Some(plan) => layout = plan.layout,
            None => gridboard_core::debug!(%kind, "default widget does not fit"),
        }
    }
    layout
}
