//! The layout engine: one owned context for the widget registry and its state.
//!
//! Every mutation goes through `&mut self`, so there is exactly one writer.
//! Each committed change pushes one history snapshot; failed operations leave
//! both the registry and the history untouched.

use gridboard_core::event::{PointerPosition, ResizeHandle};
use gridboard_core::geometry::{CellSize, GridRect, GridSize, PixelSize};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::density::{RescaleWarning, Rescaler};
use crate::document::{
    DashboardDocument, ImportContext, ImportReport, LOAD_ID_STAMP, default_widgets, normalize_import,
    repair_widgets, unique_id,
};
use crate::error::{DocumentError, LayoutError, Result};
use crate::history::LayoutHistory;
use crate::insert::{InsertStrategy, InsertionPlanner};
use crate::interaction::{
    InteractionController, InteractionEffect, InteractionEvent, InteractionFrame, InteractionState,
    InteractionTransition,
};
use crate::pack::Packer;
use crate::placement::{LayoutConflict, check_placement, is_settled, layout_conflicts};
use crate::preset::SizePreset;
use crate::widget::{Settings, Widget, WidgetId, WidgetKind};

/// How a saved layout was brought in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum LoadOutcome {
    Document,
    /// The document was unusable; the built-in layout was substituted.
    Defaulted { reason: String },
}

#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: EngineConfig,
    grid: GridSize,
    widgets: Vec<Widget>,
    history: LayoutHistory,
    controller: InteractionController,
    maximized: Option<WidgetId>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl LayoutEngine {
    /// Empty dashboard; the history starts with the empty layout.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let mut history = LayoutHistory::new(config.history_capacity);
        let widgets = Vec::new();
        history.reset(&widgets);
        Self {
            grid: config.grid(),
            config,
            widgets,
            history,
            controller: InteractionController::new(),
            maximized: None,
        }
    }

    /// Dashboard seeded with the built-in layout for the configured view mode.
    #[must_use]
    pub fn with_default_layout(config: EngineConfig) -> Self {
        let engine = Self::new(config);
        let widgets = default_widgets(engine.config.cell_size, engine.grid, engine.config.mobile_layout);
        engine.with_widgets(widgets)
    }

    /// Replace the registry wholesale and restart history from it.
    ///
    /// The widgets are taken as given; call [`Self::conflicts`] to audit them.
    #[must_use]
    pub fn with_widgets(mut self, widgets: Vec<Widget>) -> Self {
        self.replace_registry(widgets);
        self
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    #[must_use]
    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    #[must_use]
    pub fn widget(&self, id: &WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|widget| widget.id == *id)
    }

    #[must_use]
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    #[must_use]
    pub fn cell_size(&self) -> CellSize {
        self.config.cell_size
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn history(&self) -> &LayoutHistory {
        &self.history
    }

    #[must_use]
    pub fn maximized(&self) -> Option<&WidgetId> {
        self.maximized.as_ref()
    }

    #[must_use]
    pub fn is_mobile_layout(&self) -> bool {
        self.config.mobile_layout
    }

    #[must_use]
    pub fn interaction_state(&self) -> &InteractionState {
        self.controller.state()
    }

    /// Every invariant violation in the current registry.
    #[must_use]
    pub fn conflicts(&self) -> Vec<LayoutConflict> {
        layout_conflicts(&self.widgets, self.grid)
    }

    /// Drag and resize are disabled while maximized or in the mobile layout.
    #[must_use]
    pub fn is_interaction_locked(&self) -> bool {
        self.maximized.is_some() || self.config.mobile_layout
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn packer(&self) -> Packer {
        Packer::new(self.grid).with_buffer(self.config.placement_buffer)
    }

    fn planner(&self) -> InsertionPlanner {
        InsertionPlanner::new(self.packer())
    }

    fn index_of(&self, id: &WidgetId) -> Result<usize> {
        self.widgets
            .iter()
            .position(|widget| widget.id == *id)
            .ok_or_else(|| LayoutError::UnknownWidget { id: id.clone() })
    }

    fn taken_ids(&self) -> FxHashSet<WidgetId> {
        self.widgets.iter().map(|widget| widget.id.clone()).collect()
    }

    fn require_grid(&self) -> Result<()> {
        if self.grid.is_unknown() {
            return Err(LayoutError::GridUnknown);
        }
        Ok(())
    }

    fn capacity_error(&self, widgets: usize) -> LayoutError {
        let error = LayoutError::Capacity {
            widgets,
            cols: self.grid.cols,
            rows: self.grid.rows,
        };
        gridboard_core::warn!(%error, "layout change rejected");
        error
    }

    fn commit(&mut self) {
        if self.history.push(&self.widgets) {
            gridboard_core::trace!(depth = self.history.undo_depth(), "history snapshot pushed");
        }
    }

    fn replace_registry(&mut self, widgets: Vec<Widget>) {
        self.widgets = widgets;
        self.maximized = None;
        self.controller.reset();
        self.history.reset(&self.widgets);
    }

    fn install(&mut self, widgets: Vec<Widget>) {
        self.widgets = widgets;
        if let Some(id) = &self.maximized
            && !self.widgets.iter().any(|widget| widget.id == *id)
        {
            self.maximized = None;
        }
        self.commit();
    }

    // ====================================================================
    // Geometry
    // ====================================================================

    /// Re-measure the container. Not a layout change: nothing is pushed.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.config.viewport = PixelSize::new(width, height);
        self.grid = self.config.grid();
        if self.config.mobile_layout
            && !self.grid.is_unknown()
            && let [lone] = self.widgets.as_mut_slice()
            && !lone.is_minimized
        {
            lone.fill_grid(self.grid);
        }
        gridboard_core::debug!(cols = self.grid.cols, rows = self.grid.rows, "grid re-measured");
    }

    /// Whether widget `id` could sit at `(col, row)` with its current spans.
    pub fn can_place(&self, id: &WidgetId, col: u16, row: u16) -> Result<bool> {
        let widget = &self.widgets[self.index_of(id)?];
        Ok(check_placement(
            widget,
            col,
            row,
            &self.widgets,
            self.grid,
            self.config.placement_buffer,
        )
        .is_ok())
    }

    /// Move widget `id` to `(col, row)` if the placement is valid.
    pub fn move_widget(&mut self, id: &WidgetId, col: u16, row: u16) -> Result<()> {
        let index = self.index_of(id)?;
        check_placement(
            &self.widgets[index],
            col,
            row,
            &self.widgets,
            self.grid,
            self.config.placement_buffer,
        )?;
        self.widgets[index].set_origin(col, row);
        self.commit();
        Ok(())
    }

    /// Re-flow every widget to the top-left.
    pub fn auto_sort(&mut self) -> Result<()> {
        self.require_grid()?;
        match self.packer().auto_sort(&self.widgets) {
            Some(packed) => {
                self.install(packed);
                Ok(())
            }
            None => Err(self.capacity_error(self.widgets.len())),
        }
    }

    /// Change density. Never blocked; an unpackable result is kept with a warning.
    pub fn set_cell_size(&mut self, cell: CellSize) -> Option<RescaleWarning> {
        if cell == self.config.cell_size {
            return None;
        }
        let from = self.config.cell_size;
        self.config.cell_size = cell;
        self.grid = self.config.grid();
        let outcome = Rescaler::new(from, cell, self.grid)
            .fill_lone_widget(self.config.mobile_layout)
            .rescale(&self.widgets);
        gridboard_core::info!(from = from.px(), to = cell.px(), "density changed");
        self.install(outcome.layout);
        outcome.warning
    }

    // ====================================================================
    // Registry
    // ====================================================================

    /// Add a widget of `kind` at its default preset.
    pub fn add_widget(&mut self, kind: WidgetKind, now_ms: u64) -> Result<WidgetId> {
        self.add_widget_with_preset(kind, kind.default_preset(), now_ms)
    }

    pub fn add_widget_with_preset(
        &mut self,
        kind: WidgetKind,
        preset: SizePreset,
        now_ms: u64,
    ) -> Result<WidgetId> {
        let id = unique_id(kind, now_ms, &self.taken_ids());
        let widget = Widget::from_preset(id.clone(), kind, preset, self.config.cell_size);
        self.insert_widget(widget)?;
        Ok(id)
    }

    /// Place `widget` through the insertion planner.
    pub fn insert_widget(&mut self, widget: Widget) -> Result<InsertStrategy> {
        self.require_grid()?;
        if self.widget(&widget.id).is_some() {
            return Err(LayoutError::DuplicateId { id: widget.id });
        }
        let id = widget.id.clone();
        let Some(plan) = self.planner().insert(&self.widgets, widget) else {
            return Err(self.capacity_error(self.widgets.len() + 1));
        };
        gridboard_core::info!(widget = %id, strategy = ?plan.strategy, "widget inserted");
        self.install(plan.layout);
        Ok(plan.strategy)
    }

    pub fn remove_widget(&mut self, id: &WidgetId) -> Result<Widget> {
        let index = self.index_of(id)?;
        let mut widgets = self.widgets.clone();
        let removed = widgets.remove(index);
        self.install(widgets);
        Ok(removed)
    }

    /// Resize widget `id` to `preset`, re-placing it through the planner.
    ///
    /// A minimized widget keeps its collapsed row span; the preset height is
    /// stored as the span to restore.
    pub fn apply_preset(&mut self, id: &WidgetId, preset: SizePreset) -> Result<InsertStrategy> {
        self.require_grid()?;
        let index = self.index_of(id)?;
        let mut others = self.widgets.clone();
        let mut resized = others.remove(index);
        let floor = (resized.min_col_span, resized.min_row_span);
        let (cols, rows) = preset.spans(self.config.cell_size, floor);
        resized.col_span = cols;
        if resized.is_minimized {
            resized.original_row_span = Some(rows);
        } else {
            resized.row_span = rows;
        }
        let Some(plan) = self.planner().insert(&others, resized) else {
            return Err(self.capacity_error(self.widgets.len()));
        };
        self.install(plan.layout);
        Ok(plan.strategy)
    }

    /// Shallow-merge `patch` into the widget's settings.
    pub fn save_settings(&mut self, id: &WidgetId, patch: Settings) -> Result<()> {
        let index = self.index_of(id)?;
        self.widgets[index].merge_settings(patch);
        self.commit();
        Ok(())
    }

    // ====================================================================
    // View state
    // ====================================================================

    /// Collapse widget `id`. Returns `false` if it was already minimized.
    pub fn minimize(&mut self, id: &WidgetId) -> Result<bool> {
        let index = self.index_of(id)?;
        let span = self.config.minimized_row_span;
        if !self.widgets[index].minimize(span) {
            return Ok(false);
        }
        self.commit();
        Ok(true)
    }

    /// Restore widget `id` to its saved row span.
    ///
    /// If the restored widget collides with its neighbours the layout is
    /// auto-sorted; if that cannot fit, the widget stays minimized.
    pub fn restore(&mut self, id: &WidgetId) -> Result<bool> {
        let index = self.index_of(id)?;
        let mut widgets = self.widgets.clone();
        if !widgets[index].restore() {
            return Ok(false);
        }
        if !is_settled(&widgets, self.grid) {
            widgets = self
                .packer()
                .auto_sort(&widgets)
                .ok_or_else(|| self.capacity_error(self.widgets.len()))?;
        }
        self.install(widgets);
        Ok(true)
    }

    pub fn toggle_minimize(&mut self, id: &WidgetId) -> Result<bool> {
        let index = self.index_of(id)?;
        if self.widgets[index].is_minimized {
            self.restore(id)
        } else {
            self.minimize(id)
        }
    }

    /// Show widget `id` over the whole dashboard. View state only: geometry
    /// and history are untouched.
    pub fn maximize(&mut self, id: &WidgetId) -> Result<()> {
        self.index_of(id)?;
        if self.config.mobile_layout {
            return Err(LayoutError::Locked);
        }
        self.controller.reset();
        self.maximized = Some(id.clone());
        Ok(())
    }

    pub fn clear_maximize(&mut self) -> Option<WidgetId> {
        self.maximized.take()
    }

    /// Switch view mode. The registry is replaced by that mode's built-in
    /// layout and history restarts. Returns `false` if the mode did not change.
    pub fn set_mobile_layout(&mut self, mobile: bool) -> bool {
        if self.config.mobile_layout == mobile {
            return false;
        }
        self.config.mobile_layout = mobile;
        let widgets = default_widgets(self.config.cell_size, self.grid, mobile);
        self.replace_registry(widgets);
        true
    }

    // ====================================================================
    // Pointer interaction
    // ====================================================================

    pub fn begin_drag(&mut self, id: &WidgetId, position: PointerPosition) -> InteractionTransition {
        self.interact(&InteractionEvent::DragStart {
            widget: id.clone(),
            position,
        })
    }

    pub fn begin_resize(
        &mut self,
        id: &WidgetId,
        handle: ResizeHandle,
        position: PointerPosition,
    ) -> InteractionTransition {
        self.interact(&InteractionEvent::ResizeStart {
            widget: id.clone(),
            handle,
            position,
        })
    }

    pub fn pointer_move(&mut self, position: PointerPosition) -> InteractionTransition {
        self.interact(&InteractionEvent::PointerMove { position })
    }

    pub fn pointer_up(&mut self, position: PointerPosition) -> InteractionTransition {
        self.interact(&InteractionEvent::PointerUp { position })
    }

    /// Feed one event to the controller and apply its effect to the registry.
    pub fn interact(&mut self, event: &InteractionEvent) -> InteractionTransition {
        let frame = InteractionFrame {
            layout: &self.widgets,
            grid: self.grid,
            cell: self.config.cell_size,
            locked: self.maximized.is_some() || self.config.mobile_layout,
        };
        let transition = self.controller.apply(event, &frame);
        match &transition.effect {
            InteractionEffect::ResizePreview { widget, rect } => {
                self.set_rect(widget, *rect);
            }
            InteractionEffect::DragCommitted { widget, rect } => {
                self.set_rect(widget, *rect);
                self.commit();
            }
            InteractionEffect::ResizeCommitted {
                widget,
                rect,
                changed,
            } => {
                self.set_rect(widget, *rect);
                if *changed {
                    self.commit();
                }
            }
            InteractionEffect::Noop { reason } => {
                gridboard_core::debug!(?reason, "pointer event ignored");
            }
            InteractionEffect::DragStarted { .. }
            | InteractionEffect::DragMoved { .. }
            | InteractionEffect::ResizeStarted { .. } => {}
        }
        transition
    }

    fn set_rect(&mut self, id: &WidgetId, rect: GridRect) {
        if let Some(widget) = self.widgets.iter_mut().find(|widget| widget.id == *id) {
            widget.set_rect(rect);
        }
    }

    // ====================================================================
    // History
    // ====================================================================

    pub fn undo(&mut self) -> bool {
        let snapshot = self.history.undo();
        self.restore_snapshot(snapshot)
    }

    pub fn redo(&mut self) -> bool {
        let snapshot = self.history.redo();
        self.restore_snapshot(snapshot)
    }

    fn restore_snapshot(&mut self, snapshot: Option<Vec<Widget>>) -> bool {
        let Some(widgets) = snapshot else {
            return false;
        };
        self.history.begin_restore();
        self.controller.reset();
        self.install(widgets);
        self.history.end_restore();
        true
    }

    // ====================================================================
    // Persistence
    // ====================================================================

    #[must_use]
    pub fn to_document(&self) -> DashboardDocument {
        DashboardDocument::new(
            self.widgets.clone(),
            self.config.cell_size,
            self.config.mobile_layout,
        )
    }

    /// Export the current layout with optional companion data.
    pub fn export_json(&self, shared: Option<Value>) -> Result<String> {
        Ok(self.to_document().with_shared(shared).to_json()?)
    }

    /// Adopt a saved document, including its density. History restarts.
    ///
    /// Duplicate ids are regenerated and spans raised to the type floors.
    /// Widgets that fall outside the grid trigger a re-pack; overlaps alone
    /// are kept, as after a drag. On error nothing changes.
    pub fn load_document(&mut self, document: DashboardDocument) -> std::result::Result<(), DocumentError> {
        document.check_compatible(self.config.mobile_layout)?;
        let cell = document.cell_size;
        let grid = GridSize::from_viewport(self.config.viewport, cell);
        let widgets = repair_widgets(document.widgets, cell, LOAD_ID_STAMP);
        let in_bounds = widgets.iter().all(|widget| grid.contains_rect(&widget.rect()));
        let widgets = if grid.is_unknown() || in_bounds {
            widgets
        } else {
            gridboard_core::debug!(cols = grid.cols, rows = grid.rows, "saved layout exceeds the grid; re-packing");
            Packer::new(grid)
                .with_buffer(self.config.placement_buffer)
                .auto_sort(&widgets)
                .ok_or(DocumentError::DoesNotFit {
                    widgets: widgets.len(),
                    cols: grid.cols,
                    rows: grid.rows,
                })?
        };
        self.config.cell_size = cell;
        self.grid = grid;
        self.replace_registry(widgets);
        Ok(())
    }

    /// Load a saved layout, substituting the built-in layout when it is unusable.
    pub fn load_json(&mut self, json: &str) -> LoadOutcome {
        let loaded = DashboardDocument::from_json(json).and_then(|document| self.load_document(document));
        match loaded {
            Ok(()) => LoadOutcome::Document,
            Err(error) => {
                gridboard_core::warn!(%error, "saved layout unusable; using defaults");
                let widgets = default_widgets(self.config.cell_size, self.grid, self.config.mobile_layout);
                self.replace_registry(widgets);
                LoadOutcome::Defaulted {
                    reason: error.to_string(),
                }
            }
        }
    }

    /// Replace the registry with an imported payload.
    ///
    /// Entries are normalized one by one. The result is accepted as-is when
    /// conflict-free, auto-sorted otherwise, and rejected if it cannot fit.
    /// Returns the companion `shared` data alongside the report.
    pub fn import_json(&mut self, json: &str, now_ms: u64) -> Result<(ImportReport, Option<Value>)> {
        self.require_grid()?;
        let imported = normalize_import(
            json,
            ImportContext {
                cell: self.config.cell_size,
                minimized_row_span: self.config.minimized_row_span,
                now_ms,
            },
        )?;
        let mut report = imported.report;
        let widgets = if is_settled(&imported.widgets, self.grid) {
            imported.widgets
        } else {
            report.sorted = true;
            self.packer()
                .auto_sort(&imported.widgets)
                .ok_or_else(|| self.capacity_error(imported.widgets.len()))?
        };
        self.controller.reset();
        self.install(widgets);
        Ok((report, imported.shared))
    }
}
