//! Drag/resize interaction state machine.
//!
//! ```text
//! Idle --drag_start--> Dragging --pointer_up--> Idle
//! Idle --resize_start--> Resizing --pointer_up--> Idle
//! ```
//!
//! The controller never touches the registry. Each step returns a
//! [`InteractionTransition`] whose effect tells the owner what to apply:
//! previews are written to the registry without history, commits push one
//! history entry. Dropping a dragged widget is deliberately unchecked for
//! overlap; only an explicit auto-sort resolves the collision.

use gridboard_core::event::{PointerPosition, ResizeEdges, ResizeHandle};
use gridboard_core::geometry::{CellSize, GridRect, GridSize};
use serde::{Deserialize, Serialize};

use crate::widget::{Widget, WidgetId};

/// Controller lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InteractionState {
    #[default]
    Idle,
    Dragging {
        widget: WidgetId,
        origin: PointerPosition,
        current: PointerPosition,
        start: GridRect,
    },
    Resizing {
        widget: WidgetId,
        handle: ResizeHandle,
        origin: PointerPosition,
        start: GridRect,
        floor: (u16, u16),
        minimized: bool,
    },
}

/// Input accepted by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InteractionEvent {
    DragStart {
        widget: WidgetId,
        position: PointerPosition,
    },
    ResizeStart {
        widget: WidgetId,
        handle: ResizeHandle,
        position: PointerPosition,
    },
    PointerMove {
        position: PointerPosition,
    },
    PointerUp {
        position: PointerPosition,
    },
}

/// Why an event was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionNoopReason {
    IdleWithoutGesture,
    GestureInProgress,
    InteractionLocked,
    UnknownWidget,
}

/// What the owner must do in response to one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum InteractionEffect {
    DragStarted {
        widget: WidgetId,
    },
    /// Visual pixel offset only; no snapping and no collision check.
    DragMoved {
        widget: WidgetId,
        offset_x: i32,
        offset_y: i32,
    },
    /// Write `rect` to the widget unconditionally and push history.
    DragCommitted {
        widget: WidgetId,
        rect: GridRect,
    },
    ResizeStarted {
        widget: WidgetId,
        handle: ResizeHandle,
    },
    /// Write `rect` to the widget without touching history.
    ResizePreview {
        widget: WidgetId,
        rect: GridRect,
    },
    /// Write `rect`; push history only when `changed`.
    ResizeCommitted {
        widget: WidgetId,
        rect: GridRect,
        changed: bool,
    },
    Noop {
        reason: InteractionNoopReason,
    },
}

/// One controller step with its before/after state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionTransition {
    pub transition_id: u64,
    pub from: InteractionState,
    pub to: InteractionState,
    pub effect: InteractionEffect,
}

/// Read-only view of the surroundings a step is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct InteractionFrame<'a> {
    pub layout: &'a [Widget],
    pub grid: GridSize,
    pub cell: CellSize,
    /// Set while a widget is maximized or the mobile layout is active.
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionController {
    state: InteractionState,
    transition_counter: u64,
}

impl InteractionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self.state, InteractionState::Idle)
    }

    /// Widget under an active gesture, if any.
    #[must_use]
    pub fn active_widget(&self) -> Option<&WidgetId> {
        match &self.state {
            InteractionState::Idle => None,
            InteractionState::Dragging { widget, .. } | InteractionState::Resizing { widget, .. } => {
                Some(widget)
            }
        }
    }

    /// Drop any gesture in progress without emitting a transition.
    ///
    /// Used when the registry is replaced wholesale under an active gesture.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Apply one event and report the resulting transition.
    pub fn apply(&mut self, event: &InteractionEvent, frame: &InteractionFrame<'_>) -> InteractionTransition {
        let from = self.state.clone();
        let effect = match (&self.state, event) {
            (InteractionState::Idle, InteractionEvent::DragStart { widget, position }) => {
                match Self::admit(widget, frame) {
                    Ok(target) => {
                        self.state = InteractionState::Dragging {
                            widget: target.id.clone(),
                            origin: *position,
                            current: *position,
                            start: target.rect(),
                        };
                        InteractionEffect::DragStarted {
                            widget: target.id.clone(),
                        }
                    }
                    Err(reason) => InteractionEffect::Noop { reason },
                }
            }
            (
                InteractionState::Idle,
                InteractionEvent::ResizeStart {
                    widget,
                    handle,
                    position,
                },
            ) => match Self::admit(widget, frame) {
                Ok(target) => {
                    self.state = InteractionState::Resizing {
                        widget: target.id.clone(),
                        handle: *handle,
                        origin: *position,
                        start: target.rect(),
                        floor: (target.col_floor(), target.row_floor()),
                        minimized: target.is_minimized,
                    };
                    InteractionEffect::ResizeStarted {
                        widget: target.id.clone(),
                        handle: *handle,
                    }
                }
                Err(reason) => InteractionEffect::Noop { reason },
            },
            (InteractionState::Idle, _) => InteractionEffect::Noop {
                reason: InteractionNoopReason::IdleWithoutGesture,
            },
            (
                InteractionState::Dragging { .. } | InteractionState::Resizing { .. },
                InteractionEvent::DragStart { .. } | InteractionEvent::ResizeStart { .. },
            ) => InteractionEffect::Noop {
                reason: InteractionNoopReason::GestureInProgress,
            },
            (
                InteractionState::Dragging {
                    widget,
                    origin,
                    start,
                    ..
                },
                InteractionEvent::PointerMove { position },
            ) => {
                let delta = position.delta_from(*origin);
                let effect = InteractionEffect::DragMoved {
                    widget: widget.clone(),
                    offset_x: delta.dx,
                    offset_y: delta.dy,
                };
                self.state = InteractionState::Dragging {
                    widget: widget.clone(),
                    origin: *origin,
                    current: *position,
                    start: *start,
                };
                effect
            }
            (
                InteractionState::Dragging {
                    widget,
                    origin,
                    start,
                    ..
                },
                InteractionEvent::PointerUp { position },
            ) => {
                let rect = dropped_rect(*start, *origin, *position, frame);
                let effect = InteractionEffect::DragCommitted {
                    widget: widget.clone(),
                    rect,
                };
                self.state = InteractionState::Idle;
                effect
            }
            (
                InteractionState::Resizing {
                    widget,
                    handle,
                    origin,
                    start,
                    floor,
                    minimized,
                },
                InteractionEvent::PointerMove { position },
            ) => InteractionEffect::ResizePreview {
                widget: widget.clone(),
                rect: resized_rect(
                    *start,
                    effective_edges(*handle, *minimized),
                    *floor,
                    *origin,
                    *position,
                    frame,
                ),
            },
            (
                InteractionState::Resizing {
                    widget,
                    handle,
                    origin,
                    start,
                    floor,
                    minimized,
                },
                InteractionEvent::PointerUp { position },
            ) => {
                let rect = resized_rect(
                    *start,
                    effective_edges(*handle, *minimized),
                    *floor,
                    *origin,
                    *position,
                    frame,
                );
                let effect = InteractionEffect::ResizeCommitted {
                    widget: widget.clone(),
                    rect,
                    changed: rect != *start,
                };
                self.state = InteractionState::Idle;
                effect
            }
        };

        self.transition_counter = self.transition_counter.saturating_add(1);
        let transition = InteractionTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state.clone(),
            effect,
        };
        gridboard_core::trace!(
            transition_id = transition.transition_id,
            effect = ?transition.effect,
            "interaction step"
        );
        transition
    }

    fn admit<'a>(widget: &WidgetId, frame: &InteractionFrame<'a>) -> Result<&'a Widget, InteractionNoopReason> {
        if frame.locked {
            return Err(InteractionNoopReason::InteractionLocked);
        }
        frame
            .layout
            .iter()
            .find(|candidate| candidate.id == *widget)
            .ok_or(InteractionNoopReason::UnknownWidget)
    }
}

/// Vertical edges are dropped for minimized widgets: their row span is fixed.
fn effective_edges(handle: ResizeHandle, minimized: bool) -> ResizeEdges {
    let edges = handle.edges();
    if minimized {
        edges.difference(ResizeEdges::TOP | ResizeEdges::BOTTOM)
    } else {
        edges
    }
}

/// Valid origin range for `span` cells on an axis of `total` cells.
fn clamp_start(start: i32, span: u16, total: u16) -> u16 {
    let last = (i32::from(total) - i32::from(span) + 1).max(1);
    start.clamp(1, last) as u16
}

fn dropped_rect(
    start: GridRect,
    origin: PointerPosition,
    release: PointerPosition,
    frame: &InteractionFrame<'_>,
) -> GridRect {
    let (dc, dr) = release.delta_from(origin).to_cells(frame.cell);
    let col = clamp_start(i32::from(start.col) + dc, start.col_span, frame.grid.cols);
    let row = clamp_start(i32::from(start.row) + dr, start.row_span, frame.grid.rows);
    start.at(col, row)
}

/// One axis of a resize: returns `(start, span)`.
///
/// Moving the far edge changes only the span. Moving the near edge keeps the
/// far edge anchored, so a shrink below the floor stops at the floor.
fn resize_axis(
    start: u16,
    span: u16,
    floor: u16,
    total: u16,
    delta: i32,
    near: bool,
    far: bool,
) -> (u16, u16) {
    let start = i32::from(start);
    let span = i32::from(span);
    let floor = i32::from(floor.max(1));
    let total = i32::from(total);
    let end = start + span - 1;

    if far {
        let limit = (total - start + 1).max(1);
        let span = (span + delta).min(limit).max(floor);
        (start as u16, span as u16)
    } else if near {
        let new_start = (start + delta).max(1).min(end - floor + 1).max(1);
        (new_start as u16, (end - new_start + 1) as u16)
    } else {
        (start as u16, span as u16)
    }
}

fn resized_rect(
    start: GridRect,
    edges: ResizeEdges,
    floor: (u16, u16),
    origin: PointerPosition,
    current: PointerPosition,
    frame: &InteractionFrame<'_>,
) -> GridRect {
    let (dc, dr) = current.delta_from(origin).to_cells(frame.cell);
    let (col, col_span) = resize_axis(
        start.col,
        start.col_span,
        floor.0,
        frame.grid.cols,
        dc,
        edges.contains(ResizeEdges::LEFT),
        edges.contains(ResizeEdges::RIGHT),
    );
    let (row, row_span) = resize_axis(
        start.row,
        start.row_span,
        floor.1,
        frame.grid.rows,
        dr,
        edges.contains(ResizeEdges::TOP),
        edges.contains(ResizeEdges::BOTTOM),
    );
    GridRect::new(col, row, col_span, row_span)
}
