//! Placement validation: bounds and overlap tests for one widget against a layout.

use gridboard_core::geometry::{GridRect, GridSize};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::widget::{Widget, WidgetId};

/// Why a candidate placement was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("grid dimensions are not known yet")]
    GridUnknown,
    #[error("rect {rect:?} does not fit grid {grid:?}")]
    OutOfBounds { rect: GridRect, grid: GridSize },
    #[error("rect overlaps widget {other}")]
    Overlap { other: WidgetId },
}

/// Check a rectangle for widget `id` against `layout`.
///
/// Widgets sharing `id` are skipped. Each other rectangle is grown by
/// `buffer` cells before the overlap test; the first conflict wins.
pub fn check_rect(
    id: &WidgetId,
    rect: GridRect,
    layout: &[Widget],
    grid: GridSize,
    buffer: u16,
) -> Result<(), PlacementError> {
    if grid.is_unknown() {
        return Err(PlacementError::GridUnknown);
    }
    if !grid.contains_rect(&rect) {
        return Err(PlacementError::OutOfBounds { rect, grid });
    }
    match layout
        .iter()
        .filter(|other| other.id != *id)
        .find(|other| rect.intersects(&other.rect().expanded(buffer)))
    {
        Some(other) => Err(PlacementError::Overlap {
            other: other.id.clone(),
        }),
        None => Ok(()),
    }
}

/// Check `widget` at origin `(col, row)` using its current spans.
pub fn check_placement(
    widget: &Widget,
    col: u16,
    row: u16,
    layout: &[Widget],
    grid: GridSize,
    buffer: u16,
) -> Result<(), PlacementError> {
    check_rect(&widget.id, widget.rect().at(col, row), layout, grid, buffer)
}

/// Whether `widget` fits at `(col, row)` without leaving the grid or overlapping.
#[must_use]
pub fn can_place(widget: &Widget, col: u16, row: u16, layout: &[Widget], grid: GridSize) -> bool {
    check_placement(widget, col, row, layout, grid, 0).is_ok()
}

/// Row-major scan for the first origin where a `spans`-sized rect for `id` fits.
///
/// Rows are scanned top to bottom, columns left to right, so the result has a
/// top-left bias.
#[must_use]
pub fn first_fit(
    id: &WidgetId,
    spans: (u16, u16),
    layout: &[Widget],
    grid: GridSize,
    buffer: u16,
) -> Option<(u16, u16)> {
    let (col_span, row_span) = spans;
    if grid.is_unknown() || col_span == 0 || row_span == 0 {
        return None;
    }
    let last_col = grid.cols.checked_sub(col_span)?.saturating_add(1);
    let last_row = grid.rows.checked_sub(row_span)?.saturating_add(1);
    for row in 1..=last_row {
        for col in 1..=last_col {
            let rect = GridRect::new(col, row, col_span, row_span);
            if check_rect(id, rect, layout, grid, buffer).is_ok() {
                return Some((col, row));
            }
        }
    }
    None
}

/// One violated layout invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutConflict {
    OutOfBounds { widget: WidgetId },
    BelowFloor { widget: WidgetId },
    Overlap { first: WidgetId, second: WidgetId },
    DuplicateId { widget: WidgetId },
}

/// Every invariant violation in `layout`, in deterministic order.
#[must_use]
pub fn layout_conflicts(layout: &[Widget], grid: GridSize) -> Vec<LayoutConflict> {
    let mut conflicts = Vec::new();
    let mut seen = FxHashSet::default();
    for (index, widget) in layout.iter().enumerate() {
        if !seen.insert(&widget.id) {
            conflicts.push(LayoutConflict::DuplicateId {
                widget: widget.id.clone(),
            });
        }
        if !grid.contains_rect(&widget.rect()) {
            conflicts.push(LayoutConflict::OutOfBounds {
                widget: widget.id.clone(),
            });
        }
        if !widget.meets_floor() {
            conflicts.push(LayoutConflict::BelowFloor {
                widget: widget.id.clone(),
            });
        }
        for other in &layout[index + 1..] {
            if widget.rect().intersects(&other.rect()) {
                conflicts.push(LayoutConflict::Overlap {
                    first: widget.id.clone(),
                    second: other.id.clone(),
                });
            }
        }
    }
    conflicts
}

/// Whether `layout` satisfies every committed-layout invariant on `grid`.
#[must_use]
pub fn is_settled(layout: &[Widget], grid: GridSize) -> bool {
    layout_conflicts(layout, grid).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetKind;

    fn widget(id: &str, col: u16, row: u16, cols: u16, rows: u16) -> Widget {
        Widget::new(id, WidgetKind::Notes, GridRect::new(col, row, cols, rows), (1, 1))
    }

    #[test]
    fn unknown_grid_rejects_everything() {
        let a = widget("a", 1, 1, 2, 2);
        assert!(!can_place(&a, 1, 1, &[], GridSize::new(0, 10)));
        assert_eq!(
            check_placement(&a, 1, 1, &[], GridSize::default(), 0),
            Err(PlacementError::GridUnknown)
        );
    }

    #[test]
    fn bounds_are_inclusive() {
        let a = widget("a", 1, 1, 4, 4);
        let grid = GridSize::new(10, 10);
        assert!(can_place(&a, 7, 7, &[], grid));
        assert!(!can_place(&a, 8, 7, &[], grid));
        assert!(!can_place(&a, 0, 1, &[], grid));
    }

    #[test]
    fn same_id_is_ignored_for_overlap() {
        let a = widget("a", 1, 1, 4, 4);
        let grid = GridSize::new(10, 10);
        assert!(can_place(&a, 2, 2, std::slice::from_ref(&a), grid));
    }

    #[test]
    fn overlap_reports_first_conflict() {
        let grid = GridSize::new(10, 10);
        let layout = vec![widget("a", 1, 1, 4, 4), widget("b", 5, 1, 4, 4)];
        let candidate = widget("c", 1, 1, 6, 2);
        assert_eq!(
            check_placement(&candidate, 1, 1, &layout, grid, 0),
            Err(PlacementError::Overlap { other: "a".into() })
        );
        assert!(can_place(&candidate, 1, 5, &layout, grid));
    }

    #[test]
    fn buffer_expands_the_other_rect() {
        let grid = GridSize::new(10, 10);
        let layout = vec![widget("a", 1, 1, 4, 4)];
        let candidate = widget("b", 1, 1, 2, 2);
        assert!(check_placement(&candidate, 5, 1, &layout, grid, 0).is_ok());
        assert!(check_placement(&candidate, 5, 1, &layout, grid, 1).is_err());
        assert!(check_placement(&candidate, 6, 1, &layout, grid, 1).is_ok());
    }

    #[test]
    fn first_fit_scans_row_major() {
        let grid = GridSize::new(10, 10);
        let layout = vec![widget("a", 1, 1, 4, 4)];
        assert_eq!(first_fit(&"b".into(), (4, 4), &layout, grid, 0), Some((5, 1)));
        assert_eq!(first_fit(&"b".into(), (7, 2), &layout, grid, 0), Some((1, 5)));
        assert_eq!(first_fit(&"b".into(), (11, 1), &layout, grid, 0), None);
    }

    #[test]
    fn conflicts_list_every_violation() {
        let grid = GridSize::new(10, 10);
        let mut low = widget("c", 1, 8, 2, 4);
        low.min_col_span = 3;
        let layout = vec![widget("a", 1, 1, 4, 4), widget("b", 3, 3, 2, 2), low];
        let conflicts = layout_conflicts(&layout, grid);
        assert_eq!(
            conflicts,
            vec![
                LayoutConflict::Overlap {
                    first: "a".into(),
                    second: "b".into()
                },
                LayoutConflict::OutOfBounds { widget: "c".into() },
                LayoutConflict::BelowFloor { widget: "c".into() },
            ]
        );
        assert!(!is_settled(&layout, grid));
    }
}
