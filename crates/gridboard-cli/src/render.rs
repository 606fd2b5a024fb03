//! Plain-text rendering of a layout: a cell map plus a legend.

use std::fmt::Write as _;

use gridboard_core::geometry::GridSize;
use gridboard_layout::{InsertStrategy, LayoutConflict, ShrinkAxis, Widget};

const EMPTY: char = '.';
const OVERLAP: char = '*';
const GLYPHS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Glyph used for the widget at `index` in registry order.
#[must_use]
pub fn glyph(index: usize) -> char {
    GLYPHS.chars().nth(index).unwrap_or('#')
}

/// One character per cell. Cells outside the grid are clipped; cells claimed
/// by more than one widget show `*`.
#[must_use]
pub fn render_map(widgets: &[Widget], grid: GridSize) -> String {
    let cols = usize::from(grid.cols);
    let rows = usize::from(grid.rows);
    let mut cells = vec![EMPTY; cols * rows];

    for (index, widget) in widgets.iter().enumerate() {
        let rect = widget.rect();
        let col_end = (rect.col_end() as usize).min(cols);
        let row_end = (rect.row_end() as usize).min(rows);
        for row in usize::from(rect.row).max(1)..=row_end {
            for col in usize::from(rect.col).max(1)..=col_end {
                let cell = &mut cells[(row - 1) * cols + (col - 1)];
                *cell = if *cell == EMPTY { glyph(index) } else { OVERLAP };
            }
        }
    }

    let mut out = String::with_capacity((cols + 1) * rows);
    for row in cells.chunks(cols.max(1)).take(rows) {
        out.extend(row);
        out.push('\n');
    }
    out
}

/// One line per widget: glyph, id, type, origin, spans, and flags.
#[must_use]
pub fn render_legend(widgets: &[Widget], maximized: Option<&str>) -> String {
    let mut out = String::new();
    for (index, widget) in widgets.iter().enumerate() {
        let _ = write!(
            out,
            "{} {:<24} {:<10} at ({},{}) span {}x{} min {}x{}",
            glyph(index),
            widget.id.as_str(),
            widget.kind.as_str(),
            widget.col_start,
            widget.row_start,
            widget.col_span,
            widget.row_span,
            widget.min_col_span,
            widget.min_row_span,
        );
        if widget.is_minimized {
            out.push_str(" [minimized]");
        }
        if maximized == Some(widget.id.as_str()) {
            out.push_str(" [maximized]");
        }
        out.push('\n');
    }
    out
}

#[must_use]
pub fn describe_conflict(conflict: &LayoutConflict) -> String {
    match conflict {
        LayoutConflict::OutOfBounds { widget } => format!("{widget} extends past the grid"),
        LayoutConflict::BelowFloor { widget } => format!("{widget} is smaller than its minimum"),
        LayoutConflict::Overlap { first, second } => format!("{first} overlaps {second}"),
        LayoutConflict::DuplicateId { widget } => format!("{widget} appears more than once"),
    }
}

#[must_use]
pub fn describe_strategy(strategy: &InsertStrategy) -> String {
    match strategy {
        InsertStrategy::FirstFit => "placed in free space".to_string(),
        InsertStrategy::Repack => "placed after re-packing the layout".to_string(),
        InsertStrategy::Shrink { donor, axis } => {
            let unit = match axis {
                ShrinkAxis::Columns => "column",
                ShrinkAxis::Rows => "row",
            };
            format!("placed after shrinking {donor} by one {unit}")
        }
    }
}

#[cfg(test)]
mod tests {
    use gridboard_core::geometry::{GridRect, GridSize};
    use gridboard_layout::{Widget, WidgetId, WidgetKind};

    use super::*;

    fn widget(id: &str, rect: GridRect) -> Widget {
        Widget::new(id, WidgetKind::Notes, rect, (1, 1))
    }

    #[test]
    fn map_marks_each_widget_and_empty_cells() {
        let widgets = vec![
            widget("a", GridRect::new(1, 1, 2, 2)),
            widget("b", GridRect::new(4, 2, 1, 1)),
        ];
        let map = render_map(&widgets, GridSize::new(4, 3));
        assert_eq!(map, "AA..\nAA.B\n....\n");
    }

    #[test]
    fn overlapping_cells_are_starred_and_overflow_is_clipped() {
        let widgets = vec![
            widget("a", GridRect::new(1, 1, 2, 1)),
            widget("b", GridRect::new(2, 1, 4, 1)),
        ];
        let map = render_map(&widgets, GridSize::new(3, 1));
        assert_eq!(map, "A*B\n");
    }

    #[test]
    fn legend_flags_view_state() {
        let mut minimized = widget("a", GridRect::new(1, 1, 2, 3));
        minimized.minimize(1);
        let legend = render_legend(&[minimized, widget("b", GridRect::new(3, 1, 1, 1))], Some("b"));
        let lines: Vec<&str> = legend.lines().collect();
        assert!(lines[0].starts_with("A a "));
        assert!(lines[0].ends_with("[minimized]"));
        assert!(lines[1].ends_with("[maximized]"));
    }

    #[test]
    fn conflicts_read_as_sentences() {
        let text = describe_conflict(&LayoutConflict::Overlap {
            first: WidgetId::new("a"),
            second: WidgetId::new("b"),
        });
        assert_eq!(text, "a overlaps b");

        let shrink = describe_strategy(&InsertStrategy::Shrink {
            donor: WidgetId::new("notes-default"),
            axis: ShrinkAxis::Rows,
        });
        assert_eq!(shrink, "placed after shrinking notes-default by one row");
    }
}
