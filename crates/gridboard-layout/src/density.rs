//! Density rescaling: convert every widget to a new cell size, then re-pack.

use gridboard_core::geometry::{CellSize, GridRect, GridSize, PixelRect};
use serde::{Deserialize, Serialize};

use crate::pack::Packer;
use crate::widget::Widget;

/// Non-fatal degradation reported by a rescale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RescaleWarning {
    /// The rescaled layout did not pack into the new grid and was kept unpacked.
    #[error("rescaled layout of {widgets} widgets does not pack into {cols}x{rows}")]
    PackingFailed { widgets: usize, cols: u16, rows: u16 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RescaleOutcome {
    pub layout: Vec<Widget>,
    pub warning: Option<RescaleWarning>,
}

/// Cell-size conversion bound to the destination grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rescaler {
    from: CellSize,
    to: CellSize,
    grid: GridSize,
    fill_lone_widget: bool,
}

impl Rescaler {
    /// `grid` is the grid at the new density.
    #[must_use]
    pub const fn new(from: CellSize, to: CellSize, grid: GridSize) -> Self {
        Self {
            from,
            to,
            grid,
            fill_lone_widget: false,
        }
    }

    /// Stretch a single-widget layout to cover the whole new grid.
    #[must_use]
    pub const fn fill_lone_widget(mut self, fill: bool) -> Self {
        self.fill_lone_widget = fill;
        self
    }

    /// Round-trip through pixels so the division by the new cell size is exact.
    fn convert(&self, rect: GridRect) -> GridRect {
        GridRect::from_pixels(PixelRect::from_grid(rect, self.from), self.to)
    }

    /// Convert one widget's geometry without packing.
    #[must_use]
    pub fn rescale_widget(&self, widget: &Widget) -> Widget {
        let mut out = widget.clone();
        let rect = self.convert(widget.rect());
        out.col_start = rect.col;
        out.row_start = rect.row;
        out.col_span = rect.col_span.max(widget.col_floor());
        if widget.is_minimized {
            out.original_row_span = widget.original_row_span.map(|span| {
                let saved = GridRect::new(widget.col_start, widget.row_start, widget.col_span, span);
                self.convert(saved).row_span.max(widget.min_row_span.max(1))
            });
        } else {
            out.row_span = rect.row_span.max(widget.row_floor());
        }
        out
    }

    /// Rescale and re-pack `layout`. Never fails: an unpackable result is
    /// returned as rescaled, with a warning.
    #[must_use]
    pub fn rescale(&self, layout: &[Widget]) -> RescaleOutcome {
        let _span = gridboard_core::debug_span!(
            "rescale",
            from = self.from.px(),
            to = self.to.px(),
            widgets = layout.len()
        )
        .entered();

        let mut rescaled: Vec<Widget> = layout.iter().map(|w| self.rescale_widget(w)).collect();

        if self.fill_lone_widget
            && !self.grid.is_unknown()
            && let [lone] = rescaled.as_mut_slice()
            && !lone.is_minimized
        {
            lone.fill_grid(self.grid);
        }

        match Packer::new(self.grid).auto_sort(&rescaled) {
            Some(packed) => RescaleOutcome {
                layout: packed,
                warning: None,
            },
            None => {
                let warning = RescaleWarning::PackingFailed {
                    widgets: rescaled.len(),
                    cols: self.grid.cols,
                    rows: self.grid.rows,
                };
                gridboard_core::warn!(%warning, "keeping rescaled layout unpacked");
                RescaleOutcome {
                    layout: rescaled,
                    warning: Some(warning),
                }
            }
        }
    }
}

/// Rescale `layout` from `from` to `to` pixels per cell and pack into `grid`.
#[must_use]
pub fn rescale(layout: &[Widget], from: CellSize, to: CellSize, grid: GridSize) -> RescaleOutcome {
    Rescaler::new(from, to, grid).rescale(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{MINIMIZED_ROW_SPAN, WidgetKind};

    fn cell(px: u16) -> CellSize {
        CellSize::new(px).expect("non-zero")
    }

    fn widget(id: &str, rect: GridRect) -> Widget {
        Widget::new(id, WidgetKind::Notes, rect, (1, 1))
    }

    #[test]
    fn geometry_scales_by_density_ratio() {
        let rescaler = Rescaler::new(cell(30), cell(20), GridSize::new(72, 45));
        let out = rescaler.rescale_widget(&widget("a", GridRect::new(3, 2, 4, 3)));
        assert_eq!(out.rect(), GridRect::new(4, 3, 6, 5));
    }

    #[test]
    fn half_cell_ties_round_up() {
        // 11 * 15 = 165 px, 165 / 22 = 7.5
        let out = Rescaler::new(cell(15), cell(22), GridSize::new(100, 100))
            .rescale_widget(&widget("a", GridRect::new(1, 1, 11, 11)));
        assert_eq!((out.col_span, out.row_span), (8, 8));

        // 45 * 21 = 945 px, 945 / 30 = 31.5
        let out = Rescaler::new(cell(21), cell(30), GridSize::new(100, 100))
            .rescale_widget(&widget("b", GridRect::new(1, 1, 45, 45)));
        assert_eq!(out.col_span, 32);

        // 45 * 23 = 1035 px, 1035 / 18 = 57.5; start 12 sits at 11 * 23 = 253 px
        let out = Rescaler::new(cell(23), cell(18), GridSize::new(100, 100))
            .rescale_widget(&widget("c", GridRect::new(12, 1, 45, 2)));
        assert_eq!(out.col_span, 58);
        assert_eq!(out.col_start, 15);
    }

    #[test]
    fn spans_never_drop_below_floor() {
        let mut w = widget("a", GridRect::new(1, 1, 8, 6));
        w.min_col_span = 8;
        w.min_row_span = 6;
        let out = Rescaler::new(cell(20), cell(40), GridSize::new(36, 22)).rescale_widget(&w);
        assert_eq!((out.col_span, out.row_span), (8, 6));
    }

    #[test]
    fn minimized_widgets_rescale_their_saved_span() {
        let mut w = widget("a", GridRect::new(1, 1, 4, 6));
        w.minimize(MINIMIZED_ROW_SPAN);
        let out = Rescaler::new(cell(30), cell(15), GridSize::new(96, 60)).rescale_widget(&w);
        assert_eq!(out.row_span, MINIMIZED_ROW_SPAN);
        assert_eq!(out.original_row_span, Some(12));
        assert_eq!(out.col_span, 8);
    }

    #[test]
    fn result_is_packed_into_new_grid() {
        let layout = vec![
            widget("a", GridRect::new(1, 1, 4, 4)),
            widget("b", GridRect::new(5, 1, 4, 4)),
        ];
        let outcome = rescale(&layout, cell(30), cell(20), GridSize::new(12, 6));
        assert_eq!(outcome.warning, None);
        let origins: Vec<_> = outcome.layout.iter().map(|w| (w.col_start, w.row_start)).collect();
        assert_eq!(origins, vec![(1, 1), (7, 1)]);
    }

    #[test]
    fn unpackable_result_is_kept_with_warning() {
        let layout = vec![
            widget("a", GridRect::new(1, 1, 4, 4)),
            widget("b", GridRect::new(5, 1, 4, 4)),
        ];
        let outcome = rescale(&layout, cell(30), cell(10), GridSize::new(12, 12));
        assert_eq!(
            outcome.warning,
            Some(RescaleWarning::PackingFailed {
                widgets: 2,
                cols: 12,
                rows: 12
            })
        );
        assert_eq!(outcome.layout[1].rect(), GridRect::new(13, 1, 12, 12));
    }

    #[test]
    fn lone_widget_fills_the_new_grid() {
        let layout = vec![widget("only", GridRect::new(1, 1, 48, 30))];
        let grid = GridSize::new(36, 22);
        let outcome = Rescaler::new(cell(30), cell(40), grid)
            .fill_lone_widget(true)
            .rescale(&layout);
        assert_eq!(outcome.layout[0].rect(), grid.full_rect());
    }
}
