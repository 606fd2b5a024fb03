//! Auto-sort: deterministic first-fit re-flow of a whole layout.
//!
//! Widgets are visited in reading order `(row, col, id)` and each one takes the
//! first row-major origin that does not collide with widgets already placed.
//! Spans are clamped up to each widget's floor first, so packing never shrinks.
//!
//! A single greedy pass is not always a fixpoint: once widgets have moved,
//! their new reading order can differ from the order they were placed in. The
//! packer re-runs the pass on its own output until it stops changing, which
//! makes `auto_sort(auto_sort(L)) == auto_sort(L)`.

use std::cmp::Ordering;

use gridboard_core::geometry::{GridRect, GridSize};

use crate::placement::{first_fit, is_settled};
use crate::widget::Widget;

/// Upper bound on settle passes after the first successful pass.
pub const MAX_SETTLE_PASSES: usize = 16;

/// Reading order: `rowStart`, then `colStart`, then `id`.
#[must_use]
pub fn reading_order(a: &Widget, b: &Widget) -> Ordering {
    (a.row_start, a.col_start, &a.id).cmp(&(b.row_start, b.col_start, &b.id))
}

/// First-fit packer bound to a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packer {
    grid: GridSize,
    buffer: u16,
}

impl Packer {
    /// Packer for explicit grid dimensions.
    #[must_use]
    pub const fn new(grid: GridSize) -> Self {
        Self { grid, buffer: 0 }
    }

    /// Keep `buffer` empty cells around already-placed widgets.
    #[must_use]
    pub const fn with_buffer(mut self, buffer: u16) -> Self {
        self.buffer = buffer;
        self
    }

    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    #[must_use]
    pub const fn buffer(&self) -> u16 {
        self.buffer
    }

    /// Re-flow every widget. Returns `None` if some widget has no valid origin.
    ///
    /// If the greedy pass cannot place everything but `layout` already
    /// satisfies every placement invariant, it is returned unchanged in
    /// reading order.
    #[must_use]
    pub fn auto_sort(&self, layout: &[Widget]) -> Option<Vec<Widget>> {
        let _span = gridboard_core::debug_span!(
            "auto_sort",
            widgets = layout.len(),
            cols = self.grid.cols,
            rows = self.grid.rows
        )
        .entered();

        let Some(mut current) = self.pass(layout) else {
            if !layout.is_empty() && is_settled(layout, self.grid) {
                gridboard_core::debug!("greedy pass failed; keeping already-settled layout");
                let mut settled = layout.to_vec();
                settled.sort_by(reading_order);
                return Some(settled);
            }
            gridboard_core::debug!(widgets = layout.len(), "auto-sort found no fit");
            return None;
        };

        for _ in 0..MAX_SETTLE_PASSES {
            match self.pass(&current) {
                Some(next) if next != current => current = next,
                _ => break,
            }
        }
        Some(current)
    }

    fn pass(&self, layout: &[Widget]) -> Option<Vec<Widget>> {
        let mut order: Vec<&Widget> = layout.iter().collect();
        order.sort_by(|a, b| reading_order(a, b));

        let mut placed: Vec<Widget> = Vec::with_capacity(order.len());
        for widget in order {
            let spans = widget.floored_spans();
            let (col, row) = first_fit(&widget.id, spans, &placed, self.grid, self.buffer)?;
            let mut widget = widget.clone();
            widget.set_rect(GridRect::new(col, row, spans.0, spans.1));
            placed.push(widget);
        }
        placed.sort_by(reading_order);
        Some(placed)
    }
}

/// Re-flow `layout` on an explicit grid with no buffer.
#[must_use]
pub fn auto_sort(layout: &[Widget], grid: GridSize) -> Option<Vec<Widget>> {
    Packer::new(grid).auto_sort(layout)
}
