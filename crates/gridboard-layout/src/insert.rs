//! Insertion planner: adds one widget through a strategy chain.
//!
//! 1. First-fit into the existing layout, leaving every other widget in place.
//! 2. Full re-pack of existing + new.
//! 3. Shrink-to-fit: donors give up one cell on one axis, largest area first.
//!
//! The shrink step is greedy and single-step per donor: it never combines
//! shrinks across donors or takes more than one unit, so it can report
//! failure even when a combined shrink would have fit.

use gridboard_core::geometry::GridRect;
use serde::{Deserialize, Serialize};

use crate::pack::Packer;
use crate::placement::first_fit;
use crate::widget::{Widget, WidgetId};

/// Axis a donor gave up a cell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShrinkAxis {
    Columns,
    Rows,
}

/// Which strategy admitted the new widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum InsertStrategy {
    FirstFit,
    Repack,
    Shrink { donor: WidgetId, axis: ShrinkAxis },
}

/// Successful insertion result.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertPlan {
    pub layout: Vec<Widget>,
    pub strategy: InsertStrategy,
}

/// Strategy-chain planner bound to a packer (and so to a grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPlanner {
    packer: Packer,
}

impl InsertionPlanner {
    #[must_use]
    pub const fn new(packer: Packer) -> Self {
        Self { packer }
    }

    /// Plan the insertion of `incoming` into `layout`.
    ///
    /// Returns `None` when every strategy fails; `layout` is never mutated.
    #[must_use]
    pub fn insert(&self, layout: &[Widget], incoming: Widget) -> Option<InsertPlan> {
        let _span = gridboard_core::debug_span!(
            "insert_widget",
            widget = %incoming.id,
            widgets = layout.len()
        )
        .entered();

        if let Some(layout) = self.first_fit(layout, &incoming) {
            return Some(InsertPlan {
                layout,
                strategy: InsertStrategy::FirstFit,
            });
        }

        let mut combined = layout.to_vec();
        combined.push(incoming);

        if let Some(layout) = self.packer.auto_sort(&combined) {
            return Some(InsertPlan {
                layout,
                strategy: InsertStrategy::Repack,
            });
        }

        self.shrink_to_fit(combined)
    }

    fn first_fit(&self, layout: &[Widget], incoming: &Widget) -> Option<Vec<Widget>> {
        let spans = incoming.floored_spans();
        let (col, row) = first_fit(
            &incoming.id,
            spans,
            layout,
            self.packer.grid(),
            self.packer.buffer(),
        )?;
        let mut placed = incoming.clone();
        placed.set_rect(GridRect::new(col, row, spans.0, spans.1));
        let mut out = layout.to_vec();
        out.push(placed);
        Some(out)
    }

    fn shrink_to_fit(&self, mut combined: Vec<Widget>) -> Option<InsertPlan> {
        // Incoming widget is the last entry and never donates.
        let existing = combined.len().saturating_sub(1);
        let mut donors: Vec<usize> = (0..existing)
            .filter(|&index| combined[index].is_donor())
            .collect();
        // Stable sort: equal areas keep layout order.
        donors.sort_by(|&a, &b| combined[b].rect().area().cmp(&combined[a].rect().area()));

        for index in donors {
            let original = combined[index].clone();

            if original.col_span > original.col_floor() {
                combined[index].col_span -= 1;
                if let Some(layout) = self.packer.auto_sort(&combined) {
                    return Some(InsertPlan {
                        layout,
                        strategy: InsertStrategy::Shrink {
                            donor: original.id,
                            axis: ShrinkAxis::Columns,
                        },
                    });
                }
                combined[index] = original.clone();
            }

            if !original.is_minimized && original.row_span > original.row_floor() {
                combined[index].row_span -= 1;
                if let Some(layout) = self.packer.auto_sort(&combined) {
                    return Some(InsertPlan {
                        layout,
                        strategy: InsertStrategy::Shrink {
                            donor: original.id,
                            axis: ShrinkAxis::Rows,
                        },
                    });
                }
                combined[index] = original;
            }
        }

        gridboard_core::debug!("every insertion strategy failed");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::layout_conflicts;
    use crate::widget::WidgetKind;
    use gridboard_core::geometry::GridSize;

    fn widget(id: &str, rect: GridRect, floor: (u16, u16)) -> Widget {
        Widget::new(id, WidgetKind::Notes, rect, floor)
    }

    fn planner(cols: u16, rows: u16) -> InsertionPlanner {
        InsertionPlanner::new(Packer::new(GridSize::new(cols, rows)))
    }

    fn find<'a>(layout: &'a [Widget], id: &str) -> &'a Widget {
        layout
            .iter()
            .find(|w| w.id.as_str() == id)
            .expect("widget present")
    }

    #[test]
    fn first_fit_leaves_existing_widgets_alone() {
        let a = widget("a", GridRect::new(1, 1, 4, 4), (4, 4));
        let b = widget("b", GridRect::new(1, 1, 4, 4), (4, 4));
        let plan = planner(10, 10).insert(&[a.clone()], b).expect("fits");
        assert_eq!(plan.strategy, InsertStrategy::FirstFit);
        assert_eq!(plan.layout[0], a);
        assert_eq!(find(&plan.layout, "b").rect(), GridRect::new(5, 1, 4, 4));
    }

    #[test]
    fn repack_recovers_fragmented_space() {
        // Free space is split into two 3-wide gaps; re-pack merges them.
        let layout = vec![
            widget("a", GridRect::new(4, 1, 2, 2), (2, 2)),
            widget("b", GridRect::new(9, 1, 2, 2), (2, 2)),
        ];
        let c = widget("c", GridRect::new(1, 1, 6, 2), (6, 2));
        let plan = planner(10, 2).insert(&layout, c).expect("fits");
        assert_eq!(plan.strategy, InsertStrategy::Repack);
        assert!(layout_conflicts(&plan.layout, GridSize::new(10, 2)).is_empty());
    }

    #[test]
    fn settled_layout_does_not_let_repack_admit_a_widget() {
        // The existing layout is settled, so packing it alone succeeds as-is,
        // but with the incoming widget added no arrangement exists.
        let layout = vec![
            widget("a", GridRect::new(1, 1, 5, 4), (5, 4)),
            widget("b", GridRect::new(6, 1, 5, 4), (5, 4)),
        ];
        let packer = Packer::new(GridSize::new(10, 4));
        assert_eq!(packer.auto_sort(&layout).as_deref(), Some(layout.as_slice()));

        let c = widget("c", GridRect::new(1, 1, 1, 1), (1, 1));
        let mut combined = layout.clone();
        combined.push(c.clone());
        assert!(packer.auto_sort(&combined).is_none());
        assert!(InsertionPlanner::new(packer).insert(&layout, c).is_none());
    }

    #[test]
    fn fails_when_no_donor_exists() {
        let a = widget("a", GridRect::new(1, 1, 10, 10), (10, 10));
        let b = widget("b", GridRect::new(1, 1, 4, 4), (4, 4));
        assert!(planner(10, 10).insert(&[a], b).is_none());
    }

    #[test]
    fn shrink_takes_one_column_from_the_donor() {
        let layout = vec![
            widget("a", GridRect::new(1, 1, 5, 4), (4, 4)),
            widget("b", GridRect::new(6, 1, 4, 4), (4, 4)),
        ];
        let c = widget("c", GridRect::new(1, 1, 4, 4), (4, 4));
        let plan = planner(12, 4).insert(&layout, c).expect("fits after shrink");
        assert_eq!(
            plan.strategy,
            InsertStrategy::Shrink {
                donor: "a".into(),
                axis: ShrinkAxis::Columns
            }
        );
        // C enters at (1, 1), so it reads before B and packs ahead of it.
        assert_eq!(find(&plan.layout, "a").rect(), GridRect::new(1, 1, 4, 4));
        assert_eq!(find(&plan.layout, "c").rect(), GridRect::new(5, 1, 4, 4));
        assert_eq!(find(&plan.layout, "b").rect(), GridRect::new(9, 1, 4, 4));
    }

    #[test]
    fn shrink_falls_back_to_rows() {
        // A only has slack vertically.
        let layout = vec![widget("a", GridRect::new(1, 1, 4, 5), (4, 4))];
        let c = widget("c", GridRect::new(1, 1, 4, 2), (4, 2));
        let plan = planner(4, 6).insert(&layout, c).expect("fits after shrink");
        assert_eq!(
            plan.strategy,
            InsertStrategy::Shrink {
                donor: "a".into(),
                axis: ShrinkAxis::Rows
            }
        );
        assert_eq!(find(&plan.layout, "a").row_span, 4);
    }

    #[test]
    fn single_step_shrink_does_not_combine_donors() {
        // Fitting C needs one column from A *and* one from B.
        let layout = vec![
            widget("a", GridRect::new(1, 1, 5, 4), (4, 4)),
            widget("b", GridRect::new(6, 1, 5, 4), (4, 4)),
        ];
        let c = widget("c", GridRect::new(1, 1, 4, 4), (4, 4));
        assert!(planner(12, 4).insert(&layout, c).is_none());
    }

    #[test]
    fn larger_donors_are_tried_first() {
        let layout = vec![
            widget("small", GridRect::new(1, 1, 3, 2), (2, 2)),
            widget("big", GridRect::new(4, 1, 5, 2), (4, 2)),
        ];
        let c = widget("c", GridRect::new(1, 1, 2, 2), (2, 2));
        let plan = planner(9, 2).insert(&layout, c).expect("fits after shrink");
        assert_eq!(
            plan.strategy,
            InsertStrategy::Shrink {
                donor: "big".into(),
                axis: ShrinkAxis::Columns
            }
        );
    }
}
