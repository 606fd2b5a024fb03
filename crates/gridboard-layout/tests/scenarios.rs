//! End-to-end layout scenarios through the public API.

use gridboard_core::event::PointerPosition;
use gridboard_core::geometry::{CellSize, GridRect, GridSize};
use gridboard_layout::{
    EngineConfig, InsertStrategy, InsertionPlanner, LayoutEngine, LayoutHistory, Packer,
    ShrinkAxis, Widget, WidgetId, WidgetKind, layout_conflicts, rescale,
};

fn widget(id: &str, rect: GridRect, floor: (u16, u16)) -> Widget {
    Widget::new(id, WidgetKind::Notes, rect, floor)
}

fn find<'a>(layout: &'a [Widget], id: &str) -> &'a Widget {
    layout
        .iter()
        .find(|w| w.id.as_str() == id)
        .expect("widget present")
}

#[test]
fn first_fit_places_beside_existing_widget() {
    let planner = InsertionPlanner::new(Packer::new(GridSize::new(10, 10)));
    let layout = vec![widget("a", GridRect::new(1, 1, 4, 4), (4, 4))];
    let plan = planner
        .insert(&layout, widget("b", GridRect::new(1, 1, 4, 4), (4, 4)))
        .expect("fits");
    assert_eq!(plan.strategy, InsertStrategy::FirstFit);
    assert_eq!(find(&plan.layout, "b").rect(), GridRect::new(5, 1, 4, 4));
}

#[test]
fn full_grid_at_floor_rejects_insertion() {
    let planner = InsertionPlanner::new(Packer::new(GridSize::new(10, 10)));
    let layout = vec![widget("a", GridRect::new(1, 1, 10, 10), (10, 10))];
    assert!(planner
        .insert(&layout, widget("b", GridRect::new(1, 1, 4, 4), (4, 4)))
        .is_none());
}

#[test]
fn donor_gives_up_one_column() {
    let grid = GridSize::new(12, 4);
    let planner = InsertionPlanner::new(Packer::new(grid));
    let layout = vec![
        widget("a", GridRect::new(1, 1, 5, 4), (4, 4)),
        widget("b", GridRect::new(6, 1, 4, 4), (4, 4)),
    ];
    let plan = planner
        .insert(&layout, widget("c", GridRect::new(1, 1, 4, 4), (4, 4)))
        .expect("fits after shrink");
    assert_eq!(
        plan.strategy,
        InsertStrategy::Shrink {
            donor: WidgetId::new("a"),
            axis: ShrinkAxis::Columns
        }
    );
    assert_eq!(find(&plan.layout, "a").col_span, 4);
    assert!(layout_conflicts(&plan.layout, grid).is_empty());
}

#[test]
fn rescale_converts_geometry_before_packing() {
    let cell = |px| CellSize::new(px).expect("non-zero");
    let layout = vec![widget("a", GridRect::new(3, 2, 4, 3), (1, 1))];
    // A grid too small for the rescaled widget keeps the unpacked geometry.
    let outcome = rescale(&layout, cell(30), cell(20), GridSize::new(5, 4));
    assert!(outcome.warning.is_some());
    assert_eq!(outcome.layout[0].rect(), GridRect::new(4, 3, 6, 5));
}

#[test]
fn dropped_widget_may_overlap_until_sorted() {
    let mut engine = LayoutEngine::new(EngineConfig::new().viewport(300.0, 300.0)).with_widgets(vec![
        widget("a", GridRect::new(1, 1, 3, 3), (2, 2)),
        widget("b", GridRect::new(5, 1, 3, 3), (2, 2)),
    ]);
    engine.begin_drag(&WidgetId::new("b"), PointerPosition::new(200, 50));
    engine.pointer_up(PointerPosition::new(140, 50));
    assert_eq!(
        engine.widget(&WidgetId::new("b")).map(Widget::rect),
        Some(GridRect::new(3, 1, 3, 3))
    );
    assert_eq!(engine.conflicts().len(), 1);

    engine.auto_sort().expect("fits");
    assert!(engine.conflicts().is_empty());
    assert!(engine.undo());
    assert_eq!(engine.conflicts().len(), 1);
}

#[test]
fn history_keeps_the_most_recent_fifty() {
    let mut history = LayoutHistory::default();
    for n in 0..75u16 {
        history.push(&vec![widget("a", GridRect::new(1, 1, n + 1, 1), (1, 1))]);
    }
    assert_eq!(history.len(), 50);
    let oldest = history.oldest().expect("non-empty");
    // Push #26 (1-based) is the oldest survivor.
    assert_eq!(oldest[0].col_span, 26);
}
