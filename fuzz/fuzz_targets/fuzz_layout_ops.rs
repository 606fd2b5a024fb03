#![no_main]

use arbitrary::Arbitrary;
use gridboard_core::event::{PointerPosition, ResizeHandle};
use gridboard_core::geometry::CellSize;
use gridboard_layout::{
    EngineConfig, InteractionState, LayoutEngine, SizePreset, WidgetKind, auto_sort,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Session {
    width: u16,
    height: u16,
    cell: u8,
    mobile: bool,
    ops: Vec<Op>,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Add { kind: u8, preset: u8 },
    Remove { pick: u8 },
    Preset { pick: u8, preset: u8 },
    AutoSort,
    ToggleMinimize { pick: u8 },
    Maximize { pick: u8 },
    Drag { pick: u8, dx: i16, dy: i16 },
    Resize { pick: u8, handle: u8, dx: i16, dy: i16 },
    CellSize { px: u8 },
    Viewport { width: u16, height: u16 },
    Undo,
    Redo,
}

fuzz_target!(|session: Session| {
    let config = EngineConfig::new()
        .cell_size(CellSize::new(u16::from(session.cell % 60) + 5).unwrap_or(CellSize::MIN))
        .viewport(
            f64::from(session.width % 4000),
            f64::from(session.height % 3000),
        )
        .mobile_layout(session.mobile)
        .history_capacity(16);
    let mut engine = LayoutEngine::with_default_layout(config);

    for (step, op) in session.ops.iter().take(256).enumerate() {
        let ids: Vec<_> = engine.widgets().iter().map(|w| w.id.clone()).collect();
        let pick = |index: u8| ids.get(usize::from(index) % ids.len().max(1)).cloned();
        match *op {
            Op::Add { kind, preset } => {
                let kind = WidgetKind::ALL[usize::from(kind) % WidgetKind::ALL.len()];
                let preset = SizePreset::ALL[usize::from(preset) % SizePreset::ALL.len()];
                let _ = engine.add_widget_with_preset(kind, preset, step as u64);
            }
            Op::Remove { pick: index } => {
                if let Some(id) = pick(index) {
                    let _ = engine.remove_widget(&id);
                }
            }
            Op::Preset { pick: index, preset } => {
                if let Some(id) = pick(index) {
                    let preset = SizePreset::ALL[usize::from(preset) % SizePreset::ALL.len()];
                    let _ = engine.apply_preset(&id, preset);
                }
            }
            Op::AutoSort => {
                if engine.auto_sort().is_ok() {
                    assert!(engine.conflicts().is_empty(), "auto-sort left conflicts");
                    let again = auto_sort(engine.widgets(), engine.grid());
                    assert_eq!(again.as_deref(), Some(engine.widgets()), "auto-sort not idempotent");
                }
            }
            Op::ToggleMinimize { pick: index } => {
                if let Some(id) = pick(index) {
                    let _ = engine.toggle_minimize(&id);
                }
            }
            Op::Maximize { pick: index } => {
                if let Some(id) = pick(index) {
                    let _ = engine.maximize(&id);
                }
            }
            Op::Drag { pick: index, dx, dy } => {
                if let Some(id) = pick(index) {
                    engine.begin_drag(&id, PointerPosition::new(0, 0));
                    engine.pointer_up(PointerPosition::new(i32::from(dx), i32::from(dy)));
                }
            }
            Op::Resize { pick: index, handle, dx, dy } => {
                if let Some(id) = pick(index) {
                    let handle = ResizeHandle::ALL[usize::from(handle) % ResizeHandle::ALL.len()];
                    engine.begin_resize(&id, handle, PointerPosition::new(0, 0));
                    engine.pointer_move(PointerPosition::new(i32::from(dx), i32::from(dy)));
                    engine.pointer_up(PointerPosition::new(i32::from(dx), i32::from(dy)));
                }
            }
            Op::CellSize { px } => {
                let _ = engine.set_cell_size(CellSize::new(u16::from(px % 60) + 5).unwrap_or(CellSize::MIN));
            }
            Op::Viewport { width, height } => {
                engine.set_viewport(f64::from(width % 4000), f64::from(height % 3000));
            }
            Op::Undo => {
                engine.undo();
            }
            Op::Redo => {
                engine.redo();
            }
        }

        // Post-conditions that must always hold:
        let mut seen = std::collections::HashSet::new();
        for widget in engine.widgets() {
            assert!(seen.insert(widget.id.clone()), "duplicate id {}", widget.id);
            assert!(widget.meets_floor(), "{} below its floor", widget.id);
        }
        assert!(engine.history().undo_depth() <= 16, "history grew past its bound");
        assert_eq!(engine.interaction_state(), &InteractionState::Idle, "interaction left open");
    }
});
