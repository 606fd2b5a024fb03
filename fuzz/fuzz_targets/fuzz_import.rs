#![no_main]

use gridboard_layout::{EngineConfig, LayoutEngine, LoadOutcome};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Loading never fails outright; unusable input falls back to defaults.
    let mut loaded = LayoutEngine::new(EngineConfig::new().viewport(720.0, 480.0));
    match loaded.load_json(text) {
        LoadOutcome::Defaulted { reason } => {
            assert!(!reason.is_empty());
            assert!(loaded.conflicts().is_empty(), "default layout has conflicts");
        }
        LoadOutcome::Document => {
            let grid = loaded.grid();
            let mut seen = std::collections::HashSet::new();
            for widget in loaded.widgets() {
                assert!(seen.insert(widget.id.clone()), "duplicate id {}", widget.id);
                assert!(widget.meets_floor(), "{} below its floor", widget.id);
                assert!(
                    grid.is_unknown() || grid.contains_rect(&widget.rect()),
                    "{} out of bounds",
                    widget.id
                );
            }
        }
    }

    // A successful import is always conflict-free; a failed one changes nothing.
    let mut engine = LayoutEngine::with_default_layout(EngineConfig::new().viewport(720.0, 480.0));
    let before = engine.widgets().to_vec();
    match engine.import_json(text, 1_000) {
        Ok((report, _)) => {
            assert!(engine.conflicts().is_empty(), "import produced conflicts");
            assert_eq!(report.accepted, engine.widgets().len());
        }
        Err(_) => assert_eq!(engine.widgets(), before.as_slice()),
    }
});
