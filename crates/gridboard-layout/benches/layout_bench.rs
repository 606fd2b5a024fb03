//! Benchmarks for packing, insertion, and density changes.
//!
//! Run with: cargo bench -p gridboard-layout

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use gridboard_core::geometry::{CellSize, GridRect, GridSize};
use gridboard_layout::{
    EngineConfig, InsertionPlanner, LayoutEngine, Packer, Widget, WidgetKind, rescale,
};
use std::hint::black_box;

/// `n` widgets stacked at the origin, the worst case for the packer.
fn make_pile(n: usize) -> Vec<Widget> {
    (0..n)
        .map(|i| {
            let kind = WidgetKind::ALL[i % WidgetKind::ALL.len()];
            let cols = 3 + (i % 4) as u16;
            let rows = 2 + (i % 3) as u16;
            Widget::new(format!("w{i}").as_str(), kind, GridRect::new(1, 1, cols, rows), (2, 2))
        })
        .collect()
}

fn bench_auto_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/auto_sort");
    let packer = Packer::new(GridSize::new(48, 30));

    for n in [4, 8, 16, 32, 64] {
        let pile = make_pile(n);
        group.bench_with_input(BenchmarkId::new("pile", n), &pile, |b, pile| {
            b.iter(|| black_box(packer.auto_sort(pile)))
        });
    }

    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/insert");

    for n in [4, 16, 32] {
        let grid = GridSize::new(48, 30);
        let Some(layout) = Packer::new(grid).auto_sort(&make_pile(n)) else {
            continue;
        };
        let planner = InsertionPlanner::new(Packer::new(grid));
        let incoming = Widget::new("incoming", WidgetKind::Chat, GridRect::new(1, 1, 8, 6), (4, 4));
        group.bench_with_input(BenchmarkId::new("settled", n), &layout, |b, layout| {
            b.iter(|| black_box(planner.insert(layout, incoming.clone())))
        });
    }

    // Forces the shrink path: twelve 4x4 widgets fill a 16x12 grid exactly.
    let grid = GridSize::new(16, 12);
    let full: Vec<Widget> = (0..12u16)
        .map(|i| {
            let rect = GridRect::new(1 + (i % 4) * 4, 1 + (i / 4) * 4, 4, 4);
            Widget::new(format!("f{i}").as_str(), WidgetKind::Notes, rect, (3, 3))
        })
        .collect();
    let planner = InsertionPlanner::new(Packer::new(grid));
    let incoming = Widget::new("incoming", WidgetKind::Notes, GridRect::new(1, 1, 1, 4), (1, 4));
    group.bench_function("shrink_search", |b| {
        b.iter(|| black_box(planner.insert(&full, incoming.clone())))
    });

    group.finish();
}

fn bench_rescale(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/rescale");
    let from = CellSize::new(30).unwrap();
    let to = CellSize::new(20).unwrap();

    for n in [8, 32] {
        let grid = GridSize::new(72, 45);
        let layout = make_pile(n);
        group.bench_with_input(BenchmarkId::new("30_to_20", n), &layout, |b, layout| {
            b.iter(|| black_box(rescale(layout, from, to, grid)))
        });
    }

    group.finish();
}

fn bench_engine_add(c: &mut Criterion) {
    c.bench_function("engine/add_until_full", |b| {
        b.iter_batched(
            || LayoutEngine::new(EngineConfig::new().viewport(1440.0, 900.0)),
            |mut engine| {
                for step in 0..64u64 {
                    let kind = WidgetKind::ALL[(step % 5) as usize];
                    if engine.add_widget(kind, step).is_err() {
                        break;
                    }
                }
                black_box(engine.widgets().len())
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_auto_sort,
    bench_insert,
    bench_rescale,
    bench_engine_add
);
criterion_main!(benches);
