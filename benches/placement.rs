use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use osmlabel::config::LabelConfig;
use osmlabel::engine::{LabelEngine, View};
use osmlabel::geometry::Projection;
use osmlabel::scene::{Entity, GeometryKind, Scene};
use osmlabel::text_metrics::HeuristicTextMetrics;
use std::hint::black_box;

fn view() -> View {
    View::new(Projection::for_zoom(17.0, [480.0, 300.0]), [960.0, 600.0])
}

/// Synthetic city block: a grid of named POIs with a street crossing every
/// other row, dense enough that most labels collide.
fn city_scene(view: &View, cols: usize, rows: usize) -> Scene {
    let mut entities = Vec::new();
    let step_x = 960.0 / (cols + 1) as f64;
    let step_y = 600.0 / (rows + 1) as f64;

    for row in 0..rows {
        for col in 0..cols {
            let pixel = [(col + 1) as f64 * step_x, (row + 1) as f64 * step_y];
            entities.push(Entity {
                id: format!("n{row}_{col}"),
                kind: GeometryKind::Point,
                tags: [
                    ("amenity".to_string(), "bar".to_string()),
                    ("name".to_string(), format!("Bar {row}-{col}")),
                ]
                .into(),
                loc: Some(view.projection.invert(pixel)),
                nodes: Vec::new(),
            });
        }
    }

    for row in (0..rows).step_by(2) {
        entities.push(Entity {
            id: format!("w{row}"),
            kind: GeometryKind::Line,
            tags: [
                ("highway".to_string(), "residential".to_string()),
                ("name".to_string(), format!("Street {row}")),
            ]
            .into(),
            loc: None,
            nodes: (0..cols).map(|col| format!("n{row}_{col}")).collect(),
        });
    }

    Scene::new(entities, Vec::new()).expect("scene build failed")
}

fn bench_full_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("place_full");
    let view = view();
    for (cols, rows) in [(10usize, 6usize), (20, 12), (30, 20)] {
        let name = format!("grid_{}x{}", cols, rows);
        let scene = city_scene(&view, cols, rows);
        let ids: Vec<String> = scene.order().to_vec();
        group.bench_with_input(BenchmarkId::from_parameter(name), &scene, |b, scene| {
            let mut engine =
                LabelEngine::new(LabelConfig::default(), HeuristicTextMetrics::new());
            b.iter(|| {
                let placed = engine.place_labels(black_box(scene), &ids, &view, true);
                black_box(placed.len());
            });
        });
    }
    group.finish();
}

fn bench_incremental_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("place_incremental");
    let view = view();
    for (cols, rows) in [(20usize, 12usize), (30, 20)] {
        let name = format!("one_row_of_{}x{}", cols, rows);
        let scene = city_scene(&view, cols, rows);
        let ids: Vec<String> = scene.order().to_vec();
        // One row of POIs changes; the rest of the screen stays settled.
        let changed: Vec<String> = (0..cols).map(|col| format!("n0_{col}")).collect();
        group.bench_with_input(BenchmarkId::from_parameter(name), &scene, |b, scene| {
            let mut engine =
                LabelEngine::new(LabelConfig::default(), HeuristicTextMetrics::new());
            engine.place_labels(scene, &ids, &view, true);
            b.iter(|| {
                let placed = engine.place_labels(black_box(scene), &changed, &view, false);
                black_box(placed.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_full_redraw, bench_incremental_redraw
);
criterion_main!(benches);
