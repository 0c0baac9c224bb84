use std::path::Path;

use osmlabel::config::{LabelConfig, TextDirection};
use osmlabel::engine::{LabelEngine, View};
use osmlabel::geometry::{Point, Projection};
use osmlabel::index::{BoxRole, PlacementBox};
use osmlabel::place::{LabelPosition, TextAnchor};
use osmlabel::scene::{Entity, GeometryKind, Scene};
use osmlabel::text_metrics::HeuristicTextMetrics;

fn node(id: &str, loc: Point, tags: &[(&str, &str)]) -> Entity {
    Entity {
        id: id.to_string(),
        kind: GeometryKind::Point,
        tags: tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        loc: Some(loc),
        nodes: Vec::new(),
    }
}

fn way(id: &str, kind: GeometryKind, nodes: &[&str], tags: &[(&str, &str)]) -> Entity {
    Entity {
        id: id.to_string(),
        kind,
        tags: tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        loc: None,
        nodes: nodes.iter().map(|n| n.to_string()).collect(),
    }
}

fn small_view() -> View {
    View::new(Projection::for_zoom(17.0, [200.0, 150.0]), [400.0, 300.0])
}

fn wide_view() -> View {
    View::new(Projection::for_zoom(17.0, [240.0, 200.0]), [480.0, 400.0])
}

fn at(view: &View, pixel: Point) -> Point {
    view.projection.invert(pixel)
}

fn ids(scene: &Scene) -> Vec<String> {
    scene.order().to_vec()
}

fn engine() -> LabelEngine<HeuristicTextMetrics> {
    LabelEngine::new(LabelConfig::default(), HeuristicTextMetrics::new())
}

fn strictly_overlap(a: &PlacementBox, b: &PlacementBox) -> bool {
    a.min_x < b.max_x && b.min_x < a.max_x && a.min_y < b.max_y && b.min_y < a.max_y
}

#[test]
fn fixture_scene_places_all_geometry_kinds() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("downtown.json");
    let scene = Scene::from_file(&path).expect("fixture read failed");

    // Center the fixture neighborhood in a 960x600 viewport.
    let center = [-0.1, 51.4996];
    let raw = Projection::for_zoom(17.0, [0.0, 0.0]);
    let projected = raw.project(center);
    let view = View::new(
        Projection::for_zoom(17.0, [480.0 - projected[0], 300.0 - projected[1]]),
        [960.0, 600.0],
    );

    let mut engine = engine();
    let placed = engine.place_labels(&scene, &ids(&scene), &view, true);

    assert_eq!(placed.point.len(), 2);
    assert_eq!(placed.line.len(), 1);
    assert_eq!(placed.area.len(), 1);
    assert_eq!(placed.line[0].entity, "w1");
    assert_eq!(placed.line[0].name, "Long Lane");
    let LabelPosition::Area(ref area) = placed.area[0].position else {
        panic!("expected area position");
    };
    assert!(area.icon_transform.is_some());
    assert!(area.label.is_some());
}

#[test]
fn drawn_labels_never_overlap_anything() {
    let view = small_view();
    let mut entities = Vec::new();
    for row in 0..5 {
        for col in 0..8 {
            let pixel = [80.0 + col as f64 * 35.0, 80.0 + row as f64 * 40.0];
            let id = format!("n{row}{col}");
            let name = format!("Spot {row}{col}");
            entities.push(node(
                &id,
                at(&view, pixel),
                &[("amenity", "bar"), ("name", name.as_str())],
            ));
        }
    }
    let scene = Scene::new(entities, Vec::new()).unwrap();
    let mut engine = engine();
    let placed = engine.place_labels(&scene, &ids(&scene), &view, true);

    // The grid is too dense for every label to fit.
    assert!(!placed.point.is_empty());
    assert!(placed.point.len() < 40);

    let boxes: Vec<PlacementBox> = engine.collider().drawn().all().cloned().collect();
    for (i, a) in boxes.iter().enumerate() {
        for b in boxes.iter().skip(i + 1) {
            if a.key.role == BoxRole::Marker && b.key.role == BoxRole::Marker {
                // Marker reservations are forced and may collide.
                continue;
            }
            assert!(
                !strictly_overlap(a, b),
                "{:?} overlaps {:?}",
                a.key,
                b.key
            );
        }
    }
}

#[test]
fn full_redraw_is_idempotent() {
    let view = small_view();
    let scene = Scene::new(
        vec![
            node("n1", at(&view, [200.0, 150.0]), &[("amenity", "bar"), ("name", "Bar One")]),
            node("n2", at(&view, [214.0, 150.0]), &[("amenity", "bar"), ("name", "Bar Two")]),
        ],
        Vec::new(),
    )
    .unwrap();
    let mut engine = engine();
    let first = engine.place_labels(&scene, &ids(&scene), &view, true);
    let second = engine.place_labels(&scene, &ids(&scene), &view, true);
    assert_eq!(first, second);
}

#[test]
fn incremental_redraw_matches_full() {
    let view = small_view();
    let scene = Scene::new(
        vec![
            node("n1", at(&view, [200.0, 150.0]), &[("amenity", "bar"), ("name", "Bar One")]),
            node("n2", at(&view, [214.0, 150.0]), &[("amenity", "bar"), ("name", "Bar Two")]),
            node("n3", at(&view, [100.0, 80.0]), &[("amenity", "cafe"), ("name", "Third")]),
        ],
        Vec::new(),
    )
    .unwrap();
    let mut engine = engine();
    let full = engine.place_labels(&scene, &ids(&scene), &view, true);
    let incremental = engine.place_labels(&scene, &ids(&scene), &view, false);
    assert_eq!(full, incremental);
}

#[test]
fn removing_an_entity_frees_its_space() {
    let view = small_view();
    // Stacked vertically so the label boxes contest the same space while
    // both stay clear of the other node's marker reservation.
    let n1 = node("n1", at(&view, [200.0, 150.0]), &[("amenity", "bar"), ("name", "Bar One")]);
    let n2 = node("n2", at(&view, [200.0, 160.0]), &[("amenity", "bar"), ("name", "Bar Two")]);
    let scene = Scene::new(vec![n1, n2.clone()], Vec::new()).unwrap();

    let mut engine = engine();
    let placed = engine.place_labels(&scene, &ids(&scene), &view, true);
    assert_eq!(placed.point.len(), 1);
    assert_eq!(placed.point[0].entity, "n1");

    // n1 is deleted upstream: redraw the changed set against the new scene.
    let without_n1 = Scene::new(vec![n2], Vec::new()).unwrap();
    let placed = engine.place_labels(
        &without_n1,
        &["n1".to_string(), "n2".to_string()],
        &view,
        false,
    );
    assert_eq!(placed.point.len(), 1);
    assert_eq!(placed.point[0].entity, "n2");
    // Nothing of the deleted entity may linger in the drawn index, the
    // marker reservation included.
    assert!(engine.collider().drawn().all().all(|bbox| bbox.key.entity != "n1"));
}

#[test]
fn higher_priority_road_takes_the_middle() {
    let view = wide_view();
    let scene = Scene::new(
        vec![
            node("n1", at(&view, [50.0, 150.0]), &[]),
            node("n2", at(&view, [350.0, 150.0]), &[]),
            node("n3", at(&view, [50.0, 155.0]), &[]),
            node("n4", at(&view, [350.0, 155.0]), &[]),
            // Declared first, but the residential rule ranks below motorway.
            way("w2", GeometryKind::Line, &["n3", "n4"], &[
                ("highway", "residential"),
                ("name", "Side Street"),
            ]),
            way("w1", GeometryKind::Line, &["n1", "n2"], &[
                ("highway", "motorway"),
                ("name", "Main Street"),
            ]),
        ],
        Vec::new(),
    )
    .unwrap();
    let mut engine = engine();
    let placed = engine.place_labels(&scene, &ids(&scene), &view, true);

    assert_eq!(placed.line.len(), 2);
    let offset_of = |id: &str| {
        let label = placed.line.iter().find(|l| l.entity == id).unwrap();
        let LabelPosition::Line(ref p) = label.position else {
            panic!("expected line position");
        };
        p.start_offset
    };
    assert_eq!(offset_of("w1"), 50.0);
    // The lower-priority road was pushed well away from its middle.
    assert!((offset_of("w2") - 50.0).abs() >= 25.0);
}

#[test]
fn short_road_with_long_name_is_unlabeled() {
    let view = small_view();
    let scene = Scene::new(
        vec![
            node("n1", at(&view, [200.0, 150.0]), &[]),
            node("n2", at(&view, [240.0, 150.0]), &[]),
            way("w1", GeometryKind::Line, &["n1", "n2"], &[
                ("highway", "motorway"),
                ("name", "Kings Road"),
            ]),
        ],
        Vec::new(),
    )
    .unwrap();
    // 0.5em per char: a 10-char name measures 60px against a 40px path.
    let mut engine =
        LabelEngine::new(LabelConfig::default(), HeuristicTextMetrics::with_em(0.5));
    let placed = engine.place_labels(&scene, &ids(&scene), &view, true);

    assert!(placed.line.is_empty());
    assert!(
        engine
            .collider()
            .drawn()
            .all()
            .all(|bbox| bbox.key.role == BoxRole::Marker)
    );
}

#[test]
fn rtl_labels_mirror_to_the_left() {
    let view = small_view();
    let scene = Scene::new(
        vec![node(
            "n1",
            at(&view, [200.0, 150.0]),
            &[("amenity", "bar"), ("name", "Bar")],
        )],
        Vec::new(),
    )
    .unwrap();
    let config = LabelConfig {
        text_direction: TextDirection::Rtl,
        ..LabelConfig::default()
    };
    let mut engine = LabelEngine::new(config, HeuristicTextMetrics::new());
    let placed = engine.place_labels(&scene, &ids(&scene), &view, true);

    assert_eq!(placed.point.len(), 1);
    let LabelPosition::Point(ref p) = placed.point[0].position else {
        panic!("expected point position");
    };
    assert!((p.x - 185.0).abs() < 1e-6);
    assert!((p.y - 138.0).abs() < 1e-6);
    assert_eq!(p.text_anchor, TextAnchor::End);
}
