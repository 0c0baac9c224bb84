//! Area label placement: preset icon and/or centered text at the polygon
//! centroid.
//!
//! The icon has priority. When a preset supplies one, the text only renders
//! if the icon itself found room, and is pushed below it.

use crate::classify::icon_suppressed;
use crate::config::LabelConfig;
use crate::geometry::{self, Point};
use crate::index::{BoxKey, PlacementBox};
use crate::scene::Preset;

use super::{AreaPosition, Collider, PointPosition, TextAnchor};

pub fn place_area_label(
    collider: &mut Collider,
    points: &[Point],
    entity: &str,
    preset: Option<&Preset>,
    width: Option<f64>,
    font_size: f64,
    config: &LabelConfig,
) -> Option<AreaPosition> {
    let centroid = geometry::polygon_centroid(points)?;
    let (min, max) = geometry::extent(points)?;
    let area_width = max[0] - min[0];
    if area_width < config.min_area_width {
        return None;
    }

    let icon = preset
        .filter(|p| !icon_suppressed(p))
        .and_then(|p| p.icon.as_deref());

    if icon.is_some() {
        let transform = reserve_icon(collider, centroid, entity, config)?;
        let label = place_text(
            collider,
            centroid,
            entity,
            width,
            font_size,
            area_width,
            config.icon_size + config.icon_padding,
            config,
        );
        Some(AreaPosition { label, icon_transform: Some(transform) })
    } else {
        let label =
            place_text(collider, centroid, entity, width, font_size, area_width, 0.0, config)?;
        Some(AreaPosition { label: Some(label), icon_transform: None })
    }
}

fn reserve_icon(
    collider: &mut Collider,
    centroid: Point,
    entity: &str,
    config: &LabelConfig,
) -> Option<String> {
    let icon_x = centroid[0] - config.icon_size / 2.0;
    let icon_y = centroid[1] - config.icon_size / 2.0;
    let bbox = PlacementBox::new(
        icon_x,
        icon_y,
        icon_x + config.icon_size,
        icon_y + config.icon_size,
        BoxKey::icon(entity),
    );
    collider
        .try_insert(BoxKey::icon(entity), vec![bbox], true)
        .then(|| format!("translate({icon_x},{icon_y})"))
}

#[allow(clippy::too_many_arguments)]
fn place_text(
    collider: &mut Collider,
    centroid: Point,
    entity: &str,
    width: Option<f64>,
    font_size: f64,
    area_width: f64,
    y_offset: f64,
    config: &LabelConfig,
) -> Option<PointPosition> {
    let width = width?;
    // The text must fit well inside the area's horizontal extent.
    if area_width < width + config.length_margin {
        return None;
    }

    let x = centroid[0];
    let y = centroid[1] + y_offset;
    let pad = config.icon_padding;
    let bbox = PlacementBox::new(
        x - width / 2.0 - pad,
        y - font_size / 2.0 - pad,
        x + width / 2.0 + pad,
        y + font_size / 2.0 + pad,
        BoxKey::label(entity),
    );
    collider
        .try_insert(BoxKey::label(entity), vec![bbox], true)
        .then_some(PointPosition {
            x,
            y,
            width,
            height: font_size,
            text_anchor: TextAnchor::Middle,
            is_addr: false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Tags;

    fn square(cx: f64, cy: f64, half: f64) -> Vec<Point> {
        vec![
            [cx - half, cy - half],
            [cx + half, cy - half],
            [cx + half, cy + half],
            [cx - half, cy + half],
            [cx - half, cy - half],
        ]
    }

    fn cafe_preset() -> Preset {
        Preset {
            id: "amenity/cafe".to_string(),
            icon: Some("maki-cafe".to_string()),
            tags: Tags::from([("amenity".to_string(), "cafe".to_string())]),
        }
    }

    fn building_preset() -> Preset {
        Preset {
            id: "building/house".to_string(),
            icon: Some("maki-home".to_string()),
            tags: Tags::from([("building".to_string(), "house".to_string())]),
        }
    }

    #[test]
    fn icon_and_label_both_placed() {
        let config = LabelConfig::default();
        let mut collider = Collider::new([400.0, 300.0]);
        let preset = cafe_preset();
        let placed = place_area_label(
            &mut collider,
            &square(200.0, 150.0, 60.0),
            "w1",
            Some(&preset),
            Some(40.0),
            10.0,
            &config,
        )
        .unwrap();
        assert_eq!(placed.icon_transform.as_deref(), Some("translate(191.5,141.5)"));
        let label = placed.label.unwrap();
        assert_eq!(label.x, 200.0);
        assert_eq!(label.y, 150.0 + config.icon_size + config.icon_padding);
        assert_eq!(label.text_anchor, TextAnchor::Middle);
        assert_eq!(collider.drawn().len(), 2);
    }

    #[test]
    fn narrow_area_gets_nothing() {
        let config = LabelConfig::default();
        let mut collider = Collider::new([400.0, 300.0]);
        let preset = cafe_preset();
        let placed = place_area_label(
            &mut collider,
            &square(200.0, 150.0, 8.0),
            "w1",
            Some(&preset),
            Some(40.0),
            10.0,
            &config,
        );
        assert!(placed.is_none());
        assert!(collider.drawn().is_empty());
    }

    #[test]
    fn icon_without_room_for_text_still_renders() {
        let config = LabelConfig::default();
        let mut collider = Collider::new([400.0, 300.0]);
        let preset = cafe_preset();
        // Area is wide enough for the icon but not for 100px of text.
        let placed = place_area_label(
            &mut collider,
            &square(200.0, 150.0, 30.0),
            "w1",
            Some(&preset),
            Some(100.0),
            10.0,
            &config,
        )
        .unwrap();
        assert!(placed.icon_transform.is_some());
        assert!(placed.label.is_none());
        assert_eq!(collider.drawn().len(), 1);
    }

    #[test]
    fn blocked_icon_suppresses_the_whole_placement() {
        let config = LabelConfig::default();
        let mut collider = Collider::new([400.0, 300.0]);
        collider.try_insert(
            BoxKey::label("blocker"),
            vec![PlacementBox::new(
                190.0,
                140.0,
                210.0,
                160.0,
                BoxKey::label("blocker"),
            )],
            false,
        );
        let preset = cafe_preset();
        let placed = place_area_label(
            &mut collider,
            &square(200.0, 150.0, 60.0),
            "w1",
            Some(&preset),
            Some(40.0),
            10.0,
            &config,
        );
        assert!(placed.is_none());
        // The rejected icon box shows up in the debug overlay.
        assert_eq!(collider.skipped().len(), 1);
    }

    #[test]
    fn suppressed_preset_falls_back_to_text_only() {
        let config = LabelConfig::default();
        let mut collider = Collider::new([400.0, 300.0]);
        let preset = building_preset();
        let placed = place_area_label(
            &mut collider,
            &square(200.0, 150.0, 60.0),
            "w1",
            Some(&preset),
            Some(40.0),
            10.0,
            &config,
        )
        .unwrap();
        assert!(placed.icon_transform.is_none());
        let label = placed.label.unwrap();
        assert_eq!(label.y, 150.0);
    }
}
