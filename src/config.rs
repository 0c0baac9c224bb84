use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::scene::{GeometryKind, Preset, Tags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

/// One row of the label priority stack.
///
/// Rules are evaluated top to bottom; the first rule whose geometry, tag
/// key, and tag value match claims the entity. Earlier rules get first
/// claim on screen space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRule {
    pub geometry: GeometryKind,
    pub key: String,
    /// Required tag value, `*` matching any value.
    pub value: String,
    pub font_size: f64,
}

impl LabelRule {
    fn new(geometry: GeometryKind, key: &str, value: &str, font_size: f64) -> Self {
        Self {
            geometry,
            key: key.to_string(),
            value: value.to_string(),
            font_size,
        }
    }

    pub fn matches(&self, geometry: GeometryKind, tags: &Tags) -> bool {
        if geometry != self.geometry {
            return false;
        }
        tags.get(&self.key)
            .is_some_and(|value| self.value == "*" || *value == self.value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Ordered rule table, highest priority first.
    pub stack: Vec<LabelRule>,
    /// Percentage offsets along a line at which placement is attempted,
    /// in trial order (middle first, spreading outward on collision).
    pub line_offsets: Vec<f64>,
    pub text_direction: TextDirection,
    pub font_family: String,
    /// Horizontal shift of a point label from its anchor.
    pub point_offset: f64,
    /// Upward shift of a point-mode label (vertex-mode labels sit level).
    pub point_label_rise: f64,
    /// Half-size of the reservation box around an interesting node.
    pub node_padding: f64,
    /// Extra reservation above a point for its marker pin.
    pub marker_padding: f64,
    /// Padding added around text collision boxes.
    pub text_padding: f64,
    /// Padding added around line label collision boxes.
    pub line_padding: f64,
    /// Slack required beyond the text width (line length, area width).
    pub length_margin: f64,
    pub icon_size: f64,
    pub icon_padding: f64,
    /// Minimum projected width for an area to be labeled at all.
    pub min_area_width: f64,
    /// Width cap for address labels; longer text is ellipsized.
    pub addr_max_width: f64,
    /// Below this zoom, vertices carry no text label.
    pub vertex_label_zoom: f64,
    /// At or above this zoom, points with direction indicators render as
    /// vertices.
    pub direction_vertex_zoom: f64,
    /// Half-size of the pointer box used by the label-hiding pass.
    pub hover_padding: f64,
    pub hover_throttle_ms: u64,
    pub presets: Vec<Preset>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            stack: default_stack(),
            line_offsets: vec![
                50.0, 45.0, 55.0, 40.0, 60.0, 35.0, 65.0, 30.0, 70.0, 25.0, 75.0, 20.0, 80.0,
                15.0, 95.0, 10.0, 90.0, 5.0, 95.0,
            ],
            text_direction: TextDirection::Ltr,
            font_family: "sans-serif".to_string(),
            point_offset: 15.0,
            point_label_rise: 12.0,
            node_padding: 10.0,
            marker_padding: 20.0,
            text_padding: 2.0,
            line_padding: 3.0,
            length_margin: 20.0,
            icon_size: 17.0,
            icon_padding: 2.0,
            min_area_width: 20.0,
            addr_max_width: 36.0,
            vertex_label_zoom: 17.0,
            direction_vertex_zoom: 18.0,
            hover_padding: 20.0,
            hover_throttle_ms: 100,
            presets: default_presets(),
        }
    }
}

fn default_stack() -> Vec<LabelRule> {
    use GeometryKind::{Area, Line, Point};
    let mut stack = vec![
        LabelRule::new(Line, "aeroway", "*", 12.0),
        LabelRule::new(Line, "highway", "motorway", 12.0),
        LabelRule::new(Line, "highway", "trunk", 12.0),
        LabelRule::new(Line, "highway", "primary", 12.0),
        LabelRule::new(Line, "highway", "secondary", 12.0),
        LabelRule::new(Line, "highway", "tertiary", 12.0),
        LabelRule::new(Line, "highway", "*", 12.0),
        LabelRule::new(Line, "railway", "*", 12.0),
        LabelRule::new(Line, "waterway", "*", 12.0),
    ];
    for key in [
        "aeroway", "amenity", "building", "historic", "leisure", "man_made", "natural", "shop",
        "tourism", "camp_site",
    ] {
        stack.push(LabelRule::new(Area, key, "*", 12.0));
    }
    for key in [
        "aeroway", "amenity", "building", "historic", "leisure", "man_made", "natural", "shop",
        "tourism", "camp_site",
    ] {
        stack.push(LabelRule::new(Point, key, "*", 10.0));
    }
    stack.push(LabelRule::new(Line, "ref", "*", 12.0));
    stack.push(LabelRule::new(Area, "ref", "*", 12.0));
    stack.push(LabelRule::new(Point, "ref", "*", 10.0));
    stack.push(LabelRule::new(Line, "name", "*", 12.0));
    stack.push(LabelRule::new(Area, "name", "*", 12.0));
    stack.push(LabelRule::new(Point, "name", "*", 10.0));
    stack.push(LabelRule::new(Point, "addr:housenumber", "*", 10.0));
    stack.push(LabelRule::new(Point, "addr:housename", "*", 10.0));
    stack
}

fn preset(id: &str, icon: Option<&str>, tags: &[(&str, &str)]) -> Preset {
    Preset {
        id: id.to_string(),
        icon: icon.map(str::to_string),
        tags: tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

/// A compact stand-in for the full preset catalog: enough coverage for the
/// label stack's area categories. Embedders replace this with their own
/// table via config.
fn default_presets() -> Vec<Preset> {
    vec![
        preset("amenity/parking", Some("maki-parking"), &[("amenity", "parking")]),
        preset("amenity/place_of_worship", Some("maki-place-of-worship"), &[(
            "amenity",
            "place_of_worship",
        )]),
        preset("amenity", Some("maki-marker-stroked"), &[("amenity", "*")]),
        preset("leisure/park", Some("maki-park"), &[("leisure", "park")]),
        preset("leisure", Some("maki-pitch"), &[("leisure", "*")]),
        preset("shop", Some("maki-shop"), &[("shop", "*")]),
        preset("tourism", Some("maki-attraction"), &[("tourism", "*")]),
        preset("historic", Some("maki-monument"), &[("historic", "*")]),
        preset("man_made", Some("maki-industry"), &[("man_made", "*")]),
        preset("aeroway", Some("maki-airport"), &[("aeroway", "*")]),
        preset("building", Some("maki-building"), &[("building", "*")]),
        preset("natural/water", Some("maki-water"), &[("natural", "water")]),
        preset("natural", Some("maki-natural"), &[("natural", "*")]),
        preset("landuse", None, &[("landuse", "*")]),
    ]
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<LabelConfig> {
    let Some(path) = path else {
        return Ok(LabelConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config: LabelConfig = serde_json::from_str(&contents)?;
    Ok(config)
}
