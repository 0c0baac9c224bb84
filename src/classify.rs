//! Candidate selection: which entities can carry a label, how a node is
//! rendered, and which priority bucket a candidate falls into.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::config::{LabelConfig, LabelRule};
use crate::scene::{Entity, GeometryKind, Preset, Scene, Tags, is_interesting_tag};

/// Visual treatment chosen for a node, independent of its raw geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Point,
    Vertex,
}

/// Per-node render decision recorded during preprocessing and consulted by
/// point placement.
#[derive(Debug, Clone, Copy)]
pub struct RenderAs {
    pub mode: RenderMode,
    pub is_addr: bool,
}

/// Metadata-ish keys that do not make a point "more than an address".
static NON_PRIMARY_KEYS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["check_date", "fixme", "layer", "level", "level:ref", "note"]
        .into_iter()
        .collect()
});

static NON_PRIMARY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(ref|survey|note):").expect("static regex"));

/// An address-style point: every tag is an address component, uninteresting,
/// or low-priority metadata. Such points get centered, truncating labels and
/// no marker reservation.
pub fn is_address_point(tags: &Tags) -> bool {
    !tags.is_empty()
        && tags.keys().all(|key| {
            key.starts_with("addr:")
                || !is_interesting_tag(key)
                || NON_PRIMARY_KEYS.contains(key.as_str())
                || NON_PRIMARY_KEY_RE.is_match(key)
        })
}

/// Decide how a point/vertex entity renders at the current zoom.
pub fn render_node_as(
    entity: &Entity,
    geometry: GeometryKind,
    zoom: f64,
    wireframe: bool,
    config: &LabelConfig,
) -> RenderAs {
    let is_addr = is_address_point(&entity.tags);
    let mode = if wireframe || geometry == GeometryKind::Vertex {
        RenderMode::Vertex
    } else if zoom >= config.direction_vertex_zoom && entity.has_directions() {
        RenderMode::Vertex
    } else {
        RenderMode::Point
    };
    RenderAs { mode, is_addr }
}

/// A vertex deserves a collision reservation (and may carry a label) when it
/// means something: interesting tags, way endpoint, junction of two or more
/// ways, or part of the current selection.
pub fn is_interesting_vertex(scene: &Scene, entity: &Entity) -> bool {
    entity.has_interesting_tags()
        || scene.is_endpoint(entity)
        || scene.is_connected(entity)
        || scene.is_selected(&entity.id)
        || scene.has_selected_parent(entity)
}

/// Preset categories that never show an area icon.
pub fn icon_suppressed(preset: &Preset) -> bool {
    ["building", "landuse", "natural"]
        .iter()
        .any(|s| preset.id.contains(s))
}

/// Index of the first rule in the stack claiming this entity, if any.
pub fn match_rule(stack: &[LabelRule], geometry: GeometryKind, tags: &Tags) -> Option<usize> {
    stack.iter().position(|rule| rule.matches(geometry, tags))
}
