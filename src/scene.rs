//! Entity and graph model consumed by the label engine.
//!
//! The engine only reads this data: entities are owned by an external
//! graph/history store and arrive here as an immutable snapshot, together
//! with the topology lookups and display-name/preset contracts the
//! placement code needs.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Point, Projection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Vertex,
    Line,
    Area,
}

pub type Tags = BTreeMap<String, String>;

#[derive(Debug, Clone, Deserialize)]
pub struct Entity {
    pub id: String,
    pub kind: GeometryKind,
    #[serde(default)]
    pub tags: Tags,
    /// Lon/lat for point geometries.
    #[serde(default)]
    pub loc: Option<Point>,
    /// Ordered child node ids for line/area geometries.
    #[serde(default)]
    pub nodes: Vec<String>,
}

/// Tag keys carrying a viewer-facing direction indicator.
const DIRECTION_KEYS: [&str; 3] = ["direction", "camera:direction", "traffic_signals:direction"];

/// Whether a tag key says anything about what the feature *is* (as opposed
/// to provenance/bookkeeping keys).
pub fn is_interesting_tag(key: &str) -> bool {
    key != "attribution"
        && key != "created_by"
        && key != "source"
        && key != "odbl"
        && !key.starts_with("source:")
        && !key.starts_with("source_ref")
        && !key.starts_with("tiger:")
}

impl Entity {
    pub fn has_interesting_tags(&self) -> bool {
        self.tags.keys().any(|key| is_interesting_tag(key))
    }

    pub fn has_directions(&self) -> bool {
        DIRECTION_KEYS
            .iter()
            .any(|key| self.tags.get(*key).is_some_and(|v| !v.is_empty()))
    }

    /// Display name shown on the label, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.tags
            .get("name")
            .or_else(|| self.tags.get("addr:housename"))
            .or_else(|| self.tags.get("addr:housenumber"))
            .or_else(|| self.tags.get("ref"))
            .map(String::as_str)
    }

    /// Display name for text drawn along a path. Identical to
    /// [`Entity::display_name`] here; path-specific glyph workarounds
    /// belong to the excluded localization layer.
    pub fn display_name_for_path(&self) -> Option<&str> {
        self.display_name()
    }
}

/// A preset matched from an entity's tags; only the icon and the preset id
/// matter to label placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Tags the entity must carry; a value of `*` matches any value.
    pub tags: Tags,
}

impl Preset {
    fn matches(&self, tags: &Tags) -> bool {
        self.tags.iter().all(|(key, value)| {
            tags.get(key)
                .is_some_and(|actual| value == "*" || actual == value)
        })
    }
}

/// Ordered preset table; the most specific matching preset wins.
#[derive(Debug, Clone, Default)]
pub struct PresetIndex {
    presets: Vec<Preset>,
}

impl PresetIndex {
    pub fn new(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    pub fn match_entity(&self, entity: &Entity) -> Option<&Preset> {
        self.presets
            .iter()
            .filter(|preset| preset.matches(&entity.tags))
            .max_by_key(|preset| preset.tags.len())
    }
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("way {way} references unknown node {node}")]
    UnknownNode { way: String, node: String },
    #[error("node {0} has no location")]
    MissingLocation(String),
    #[error("duplicate entity id {0}")]
    DuplicateId(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct SceneFile {
    entities: Vec<Entity>,
    #[serde(default)]
    selected: Vec<String>,
}

/// Immutable snapshot of the visible entity set plus its topology.
#[derive(Debug, Default)]
pub struct Scene {
    entities: BTreeMap<String, Entity>,
    /// Draw order of the snapshot, preserved from ingestion.
    order: Vec<String>,
    /// Node id to parent way ids.
    parents: HashMap<String, Vec<String>>,
    selected: HashSet<String>,
}

impl Scene {
    pub fn new(entities: Vec<Entity>, selected: Vec<String>) -> Result<Self, SceneError> {
        let mut scene = Scene {
            selected: selected.into_iter().collect(),
            ..Scene::default()
        };
        for entity in &entities {
            match entity.kind {
                GeometryKind::Point | GeometryKind::Vertex => {
                    if entity.loc.is_none() {
                        return Err(SceneError::MissingLocation(entity.id.clone()));
                    }
                }
                GeometryKind::Line | GeometryKind::Area => {
                    for node in &entity.nodes {
                        scene
                            .parents
                            .entry(node.clone())
                            .or_default()
                            .push(entity.id.clone());
                    }
                }
            }
        }
        for entity in entities {
            scene.order.push(entity.id.clone());
            if scene.entities.insert(entity.id.clone(), entity).is_some() {
                let id = scene.order.pop().unwrap_or_default();
                return Err(SceneError::DuplicateId(id));
            }
        }
        // Way membership is resolved lazily elsewhere; validate it up front
        // so placement never sees a dangling reference.
        for entity in scene.entities.values() {
            for node in &entity.nodes {
                match scene.entities.get(node) {
                    Some(child) if child.loc.is_some() => {}
                    Some(child) => return Err(SceneError::MissingLocation(child.id.clone())),
                    None => {
                        return Err(SceneError::UnknownNode {
                            way: entity.id.clone(),
                            node: node.clone(),
                        });
                    }
                }
            }
        }
        Ok(scene)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        let file: SceneFile = serde_json::from_str(json)?;
        Self::new(file.entities, file.selected)
    }

    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Entity ids in draw order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Rendering geometry class: a point that belongs to a way is a vertex.
    pub fn geometry(&self, entity: &Entity) -> GeometryKind {
        match entity.kind {
            GeometryKind::Point if self.parents.contains_key(&entity.id) => GeometryKind::Vertex,
            kind => kind,
        }
    }

    pub fn parent_ways(&self, id: &str) -> &[String] {
        self.parents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the node is the first or last child of any parent way.
    pub fn is_endpoint(&self, entity: &Entity) -> bool {
        self.parent_ways(&entity.id).iter().any(|way| {
            self.entities
                .get(way)
                .is_some_and(|parent| {
                    parent.nodes.first().is_some_and(|n| n == &entity.id)
                        || parent.nodes.last().is_some_and(|n| n == &entity.id)
                })
        })
    }

    /// Whether the node joins two or more ways.
    pub fn is_connected(&self, entity: &Entity) -> bool {
        self.parent_ways(&entity.id).len() >= 2
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn has_selected_parent(&self, entity: &Entity) -> bool {
        self.parent_ways(&entity.id)
            .iter()
            .any(|way| self.selected.contains(way))
    }

    pub fn selected(&self) -> &HashSet<String> {
        &self.selected
    }

    /// Projected child node coordinates of a line/area entity, in order.
    pub fn child_points(&self, entity: &Entity, projection: &Projection) -> Vec<Point> {
        entity
            .nodes
            .iter()
            .filter_map(|node| self.entities.get(node))
            .filter_map(|node| node.loc)
            .map(|loc| projection.project(loc))
            .collect()
    }

    /// Projected location of a point/vertex entity.
    pub fn projected_loc(&self, entity: &Entity, projection: &Projection) -> Option<Point> {
        entity.loc.map(|loc| projection.project(loc))
    }
}
