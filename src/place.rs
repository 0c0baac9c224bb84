//! Collision resolution and the shared placement output types.
//!
//! The strategies in the submodules compute candidate box sets; [`Collider`]
//! arbitrates them against the drawn index and keeps the per-entity box
//! registry that makes incremental redraws cheap to reverse.

pub mod area;
pub mod line;
pub mod point;

use std::collections::HashMap;

use serde::Serialize;

use crate::index::{BoxIndex, BoxKey, PlacementBox};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// A point (or area text) label position: anchor coordinates plus styling
/// hints for the paint layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointPosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text_anchor: TextAnchor,
    pub is_addr: bool,
}

/// A line label position: the extracted subpath and the percentage offset
/// along the full path where it starts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePosition {
    pub font_size: f64,
    /// SVG-style path data for the label's baseline.
    pub path: String,
    /// Percent offset along the parent path.
    pub start_offset: f64,
}

/// An area placement: independently tracked icon transform and/or centered
/// text label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaPosition {
    pub label: Option<PointPosition>,
    pub icon_transform: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    Point(PointPosition),
    Line(LinePosition),
    Area(AreaPosition),
}

/// One render-ready label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLabel {
    pub entity: String,
    pub name: String,
    /// CSS class hints: geometry kind plus the matched tag key.
    pub classes: String,
    pub position: LabelPosition,
}

/// Placed labels grouped by geometry kind, in placement order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlacedLabels {
    pub point: Vec<PlacedLabel>,
    pub line: Vec<PlacedLabel>,
    pub area: Vec<PlacedLabel>,
}

impl PlacedLabels {
    pub fn len(&self) -> usize {
        self.point.len() + self.line.len() + self.area.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared insert/try-insert/undo logic over the drawn and skipped indices.
#[derive(Debug, Default)]
pub struct Collider {
    drawn: BoxIndex,
    skipped: BoxIndex,
    registry: HashMap<BoxKey, Vec<PlacementBox>>,
    dimensions: [f64; 2],
}

impl Collider {
    pub fn new(dimensions: [f64; 2]) -> Self {
        Self { dimensions, ..Self::default() }
    }

    pub fn set_dimensions(&mut self, dimensions: [f64; 2]) {
        self.dimensions = dimensions;
    }

    pub fn dimensions(&self) -> [f64; 2] {
        self.dimensions
    }

    /// Drop everything: both indices and the registry. Full-redraw reset.
    pub fn clear(&mut self) {
        self.drawn.clear();
        self.skipped.clear();
        self.registry.clear();
    }

    /// Remove whatever box set is registered under `key` from both indices.
    fn evict(&mut self, key: &BoxKey) {
        if let Some(old) = self.registry.remove(key) {
            for bbox in &old {
                self.drawn.remove(bbox);
                self.skipped.remove(bbox);
            }
        }
    }

    /// Remove every box an entity owns ahead of recomputation. The
    /// reservation pass re-reserves the marker box for entities that still
    /// exist; for deleted entities nothing may linger in either index.
    pub fn forget(&mut self, entity: &str) {
        self.evict(&BoxKey::label(entity));
        self.evict(&BoxKey::icon(entity));
        self.evict(&BoxKey::marker(entity));
    }

    /// Attempt to commit a candidate's full box set atomically.
    ///
    /// Every box must lie within the viewport and clear the drawn index;
    /// one failure rejects the whole set. A rejected set is recorded in the
    /// skipped index when `save_skipped` is set (debug overlay only). The
    /// set replaces any boxes previously registered under `key`.
    pub fn try_insert(&mut self, key: BoxKey, boxes: Vec<PlacementBox>, save_skipped: bool) -> bool {
        self.evict(&key);
        let rejected = boxes
            .iter()
            .any(|bbox| !bbox.within(self.dimensions) || self.drawn.collides(bbox));
        if rejected {
            if save_skipped {
                self.skipped.load(boxes.clone());
            }
            self.registry.insert(key, boxes);
            false
        } else {
            self.drawn.load(boxes.clone());
            self.registry.insert(key, boxes);
            true
        }
    }

    /// Force-insert a single box, evicting any prior set under its key.
    /// Used for the fixed marker reservations, which are not subject to
    /// collision arbitration.
    pub fn reserve(&mut self, bbox: PlacementBox) {
        let key = bbox.key.clone();
        self.evict(&key);
        self.drawn.insert(bbox.clone());
        self.registry.insert(key, vec![bbox]);
    }

    /// Reverse a prior reservation (or committed set) under `key`.
    pub fn release(&mut self, key: &BoxKey) {
        self.evict(key);
    }

    pub fn drawn(&self) -> &BoxIndex {
        &self.drawn
    }

    pub fn skipped(&self) -> &BoxIndex {
        &self.skipped
    }

    /// Registered box set for an owner, committed or not.
    pub fn boxes_for(&self, key: &BoxKey) -> Option<&[PlacementBox]> {
        self.registry.get(key).map(Vec::as_slice)
    }
}
