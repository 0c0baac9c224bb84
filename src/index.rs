//! R-tree index over label collision boxes.
//!
//! Two instances of [`BoxIndex`] back the collision resolver: one for boxes
//! that were committed to the screen ("drawn") and one for boxes that were
//! computed but rejected ("skipped", kept only for debug overlays).

use rstar::{AABB, RTree, RTreeObject};

/// Disambiguates the multiple boxes one entity may own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxRole {
    /// The text label box (or boxes, for line labels).
    Label,
    /// An area's preset icon box.
    Icon,
    /// The fixed reservation around an interesting point/vertex.
    Marker,
}

/// Registry key: entity id plus the role of the box set under that id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoxKey {
    pub entity: String,
    pub role: BoxRole,
}

impl BoxKey {
    pub fn label(entity: impl Into<String>) -> Self {
        Self { entity: entity.into(), role: BoxRole::Label }
    }

    pub fn icon(entity: impl Into<String>) -> Self {
        Self { entity: entity.into(), role: BoxRole::Icon }
    }

    pub fn marker(entity: impl Into<String>) -> Self {
        Self { entity: entity.into(), role: BoxRole::Marker }
    }
}

/// An axis-aligned collision box owned by one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub key: BoxKey,
}

impl PlacementBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64, key: BoxKey) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
            key,
        }
    }

    /// Box centered at `center` with the given half extents.
    pub fn around(center: [f64; 2], half_w: f64, half_h: f64, key: BoxKey) -> Self {
        Self::new(
            center[0] - half_w,
            center[1] - half_h,
            center[0] + half_w,
            center[1] + half_h,
            key,
        )
    }

    /// Whether the box lies fully within `[0, w] x [0, h]`.
    pub fn within(&self, dimensions: [f64; 2]) -> bool {
        self.min_x >= 0.0
            && self.min_y >= 0.0
            && self.max_x <= dimensions[0]
            && self.max_y <= dimensions[1]
    }
}

impl RTreeObject for PlacementBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

/// Bulk-loadable rectangle index with removal by value.
#[derive(Debug, Default)]
pub struct BoxIndex {
    tree: RTree<PlacementBox>,
}

impl BoxIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Build an index from a full box set in one packing pass.
    pub fn bulk(boxes: Vec<PlacementBox>) -> Self {
        Self { tree: RTree::bulk_load(boxes) }
    }

    pub fn insert(&mut self, bbox: PlacementBox) {
        self.tree.insert(bbox);
    }

    /// Insert a batch of boxes into the existing index.
    pub fn load(&mut self, boxes: Vec<PlacementBox>) {
        for bbox in boxes {
            self.tree.insert(bbox);
        }
    }

    /// Remove a previously inserted box. A miss is a no-op.
    pub fn remove(&mut self, bbox: &PlacementBox) -> bool {
        self.tree.remove(bbox).is_some()
    }

    /// Whether any indexed box overlaps `bbox` (touching counts).
    pub fn collides(&self, bbox: &PlacementBox) -> bool {
        self.tree
            .locate_in_envelope_intersecting(&bbox.envelope())
            .next()
            .is_some()
    }

    /// All boxes overlapping the given region.
    pub fn search(
        &self,
        min: [f64; 2],
        max: [f64; 2],
    ) -> impl Iterator<Item = &PlacementBox> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_corners(min, max))
    }

    pub fn all(&self) -> impl Iterator<Item = &PlacementBox> {
        self.tree.iter()
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
