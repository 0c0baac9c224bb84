//! The placement pass: candidate selection, priority buckets, marker
//! reservations, and the hover hiding support.
//!
//! A redraw walks the changed entities twice. The first pass reserves
//! collision space for point/vertex markers and sorts labelable entities
//! into priority buckets. The second pass runs bucket by bucket, so an
//! entity claimed by an earlier rule gets first pick of screen space.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::classify::{self, RenderAs, RenderMode};
use crate::config::LabelConfig;
use crate::geometry::{Point, Projection};
use crate::index::{BoxKey, BoxRole, PlacementBox};
use crate::place::{Collider, LabelPosition, PlacedLabel, PlacedLabels, area, line, point};
use crate::scene::{GeometryKind, PresetIndex, Scene};
use crate::text_metrics::{TextMetrics, TextWidthCache};

/// Viewport state for one redraw.
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub projection: Projection,
    pub dimensions: [f64; 2],
    pub wireframe: bool,
}

impl View {
    pub fn new(projection: Projection, dimensions: [f64; 2]) -> Self {
        Self { projection, dimensions, wireframe: false }
    }
}

pub struct LabelEngine<M> {
    config: LabelConfig,
    presets: PresetIndex,
    metrics: TextWidthCache<M>,
    collider: Collider,
}

impl<M: TextMetrics> LabelEngine<M> {
    pub fn new(config: LabelConfig, metrics: M) -> Self {
        let presets = PresetIndex::new(config.presets.clone());
        Self {
            presets,
            metrics: TextWidthCache::new(metrics),
            collider: Collider::new([0.0, 0.0]),
            config,
        }
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Collision state, exposed for debug overlays and dumps.
    pub fn collider(&self) -> &Collider {
        &self.collider
    }

    /// Place labels for `entities`. A full redraw resets all collision
    /// state first; an incremental one only forgets the boxes previously
    /// owned by the given entities, leaving the rest of the screen alone.
    pub fn place_labels(
        &mut self,
        scene: &Scene,
        entities: &[String],
        view: &View,
        full_redraw: bool,
    ) -> PlacedLabels {
        let zoom = view.projection.zoom();
        self.collider.set_dimensions(view.dimensions);

        if full_redraw {
            self.collider.clear();
        } else {
            for id in entities {
                self.collider.forget(id);
            }
        }

        let mut render_as: HashMap<String, RenderAs> = HashMap::new();
        let mut buckets: Vec<Vec<String>> = vec![Vec::new(); self.config.stack.len()];

        for id in entities {
            let Some(entity) = scene.entity(id) else { continue };
            let geometry = scene.geometry(entity);

            if geometry == GeometryKind::Point
                || (geometry == GeometryKind::Vertex
                    && classify::is_interesting_vertex(scene, entity))
            {
                let render =
                    classify::render_node_as(entity, geometry, zoom, view.wireframe, &self.config);
                render_as.insert(entity.id.clone(), render);

                if render.is_addr {
                    // Address points have no pin; free any stale reservation.
                    self.collider.release(&BoxKey::marker(&entity.id));
                } else if let Some(coord) = scene.projected_loc(entity, &view.projection) {
                    let marker_padding = if render.mode == RenderMode::Point {
                        self.config.marker_padding
                    } else {
                        0.0
                    };
                    let pad = self.config.node_padding;
                    self.collider.reserve(PlacementBox::new(
                        coord[0] - pad,
                        coord[1] - pad - marker_padding,
                        coord[0] + pad,
                        coord[1] + pad,
                        BoxKey::marker(&entity.id),
                    ));
                }
            }

            // Vertices compete for space as points from here on.
            let geometry = if geometry == GeometryKind::Vertex {
                GeometryKind::Point
            } else {
                geometry
            };

            let preset = (geometry == GeometryKind::Area)
                .then(|| self.presets.match_entity(entity))
                .flatten();
            let icon = preset
                .filter(|p| !classify::icon_suppressed(p))
                .and_then(|p| p.icon.as_deref());
            if icon.is_none() && entity.display_name().is_none() {
                continue;
            }

            if let Some(k) = classify::match_rule(&self.config.stack, geometry, &entity.tags) {
                buckets[k].push(entity.id.clone());
            }
        }

        let viewport = viewport_ring(view.dimensions);
        let mut placed = PlacedLabels::default();

        for (k, bucket) in buckets.iter().enumerate() {
            let font_size = self.config.stack[k].font_size;
            let rule_key = self.config.stack[k].key.clone();

            for id in bucket {
                let Some(entity) = scene.entity(id) else { continue };
                let geometry = scene.geometry(entity);

                let result = match geometry {
                    GeometryKind::Point | GeometryKind::Vertex => {
                        // No point or vertex labels in wireframe mode; no
                        // vertex labels at low zooms (vertices have no icons).
                        if view.wireframe {
                            continue;
                        }
                        let render = render_as.get(id).copied().unwrap_or(RenderAs {
                            mode: RenderMode::Point,
                            is_addr: false,
                        });
                        if render.mode == RenderMode::Vertex && zoom < self.config.vertex_label_zoom
                        {
                            continue;
                        }
                        let Some(name) = entity.display_name() else { continue };
                        let mut label = name.to_string();
                        let mut width = self.metrics.measure(&label, font_size);
                        if render.is_addr {
                            while width > self.config.addr_max_width {
                                let mut chars: Vec<char> = label.chars().collect();
                                if chars.last() == Some(&'…') {
                                    chars.pop();
                                }
                                if chars.len() <= 1 {
                                    break;
                                }
                                chars.pop();
                                chars.push('…');
                                label = chars.into_iter().collect();
                                width = self.metrics.measure(&label, font_size);
                            }
                        }
                        let Some(coord) = scene.projected_loc(entity, &view.projection) else {
                            continue;
                        };
                        point::place_point_label(
                            &mut self.collider,
                            coord,
                            id,
                            width,
                            font_size,
                            render,
                            &self.config,
                        )
                        .map(|p| (label, LabelPosition::Point(p)))
                    }
                    GeometryKind::Line => {
                        let Some(name) = entity.display_name_for_path() else { continue };
                        let width = self.metrics.measure(name, font_size);
                        let points = scene.child_points(entity, &view.projection);
                        line::place_line_label(
                            &mut self.collider,
                            &points,
                            id,
                            width,
                            font_size,
                            &viewport,
                            &self.config,
                        )
                        .map(|p| (name.to_string(), LabelPosition::Line(p)))
                    }
                    GeometryKind::Area => {
                        let name = entity.display_name();
                        let width = name.map(|n| self.metrics.measure(n, font_size));
                        let preset = self.presets.match_entity(entity);
                        let points = scene.child_points(entity, &view.projection);
                        area::place_area_label(
                            &mut self.collider,
                            &points,
                            id,
                            preset,
                            width,
                            font_size,
                            &self.config,
                        )
                        .map(|p| (name.unwrap_or_default().to_string(), LabelPosition::Area(p)))
                    }
                };

                if let Some((name, position)) = result {
                    let class_geometry = match geometry {
                        GeometryKind::Point | GeometryKind::Vertex => "point",
                        GeometryKind::Line => "line",
                        GeometryKind::Area => "area",
                    };
                    let label = PlacedLabel {
                        entity: id.clone(),
                        name,
                        classes: format!("{class_geometry} tag-{rule_key}"),
                        position,
                    };
                    match label.position {
                        LabelPosition::Point(_) => placed.point.push(label),
                        LabelPosition::Line(_) => placed.line.push(label),
                        LabelPosition::Area(_) => placed.area.push(label),
                    }
                }
            }
        }

        placed
    }

    /// Entity ids whose labels should hide while the pointer is near them.
    /// Selected entities keep their labels. Only text-label boxes count;
    /// marker and icon reservations never trigger hiding on their own.
    pub fn hidden_near(&self, pointer: Point, selected: &HashSet<String>) -> Vec<String> {
        let pad = self.config.hover_padding;
        let mut ids: Vec<String> = self
            .collider
            .drawn()
            .search(
                [pointer[0] - pad, pointer[1] - pad],
                [pointer[0] + pad, pointer[1] + pad],
            )
            .filter(|bbox| bbox.key.role == BoxRole::Label)
            .map(|bbox| bbox.key.entity.clone())
            .filter(|id| !selected.contains(id))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

fn viewport_ring(dimensions: [f64; 2]) -> Vec<Point> {
    let [w, h] = dimensions;
    vec![[0.0, 0.0], [w, 0.0], [w, h], [0.0, h], [0.0, 0.0]]
}

/// Trailing-edge rate limiter for the hover hiding pass.
///
/// `request` either runs immediately (returns true) or marks the call as
/// pending; `poll` reports when a pending call has waited out the window.
/// `cancel` drops a pending call, as when the pointer leaves the map.
#[derive(Debug)]
pub struct Throttle {
    window: Duration,
    last_run: Option<Instant>,
    pending: bool,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self { window, last_run: None, pending: false }
    }

    pub fn request(&mut self, now: Instant) -> bool {
        match self.last_run {
            Some(last) if now.duration_since(last) < self.window => {
                self.pending = true;
                false
            }
            _ => {
                self.last_run = Some(now);
                self.pending = false;
                true
            }
        }
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.pending {
            return false;
        }
        match self.last_run {
            Some(last) if now.duration_since(last) < self.window => false,
            _ => {
                self.last_run = Some(now);
                self.pending = false;
                true
            }
        }
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }
}
