//! Point label placement: one box beside (or below, for addresses) the
//! node's anchor.

use crate::classify::{RenderAs, RenderMode};
use crate::config::{LabelConfig, TextDirection};
use crate::geometry::Point;
use crate::index::{BoxKey, PlacementBox};

use super::{Collider, PointPosition, TextAnchor};

/// Compute and try to commit a point label. Returns the position on
/// success; a collision or out-of-bounds box yields `None` (the rejected
/// box is kept for the debug overlay).
pub fn place_point_label(
    collider: &mut Collider,
    coord: Point,
    entity: &str,
    width: f64,
    font_size: f64,
    render_as: RenderAs,
    config: &LabelConfig,
) -> Option<PointPosition> {
    // Vertex-mode labels sit level with the anchor; point-mode labels rise
    // above the marker pin.
    let y_shift = if render_as.mode == RenderMode::Point {
        -config.point_label_rise
    } else {
        0.0
    };
    let (dx, dy, text_anchor) = if render_as.is_addr {
        (0.0, 1.0, TextAnchor::Middle)
    } else {
        match config.text_direction {
            TextDirection::Ltr => (config.point_offset, y_shift, TextAnchor::Start),
            TextDirection::Rtl => (-config.point_offset, y_shift, TextAnchor::End),
        }
    };

    let position = PointPosition {
        x: coord[0] + dx,
        y: coord[1] + dy,
        width,
        height: font_size,
        text_anchor,
        is_addr: render_as.is_addr,
    };

    let pad = config.text_padding;
    let half_h = font_size / 2.0 + pad;
    let bbox = if render_as.is_addr {
        PlacementBox::new(
            position.x - width / 2.0 - pad,
            position.y - half_h,
            position.x + width / 2.0 + pad,
            position.y + half_h,
            BoxKey::label(entity),
        )
    } else if config.text_direction == TextDirection::Rtl {
        PlacementBox::new(
            position.x - width - pad,
            position.y - half_h,
            position.x + pad,
            position.y + half_h,
            BoxKey::label(entity),
        )
    } else {
        PlacementBox::new(
            position.x - pad,
            position.y - half_h,
            position.x + width + pad,
            position.y + half_h,
            BoxKey::label(entity),
        )
    };

    collider
        .try_insert(BoxKey::label(entity), vec![bbox], true)
        .then_some(position)
}
