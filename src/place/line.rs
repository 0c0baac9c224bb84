//! Line label placement: text along a subsegment of the way's path.
//!
//! Trial offsets bias toward the middle of the path and spread outward when
//! the middle is contested. The accepted subsegment is exactly as long as
//! the text and is covered by a chain of small square collision boxes, so
//! crossing labels collide even where their overall extents do not.

use crate::config::LabelConfig;
use crate::geometry::{self, Point};
use crate::index::{BoxKey, PlacementBox};

use super::{Collider, LinePosition};

pub fn place_line_label(
    collider: &mut Collider,
    points: &[Point],
    entity: &str,
    width: f64,
    font_size: f64,
    viewport: &[Point],
    config: &LabelConfig,
) -> Option<LinePosition> {
    let length = geometry::path_length(points);
    if length < width + config.length_margin {
        return None;
    }

    let box_size = (font_size + 2.0) / 2.0;

    for &offset in &config.line_offsets {
        let middle = offset / 100.0 * length;
        let start = middle - width / 2.0;
        if start < 0.0 || start + width > length {
            continue;
        }

        // Extract the subsegment carrying the text; ignore ones that are
        // degenerate or fall outside the viewport entirely.
        let Some(mut sub) = subpath(points, start, start + width) else {
            continue;
        };
        if !geometry::polygon_intersects_polygon(viewport, &sub, true) {
            continue;
        }

        if is_reverse(&sub) {
            sub.reverse();
        }

        let mut boxes = Vec::new();
        for pair in sub.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            // One box per 2 x box_size of path, at least one per segment.
            let num = ((geometry::vec_length(a, b) / box_size / 2.0).floor() as usize).max(1);
            for i in 0..num {
                let p = geometry::vec_interp(a, b, i as f64 / num as f64);
                let half = box_size + config.line_padding;
                boxes.push(PlacementBox::new(
                    p[0] - half,
                    p[1] - half,
                    p[0] + half,
                    p[1] + half,
                    BoxKey::label(entity),
                ));
            }
        }

        if collider.try_insert(BoxKey::label(entity), boxes, false) {
            return Some(LinePosition {
                font_size: font_size + 2.0,
                path: line_string(&sub),
                start_offset: offset,
            });
        }
    }
    None
}

/// Whether text along `p` would read upside-down or right-to-left on
/// screen, based on the endpoints and the initial segment angle.
fn is_reverse(p: &[Point]) -> bool {
    let angle = (p[1][1] - p[0][1]).atan2(p[1][0] - p[0][0]);
    !(p[0][0] < p[p.len() - 1][0]
        && angle < std::f64::consts::FRAC_PI_2
        && angle > -std::f64::consts::FRAC_PI_2)
}

fn line_string(points: &[Point]) -> String {
    let mut out = String::from("M");
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push('L');
        }
        out.push_str(&format!("{},{}", p[0], p[1]));
    }
    out
}

/// The portion of `points` between path distances `from` and `to`, with
/// interpolated endpoints.
fn subpath(points: &[Point], from: f64, to: f64) -> Option<Vec<Point>> {
    let mut sofar = 0.0;
    let mut start: Option<Point> = None;
    let mut end: Option<Point> = None;
    let mut i0 = 0;
    let mut i1 = 0;

    for i in 0..points.len().checked_sub(1)? {
        let a = points[i];
        let b = points[i + 1];
        let current = geometry::vec_length(a, b);
        if current > 0.0 {
            if start.is_none() && sofar + current >= from {
                start = Some(geometry::vec_interp(a, b, (from - sofar) / current));
                i0 = i + 1;
            }
            if end.is_none() && sofar + current >= to {
                end = Some(geometry::vec_interp(a, b, (to - sofar) / current));
                i1 = i + 1;
            }
        }
        sofar += current;
    }

    let start = start?;
    let end = end?;
    let mut result = points.get(i0..i1)?.to_vec();
    result.insert(0, start);
    result.push(end);
    Some(result)
}
