//! Screen-space geometry helpers shared by the placement strategies.

use serde::{Deserialize, Serialize};

pub type Point = [f64; 2];

pub fn vec_length(a: Point, b: Point) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    (dx * dx + dy * dy).sqrt()
}

/// Linear interpolation between `a` and `b` at parameter `t`.
pub fn vec_interp(a: Point, b: Point, t: f64) -> Point {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]
}

pub fn path_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|pair| vec_length(pair[0], pair[1]))
        .sum()
}

/// Ray-cast point-in-polygon test. The polygon is implicitly closed.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a[1] > point[1]) != (b[1] > point[1]) {
            let x = (b[0] - a[0]) * (point[1] - a[1]) / (b[1] - a[1]) + a[0];
            if point[0] < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn point_on_segment(point: Point, a: Point, b: Point, eps: f64) -> bool {
    point[0] >= a[0].min(b[0]) - eps
        && point[0] <= a[0].max(b[0]) + eps
        && point[1] >= a[1].min(b[1]) - eps
        && point[1] <= a[1].max(b[1]) + eps
}

pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let eps = 1e-9;
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);
    let crosses = ((o1 > eps && o2 < -eps) || (o1 < -eps && o2 > eps))
        && ((o3 > eps && o4 < -eps) || (o3 < -eps && o4 > eps));
    if crosses {
        return true;
    }
    (o1.abs() <= eps && point_on_segment(c, a, b, eps))
        || (o2.abs() <= eps && point_on_segment(d, a, b, eps))
        || (o3.abs() <= eps && point_on_segment(a, c, d, eps))
        || (o4.abs() <= eps && point_on_segment(b, c, d, eps))
}

fn paths_intersect(outer: &[Point], inner: &[Point]) -> bool {
    for seg_a in outer.windows(2) {
        for seg_b in inner.windows(2) {
            if segments_intersect(seg_a[0], seg_a[1], seg_b[0], seg_b[1]) {
                return true;
            }
        }
    }
    false
}

/// Whether `inner` (a polyline or polygon ring) intersects the `outer`
/// polygon: any inner point lies inside, or (with `check_segments`) any
/// segment of one crosses a segment of the other.
pub fn polygon_intersects_polygon(outer: &[Point], inner: &[Point], check_segments: bool) -> bool {
    if inner.iter().any(|&p| point_in_polygon(p, outer)) {
        return true;
    }
    check_segments && paths_intersect(outer, inner)
}

/// Area-weighted centroid of a polygon ring. `None` when the ring is
/// degenerate (fewer than three points or zero signed area).
pub fn polygon_centroid(points: &[Point]) -> Option<Point> {
    if points.len() < 3 {
        return None;
    }
    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let a = points[j];
        let b = points[i];
        let cross = a[0] * b[1] - b[0] * a[1];
        area += cross;
        cx += (a[0] + b[0]) * cross;
        cy += (a[1] + b[1]) * cross;
        j = i;
    }
    if area.abs() < 1e-12 {
        return None;
    }
    let factor = 1.0 / (3.0 * area);
    let centroid = [cx * factor, cy * factor];
    if centroid[0].is_nan() || centroid[1].is_nan() {
        return None;
    }
    Some(centroid)
}

/// Axis-aligned bounds of a point set as `(min, max)`.
pub fn extent(points: &[Point]) -> Option<(Point, Point)> {
    let first = *points.first()?;
    let mut min = first;
    let mut max = first;
    for p in &points[1..] {
        min[0] = min[0].min(p[0]);
        min[1] = min[1].min(p[1]);
        max[0] = max[0].max(p[0]);
        max[1] = max[1].max(p[1]);
    }
    Some((min, max))
}

const TILE_SIZE: f64 = 256.0;

/// Map scale factor to tile zoom level.
pub fn scale_to_zoom(k: f64) -> f64 {
    (k * 2.0 * std::f64::consts::PI / TILE_SIZE).log2()
}

/// Tile zoom level to map scale factor.
pub fn zoom_to_scale(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom) / (2.0 * std::f64::consts::PI)
}

/// Spherical-mercator screen projection: lon/lat degrees to pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Projection {
    pub scale: f64,
    pub translate: Point,
}

impl Projection {
    pub fn new(scale: f64, translate: Point) -> Self {
        Self { scale, translate }
    }

    pub fn for_zoom(zoom: f64, translate: Point) -> Self {
        Self::new(zoom_to_scale(zoom), translate)
    }

    pub fn zoom(&self) -> f64 {
        scale_to_zoom(self.scale)
    }

    pub fn project(&self, loc: Point) -> Point {
        let lambda = loc[0].to_radians();
        // Clamp latitude to the mercator domain.
        let phi = loc[1].clamp(-85.0511287, 85.0511287).to_radians();
        let x = self.translate[0] + self.scale * lambda;
        let y = self.translate[1] - self.scale * (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln();
        [x, y]
    }

    pub fn invert(&self, point: Point) -> Point {
        let lambda = (point[0] - self.translate[0]) / self.scale;
        let phi =
            2.0 * ((self.translate[1] - point[1]) / self.scale).exp().atan() - std::f64::consts::FRAC_PI_2;
        [lambda.to_degrees(), phi.to_degrees()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_length_sums_segments() {
        let points = [[0.0, 0.0], [3.0, 4.0], [3.0, 14.0]];
        assert!((path_length(&points) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn interp_midpoint() {
        let p = vec_interp([0.0, 0.0], [10.0, 20.0], 0.5);
        assert_eq!(p, [5.0, 10.0]);
    }

    #[test]
    fn point_in_unit_square() {
        let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        assert!(point_in_polygon([0.5, 0.5], &square));
        assert!(!point_in_polygon([1.5, 0.5], &square));
    }

    #[test]
    fn polyline_crossing_polygon_intersects() {
        let square = [
            [0.0, 0.0],
            [10.0, 0.0],
            [10.0, 10.0],
            [0.0, 10.0],
            [0.0, 0.0],
        ];
        // Crosses the square without any endpoint inside it.
        let line = [[-5.0, 5.0], [15.0, 5.0]];
        assert!(polygon_intersects_polygon(&square, &line, true));
        assert!(!polygon_intersects_polygon(&square, &line, false));
        let far = [[20.0, 20.0], [30.0, 20.0]];
        assert!(!polygon_intersects_polygon(&square, &far, true));
    }

    #[test]
    fn centroid_of_square() {
        let square = [
            [0.0, 0.0],
            [4.0, 0.0],
            [4.0, 4.0],
            [0.0, 4.0],
            [0.0, 0.0],
        ];
        let c = polygon_centroid(&square).unwrap();
        assert!((c[0] - 2.0).abs() < 1e-9);
        assert!((c[1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_centroid_is_none() {
        assert!(polygon_centroid(&[[0.0, 0.0], [1.0, 1.0]]).is_none());
        assert!(polygon_centroid(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]).is_none());
    }

    #[test]
    fn projection_roundtrip() {
        let projection = Projection::for_zoom(17.0, [400.0, 300.0]);
        let loc = projection.invert([123.0, 456.0]);
        let back = projection.project(loc);
        assert!((back[0] - 123.0).abs() < 1e-6);
        assert!((back[1] - 456.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_scale_roundtrip() {
        let k = zoom_to_scale(18.0);
        assert!((scale_to_zoom(k) - 18.0).abs() < 1e-9);
    }
}
