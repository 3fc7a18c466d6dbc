use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::types::ScreenPoint;

/// Tolerance used to treat near-parallel directions as parallel.
pub const GEOMETRY_EPSILON: f64 = 1e-10;

/// Line in general form `a*x + b*y + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Line {
    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Line through two distinct points, `None` when they coincide.
    #[must_use]
    pub fn through_points(p0: ScreenPoint, p1: ScreenPoint) -> Option<Self> {
        if p0 == p1 {
            return None;
        }
        Some(Self {
            a: p0.y - p1.y,
            b: p1.x - p0.x,
            c: p0.x * p1.y - p1.x * p0.y,
        })
    }

    #[must_use]
    pub fn distance_to_point(self, point: ScreenPoint) -> f64 {
        let norm = self.a.hypot(self.b);
        if norm == 0.0 {
            return f64::INFINITY;
        }
        (self.a * point.x + self.b * point.y + self.c).abs() / norm
    }

    #[must_use]
    pub fn intersect(self, other: Self) -> Option<ScreenPoint> {
        let det = self.a * other.b - other.a * self.b;
        if det.abs() < GEOMETRY_EPSILON {
            return None;
        }
        Some(ScreenPoint::new(
            (self.b * other.c - other.b * self.c) / det,
            (other.a * self.c - self.a * other.c) / det,
        ))
    }
}

/// Finite segment between two pixel points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: ScreenPoint,
    pub end: ScreenPoint,
}

impl Segment {
    #[must_use]
    pub const fn new(start: ScreenPoint, end: ScreenPoint) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn direction(self) -> ScreenPoint {
        self.end - self.start
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.direction().length()
    }

    /// Closest point on the segment to `point`.
    #[must_use]
    pub fn closest_point(self, point: ScreenPoint) -> ScreenPoint {
        let direction = self.direction();
        let length_sq = direction.dot(direction);
        if length_sq == 0.0 {
            return self.start;
        }
        let t = ((point - self.start).dot(direction) / length_sq).clamp(0.0, 1.0);
        self.start + direction * t
    }

    #[must_use]
    pub fn distance_to_point(self, point: ScreenPoint) -> f64 {
        self.closest_point(point).distance_to(point)
    }
}

/// Axis-aligned pixel rectangle with inclusive edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxBounds {
    pub min: ScreenPoint,
    pub max: ScreenPoint,
}

impl BoxBounds {
    /// Builds a normalized box from two opposite corners.
    #[must_use]
    pub fn new(a: ScreenPoint, b: ScreenPoint) -> Self {
        Self {
            min: ScreenPoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: ScreenPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    #[must_use]
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(width, height))
    }

    /// Bounding box of a point set, `None` when empty.
    #[must_use]
    pub fn enclosing(points: &[ScreenPoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::new(*first, *first);
        for point in rest {
            bounds.min.x = bounds.min.x.min(point.x);
            bounds.min.y = bounds.min.y.min(point.y);
            bounds.max.x = bounds.max.x.max(point.x);
            bounds.max.y = bounds.max.y.max(point.y);
        }
        Some(bounds)
    }

    #[must_use]
    pub fn width(self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn contains(self, point: ScreenPoint) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    #[must_use]
    pub fn expanded(self, margin: f64) -> Self {
        Self {
            min: ScreenPoint::new(self.min.x - margin, self.min.y - margin),
            max: ScreenPoint::new(self.max.x + margin, self.max.y + margin),
        }
    }

    /// Corners in clockwise order starting at the top-left.
    #[must_use]
    pub fn corners(self) -> [ScreenPoint; 4] {
        [
            self.min,
            ScreenPoint::new(self.max.x, self.min.y),
            self.max,
            ScreenPoint::new(self.min.x, self.max.y),
        ]
    }

    #[must_use]
    pub fn edges(self) -> [Segment; 4] {
        let [a, b, c, d] = self.corners();
        [
            Segment::new(a, b),
            Segment::new(b, c),
            Segment::new(c, d),
            Segment::new(d, a),
        ]
    }

    /// Distance from `point` to the nearest edge, zero on the border.
    #[must_use]
    pub fn distance_to_border(self, point: ScreenPoint) -> f64 {
        self.edges()
            .iter()
            .map(|edge| edge.distance_to_point(point))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Clips the parameter window `[t0, t1]` of `origin + t * delta` against the slab `[lo, hi]`.
///
/// Works per axis; callers run it once for x and once for y. Returns `false`
/// as soon as the window becomes empty.
pub fn clip_slab(origin: f64, delta: f64, lo: f64, hi: f64, t0: &mut f64, t1: &mut f64) -> bool {
    if delta.abs() < GEOMETRY_EPSILON {
        return origin >= lo && origin <= hi;
    }
    let mut enter = (lo - origin) / delta;
    let mut exit = (hi - origin) / delta;
    if enter > exit {
        std::mem::swap(&mut enter, &mut exit);
    }
    *t0 = t0.max(enter);
    *t1 = t1.min(exit);
    *t0 <= *t1
}

/// Parametric window of `origin + t * direction` inside `bounds`, restricted to `t_range`.
#[must_use]
pub fn clip_parameter_range(
    origin: ScreenPoint,
    direction: ScreenPoint,
    t_range: (f64, f64),
    bounds: BoxBounds,
) -> Option<(f64, f64)> {
    let (mut t0, mut t1) = t_range;
    if !clip_slab(origin.x, direction.x, bounds.min.x, bounds.max.x, &mut t0, &mut t1) {
        return None;
    }
    if !clip_slab(origin.y, direction.y, bounds.min.y, bounds.max.y, &mut t0, &mut t1) {
        return None;
    }
    if !t0.is_finite() || !t1.is_finite() {
        // A degenerate direction never narrows the window; nothing visible to report.
        return None;
    }
    Some((t0, t1))
}

#[must_use]
pub fn intersect_segments(first: Segment, second: Segment) -> Option<ScreenPoint> {
    let r = first.direction();
    let s = second.direction();
    let denom = r.cross(s);
    if denom.abs() < GEOMETRY_EPSILON {
        return None;
    }
    let offset = second.start - first.start;
    let t = offset.cross(s) / denom;
    let u = offset.cross(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(first.start + r * t)
    } else {
        None
    }
}

/// Visible piece of an infinite line through `p0`/`p1`.
#[must_use]
pub fn intersect_line_and_box(p0: ScreenPoint, p1: ScreenPoint, bounds: BoxBounds) -> Option<Segment> {
    clip_to_segment(p0, p1 - p0, (f64::NEG_INFINITY, f64::INFINITY), bounds)
}

/// Visible piece of a ray starting at `origin` heading through `through`.
#[must_use]
pub fn intersect_ray_and_box(
    origin: ScreenPoint,
    through: ScreenPoint,
    bounds: BoxBounds,
) -> Option<Segment> {
    clip_to_segment(origin, through - origin, (0.0, f64::INFINITY), bounds)
}

#[must_use]
pub fn intersect_segment_and_box(segment: Segment, bounds: BoxBounds) -> Option<Segment> {
    if segment.start == segment.end {
        return bounds
            .contains(segment.start)
            .then_some(Segment::new(segment.start, segment.start));
    }
    clip_to_segment(segment.start, segment.direction(), (0.0, 1.0), bounds)
}

fn clip_to_segment(
    origin: ScreenPoint,
    direction: ScreenPoint,
    t_range: (f64, f64),
    bounds: BoxBounds,
) -> Option<Segment> {
    if direction.length() < GEOMETRY_EPSILON {
        return None;
    }
    let (t0, t1) = clip_parameter_range(origin, direction, t_range, bounds)?;
    Some(Segment::new(origin + direction * t0, origin + direction * t1))
}

/// Even-odd point-in-polygon test.
#[must_use]
pub fn point_in_polygon(point: ScreenPoint, polygon: &[ScreenPoint]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut previous = polygon[polygon.len() - 1];
    for &current in polygon {
        if (current.y > point.y) != (previous.y > point.y) {
            let x_cross =
                (previous.x - current.x) * (point.y - current.y) / (previous.y - current.y) + current.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

/// Minimum distance from `point` to an open polyline.
#[must_use]
pub fn distance_to_polyline(point: ScreenPoint, polyline: &[ScreenPoint]) -> Option<f64> {
    match polyline {
        [] => None,
        [single] => Some(single.distance_to(point)),
        _ => polyline
            .windows(2)
            .map(|pair| Segment::new(pair[0], pair[1]).distance_to_point(point))
            .reduce(f64::min),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipEdge {
    Left,
    Right,
    Top,
    Bottom,
}

impl ClipEdge {
    fn inside(self, point: ScreenPoint, bounds: BoxBounds) -> bool {
        match self {
            Self::Left => point.x >= bounds.min.x,
            Self::Right => point.x <= bounds.max.x,
            Self::Top => point.y >= bounds.min.y,
            Self::Bottom => point.y <= bounds.max.y,
        }
    }

    fn crossing(self, from: ScreenPoint, to: ScreenPoint, bounds: BoxBounds) -> ScreenPoint {
        let direction = to - from;
        let t = match self {
            Self::Left => (bounds.min.x - from.x) / direction.x,
            Self::Right => (bounds.max.x - from.x) / direction.x,
            Self::Top => (bounds.min.y - from.y) / direction.y,
            Self::Bottom => (bounds.max.y - from.y) / direction.y,
        };
        from + direction * t
    }
}

/// Sutherland–Hodgman clipping of a polygon against a rectangle.
///
/// Returns an empty list when the polygon lies entirely outside.
#[must_use]
pub fn clip_polygon(polygon: &[ScreenPoint], bounds: BoxBounds) -> Vec<ScreenPoint> {
    let mut output: Vec<ScreenPoint> = polygon.to_vec();
    for edge in [ClipEdge::Left, ClipEdge::Right, ClipEdge::Top, ClipEdge::Bottom] {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let mut previous = input[input.len() - 1];
        for &current in &input {
            let current_inside = edge.inside(current, bounds);
            let previous_inside = edge.inside(previous, bounds);
            if current_inside {
                if !previous_inside {
                    output.push(edge.crossing(previous, current, bounds));
                }
                output.push(current);
            } else if previous_inside {
                output.push(edge.crossing(previous, current, bounds));
            }
            previous = current;
        }
    }
    output
}

/// Result of extending and clipping a line to the drawing area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClippedLine {
    Segment(Segment),
    Point(ScreenPoint),
}

/// Optionally extends `p0 -> p1` past either end and clips it to `[0, width] x [0, height]`.
///
/// `extend_left` extends beyond `p0`, `extend_right` beyond `p1`.
#[must_use]
pub fn extend_and_clip(
    p0: ScreenPoint,
    p1: ScreenPoint,
    width: f64,
    height: f64,
    extend_left: bool,
    extend_right: bool,
) -> Option<ClippedLine> {
    let bounds = BoxBounds::from_size(width, height);
    let direction = p1 - p0;
    if direction.length() < GEOMETRY_EPSILON {
        return bounds.contains(p0).then_some(ClippedLine::Point(p0));
    }

    let t_start = if extend_left { f64::NEG_INFINITY } else { 0.0 };
    let t_end = if extend_right { f64::INFINITY } else { 1.0 };
    let (t0, t1) = clip_parameter_range(p0, direction, (t_start, t_end), bounds)?;
    let start = p0 + direction * t0;
    if (t1 - t0).abs() < GEOMETRY_EPSILON {
        return Some(ClippedLine::Point(start));
    }
    Some(ClippedLine::Segment(Segment::new(start, p0 + direction * t1)))
}

/// Intersections of a segment with the rectangle border, ordered along the segment.
#[must_use]
pub fn segment_box_crossings(segment: Segment, bounds: BoxBounds) -> SmallVec<[ScreenPoint; 2]> {
    let mut crossings: SmallVec<[ScreenPoint; 2]> = SmallVec::new();
    for edge in bounds.edges() {
        if let Some(point) = intersect_segments(segment, edge) {
            if crossings
                .iter()
                .all(|existing| existing.distance_to(point) > GEOMETRY_EPSILON)
            {
                crossings.push(point);
            }
        }
    }
    crossings.sort_by(|a, b| {
        a.distance_to(segment.start)
            .total_cmp(&b.distance_to(segment.start))
    });
    crossings
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> ScreenPoint {
        ScreenPoint::new(x, y)
    }

    #[test]
    fn line_through_points_contains_both_points() {
        let line = Line::through_points(p(1.0, 2.0), p(4.0, 8.0)).expect("line");
        assert_relative_eq!(line.distance_to_point(p(1.0, 2.0)), 0.0, epsilon = 1e-12);
        assert_relative_eq!(line.distance_to_point(p(4.0, 8.0)), 0.0, epsilon = 1e-12);
        assert!(Line::through_points(p(1.0, 1.0), p(1.0, 1.0)).is_none());
    }

    #[test]
    fn perpendicular_lines_intersect_at_expected_point() {
        let horizontal = Line::through_points(p(0.0, 5.0), p(10.0, 5.0)).expect("h");
        let vertical = Line::through_points(p(3.0, 0.0), p(3.0, 10.0)).expect("v");
        let hit = horizontal.intersect(vertical).expect("intersection");
        assert_relative_eq!(hit.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(hit.y, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn crossing_segments_intersect_and_parallel_ones_do_not() {
        let a = Segment::new(p(0.0, 0.0), p(10.0, 10.0));
        let b = Segment::new(p(0.0, 10.0), p(10.0, 0.0));
        let hit = intersect_segments(a, b).expect("cross");
        assert_relative_eq!(hit.x, 5.0, epsilon = 1e-12);
        let c = Segment::new(p(0.0, 1.0), p(10.0, 11.0));
        assert!(intersect_segments(a, c).is_none());
    }

    #[test]
    fn extend_and_clip_covers_finite_ray_and_infinite_cases() {
        let finite = extend_and_clip(p(10.0, 10.0), p(20.0, 10.0), 100.0, 50.0, false, false);
        assert_eq!(
            finite,
            Some(ClippedLine::Segment(Segment::new(p(10.0, 10.0), p(20.0, 10.0))))
        );

        let right = extend_and_clip(p(10.0, 10.0), p(20.0, 10.0), 100.0, 50.0, false, true);
        assert_eq!(
            right,
            Some(ClippedLine::Segment(Segment::new(p(10.0, 10.0), p(100.0, 10.0))))
        );

        let both = extend_and_clip(p(10.0, 10.0), p(20.0, 10.0), 100.0, 50.0, true, true);
        assert_eq!(
            both,
            Some(ClippedLine::Segment(Segment::new(p(0.0, 10.0), p(100.0, 10.0))))
        );

        let outside = extend_and_clip(p(-30.0, -10.0), p(-20.0, -10.0), 100.0, 50.0, true, true);
        assert!(outside.is_none());
    }

    #[test]
    fn extend_and_clip_degenerate_segment_returns_point_when_inside() {
        let inside = extend_and_clip(p(5.0, 5.0), p(5.0, 5.0), 10.0, 10.0, true, true);
        assert_eq!(inside, Some(ClippedLine::Point(p(5.0, 5.0))));
        let outside = extend_and_clip(p(50.0, 5.0), p(50.0, 5.0), 10.0, 10.0, true, true);
        assert!(outside.is_none());
    }

    #[test]
    fn polygon_clipping_keeps_only_the_inside_part() {
        let square = [p(-5.0, -5.0), p(5.0, -5.0), p(5.0, 5.0), p(-5.0, 5.0)];
        let clipped = clip_polygon(&square, BoxBounds::from_size(10.0, 10.0));
        let bounds = BoxBounds::enclosing(&clipped).expect("non-empty");
        assert_relative_eq!(bounds.min.x, 0.0);
        assert_relative_eq!(bounds.min.y, 0.0);
        assert_relative_eq!(bounds.max.x, 5.0);
        assert_relative_eq!(bounds.max.y, 5.0);

        let far = [p(50.0, 50.0), p(60.0, 50.0), p(55.0, 60.0)];
        assert!(clip_polygon(&far, BoxBounds::from_size(10.0, 10.0)).is_empty());
    }

    #[test]
    fn point_in_polygon_respects_triangle_edges() {
        let triangle = [p(0.0, 0.0), p(10.0, 0.0), p(5.0, 10.0)];
        assert!(point_in_polygon(p(5.0, 3.0), &triangle));
        assert!(!point_in_polygon(p(0.0, 9.0), &triangle));
    }

    #[test]
    fn ray_box_intersection_starts_at_origin_when_inside() {
        let bounds = BoxBounds::from_size(100.0, 100.0);
        let ray = intersect_ray_and_box(p(50.0, 50.0), p(60.0, 50.0), bounds).expect("ray");
        assert_eq!(ray.start, p(50.0, 50.0));
        assert_relative_eq!(ray.end.x, 100.0);
        assert!(intersect_ray_and_box(p(50.0, 50.0), p(40.0, 150.0), BoxBounds::new(p(60.0, 0.0), p(100.0, 40.0))).is_none());
    }

    #[test]
    fn segment_crossings_are_ordered_from_start() {
        let crossings = segment_box_crossings(
            Segment::new(p(-10.0, 5.0), p(20.0, 5.0)),
            BoxBounds::from_size(10.0, 10.0),
        );
        assert_eq!(crossings.len(), 2);
        assert_relative_eq!(crossings[0].x, 0.0);
        assert_relative_eq!(crossings[1].x, 10.0);
    }
}
