use super::triangle::triangle_normal;
use super::{Point3, Vector3, COPLANAR_TOLERANCE};

/// Which input surface an intersection endpoint was cut from.
///
/// An endpoint of a triangle/triangle segment is always the place where an
/// edge of one of the two triangles pierces the other triangle's plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveOrigin {
    /// The endpoint lies on an edge of the first surface's triangle.
    First,
    /// The endpoint lies on an edge of the second surface's triangle.
    Second,
    /// The endpoint lies on edges of both surfaces.
    Both,
}

impl CurveOrigin {
    /// Numeric code exported in the `SurfaceID` point array (1, 2 or 3).
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Both => 3,
        }
    }

    /// Origin for an endpoint of the surface with the given index (0 or 1).
    #[must_use]
    pub fn of_surface(index: usize) -> Self {
        if index == 0 {
            Self::First
        } else {
            Self::Second
        }
    }
}

/// Result of intersecting two triangles.
#[derive(Debug, Clone, PartialEq)]
pub enum TriangleIntersection {
    /// The triangles do not touch, or the configuration is too degenerate
    /// to produce a segment.
    None,
    /// The supporting planes coincide. No segment is computed.
    Coplanar,
    /// The triangles cross along a segment.
    Segment {
        start: Point3,
        end: Point3,
        /// Origin of `start` and `end`, in that order.
        origins: [CurveOrigin; 2],
    },
}

/// Computes the intersection segment of two triangles.
///
/// Each triangle's vertices are tested against the other triangle's
/// supporting plane; when all three lie strictly on one side there is no
/// intersection. Otherwise both triangles are cut by the line shared by the
/// two planes and the two resulting parameter intervals are overlapped.
///
/// `tolerance` widens the accepted edge parameter range to `(-tol, 1 + tol)`
/// so that hits at triangle vertices are not lost to round-off.
#[must_use]
pub fn intersect_triangles(
    first: &[Point3; 3],
    second: &[Point3; 3],
    tolerance: f64,
) -> TriangleIntersection {
    intersect_triangles_with(first, second, tolerance, COPLANAR_TOLERANCE)
}

/// Same as [`intersect_triangles`] with an explicit tolerance for deciding
/// that the two supporting planes coincide.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn intersect_triangles_with(
    first: &[Point3; 3],
    second: &[Point3; 3],
    tolerance: f64,
    coplanar_tolerance: f64,
) -> TriangleIntersection {
    let (Some(n1), Some(n2)) = (
        triangle_normal(&first[0], &first[1], &first[2]),
        triangle_normal(&second[0], &second[1], &second[2]),
    ) else {
        return TriangleIntersection::None;
    };
    let s1 = -n1.dot(&first[0].coords);
    let s2 = -n2.dot(&second[0].coords);

    // Signed distances of the first triangle to the second plane, and back.
    let dist1 = first.map(|p| n2.dot(&p.coords) + s2);
    if dist1[0] * dist1[1] > 0.0 && dist1[0] * dist1[2] > 0.0 {
        return TriangleIntersection::None;
    }
    let dist2 = second.map(|p| n1.dot(&p.coords) + s1);
    if dist2[0] * dist2[1] > 0.0 && dist2[0] * dist2[2] > 0.0 {
        return TriangleIntersection::None;
    }

    let same = (n1 - n2).amax() < coplanar_tolerance && (s1 - s2).abs() < coplanar_tolerance;
    let flipped = (n1 + n2).amax() < coplanar_tolerance && (s1 + s2).abs() < coplanar_tolerance;
    if same || flipped {
        return TriangleIntersection::Coplanar;
    }

    // Line of intersection between the two planes: L(t) = p + t * v.
    let n1n2 = n1.dot(&n2);
    let denom = n1n2 * n1n2 - 1.0;
    let a = (s1 - s2 * n1n2) / denom;
    let b = (s2 - s1 * n1n2) / denom;
    let p = Point3::from(n1 * a + n2 * b);
    let v = n1.cross(&n2);
    let v_len = v.norm();
    if !(v_len.is_finite() && v_len > 0.0) {
        return TriangleIntersection::None;
    }
    let v = v / v_len;

    let Some(t1) = line_interval(first, &n2, &second[0], &p, &v, tolerance) else {
        return TriangleIntersection::None;
    };
    let Some(t2) = line_interval(second, &n1, &first[0], &p, &v, tolerance) else {
        return TriangleIntersection::None;
    };

    if t1[1] < t2[0] || t2[1] < t1[0] {
        return TriangleIntersection::None;
    }

    let (origins, tt1, tt2) = if t1[0] < t2[0] {
        if t1[1] < t2[1] {
            ([CurveOrigin::Second, CurveOrigin::First], t2[0], t1[1])
        } else {
            ([CurveOrigin::Second, CurveOrigin::Second], t2[0], t2[1])
        }
    } else if t1[1] < t2[1] {
        ([CurveOrigin::First, CurveOrigin::First], t1[0], t1[1])
    } else {
        ([CurveOrigin::First, CurveOrigin::Second], t1[0], t2[1])
    };

    TriangleIntersection::Segment {
        start: p + v * tt1,
        end: p + v * tt2,
        origins,
    }
}

/// Cuts a triangle's edges with a plane and returns the sorted parameters of
/// the two hits along the line `line_point + t * dir`.
///
/// Returns `None` unless exactly two hits remain, or if a parameter is NaN.
fn line_interval(
    triangle: &[Point3; 3],
    plane_normal: &Vector3,
    plane_point: &Point3,
    line_point: &Point3,
    dir: &Vector3,
    tolerance: f64,
) -> Option<[f64; 2]> {
    // (edge parameter, line parameter)
    let mut hits: Vec<(f64, f64)> = Vec::with_capacity(3);
    for i in 0..3 {
        let a = triangle[i];
        let b = triangle[(i + 1) % 3];
        let ab = b - a;
        let denom = plane_normal.dot(&ab);
        if denom.abs() <= f64::EPSILON {
            continue;
        }
        let t = plane_normal.dot(&(plane_point - a)) / denom;
        if t > -tolerance && t < 1.0 + tolerance {
            let x = a + ab * t;
            hits.push((t, dir.dot(&(x - line_point))));
        }
    }

    // A plane through a vertex is hit by both incident edges; keep the hit
    // that starts an edge and drop the one that ends the previous edge.
    if hits.len() == 3 {
        let end_hit = hits
            .iter()
            .rposition(|&(t, _)| (t - 1.0).abs() < tolerance)?;
        hits.remove(end_hit);
    }
    if hits.len() != 2 {
        return None;
    }

    let (t0, t1) = (hits[0].1, hits[1].1);
    if t0.is_nan() || t1.is_nan() {
        return None;
    }
    Some(if t0 > t1 { [t1, t0] } else { [t0, t1] })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::triangle::barycentric_weights;
    use crate::math::WELD_TOLERANCE;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn segment(result: &TriangleIntersection) -> (Point3, Point3) {
        match result {
            TriangleIntersection::Segment { start, end, .. } => (*start, *end),
            other => panic!("expected Segment, got {other:?}"),
        }
    }

    fn plane_distance(tri: &[Point3; 3], x: &Point3) -> f64 {
        let n = triangle_normal(&tri[0], &tri[1], &tri[2]).unwrap();
        n.dot(&(x - tri[0]))
    }

    fn inside(tri: &[Point3; 3], x: &Point3) -> bool {
        barycentric_weights(x, &tri[0], &tri[1], &tri[2])
            .iter()
            .all(|&w| w > -1e-9)
    }

    fn horizontal() -> [Point3; 3] {
        [p(-1.0, -1.0, 0.0), p(2.0, -1.0, 0.0), p(-1.0, 2.0, 0.0)]
    }

    fn vertical() -> [Point3; 3] {
        [p(-0.5, 0.0, -1.0), p(0.5, 0.0, -1.0), p(0.0, 0.0, 1.0)]
    }

    #[test]
    fn perpendicular_triangles_cross() {
        let (a, b) = segment(&intersect_triangles(&horizontal(), &vertical(), WELD_TOLERANCE));
        // The vertical triangle is cut at z = 0 between x = -0.25 and x = 0.25.
        let len = (b - a).norm();
        assert_relative_eq!(len, 0.5, epsilon = 1e-12);
        for x in [a, b] {
            assert_relative_eq!(x.y, 0.0, epsilon = 1e-12);
            assert_relative_eq!(x.z, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn endpoints_lie_on_both_planes_and_inside_both_triangles() {
        let first = [p(0.0, 0.0, 0.0), p(3.0, 0.2, 0.1), p(0.5, 2.5, -0.3)];
        let second = [p(1.0, 1.0, -2.0), p(1.2, 0.4, 2.0), p(0.2, 0.8, 1.5)];
        let result = intersect_triangles(&first, &second, WELD_TOLERANCE);
        let (a, b) = segment(&result);
        for x in [a, b] {
            assert!(plane_distance(&first, &x).abs() < 1e-9);
            assert!(plane_distance(&second, &x).abs() < 1e-9);
            assert!(inside(&first, &x), "{x:?} outside first triangle");
            assert!(inside(&second, &x), "{x:?} outside second triangle");
        }
    }

    #[test]
    fn intersection_is_symmetric() {
        let ab = intersect_triangles(&horizontal(), &vertical(), WELD_TOLERANCE);
        let ba = intersect_triangles(&vertical(), &horizontal(), WELD_TOLERANCE);
        let (a0, a1) = segment(&ab);
        let (b0, b1) = segment(&ba);
        let same = (a0 - b0).norm() < 1e-12 && (a1 - b1).norm() < 1e-12;
        let swapped = (a0 - b1).norm() < 1e-12 && (a1 - b0).norm() < 1e-12;
        assert!(same || swapped, "{ab:?} vs {ba:?}");
    }

    #[test]
    fn separated_triangles_do_not_intersect() {
        let lifted = vertical().map(|q| q + Vector3::new(0.0, 0.0, 5.0));
        assert_eq!(
            intersect_triangles(&horizontal(), &lifted, WELD_TOLERANCE),
            TriangleIntersection::None
        );
    }

    #[test]
    fn planes_cross_but_triangles_miss() {
        let shifted = vertical().map(|q| q + Vector3::new(10.0, 0.0, 0.0));
        assert_eq!(
            intersect_triangles(&horizontal(), &shifted, WELD_TOLERANCE),
            TriangleIntersection::None
        );
    }

    #[test]
    fn coincident_triangles_are_coplanar() {
        let tri = horizontal();
        assert_eq!(
            intersect_triangles(&tri, &tri, WELD_TOLERANCE),
            TriangleIntersection::Coplanar
        );
    }

    #[test]
    fn flipped_coincident_triangles_are_coplanar() {
        let tri = horizontal();
        let flipped = [tri[0], tri[2], tri[1]];
        assert_eq!(
            intersect_triangles(&tri, &flipped, WELD_TOLERANCE),
            TriangleIntersection::Coplanar
        );
    }

    #[test]
    fn vertex_touching_plane_is_not_rejected_early() {
        // The vertical triangle only touches the horizontal plane with one vertex.
        let touching = [p(0.0, 0.0, 0.0), p(0.5, 0.0, 1.0), p(-0.5, 0.0, 1.0)];
        let result = intersect_triangles(&horizontal(), &touching, WELD_TOLERANCE);
        let (a, b) = segment(&result);
        assert!((a - b).norm() < 1e-12);
        assert!((a - p(0.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn plane_through_vertex_keeps_two_hits() {
        // The horizontal plane passes through the apex-opposite vertex of this triangle.
        let through = [p(0.0, 0.0, 0.0), p(0.5, 0.0, 1.0), p(0.5, 0.0, -1.0)];
        let result = intersect_triangles(&horizontal(), &through, WELD_TOLERANCE);
        let (a, b) = segment(&result);
        assert_relative_eq!((b - a).norm(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn origins_track_contributing_surface() {
        // The vertical triangle is narrower than the horizontal one along the
        // cut line, so both endpoints come from the second surface.
        match intersect_triangles(&horizontal(), &vertical(), WELD_TOLERANCE) {
            TriangleIntersection::Segment { origins, .. } => {
                assert_eq!(origins, [CurveOrigin::Second, CurveOrigin::Second]);
            }
            other => panic!("expected Segment, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_triangle_is_ignored() {
        let sliver = [p(0.0, 0.0, -1.0), p(0.0, 0.0, 0.0), p(0.0, 0.0, 1.0)];
        assert_eq!(
            intersect_triangles(&horizontal(), &sliver, WELD_TOLERANCE),
            TriangleIntersection::None
        );
    }
}
