use super::{Point3, Vector3};

/// Unit normal of the triangle `(a, b, c)` following its winding.
///
/// Returns `None` for degenerate (zero-area or non-finite) triangles.
#[must_use]
pub fn triangle_normal(a: &Point3, b: &Point3, c: &Point3) -> Option<Vector3> {
    let n = (b - a).cross(&(c - a));
    let len = n.norm();
    if len.is_finite() && len > 0.0 {
        Some(n / len)
    } else {
        None
    }
}

/// Area of the triangle `(a, b, c)`.
#[must_use]
pub fn triangle_area(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    0.5 * (b - a).cross(&(c - a)).norm()
}

/// Centroid of the triangle `(a, b, c)`.
#[must_use]
pub fn triangle_center(a: &Point3, b: &Point3, c: &Point3) -> Point3 {
    Point3::from((a.coords + b.coords + c.coords) / 3.0)
}

/// Barycentric weights of `p` projected onto the plane of `(a, b, c)`.
///
/// The weights sum to one. A degenerate triangle puts all weight on `a`.
#[must_use]
pub fn barycentric_weights(p: &Point3, a: &Point3, b: &Point3, c: &Point3) -> [f64; 3] {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;
    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);
    let denom = d00 * d11 - d01 * d01;
    if denom.abs() <= f64::EPSILON * d00 * d11 {
        return [1.0, 0.0, 0.0];
    }
    let w1 = (d11 * d20 - d01 * d21) / denom;
    let w2 = (d00 * d21 - d01 * d20) / denom;
    [1.0 - w1 - w2, w1, w2]
}

/// Distance from `p` to the infinite line through `a` and `b`, together with
/// the parameter `t` of the closest point (`a + t * (b - a)`).
///
/// A zero-length segment yields the distance to `a` and `t = 0`.
#[must_use]
pub fn distance_to_line(p: &Point3, a: &Point3, b: &Point3) -> (f64, f64) {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq <= 0.0 {
        return ((p - a).norm(), 0.0);
    }
    let t = (p - a).dot(&ab) / len_sq;
    let closest = a + ab * t;
    ((p - closest).norm(), t)
}

/// Distance from `p` to the closed segment `[a, b]`.
#[must_use]
pub fn distance_to_segment(p: &Point3, a: &Point3, b: &Point3) -> f64 {
    let (dist, t) = distance_to_line(p, a, b);
    if t < 0.0 {
        (p - a).norm()
    } else if t > 1.0 {
        (p - b).norm()
    } else {
        dist
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn normal_follows_winding() {
        let n = triangle_normal(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &p(0.0, 1.0, 0.0));
        assert_eq!(n, Some(Vector3::new(0.0, 0.0, 1.0)));
        let n = triangle_normal(&p(0.0, 0.0, 0.0), &p(0.0, 1.0, 0.0), &p(1.0, 0.0, 0.0));
        assert_eq!(n, Some(Vector3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn collinear_triangle_has_no_normal() {
        let n = triangle_normal(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &p(2.0, 0.0, 0.0));
        assert!(n.is_none());
    }

    #[test]
    fn barycentric_weights_reproduce_point() {
        let (a, b, c) = (p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 2.0, 0.0));
        let q = p(0.5, 0.5, 0.0);
        let w = barycentric_weights(&q, &a, &b, &c);
        let r = a.coords * w[0] + b.coords * w[1] + c.coords * w[2];
        assert_relative_eq!(r, q.coords, epsilon = 1e-12);
        assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn distance_to_line_reports_parameter() {
        let (d, t) = distance_to_line(&p(0.5, 1.0, 0.0), &p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0));
        assert_relative_eq!(d, 1.0);
        assert_relative_eq!(t, 0.5);
    }

    #[test]
    fn distance_to_segment_clamps() {
        let d = distance_to_segment(&p(2.0, 0.0, 0.0), &p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0));
        assert_relative_eq!(d, 1.0);
    }
}
