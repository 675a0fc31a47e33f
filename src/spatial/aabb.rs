use crate::math::{Point3, Vector3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    /// An empty box that any point will grow.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box containing all `points`.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        points.into_iter().fold(Self::empty(), |mut acc, p| {
            acc.grow(p);
            acc
        })
    }

    /// Grows the box to contain `p`.
    pub fn grow(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Grows the box to contain `other`.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Returns the box inflated by `margin` on every side.
    #[must_use]
    pub fn loosened(&self, margin: f64) -> Self {
        let m = Vector3::repeat(margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Box extents along each axis.
    #[must_use]
    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }

    /// Box center.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Checks if two boxes overlap (touching counts).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Conservative triangle/box overlap test.
    ///
    /// Rejects the triangle only if its bounds miss the box or if all eight
    /// box corners lie strictly on one side of the triangle's plane. False
    /// positives are possible, false negatives are not.
    #[must_use]
    pub fn may_intersect_triangle(&self, triangle: &[Point3; 3], margin: f64) -> bool {
        let bounds = self.loosened(margin);
        if !bounds.intersects(&Self::from_points(triangle)) {
            return false;
        }
        let normal = (triangle[1] - triangle[0]).cross(&(triangle[2] - triangle[0]));
        let len = normal.norm();
        if !(len.is_finite() && len > 0.0) {
            return true;
        }
        let normal = normal / len;
        let center = bounds.center();
        let half = bounds.extents() * 0.5;
        let dist = normal.dot(&(center - triangle[0]));
        let radius = half.x * normal.x.abs() + half.y * normal.y.abs() + half.z * normal.z.abs();
        dist.abs() <= radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn unit() -> Aabb {
        Aabb::from_points(&[p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)])
    }

    #[test]
    fn touching_boxes_intersect() {
        let other = Aabb::from_points(&[p(1.0, 0.0, 0.0), p(2.0, 1.0, 1.0)]);
        assert!(unit().intersects(&other));
        let apart = Aabb::from_points(&[p(1.5, 0.0, 0.0), p(2.0, 1.0, 1.0)]);
        assert!(!unit().intersects(&apart));
    }

    #[test]
    fn triangle_plane_outside_box_is_rejected() {
        // Bounds overlap, but the tilted plane passes beyond the box corner.
        let tri = [p(2.9, 0.1, 0.1), p(0.1, 2.9, 0.1), p(0.1, 0.1, 2.9)];
        assert!(!unit().may_intersect_triangle(&tri, 0.0));
        assert!(unit().may_intersect_triangle(&tri, 0.1));
    }

    #[test]
    fn triangle_through_box_is_kept() {
        let tri = [p(-1.0, -1.0, 0.5), p(3.0, -1.0, 0.5), p(-1.0, 3.0, 0.5)];
        assert!(unit().may_intersect_triangle(&tri, 0.0));
    }
}
