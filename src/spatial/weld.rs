use std::collections::HashMap;

use crate::math::Point3;

/// Assigns one id to all points closer than a tolerance.
///
/// Points are bucketed in a uniform grid whose cell size equals the
/// tolerance, so a lookup only visits the 27 cells around the query. The
/// decision is made once at insertion: existing points never move or merge.
#[derive(Debug, Clone)]
pub struct PointWelder {
    tolerance: f64,
    inv_cell: f64,
    points: Vec<Point3>,
    grid: HashMap<[i64; 3], Vec<usize>>,
}

impl PointWelder {
    /// Creates an empty welder.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        let cell = tolerance.max(f64::MIN_POSITIVE);
        Self {
            tolerance,
            inv_cell: 1.0 / cell,
            points: Vec::new(),
            grid: HashMap::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn key(&self, p: &Point3) -> [i64; 3] {
        [
            (p.x * self.inv_cell).floor() as i64,
            (p.y * self.inv_cell).floor() as i64,
            (p.z * self.inv_cell).floor() as i64,
        ]
    }

    /// Returns the closest stored point within the tolerance of `p`.
    #[must_use]
    pub fn find(&self, p: &Point3) -> Option<usize> {
        let [x, y, z] = self.key(p);
        let tol_sq = self.tolerance * self.tolerance;
        let mut best: Option<(usize, f64)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let cell = [x.saturating_add(dx), y.saturating_add(dy), z.saturating_add(dz)];
                    let Some(ids) = self.grid.get(&cell) else {
                        continue;
                    };
                    for &id in ids {
                        let d = (self.points[id] - p).norm_squared();
                        if d <= tol_sq && best.is_none_or(|(_, bd)| d < bd) {
                            best = Some((id, d));
                        }
                    }
                }
            }
        }
        best.map(|(id, _)| id)
    }

    /// Welds `p` into the set. Returns its id and whether it was new.
    pub fn insert(&mut self, p: Point3) -> (usize, bool) {
        match self.find(&p) {
            Some(id) => (id, false),
            None => (self.push(p), true),
        }
    }

    /// Stores `p` under a new id without looking for an existing match.
    pub fn push(&mut self, p: Point3) -> usize {
        let id = self.points.len();
        let key = self.key(&p);
        self.points.push(p);
        self.grid.entry(key).or_default().push(id);
        id
    }

    /// Returns the stored points, indexed by id.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Returns the number of stored points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if no point has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the weld tolerance.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}
