use std::collections::{BTreeMap, HashMap};

use crate::math::triangle::distance_to_line;
use crate::math::Point3;

use super::curve::IntersectionCurve;

/// A curve point lying on one edge of a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PointEdgeRecord {
    /// Triangle the point was found on.
    pub cell: usize,
    /// Local edge index: edge `k` joins corners `k` and `(k + 1) % 3`.
    pub edge: usize,
    /// Curve line that produced the record.
    pub line: usize,
}

/// Per-mesh bookkeeping collected while building the curve.
#[derive(Debug, Clone, Default)]
pub(crate) struct SplitMaps {
    cell_lines: BTreeMap<usize, Vec<usize>>,
    point_edges: BTreeMap<usize, Vec<PointEdgeRecord>>,
    point_cells: HashMap<usize, usize>,
}

impl SplitMaps {
    /// Records that `line` cuts triangle `cell`.
    pub fn add_cell_line(&mut self, cell: usize, line: usize) {
        self.cell_lines.entry(cell).or_default().push(line);
    }

    /// Curve lines cutting `cell`.
    pub fn cell_lines(&self, cell: usize) -> &[usize] {
        self.cell_lines.get(&cell).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if at least one curve line cuts `cell`.
    pub fn is_cut(&self, cell: usize) -> bool {
        self.cell_lines.contains_key(&cell)
    }

    /// Number of cut triangles.
    pub fn num_cut_cells(&self) -> usize {
        self.cell_lines.len()
    }

    /// Makes `cell` the owner of `point` unless it already has one.
    pub fn claim_point(&mut self, point: usize, cell: usize) {
        self.point_cells.entry(point).or_insert(cell);
    }

    /// Triangle owning `point`, used to interpolate its attributes.
    pub fn owner(&self, point: usize) -> Option<usize> {
        self.point_cells.get(&point).copied()
    }

    /// Edge records of every point, ordered by point id.
    pub fn point_edges(&self) -> impl Iterator<Item = (usize, &[PointEdgeRecord])> {
        self.point_edges.iter().map(|(&p, r)| (p, r.as_slice()))
    }

    /// Tries to record `point` (at position `at`) against each edge of the
    /// triangle `cell` with corner positions `triangle`.
    ///
    /// At most one record is kept per (point, triangle): the first edge
    /// found. Returns `true` if the point has a record for this triangle.
    pub fn record_edges(
        &mut self,
        point: usize,
        at: &Point3,
        cell: usize,
        triangle: &[Point3; 3],
        line: usize,
        tolerance: f64,
    ) -> bool {
        let records = self.point_edges.entry(point).or_default();
        if records.iter().any(|r| r.cell == cell) {
            return true;
        }
        for edge in 0..3 {
            let (dist, t) = distance_to_line(at, &triangle[edge], &triangle[(edge + 1) % 3]);
            if dist < tolerance && (0.0..=1.0).contains(&t) {
                records.push(PointEdgeRecord { cell, edge, line });
                return true;
            }
        }
        if records.is_empty() {
            self.point_edges.remove(&point);
        }
        false
    }
}

/// Scratch state threaded through one intersection request.
#[derive(Debug, Clone)]
pub(crate) struct IntersectionContext {
    pub curve: IntersectionCurve,
    pub maps: [SplitMaps; 2],
}

impl IntersectionContext {
    pub fn new(weld_tolerance: f64) -> Self {
        Self {
            curve: IntersectionCurve::new(weld_tolerance),
            maps: [SplitMaps::default(), SplitMaps::default()],
        }
    }
}
