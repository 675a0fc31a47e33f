use std::collections::HashSet;

use crate::error::Result;
use crate::math::intersect_3d::CurveOrigin;
use crate::math::Point3;
use crate::mesh::links::edge_key;
use crate::mesh::{AttributeArray, AttributeData, Mesh};
use crate::spatial::PointWelder;

use super::context::IntersectionContext;

/// The welded intersection curve: a point set plus two-point lines.
///
/// Each line remembers the triangle it was cut from in both input meshes and
/// each point remembers which surface's edge produced it.
#[derive(Debug, Clone)]
pub struct IntersectionCurve {
    welder: PointWelder,
    origins: Vec<CurveOrigin>,
    lines: Vec<[usize; 2]>,
    line_cells: Vec<[usize; 2]>,
    new_cells: [Vec<[Option<usize>; 2]>; 2],
    connected: HashSet<(usize, usize)>,
}

impl IntersectionCurve {
    /// Creates an empty curve welding points closer than `weld_tolerance`.
    #[must_use]
    pub fn new(weld_tolerance: f64) -> Self {
        Self {
            welder: PointWelder::new(weld_tolerance),
            origins: Vec::new(),
            lines: Vec::new(),
            line_cells: Vec::new(),
            new_cells: [Vec::new(), Vec::new()],
            connected: HashSet::new(),
        }
    }

    /// Curve points, indexed by point id.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        self.welder.points()
    }

    /// Lines as pairs of point ids.
    #[must_use]
    pub fn lines(&self) -> &[[usize; 2]] {
        &self.lines
    }

    /// Source triangle of each line in the first and second mesh.
    #[must_use]
    pub fn line_cells(&self) -> &[[usize; 2]] {
        &self.line_cells
    }

    /// Cells of split output `surface` (0 or 1) that border each line.
    ///
    /// Empty until that mesh has been split. Slots are `None` when fewer
    /// than two output cells have the line as an edge.
    #[must_use]
    pub fn new_cells(&self, surface: usize) -> &[[Option<usize>; 2]] {
        match self.new_cells.get(surface) {
            Some(cells) => cells,
            None => &[],
        }
    }

    /// Origin surface of each point.
    #[must_use]
    pub fn origins(&self) -> &[CurveOrigin] {
        &self.origins
    }

    /// Number of points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.welder.len()
    }

    /// Number of lines.
    #[must_use]
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the curve has no line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns `true` if a line joins points `a` and `b`, in either order.
    #[must_use]
    pub fn has_line(&self, a: usize, b: usize) -> bool {
        self.connected.contains(&edge_key(a, b))
    }

    /// Welds `p` into the curve and updates its origin. Returns the point id
    /// and whether the point is new.
    ///
    /// An existing point already marked [`CurveOrigin::Both`] keeps it.
    pub(crate) fn weld(&mut self, p: Point3, origin: CurveOrigin) -> (usize, bool) {
        let (id, inserted) = self.welder.insert(p);
        if inserted {
            self.origins.push(origin);
        } else if self.origins[id] != CurveOrigin::Both {
            self.origins[id] = origin;
        }
        (id, inserted)
    }

    pub(crate) fn set_origin(&mut self, point: usize, origin: CurveOrigin) {
        if let Some(o) = self.origins.get_mut(point) {
            *o = origin;
        }
    }

    pub(crate) fn set_new_cells(&mut self, surface: usize, cells: Vec<[Option<usize>; 2]>) {
        if let Some(slot) = self.new_cells.get_mut(surface) {
            *slot = cells;
        }
    }

    pub(crate) fn push_line(&mut self, a: usize, b: usize, cells: [usize; 2]) -> usize {
        self.lines.push([a, b]);
        self.line_cells.push(cells);
        self.connected.insert(edge_key(a, b));
        self.lines.len() - 1
    }

    /// Exports the curve as a polyline mesh.
    ///
    /// Points carry the `SurfaceID` array (1, 2 or 3), lines carry the
    /// `Input0CellID` and `Input1CellID` arrays plus the two-component
    /// `NewCell0ID` and `NewCell1ID` arrays naming the bordering cells of
    /// each split output (-1 where unknown).
    ///
    /// # Errors
    ///
    /// Returns an error if a point is not finite.
    #[allow(clippy::cast_possible_wrap)]
    pub fn to_mesh(&self) -> Result<Mesh> {
        let polys = self.lines.iter().map(|l| l.to_vec()).collect();

        let mut point_data = AttributeData::new();
        point_data.add_array(AttributeArray::int(
            "SurfaceID",
            1,
            self.origins.iter().map(|o| o.code()).collect(),
        )?);

        let mut cell_data = AttributeData::new();
        for (k, name) in ["Input0CellID", "Input1CellID"].into_iter().enumerate() {
            let ids = self.line_cells.iter().map(|c| c[k] as i64).collect();
            cell_data.add_array(AttributeArray::int(name, 1, ids)?);
        }
        for (surface, name) in ["NewCell0ID", "NewCell1ID"].into_iter().enumerate() {
            let ids = (0..self.lines.len())
                .flat_map(|line| {
                    let cells = self.new_cells[surface].get(line).copied().unwrap_or([None; 2]);
                    cells.map(|c| c.map_or(-1, |c| c as i64))
                })
                .collect();
            cell_data.add_array(AttributeArray::int(name, 2, ids)?);
        }

        Ok(Mesh::new(self.points().to_vec(), polys)?
            .with_point_data(point_data)
            .with_cell_data(cell_data))
    }
}

/// One non-coplanar triangle/triangle hit.
#[derive(Debug, Clone)]
pub(crate) struct SegmentHit {
    /// Triangle ids in the first and second mesh.
    pub cells: [usize; 2],
    /// Corner positions of both triangles.
    pub triangles: [[Point3; 3]; 2],
    pub start: Point3,
    pub end: Point3,
    pub origins: [CurveOrigin; 2],
}

/// Welds a segment into the curve and updates both meshes' maps.
///
/// Returns the new line id, or `None` when the segment collapses to a single
/// point or duplicates an existing line.
pub(crate) fn add_segment(
    ctx: &mut IntersectionContext,
    hit: &SegmentHit,
    edge_tolerance: f64,
) -> Option<usize> {
    let curve = &mut ctx.curve;
    let (id0, new0) = curve.weld(hit.start, hit.origins[0]);
    let (id1, new1) = curve.weld(hit.end, hit.origins[1]);

    if id0 == id1 {
        if hit.origins[0] != hit.origins[1] {
            curve.set_origin(id0, CurveOrigin::Both);
        }
        return None;
    }
    if !new0 && !new1 && curve.has_line(id0, id1) {
        return None;
    }

    let line = curve.push_line(id0, id1, hit.cells);
    for (maps, &cell) in ctx.maps.iter_mut().zip(&hit.cells) {
        maps.add_cell_line(cell, line);
        maps.claim_point(id0, cell);
        maps.claim_point(id1, cell);
    }

    for (id, at) in [(id0, hit.start), (id1, hit.end)] {
        let mut on_edge = [false; 2];
        for (m, maps) in ctx.maps.iter_mut().enumerate() {
            on_edge[m] = maps.record_edges(id, &at, hit.cells[m], &hit.triangles[m], line, edge_tolerance);
        }
        if on_edge[0] && on_edge[1] {
            ctx.curve.set_origin(id, CurveOrigin::Both);
        }
    }
    Some(line)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mesh::AttributeValues;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn hit(cells: [usize; 2], start: Point3, end: Point3) -> SegmentHit {
        SegmentHit {
            cells,
            triangles: [
                [p(-1.0, -1.0, 0.0), p(2.0, -1.0, 0.0), p(-1.0, 2.0, 0.0)],
                [p(-0.5, 0.0, -1.0), p(0.5, 0.0, -1.0), p(0.0, 0.0, 1.0)],
            ],
            start,
            end,
            origins: [CurveOrigin::Second, CurveOrigin::Second],
        }
    }

    #[test]
    fn segment_adds_line_and_maps() {
        let mut ctx = IntersectionContext::new(1e-6);
        let line = add_segment(&mut ctx, &hit([4, 9], p(-0.25, 0.0, 0.0), p(0.25, 0.0, 0.0)), 1e-9);
        assert_eq!(line, Some(0));
        assert_eq!(ctx.curve.num_points(), 2);
        assert_eq!(ctx.curve.line_cells(), &[[4, 9]]);
        assert_eq!(ctx.maps[0].cell_lines(4), &[0]);
        assert_eq!(ctx.maps[1].cell_lines(9), &[0]);
        assert_eq!(ctx.maps[0].owner(1), Some(4));
        // Both endpoints sit on edges of the second triangle only.
        assert_eq!(ctx.maps[0].point_edges().count(), 0);
        assert_eq!(ctx.maps[1].point_edges().count(), 2);
    }

    #[test]
    fn duplicate_and_collapsed_segments_are_dropped() {
        let mut ctx = IntersectionContext::new(1e-6);
        let a = p(-0.25, 0.0, 0.0);
        let b = p(0.25, 0.0, 0.0);
        assert!(add_segment(&mut ctx, &hit([0, 0], a, b), 1e-9).is_some());
        assert!(add_segment(&mut ctx, &hit([1, 1], b, a + crate::math::Vector3::new(1e-7, 0.0, 0.0)), 1e-9).is_none());
        assert!(add_segment(&mut ctx, &hit([2, 2], a, a), 1e-9).is_none());
        assert_eq!(ctx.curve.num_lines(), 1);
        assert!(!ctx.maps[0].is_cut(1));
    }

    #[test]
    fn collapsed_segment_with_mixed_origins_is_both() {
        let mut ctx = IntersectionContext::new(1e-6);
        let mut h = hit([0, 0], p(0.0, 0.0, 0.0), p(0.0, 0.0, 0.0));
        h.origins = [CurveOrigin::First, CurveOrigin::Second];
        assert!(add_segment(&mut ctx, &h, 1e-9).is_none());
        assert_eq!(ctx.curve.origins(), &[CurveOrigin::Both]);
    }

    #[test]
    fn exported_mesh_carries_arrays() {
        let mut ctx = IntersectionContext::new(1e-6);
        add_segment(&mut ctx, &hit([3, 5], p(-0.25, 0.0, 0.0), p(0.25, 0.0, 0.0)), 1e-9);
        let mesh = ctx.curve.to_mesh().unwrap();
        assert_eq!(mesh.num_points(), 2);
        assert_eq!(mesh.polys(), &[vec![0, 1]]);
        assert_eq!(
            mesh.point_data().array("SurfaceID").unwrap().values(),
            &AttributeValues::Int(vec![2, 2])
        );
        assert_eq!(
            mesh.cell_data().array("Input1CellID").unwrap().values(),
            &AttributeValues::Int(vec![5])
        );
        assert_eq!(
            mesh.cell_data().array("NewCell0ID").unwrap().values(),
            &AttributeValues::Int(vec![-1, -1])
        );
    }

    #[test]
    fn new_cells_are_exported_per_surface() {
        let mut ctx = IntersectionContext::new(1e-6);
        add_segment(&mut ctx, &hit([3, 5], p(-0.25, 0.0, 0.0), p(0.25, 0.0, 0.0)), 1e-9);
        ctx.curve.set_new_cells(1, vec![[Some(7), None]]);
        assert_eq!(ctx.curve.new_cells(1), &[[Some(7), None]]);
        assert!(ctx.curve.new_cells(0).is_empty());
        let mesh = ctx.curve.to_mesh().unwrap();
        let array = mesh.cell_data().array("NewCell1ID").unwrap();
        assert_eq!(array.components(), 2);
        assert_eq!(array.values(), &AttributeValues::Int(vec![7, -1]));
    }
}
