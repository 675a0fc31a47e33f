use crate::math::Point3;
use crate::mesh::links::edge_key;
use crate::mesh::Mesh;

use super::context::{PointEdgeRecord, SplitMaps};
use super::curve::IntersectionCurve;

/// A per-mesh copy of the curve in which a welded point is duplicated for
/// each group of triangles that do not share the point topologically.
#[derive(Debug, Clone, Default)]
pub(crate) struct SplitCurve {
    /// Point positions. The first points mirror the welded curve.
    pub points: Vec<Point3>,
    /// Lines, with endpoints rewritten to per-triangle duplicates.
    pub lines: Vec<[usize; 2]>,
    /// Triangle each point is interpolated from.
    pub owners: Vec<Option<usize>>,
    /// Welded curve point each point was copied from.
    pub sources: Vec<usize>,
}

impl SplitCurve {
    /// Number of points added on top of the welded curve.
    pub fn num_duplicates(&self) -> usize {
        self.points.len() - self.sources.iter().zip(0..).filter(|(s, i)| *s == i).count()
    }
}

/// Corners of the mesh edge a record refers to.
fn record_edge(mesh: &Mesh, record: &PointEdgeRecord) -> Option<(usize, usize)> {
    let tri = mesh.triangle(record.cell)?;
    Some(edge_key(tri[record.edge], tri[(record.edge + 1) % 3]))
}

/// Two records belong together when their triangles share the edge the point
/// lies on, or share a corner the point sits on.
fn records_linked(mesh: &Mesh, at: &Point3, a: &PointEdgeRecord, b: &PointEdgeRecord, tolerance: f64) -> bool {
    if a.cell == b.cell {
        return true;
    }
    if let (Some(ea), Some(eb)) = (record_edge(mesh, a), record_edge(mesh, b)) {
        if ea == eb {
            return true;
        }
    }
    let (Some(ta), Some(tb)) = (mesh.triangle(a.cell), mesh.triangle(b.cell)) else {
        return false;
    };
    ta.iter()
        .filter(|v| tb.contains(v))
        .any(|&v| mesh.point(v).is_some_and(|q| (q - at).norm() <= tolerance))
}

/// Builds the split copy of `curve` for one mesh.
///
/// For each curve point the edge records are walked in order. The first
/// record keeps the welded id; a later record reuses the id of an earlier
/// record it is linked to, and otherwise gets a new coordinate-identical
/// point. Lines of the record's triangle touching the point are rewritten to
/// the id chosen for that triangle.
pub(crate) fn split_lines(mesh: &Mesh, curve: &IntersectionCurve, maps: &SplitMaps, tolerance: f64) -> SplitCurve {
    let n = curve.num_points();
    let mut split = SplitCurve {
        points: curve.points().to_vec(),
        lines: curve.lines().to_vec(),
        owners: (0..n).map(|p| maps.owner(p)).collect(),
        sources: (0..n).collect(),
    };

    for (point, records) in maps.point_edges() {
        let Some(&at) = curve.points().get(point) else {
            tracing::warn!(point, "edge record refers to a missing curve point");
            continue;
        };
        let mut assigned: Vec<(PointEdgeRecord, usize)> = Vec::with_capacity(records.len());
        for (k, record) in records.iter().enumerate() {
            let id = if k == 0 {
                point
            } else if let Some(&(_, shared)) = assigned
                .iter()
                .find(|(earlier, _)| records_linked(mesh, &at, earlier, record, tolerance))
            {
                shared
            } else {
                split.points.push(at);
                split.owners.push(Some(record.cell));
                split.sources.push(point);
                let dup = split.points.len() - 1;
                tracing::trace!(point, dup, cell = record.cell, line = record.line, "duplicated curve point");
                dup
            };
            assigned.push((*record, id));

            if id != point {
                for &line in maps.cell_lines(record.cell) {
                    if let Some(ends) = split.lines.get_mut(line) {
                        for end in ends.iter_mut().filter(|e| **e == point) {
                            *end = id;
                        }
                    }
                }
            }
        }
    }

    tracing::trace!(
        points = split.points.len(),
        duplicates = split.num_duplicates(),
        "split curve lines"
    );
    split
}
