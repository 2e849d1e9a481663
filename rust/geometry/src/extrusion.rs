// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting 2D footprints to closed solids
//!
//! Every solid shares its vertices between caps and sides, so each emitted
//! body is closed: every edge is used by exactly two faces.

use crate::bool2d::{
    contour_bounds, ensure_ccw, ensure_cw, point_in_any, point_in_contour, sanitize_contour,
    simplify_contour,
};
use crate::error::{Error, Result};
use crate::mesh::{GroupedMesh, MeshTag};
use crate::openings::WallBox;
use crate::profile::{Profile2D, Ring};
use crate::segment::BalustradeSegment;
use nalgebra::{Point2, Point3};
use tracing::warn;

/// Raster grids are coarsened beyond this many cells
const MAX_RASTER_CELLS: f64 = 4_000_000.0;

/// Ring vertices this close to collinear are dropped before capping; the
/// cap triangulation would skip them and leave side edges unmatched
const COLLINEAR_EPSILON: f64 = 1e-9;

/// Emit a box as 8 vertices and 6 outward-facing quads
pub fn extrude_box(mesh: &mut GroupedMesh, tag: MeshTag, wall_box: &WallBox) -> bool {
    if wall_box.min_rise() <= 0.0 {
        return false;
    }

    let tops = [
        wall_box.top_start,
        wall_box.top_end,
        wall_box.top_end,
        wall_box.top_start,
    ];
    let bottom: Vec<u32> = wall_box
        .footprint
        .iter()
        .map(|p| mesh.add_vertex(Point3::new(p.x, p.y, wall_box.bottom)))
        .collect();
    let top: Vec<u32> = wall_box
        .footprint
        .iter()
        .zip(tops)
        .map(|(p, z)| mesh.add_vertex(Point3::new(p.x, p.y, z)))
        .collect();

    mesh.add_face(tag, &[bottom[0], bottom[3], bottom[2], bottom[1]]);
    mesh.add_face(tag, &[top[0], top[1], top[2], top[3]]);
    for i in 0..4 {
        let j = (i + 1) % 4;
        mesh.add_face(tag, &[bottom[i], bottom[j], top[j], top[i]]);
    }
    true
}

/// Extrude a polygon-with-holes between `z0` and `z1`.
///
/// Caps come from the triangulation; every ring (holes included) gets quad
/// side walls. The outer ring is wound counter-clockwise and holes clockwise
/// so side faces point away from the solid.
pub fn extrude_profile(
    mesh: &mut GroupedMesh,
    tag: MeshTag,
    profile: &Profile2D,
    z0: f64,
    z1: f64,
) -> Result<()> {
    if z1 - z0 <= 0.0 {
        return Err(Error::InvalidExtrusion(
            "Depth must be positive".to_string(),
        ));
    }

    let clean = |ring: &Ring| {
        sanitize_contour(ring)
            .map(|r| simplify_contour(&r, COLLINEAR_EPSILON))
            .filter(|r| r.len() >= 3)
    };
    let outer = clean(&profile.outer)
        .ok_or_else(|| Error::InvalidProfile("outer ring is degenerate".to_string()))?;
    let normalized = Profile2D::with_holes(
        ensure_ccw(&outer),
        profile
            .holes
            .iter()
            .filter_map(|h| clean(h))
            .map(|h| ensure_cw(&h))
            .collect(),
    );
    let triangulation = normalized.triangulate()?;
    if triangulation.indices.is_empty() {
        return Err(Error::TriangulationError(
            "profile produced no triangles".to_string(),
        ));
    }

    let base = mesh.vertex_count() as u32;
    let count = triangulation.points.len() as u32;
    for p in &triangulation.points {
        mesh.add_vertex(Point3::new(p.x, p.y, z0));
    }
    for p in &triangulation.points {
        mesh.add_vertex(Point3::new(p.x, p.y, z1));
    }

    // Caps: top counter-clockwise seen from above, bottom reversed
    for tri in triangulation.indices.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let pts = &triangulation.points;
        let ccw = cross(&pts[a], &pts[b], &pts[c]) >= 0.0;
        let (i0, i1, i2) = if ccw { (a, b, c) } else { (a, c, b) };
        let (i0, i1, i2) = (i0 as u32, i1 as u32, i2 as u32);
        mesh.add_face(tag, &[base + count + i0, base + count + i1, base + count + i2]);
        mesh.add_face(tag, &[base + i0, base + i2, base + i1]);
    }

    // Sides, ring by ring in triangulation point order
    let mut offset = 0u32;
    for ring in normalized.rings() {
        let n = ring.len() as u32;
        for i in 0..n {
            let j = (i + 1) % n;
            if (ring[i as usize] - ring[j as usize]).norm() < 1e-12 {
                continue;
            }
            let (bi, bj) = (base + offset + i, base + offset + j);
            mesh.add_face(tag, &[bi, bj, bj + count, bi + count]);
        }
        offset += n;
    }

    Ok(())
}

#[inline]
fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Extrude several profiles; failures are logged and counted, not fatal
pub fn extrude_profiles(
    mesh: &mut GroupedMesh,
    tag: MeshTag,
    profiles: &[Profile2D],
    z0: f64,
    z1: f64,
) -> usize {
    let mut failed = 0;
    for (index, profile) in profiles.iter().enumerate() {
        if let Err(e) = extrude_profile(mesh, tag, profile, z0, z1) {
            warn!(group = %tag, polygon = index, error = %e, "skipping polygon that could not be extruded");
            failed += 1;
        }
    }
    failed
}

/// Closed slab solid from `-thickness` to 0
pub fn solid_slab(mesh: &mut GroupedMesh, floor: &[Profile2D], thickness: f64) -> usize {
    extrude_profiles(mesh, MeshTag::Floor, floor, -thickness, 0.0)
}

/// Top-only slab sampled on a grid. A cell is emitted when its center lies in
/// the floor and outside every void; horizontal runs of cells merge into one
/// quad.
pub fn raster_slab(mesh: &mut GroupedMesh, floor: &[Profile2D], voids: &[Ring], cell_size: f64) -> usize {
    let Some((min, max)) = floor_bounds(floor) else {
        return 0;
    };
    let mut cell = if cell_size.is_finite() && cell_size > 0.0 {
        cell_size
    } else {
        3.0
    };
    let (width, height) = (max.x - min.x, max.y - min.y);
    let cells = (width / cell).ceil() * (height / cell).ceil();
    if cells > MAX_RASTER_CELLS {
        cell *= (cells / MAX_RASTER_CELLS).sqrt();
    }
    let columns = (width / cell).ceil() as usize;
    let rows = (height / cell).ceil() as usize;

    let inside = |p: &Point2<f64>| point_in_any(p, floor) && !voids.iter().any(|v| point_in_contour(p, v));

    let mut quads = 0;
    for row in 0..rows {
        let y0 = min.y + row as f64 * cell;
        let y1 = y0 + cell;
        let cy = y0 + cell / 2.0;
        let mut run_start: Option<usize> = None;
        for col in 0..=columns {
            let filled = col < columns && inside(&Point2::new(min.x + (col as f64 + 0.5) * cell, cy));
            match (filled, run_start) {
                (true, None) => run_start = Some(col),
                (false, Some(start)) => {
                    let x0 = min.x + start as f64 * cell;
                    let x1 = min.x + col as f64 * cell;
                    let a = mesh.add_vertex(Point3::new(x0, y0, 0.0));
                    let b = mesh.add_vertex(Point3::new(x1, y0, 0.0));
                    let c = mesh.add_vertex(Point3::new(x1, y1, 0.0));
                    let d = mesh.add_vertex(Point3::new(x0, y1, 0.0));
                    mesh.add_face(MeshTag::Floor, &[a, b, c, d]);
                    run_start = None;
                    quads += 1;
                }
                _ => {}
            }
        }
    }
    quads
}

fn floor_bounds(floor: &[Profile2D]) -> Option<(Point2<f64>, Point2<f64>)> {
    floor
        .iter()
        .filter_map(|p| contour_bounds(&p.outer))
        .reduce(|(amin, amax), (bmin, bmax)| {
            (
                Point2::new(amin.x.min(bmin.x), amin.y.min(bmin.y)),
                Point2::new(amax.x.max(bmax.x), amax.y.max(bmax.y)),
            )
        })
}

/// Balustrade segment as a box from the floor to its railing height
pub fn balustrade_box(segment: &BalustradeSegment) -> Option<WallBox> {
    let dir = segment.direction()?;
    Some(WallBox::along(
        &segment.a,
        &dir,
        segment.half_thickness(),
        0.0,
        segment.length(),
        0.0,
        segment.height,
        segment.height,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;
    use rustc_hash::FxHashMap;

    /// Every undirected edge is used by exactly two faces
    fn assert_closed(mesh: &GroupedMesh) {
        let mut edges: FxHashMap<(u32, u32), usize> = FxHashMap::default();
        for group in &mesh.groups {
            for face in &group.faces {
                for k in 0..face.len() {
                    let (a, b) = (face[k], face[(k + 1) % face.len()]);
                    *edges.entry((a.min(b), a.max(b))).or_default() += 1;
                }
            }
        }
        assert!(edges.values().all(|&n| n == 2), "open edges: {:?}", edges);
    }

    fn sample_box() -> WallBox {
        WallBox::along(
            &Point2::new(0.0, 0.0),
            &Vector2::new(1.0, 0.0),
            10.0,
            0.0,
            100.0,
            0.0,
            280.0,
            280.0,
        )
    }

    #[test]
    fn test_box_is_closed_hexahedron() {
        let mut mesh = GroupedMesh::new();
        assert!(extrude_box(&mut mesh, MeshTag::Walls, &sample_box()));
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 6);
        assert_closed(&mesh);

        let render = mesh.to_render_mesh(None);
        // Second face is the top
        assert!((render.normals[4 * 3 + 2] - 1.0).abs() < 1e-6);
        // First face is the bottom
        assert!((render.normals[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_flat_box_skipped() {
        let mut flat = sample_box();
        flat.top_start = 0.0;
        let mut mesh = GroupedMesh::new();
        assert!(!extrude_box(&mut mesh, MeshTag::Walls, &flat));
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_profile_with_hole_is_closed() {
        let mut profile = Profile2D::rectangle(0.0, 0.0, 100.0, 100.0);
        profile.add_hole(vec![
            Point2::new(30.0, 30.0),
            Point2::new(70.0, 30.0),
            Point2::new(70.0, 70.0),
            Point2::new(30.0, 70.0),
        ]);
        let mut mesh = GroupedMesh::new();
        extrude_profile(&mut mesh, MeshTag::Walls, &profile, 0.0, 280.0).unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        // 8 cap triangles each side + 8 side quads
        assert_eq!(mesh.face_count(), 8 * 2 + 8);
        assert_closed(&mesh);
    }

    #[test]
    fn test_collinear_and_duplicate_points_dropped() {
        let profile = Profile2D::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(50.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(100.0, 100.0),
            Point2::new(0.0, 100.0),
            Point2::new(0.0, 0.0),
        ]);
        let mut mesh = GroupedMesh::new();
        extrude_profile(&mut mesh, MeshTag::Floor, &profile, 0.0, 10.0).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_closed(&mesh);
    }

    #[test]
    fn test_clockwise_profile_caps_face_out() {
        let profile = Profile2D::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 10.0),
            Point2::new(10.0, 0.0),
        ]);
        let mut mesh = GroupedMesh::new();
        extrude_profile(&mut mesh, MeshTag::Floor, &profile, -30.0, 0.0).unwrap();
        assert_closed(&mesh);
        let render = mesh.to_render_mesh(None);
        // First emitted face is a top cap triangle
        assert!((render.normals[2] - 1.0).abs() < 1e-6);
        let (min, max) = mesh.bounds();
        assert_eq!((min.z, max.z), (-30.0, 0.0));
    }

    #[test]
    fn test_zero_depth_rejected() {
        let mut mesh = GroupedMesh::new();
        let profile = Profile2D::rectangle(0.0, 0.0, 1.0, 1.0);
        assert!(extrude_profile(&mut mesh, MeshTag::Floor, &profile, 0.0, 0.0).is_err());
        assert_eq!(extrude_profiles(&mut mesh, MeshTag::Floor, &[profile], 5.0, 5.0), 1);
    }

    #[test]
    fn test_raster_merges_rows() {
        let floor = vec![Profile2D::rectangle(0.0, 0.0, 30.0, 30.0)];
        let mut mesh = GroupedMesh::new();
        assert_eq!(raster_slab(&mut mesh, &floor, &[], 3.0), 10);
        assert!(mesh.vertices.iter().all(|v| v.z == 0.0));
    }

    #[test]
    fn test_raster_skips_void_cells() {
        let floor = vec![Profile2D::rectangle(0.0, 0.0, 30.0, 30.0)];
        let void = vec![
            Point2::new(12.0, 12.0),
            Point2::new(18.0, 12.0),
            Point2::new(18.0, 18.0),
            Point2::new(12.0, 18.0),
        ];
        let mut mesh = GroupedMesh::new();
        // Rows 4 and 5 split around the void
        assert_eq!(raster_slab(&mut mesh, &floor, &[void], 3.0), 12);
    }

    #[test]
    fn test_balustrade_box() {
        let segment = BalustradeSegment {
            a: Point2::new(0.0, 0.0),
            b: Point2::new(0.0, 200.0),
            thickness: 10.0,
            height: 100.0,
            arc: false,
            source: 0,
        };
        let wall_box = balustrade_box(&segment).unwrap();
        assert_eq!(wall_box.top_start, 100.0);
        assert!((wall_box.footprint[0].x - 5.0).abs() < 1e-9);
    }
}
