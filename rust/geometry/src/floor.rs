// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-floor reconstruction pipeline
//!
//! tessellate -> heal walls -> balustrade chains -> floor union minus voids
//! -> extrude -> re-center and scale. Each floor is independent; the only
//! cross-floor input is the item list of the floor below, used for void
//! detection.

use crate::balustrade::{build_balustrades, BalustradeGeometry};
use crate::bool2d::{
    contour_centroid, difference_or_passthrough, ensure_ccw, expand_from_centroid,
    is_valid_contour, sanitize_contour, union_or_passthrough,
};
use crate::config::{MeshConfig, SlabMode};
use crate::error::{Error, Result};
use crate::extrusion::{balustrade_box, extrude_box, extrude_profiles, raster_slab, solid_slab};
use crate::mesh::{CoordinateShift, GroupedMesh, MeshTag};
use crate::obj::to_obj_string;
use crate::openings::cut_wall;
use crate::profile::{Profile2D, Ring};
use crate::tessellate::{tessellate_ring, tessellate_walls};
use crate::voids::{detect_stair_voids, voids_for_floor};
use crate::walls::{heal_walls, WallUnion};
use plan_mesh_core::model::{Design, Floor, Item};
use plan_mesh_core::{PlanBounds, PlanDocument};
use rayon::prelude::*;
use tracing::{debug, info};

/// What happened while generating one floor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloorDiagnostics {
    pub skipped_walls: usize,
    pub skipped_balustrades: usize,
    pub boxed_walls: usize,
    pub junction_fillers: usize,
    pub voids: usize,
    pub floor_sources: usize,
    /// Polygons that could not be extruded
    pub failed_extrusions: usize,
    /// Boolean operations that fell back to their uncombined input
    pub recovered: Vec<String>,
}

/// Mesh and intermediate polygons for one floor
#[derive(Debug, Clone)]
pub struct FloorMeshOutput {
    pub name: Option<String>,
    /// Re-centered, scaled, Z-up geometry
    pub mesh: GroupedMesh,
    pub bounds: PlanBounds,
    pub shift: CoordinateShift,
    /// Plan extent in output units
    pub world_width: f64,
    pub world_height: f64,
    /// Healed wall footprints in plan space
    pub wall_union: Vec<Profile2D>,
    /// Final floor polygons in plan space, voids removed
    pub floor_polygons: Vec<Profile2D>,
    pub voids: Vec<Ring>,
    pub diagnostics: FloorDiagnostics,
}

impl FloorMeshOutput {
    /// OBJ text for this floor
    pub fn to_obj(&self) -> String {
        let header = match &self.name {
            Some(name) => format!("plan-mesh floor '{}'", name),
            None => "plan-mesh floor".to_string(),
        };
        to_obj_string(&self.mesh, Some(&header))
    }
}

/// Generate one floor, detecting its voids from the floor below
pub fn generate_floor_mesh(
    floor: &Floor,
    prior_items: Option<&[Item]>,
    config: &MeshConfig,
) -> Result<FloorMeshOutput> {
    let design = floor
        .design()
        .ok_or_else(|| Error::EmptyMesh("floor has no design".to_string()))?;
    let voids = voids_for_floor(design, prior_items);
    Ok(generate_with_voids(floor.name.clone(), design, voids, config))
}

/// Generate every usable floor of a document.
///
/// Void detection runs once across all floors first. Output keeps floor
/// order and pairs each mesh with its floor index; floors without content
/// are skipped.
pub fn generate_document(
    doc: &PlanDocument,
    config: &MeshConfig,
) -> Result<Vec<(usize, FloorMeshOutput)>> {
    let floors: Vec<(usize, &Floor)> = doc
        .usable_floors()?
        .filter(|(index, floor)| {
            let usable = floor.design().is_some_and(|d| !d.is_empty());
            if !usable {
                debug!(floor = index, "skipping floor without content");
            }
            usable
        })
        .collect();
    let voids = detect_stair_voids(&doc.floors);

    let generate = |&(index, floor): &(usize, &Floor)| -> Option<(usize, FloorMeshOutput)> {
        let design = floor.design()?;
        let floor_voids = voids.get(index).cloned().unwrap_or_default();
        Some((index, generate_with_voids(floor.name.clone(), design, floor_voids, config)))
    };

    let outputs: Vec<(usize, FloorMeshOutput)> = if config.parallel {
        floors.par_iter().filter_map(generate).collect()
    } else {
        floors.iter().filter_map(generate).collect()
    };

    info!(floors = outputs.len(), "generated document");
    Ok(outputs)
}

fn generate_with_voids(
    name: Option<String>,
    design: &Design,
    voids: Vec<Ring>,
    config: &MeshConfig,
) -> FloorMeshOutput {
    let mut diagnostics = FloorDiagnostics {
        voids: voids.len(),
        ..FloorDiagnostics::default()
    };

    let segments = tessellate_walls(&design.walls, config.wall_height);
    let walls = heal_walls(&segments, config.wall_height);
    diagnostics.skipped_walls = walls.skipped;
    diagnostics.boxed_walls = walls.boxed.len();
    diagnostics.junction_fillers = walls.filler_count;
    diagnostics.recovered.extend(walls.recovered.clone());

    let balustrades = build_balustrades(design);
    diagnostics.skipped_balustrades = balustrades.skipped;

    let sources = floor_sources(design, &walls, &balustrades, config);
    diagnostics.floor_sources = sources.len();
    let floor_polygons = build_floor_polygons(&sources, &voids, &mut diagnostics.recovered);

    let mut mesh = GroupedMesh::new();
    diagnostics.failed_extrusions +=
        extrude_profiles(&mut mesh, MeshTag::Walls, &walls.polygons, 0.0, config.wall_height);
    for wall in &walls.boxed {
        let cut = cut_wall(wall, config);
        for wall_box in cut.boxes.iter().chain(&cut.frames) {
            extrude_box(&mut mesh, MeshTag::Walls, wall_box);
        }
    }
    for segment in &balustrades.segments {
        if let Some(wall_box) = balustrade_box(segment) {
            extrude_box(&mut mesh, MeshTag::WallsBalustrades, &wall_box);
        }
    }
    match config.slab_mode {
        SlabMode::Solid => {
            diagnostics.failed_extrusions += solid_slab(&mut mesh, &floor_polygons, config.slab_thickness);
        }
        SlabMode::Raster => {
            raster_slab(&mut mesh, &floor_polygons, &voids, config.raster_cell_size);
        }
    }

    let bounds = PlanBounds::from_design(design);
    let shift = CoordinateShift::from_bounds(&bounds, config.unit_scale);
    mesh.apply_shift(&shift);

    info!(
        floor = name.as_deref().unwrap_or("<unnamed>"),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        wall_polygons = walls.polygons.len(),
        floor_polygons = floor_polygons.len(),
        voids = voids.len(),
        recovered = diagnostics.recovered.len(),
        "generated floor mesh"
    );

    FloorMeshOutput {
        name,
        mesh,
        world_width: bounds.width() * config.unit_scale,
        world_height: bounds.height() * config.unit_scale,
        bounds,
        shift,
        wall_union: walls.polygons,
        floor_polygons,
        voids,
        diagnostics,
    }
}

/// Candidate polygons whose union forms the floor, each pushed outward by
/// `floor_expansion` so neighbours overlap instead of meeting on a seam
pub fn floor_sources(
    design: &Design,
    walls: &WallUnion,
    balustrades: &BalustradeGeometry,
    config: &MeshConfig,
) -> Vec<Profile2D> {
    let wall_bounds = PlanBounds::from_walls(design);
    let within_walls = |ring: &Ring| {
        if design.walls.is_empty() {
            return true;
        }
        contour_centroid(ring).is_some_and(|c| {
            wall_bounds.contains_with_margin(c.x, c.y, config.surface_exclusion_margin)
        })
    };

    let areas = design.areas.iter().map(|a| tessellate_ring(&a.poly));
    let surfaces = design
        .surfaces
        .iter()
        .filter(|s| !s.is_void())
        .map(|s| tessellate_ring(&s.poly))
        .filter(|ring| {
            let keep = within_walls(ring);
            if !keep {
                debug!(vertices = ring.len(), "dropping surface outside the wall envelope");
            }
            keep
        });
    let railings = balustrades.strips.iter().chain(&balustrades.fills).cloned();
    let wall_rings = walls.footprints().into_iter().map(|p| p.outer);

    let sources: Vec<Profile2D> = areas
        .chain(surfaces)
        .chain(railings)
        .chain(wall_rings)
        .filter_map(|ring| sanitize_contour(&ring))
        .filter(|ring| is_valid_contour(ring))
        .map(|ring| {
            let ring = ensure_ccw(&ring);
            Profile2D::new(expand_from_centroid(&ring, config.floor_expansion))
        })
        .collect();

    debug!(sources = sources.len(), "collected floor sources");
    sources
}

/// Union the floor sources and subtract voids, falling back to uncombined
/// polygons when a boolean operation fails
pub fn build_floor_polygons(sources: &[Profile2D], voids: &[Ring], recovered: &mut Vec<String>) -> Vec<Profile2D> {
    if sources.is_empty() {
        return Vec::new();
    }

    let union = union_or_passthrough(sources, "floor union");
    recovered.extend(union.recovered);
    if voids.is_empty() {
        return union.profiles;
    }

    let clip: Vec<Profile2D> = voids.iter().cloned().map(Profile2D::new).collect();
    let difference = difference_or_passthrough(&union.profiles, &clip, "void subtraction");
    recovered.extend(difference.recovered);
    difference.profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use plan_mesh_core::model::{Area, Point2D, PolyVertex, Surface, Wall};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<PolyVertex> {
        vec![
            PolyVertex::new(x0, y0),
            PolyVertex::new(x1, y0),
            PolyVertex::new(x1, y1),
            PolyVertex::new(x0, y1),
        ]
    }

    fn room_design() -> Design {
        let corners = [(0.0, 0.0), (500.0, 0.0), (500.0, 400.0), (0.0, 400.0)];
        let walls = (0..4)
            .map(|i| {
                let (ax, ay) = corners[i];
                let (bx, by) = corners[(i + 1) % 4];
                Wall::straight(Point2D::new(ax, ay), Point2D::new(bx, by), 20.0)
            })
            .collect();
        Design {
            walls,
            areas: vec![Area {
                name: Some("living".into()),
                poly: square(100.0, 50.0, 400.0, 350.0),
            }],
            ..Design::default()
        }
    }

    #[test]
    fn test_empty_void_list_keeps_union() {
        let sources = vec![Profile2D::rectangle(0.0, 0.0, 100.0, 100.0)];
        let mut recovered = Vec::new();
        let floor = build_floor_polygons(&sources, &[], &mut recovered);
        assert_eq!(floor.len(), 1);
        assert_relative_eq!(floor[0].area(), 10000.0, epsilon = 1e-6);
        assert!(recovered.is_empty());
    }

    #[test]
    fn test_stray_surface_excluded() {
        let mut design = room_design();
        design.surfaces.push(Surface {
            name: Some("garden".into()),
            poly: square(900.0, 900.0, 1000.0, 1000.0),
            role: None,
            is_cutout: false,
        });
        design.surfaces.push(Surface {
            name: Some("terrace".into()),
            poly: square(450.0, 350.0, 540.0, 440.0),
            role: None,
            is_cutout: false,
        });
        let config = MeshConfig::default();
        let segments = tessellate_walls(&design.walls, config.wall_height);
        let walls = heal_walls(&segments, config.wall_height);
        let sources = floor_sources(&design, &walls, &BalustradeGeometry::default(), &config);
        // area + terrace + one wall ring
        assert_eq!(sources.len(), 3);
    }

    #[test]
    fn test_void_surface_not_a_floor_source() {
        let mut design = room_design();
        design.surfaces.push(Surface {
            name: None,
            poly: square(200.0, 100.0, 300.0, 200.0),
            role: Some("stairwell".into()),
            is_cutout: false,
        });
        let output = generate_floor_mesh(&Floor::with_design(design), None, &MeshConfig::default()).unwrap();
        assert_eq!(output.voids.len(), 1);
        assert_eq!(output.floor_polygons.len(), 1);
        assert_eq!(output.floor_polygons[0].holes.len(), 1);
    }

    #[test]
    fn test_floor_without_design_is_an_error() {
        let floor = Floor::default();
        assert!(matches!(
            generate_floor_mesh(&floor, None, &MeshConfig::default()),
            Err(Error::EmptyMesh(_))
        ));
    }

    #[test]
    fn test_output_is_recentered_and_scaled() {
        let output = generate_floor_mesh(&Floor::with_design(room_design()), None, &MeshConfig::default()).unwrap();
        let (min, max) = output.mesh.bounds();
        // Slab overhangs the wall footprint by the seam expansion
        assert_relative_eq!(min.x, -2.6, epsilon = 0.02);
        assert_relative_eq!(max.x, 2.6, epsilon = 0.02);
        assert_relative_eq!(max.z, 2.8, epsilon = 1e-6);
        assert_relative_eq!(min.z, -0.3, epsilon = 1e-6);
        assert_relative_eq!(output.world_width, 5.2, epsilon = 1e-9);
        assert!(output.to_obj().starts_with("# plan-mesh floor"));
    }

    #[test]
    fn test_regeneration_is_idempotent() {
        let floor = Floor::with_design(room_design());
        let config = MeshConfig::default();
        let first = generate_floor_mesh(&floor, None, &config).unwrap();
        let second = generate_floor_mesh(&floor, None, &config).unwrap();
        assert_eq!(first.mesh, second.mesh);
        assert_eq!(floor, Floor::with_design(room_design()));
    }

    #[test]
    fn test_raster_mode_emits_flat_floor() {
        let output =
            generate_floor_mesh(&Floor::with_design(room_design()), None, &MeshConfig::preview()).unwrap();
        let floor_faces = output.mesh.faces(MeshTag::Floor);
        assert!(!floor_faces.is_empty());
        assert!(floor_faces
            .iter()
            .flat_map(|f| f.iter())
            .all(|&i| output.mesh.vertices[i as usize].z == 0.0));
    }
}
