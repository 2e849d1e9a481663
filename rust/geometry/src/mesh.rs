// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures
//!
//! [`GroupedMesh`] is the primary output: shared vertices plus quad and
//! triangle faces grouped by material tag, exactly what the OBJ writer emits.
//! [`Mesh`] is the flat-shaded triangle form handed to renderers.

use crate::error::{Error, Result};
use crate::triangulation::calculate_polygon_normal;
use nalgebra::{Point3, Vector3};
use plan_mesh_core::PlanBounds;
use smallvec::SmallVec;

/// Quad or triangle, 0-based vertex indices
pub type Face = SmallVec<[u32; 4]>;

/// Material group of a face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshTag {
    Walls,
    Floor,
    WallsBalustrades,
}

impl MeshTag {
    pub const ALL: [MeshTag; 3] = [MeshTag::Walls, MeshTag::Floor, MeshTag::WallsBalustrades];

    /// Group name used in the OBJ output
    pub fn name(self) -> &'static str {
        match self {
            MeshTag::Walls => "walls",
            MeshTag::Floor => "floor",
            MeshTag::WallsBalustrades => "walls_balustrades",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.name() == name)
    }
}

impl std::fmt::Display for MeshTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Re-centering and unit conversion applied before emission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateShift {
    /// X offset (subtracted from all X coordinates)
    pub x: f64,
    /// Y offset (subtracted from all Y coordinates)
    pub y: f64,
    /// Multiplier applied after the offset
    pub scale: f64,
}

impl Default for CoordinateShift {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl CoordinateShift {
    #[inline]
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// Center on the plan bounds; invalid bounds only scale
    pub fn from_bounds(bounds: &PlanBounds, scale: f64) -> Self {
        if !bounds.is_valid() {
            return Self::new(0.0, 0.0, scale);
        }
        let (x, y) = bounds.center();
        Self { x, y, scale }
    }

    /// Check if shift is the identity
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.scale == 1.0
    }

    #[inline]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::new(
            (point.x - self.x) * self.scale,
            (point.y - self.y) * self.scale,
            point.z * self.scale,
        )
    }
}

/// Faces sharing one material tag
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGroup {
    pub tag: MeshTag,
    pub faces: Vec<Face>,
}

/// Shared vertex pool with tagged face groups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedMesh {
    pub vertices: Vec<Point3<f64>>,
    /// Groups in first-use order
    pub groups: Vec<MeshGroup>,
}

impl GroupedMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.vertices.push(position);
        (self.vertices.len() - 1) as u32
    }

    /// Add a face to the group of `tag`, creating the group on first use
    pub fn add_face(&mut self, tag: MeshTag, face: &[u32]) {
        if face.len() < 3 {
            return;
        }
        self.group_mut(tag).faces.push(Face::from_slice(face));
    }

    fn group_mut(&mut self, tag: MeshTag) -> &mut MeshGroup {
        let index = match self.groups.iter().position(|g| g.tag == tag) {
            Some(index) => index,
            None => {
                self.groups.push(MeshGroup {
                    tag,
                    faces: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }

    pub fn group(&self, tag: MeshTag) -> Option<&MeshGroup> {
        self.groups.iter().find(|g| g.tag == tag)
    }

    /// Faces of one tag, empty when the group does not exist
    pub fn faces(&self, tag: MeshTag) -> &[Face] {
        self.group(tag).map(|g| g.faces.as_slice()).unwrap_or(&[])
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.groups.iter().map(|g| g.faces.len()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Apply a coordinate shift to every vertex in place
    pub fn apply_shift(&mut self, shift: &CoordinateShift) {
        if shift.is_identity() {
            return;
        }
        for vertex in &mut self.vertices {
            *vertex = shift.apply(vertex);
        }
    }

    /// Calculate bounds (min, max)
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }
        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        for v in &self.vertices {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }
        (min, max)
    }

    /// Check that every face index references an existing vertex
    pub fn validate(&self) -> Result<()> {
        let count = self.vertices.len();
        for group in &self.groups {
            for face in &group.faces {
                if let Some(&bad) = face.iter().find(|&&i| i as usize >= count) {
                    return Err(Error::InvalidExtrusion(format!(
                        "face in group '{}' references vertex {} of {}",
                        group.tag, bad, count
                    )));
                }
            }
        }
        Ok(())
    }

    /// Flat-shaded triangle mesh for one group (or all groups)
    pub fn to_render_mesh(&self, tag: Option<MeshTag>) -> Mesh {
        let mut mesh = Mesh::new();
        for group in self.groups.iter().filter(|g| tag.map_or(true, |t| t == g.tag)) {
            for face in &group.faces {
                let points: SmallVec<[Point3<f64>; 4]> =
                    face.iter().map(|&i| self.vertices[i as usize]).collect();
                let normal = calculate_polygon_normal(&points);
                let base = mesh.vertex_count() as u32;
                for p in &points {
                    mesh.add_vertex(*p, normal);
                }
                for k in 1..points.len() as u32 - 1 {
                    mesh.add_triangle(base, base + k, base + k + 1);
                }
            }
        }
        mesh
    }
}

/// Triangle mesh
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Add a vertex with normal
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);

        self.normals.push(normal.x as f32);
        self.normals.push(normal.y as f32);
        self.normals.push(normal.z as f32);
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
