// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan-Mesh Geometry
//!
//! Reconstruction of watertight floor meshes from centerline floor plans,
//! using i_overlay for polygon booleans, earcutr for cap triangulation and
//! nalgebra for vector math.
//!
//! ## Pipeline
//!
//! 1. [`tessellate`]: curved walls, balustrades and polygon edges to polylines
//! 2. [`walls`]: junction healing (union path and boxed path)
//! 3. [`balustrade`]: railing chains, strips and rim fills
//! 4. [`voids`]: explicit and stair-inferred floor openings
//! 5. [`bool2d`]: union/difference with pass-through recovery
//! 6. [`extrusion`]: wall solids, opening boxes, slab, balustrades
//!
//! [`floor::generate_document`] runs the whole thing per floor and
//! [`obj::to_obj_string`] serializes the result.
//!
//! ```rust,ignore
//! use plan_mesh_geometry::{generate_document, MeshConfig};
//!
//! let doc = plan_mesh_core::PlanDocument::from_path("plan.json")?;
//! for (index, floor) in generate_document(&doc, &MeshConfig::default())? {
//!     std::fs::write(format!("floor_{}.obj", index), floor.to_obj())?;
//! }
//! ```

pub mod balustrade;
pub mod bool2d;
pub mod config;
pub mod error;
pub mod extrusion;
pub mod floor;
pub mod junctions;
pub mod mesh;
pub mod obj;
pub mod openings;
pub mod profile;
pub mod segment;
pub mod tessellate;
pub mod triangulation;
pub mod voids;
pub mod walls;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use balustrade::{build_balustrades, build_chains, BalustradeChain, BalustradeGeometry};
pub use bool2d::{difference, point_in_contour, union};
pub use config::{MeshConfig, SlabMode};
pub use error::{Error, Result};
pub use floor::{generate_document, generate_floor_mesh, FloorDiagnostics, FloorMeshOutput};
pub use mesh::{CoordinateShift, GroupedMesh, Mesh, MeshTag};
pub use obj::{parse_obj, to_obj_string, write_obj};
pub use profile::{Profile2D, Ring};
pub use triangulation::{ear_clip, triangulate_polygon};
pub use voids::detect_stair_voids;
pub use walls::{heal_walls, WallUnion};
