// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Plan-Mesh Core
//!
//! Document model for architectural floor plans as produced by the plan
//! editor: walls with openings, balustrades, areas, surfaces and placed items,
//! grouped into floors.
//!
//! ## Overview
//!
//! - **Model**: strongly typed walls, openings, balustrades, polygons and items,
//!   with the documented defaults applied through accessor methods
//! - **Bounds**: per-floor plan bounds used to re-center generated geometry
//! - **Document**: JSON loading and validation of the floor list
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use plan_mesh_core::PlanDocument;
//!
//! let doc = PlanDocument::from_json(&std::fs::read_to_string("plan.json")?)?;
//! for (index, floor) in doc.usable_floors()? {
//!     println!("floor {} has {} walls", index, floor.design().map_or(0, |d| d.walls.len()));
//! }
//! ```
//!
//! All lengths are centimeters, rotations are degrees.

pub mod document;
pub mod error;
pub mod model;
pub mod model_bounds;

pub use document::PlanDocument;
pub use error::{Error, Result};
pub use model::{
    Area, Balustrade, Design, Floor, Item, Opening, OpeningKind, Point2D, PolyVertex, Surface,
    Wall,
};
pub use model_bounds::PlanBounds;
