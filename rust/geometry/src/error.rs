// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during plan reconstruction
#[derive(Error, Debug)]
pub enum Error {
    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid extrusion parameters: {0}")]
    InvalidExtrusion(String),

    #[error("Polygon boolean operation failed: {0}")]
    PolygonOp(String),

    #[error("Empty mesh: {0}")]
    EmptyMesh(String),

    #[error("OBJ parse error at line {line}: {message}")]
    ObjParse { line: usize, message: String },

    #[error("Plan document error: {0}")]
    Core(#[from] plan_mesh_core::Error),
}
