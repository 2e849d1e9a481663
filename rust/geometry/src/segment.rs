// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Straight working segments derived from the plan document
//!
//! Every later stage operates on these owned copies, never on the input
//! document, so regenerating a floor is idempotent.

use nalgebra::{Point2, Vector2};
use plan_mesh_core::model::{Balustrade, Opening, OpeningKind, Wall};

/// Walls shorter than this are skipped
pub const MIN_SEGMENT_LENGTH: f64 = 0.1;

/// Ratio of the minor axis component to length above which a wall is diagonal
pub const DIAGONAL_RATIO: f64 = 0.15;

/// Which end of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum End {
    A,
    B,
}

/// Opening with defaults applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedOpening {
    /// Center position along the original wall span, 0..1
    pub t: f64,
    pub width: f64,
    pub height: f64,
    pub elevation: f64,
    pub kind: OpeningKind,
}

impl From<&Opening> for ResolvedOpening {
    fn from(opening: &Opening) -> Self {
        Self {
            t: opening.t.clamp(0.0, 1.0),
            width: opening.width(),
            height: opening.height(),
            elevation: opening.elevation(),
            kind: opening.kind,
        }
    }
}

/// Straight wall piece ready for junction healing
#[derive(Debug, Clone, PartialEq)]
pub struct WallSegment {
    pub a: Point2<f64>,
    pub b: Point2<f64>,
    pub thickness: f64,
    pub height_a: f64,
    pub height_b: f64,
    pub openings: Vec<ResolvedOpening>,
    /// Produced by curve tessellation; only joins its tessellation neighbours
    pub arc: bool,
    /// Index of the source wall in the design
    pub source: usize,
}

impl WallSegment {
    /// Straight copy of a plan wall (the control point is ignored)
    pub fn from_wall(wall: &Wall, source: usize, default_height: f64) -> Self {
        let (height_a, height_b) = wall.end_heights(default_height);
        Self {
            a: Point2::new(wall.a.x, wall.a.y),
            b: Point2::new(wall.b.x, wall.b.y),
            thickness: wall.thickness(),
            height_a,
            height_b,
            openings: wall.openings.iter().map(ResolvedOpening::from).collect(),
            arc: false,
            source,
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        (self.b - self.a).norm()
    }

    #[inline]
    pub fn half_thickness(&self) -> f64 {
        self.thickness / 2.0
    }

    /// Unit direction a -> b, `None` for degenerate segments
    #[inline]
    pub fn direction(&self) -> Option<Vector2<f64>> {
        (self.b - self.a).try_normalize(1e-12)
    }

    #[inline]
    pub fn endpoint(&self, end: End) -> Point2<f64> {
        match end {
            End::A => self.a,
            End::B => self.b,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.length() < MIN_SEGMENT_LENGTH
    }

    pub fn is_diagonal(&self) -> bool {
        is_diagonal(&self.a, &self.b)
    }

    /// True when either end deviates from the standard wall height
    pub fn has_custom_height(&self, wall_height: f64) -> bool {
        (self.height_a - wall_height).abs() > 1e-6 || (self.height_b - wall_height).abs() > 1e-6
    }
}

/// Straight railing piece
#[derive(Debug, Clone, PartialEq)]
pub struct BalustradeSegment {
    pub a: Point2<f64>,
    pub b: Point2<f64>,
    pub thickness: f64,
    pub height: f64,
    pub arc: bool,
    pub source: usize,
}

impl BalustradeSegment {
    pub fn from_balustrade(balustrade: &Balustrade, source: usize) -> Self {
        Self {
            a: Point2::new(balustrade.a.x, balustrade.a.y),
            b: Point2::new(balustrade.b.x, balustrade.b.y),
            thickness: balustrade.thickness(),
            height: balustrade.height(),
            arc: false,
            source,
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        (self.b - self.a).norm()
    }

    #[inline]
    pub fn half_thickness(&self) -> f64 {
        self.thickness / 2.0
    }

    #[inline]
    pub fn direction(&self) -> Option<Vector2<f64>> {
        (self.b - self.a).try_normalize(1e-12)
    }
}

/// Neither axis-aligned component dominates the segment
pub fn is_diagonal(a: &Point2<f64>, b: &Point2<f64>) -> bool {
    let d = b - a;
    let len = d.norm();
    if len < MIN_SEGMENT_LENGTH {
        return false;
    }
    d.x.abs().min(d.y.abs()) / len > DIAGONAL_RATIO
}

/// Left-hand unit normal of a direction
#[inline]
pub fn left_normal(dir: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-dir.y, dir.x)
}
