// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D polygons with holes and their triangulation

use crate::bool2d::{compute_signed_area, contour_bounds, point_in_contour};
use crate::error::{Error, Result};
use crate::triangulation::triangulate_polygon_with_holes;
use nalgebra::Point2;

/// A closed ring of points, without a repeated closing point
pub type Ring = Vec<Point2<f64>>;

/// 2D polygon with optional holes
#[derive(Debug, Clone, PartialEq)]
pub struct Profile2D {
    /// Outer boundary (counter-clockwise)
    pub outer: Ring,
    /// Holes (clockwise)
    pub holes: Vec<Ring>,
}

impl Profile2D {
    /// Create a new profile
    pub fn new(outer: Ring) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(outer: Ring, holes: Vec<Ring>) -> Self {
        Self { outer, holes }
    }

    /// Axis-aligned rectangle, counter-clockwise
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(vec![
            Point2::new(min_x, min_y),
            Point2::new(max_x, min_y),
            Point2::new(max_x, max_y),
            Point2::new(min_x, max_y),
        ])
    }

    /// Add a hole to the profile
    pub fn add_hole(&mut self, hole: Ring) {
        self.holes.push(hole);
    }

    /// Outer ring followed by the holes
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Enclosed area (outer minus holes)
    pub fn area(&self) -> f64 {
        let holes: f64 = self
            .holes
            .iter()
            .map(|h| compute_signed_area(h).abs())
            .sum();
        compute_signed_area(&self.outer).abs() - holes
    }

    /// Even-odd containment: inside the outer ring and outside every hole
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        point_in_contour(point, &self.outer) && !self.holes.iter().any(|h| point_in_contour(point, h))
    }

    pub fn bounds(&self) -> Option<(Point2<f64>, Point2<f64>)> {
        contour_bounds(&self.outer)
    }

    /// Triangulate the profile (holes included)
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidProfile(
                "Profile must have at least 3 vertices".to_string(),
            ));
        }

        let holes: Vec<Ring> = self.holes.iter().filter(|h| h.len() >= 3).cloned().collect();
        let indices = triangulate_polygon_with_holes(&self.outer, &holes)?;

        let mut points = Vec::with_capacity(
            self.outer.len() + holes.iter().map(|h| h.len()).sum::<usize>(),
        );
        points.extend_from_slice(&self.outer);
        for hole in &holes {
            points.extend_from_slice(hole);
        }

        Ok(Triangulation { points, indices })
    }
}

/// Triangulated profile result
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// All vertices (outer + holes)
    pub points: Vec<Point2<f64>>,
    /// Triangle indices
    pub indices: Vec<usize>,
}

impl Triangulation {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Sum of triangle areas
    pub fn area(&self) -> f64 {
        self.indices
            .chunks_exact(3)
            .map(|t| {
                let (a, b, c) = (self.points[t[0]], self.points[t[1]], self.points[t[2]]);
                ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs() * 0.5
            })
            .sum()
    }
}
