// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan bounds calculation
//!
//! Determines the bounding box of a floor design in plan space. The generated
//! mesh is re-centered on the center of these bounds before unit conversion.

use crate::model::{Design, Point2D};

/// Axis-aligned plan bounds (cm)
#[derive(Debug, Clone, PartialEq)]
pub struct PlanBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    /// Number of points sampled
    pub sample_count: usize,
}

impl PlanBounds {
    /// Create new bounds initialized to invalid state
    pub fn new() -> Self {
        Self {
            min_x: f64::MAX,
            min_y: f64::MAX,
            max_x: f64::MIN,
            max_y: f64::MIN,
            sample_count: 0,
        }
    }

    /// Bounds of every wall footprint, balustrade, area and surface vertex
    pub fn from_design(design: &Design) -> Self {
        let mut bounds = Self::new();
        for wall in &design.walls {
            let half = wall.thickness() / 2.0;
            bounds.expand_padded(&wall.a, half);
            bounds.expand_padded(&wall.b, half);
            if let Some(c) = &wall.c {
                bounds.expand_padded(c, half);
            }
        }
        for balustrade in &design.balustrades {
            let half = balustrade.thickness() / 2.0;
            bounds.expand_padded(&balustrade.a, half);
            bounds.expand_padded(&balustrade.b, half);
        }
        for vertex in design
            .areas
            .iter()
            .flat_map(|a| a.poly.iter())
            .chain(design.surfaces.iter().flat_map(|s| s.poly.iter()))
        {
            bounds.expand(vertex.x, vertex.y);
        }
        bounds
    }

    /// Bounds of wall footprints only; used to reject stray surfaces
    pub fn from_walls(design: &Design) -> Self {
        let mut bounds = Self::new();
        for wall in &design.walls {
            let half = wall.thickness() / 2.0;
            bounds.expand_padded(&wall.a, half);
            bounds.expand_padded(&wall.b, half);
        }
        bounds
    }

    /// Check if bounds are valid (at least one point added)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.sample_count > 0
    }

    /// Expand bounds to include a point
    #[inline]
    pub fn expand(&mut self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.sample_count += 1;
    }

    #[inline]
    fn expand_padded(&mut self, p: &Point2D, pad: f64) {
        self.expand(p.x - pad, p.y - pad);
        self.expand(p.x + pad, p.y + pad);
    }

    /// Center of the bounding box
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        if !self.is_valid() {
            return (0.0, 0.0);
        }
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// World width (x extent)
    #[inline]
    pub fn width(&self) -> f64 {
        if self.is_valid() {
            self.max_x - self.min_x
        } else {
            0.0
        }
    }

    /// World height (y extent)
    #[inline]
    pub fn height(&self) -> f64 {
        if self.is_valid() {
            self.max_y - self.min_y
        } else {
            0.0
        }
    }

    /// Whether a point lies inside the bounds grown by `margin`
    pub fn contains_with_margin(&self, x: f64, y: f64, margin: f64) -> bool {
        self.is_valid()
            && x >= self.min_x - margin
            && x <= self.max_x + margin
            && y >= self.min_y - margin
            && y <= self.max_y + margin
    }
}

impl Default for PlanBounds {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Wall;

    #[test]
    fn test_empty_bounds() {
        let bounds = PlanBounds::new();
        assert!(!bounds.is_valid());
        assert_eq!(bounds.center(), (0.0, 0.0));
        assert_eq!(bounds.width(), 0.0);
    }

    #[test]
    fn test_wall_bounds_include_thickness() {
        let design = Design {
            walls: vec![Wall::straight(
                Point2D::new(0.0, 0.0),
                Point2D::new(500.0, 0.0),
                20.0,
            )],
            ..Default::default()
        };
        let bounds = PlanBounds::from_design(&design);
        assert_eq!(bounds.min_x, -10.0);
        assert_eq!(bounds.max_x, 510.0);
        assert_eq!(bounds.height(), 20.0);
        assert_eq!(bounds.center(), (250.0, 0.0));
    }

    #[test]
    fn test_contains_with_margin() {
        let mut bounds = PlanBounds::new();
        bounds.expand(0.0, 0.0);
        bounds.expand(100.0, 100.0);
        assert!(bounds.contains_with_margin(120.0, 50.0, 50.0));
        assert!(!bounds.contains_with_margin(200.0, 50.0, 50.0));
    }
}
