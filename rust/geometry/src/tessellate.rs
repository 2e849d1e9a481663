// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Curve tessellation
//!
//! Curved walls, balustrades and polygon edges are stored as quadratic Bezier
//! curves (`a`, control `c`, `b`). Everything downstream assumes straight
//! segments, so curves are replaced by polylines here, before any healing.

use crate::profile::Ring;
use crate::segment::{BalustradeSegment, WallSegment};
use nalgebra::Point2;
use plan_mesh_core::model::{Balustrade, Point2D, PolyVertex, Wall};

/// Sub-segments per curved wall or balustrade
pub const WALL_ARC_SEGMENTS: usize = 16;

/// Sub-segments per curved polygon edge
pub const SURFACE_ARC_SEGMENTS: usize = 24;

/// Evaluate `P(t) = (1-t)^2 A + 2(1-t)t C + t^2 B`
#[inline]
pub fn quadratic_bezier(a: &Point2<f64>, c: &Point2<f64>, b: &Point2<f64>, t: f64) -> Point2<f64> {
    let u = 1.0 - t;
    Point2::new(
        u * u * a.x + 2.0 * u * t * c.x + t * t * b.x,
        u * u * a.y + 2.0 * u * t * c.y + t * t * b.y,
    )
}

/// Sample `segments + 1` points along the curve; the ends are exactly `a` and `b`
pub fn sample_quadratic(
    a: &Point2<f64>,
    c: &Point2<f64>,
    b: &Point2<f64>,
    segments: usize,
) -> Vec<Point2<f64>> {
    let segments = segments.max(1);
    let mut points = Vec::with_capacity(segments + 1);
    points.push(*a);
    for i in 1..segments {
        points.push(quadratic_bezier(a, c, b, i as f64 / segments as f64));
    }
    points.push(*b);
    points
}

#[inline]
fn to_point(p: &Point2D) -> Point2<f64> {
    Point2::new(p.x, p.y)
}

/// Straight segments for every wall; curved walls become
/// [`WALL_ARC_SEGMENTS`] arc pieces without openings
pub fn tessellate_walls(walls: &[Wall], default_height: f64) -> Vec<WallSegment> {
    let mut segments = Vec::with_capacity(walls.len());
    for (index, wall) in walls.iter().enumerate() {
        let base = WallSegment::from_wall(wall, index, default_height);
        match &wall.c {
            None => segments.push(base),
            Some(c) => segments.extend(split_wall_arc(&base, &to_point(c))),
        }
    }
    segments
}

fn split_wall_arc(base: &WallSegment, control: &Point2<f64>) -> Vec<WallSegment> {
    let points = sample_quadratic(&base.a, control, &base.b, WALL_ARC_SEGMENTS);
    let n = (points.len() - 1) as f64;
    points
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let t0 = i as f64 / n;
            let t1 = (i + 1) as f64 / n;
            WallSegment {
                a: pair[0],
                b: pair[1],
                height_a: base.height_a + (base.height_b - base.height_a) * t0,
                height_b: base.height_a + (base.height_b - base.height_a) * t1,
                openings: Vec::new(),
                arc: true,
                ..base.clone()
            }
        })
        .collect()
}

/// Straight segments for every balustrade; curved ones are split like walls
pub fn tessellate_balustrades(balustrades: &[Balustrade]) -> Vec<BalustradeSegment> {
    let mut segments = Vec::with_capacity(balustrades.len());
    for (index, balustrade) in balustrades.iter().enumerate() {
        let base = BalustradeSegment::from_balustrade(balustrade, index);
        match &balustrade.c {
            None => segments.push(base),
            Some(c) => {
                let points = sample_quadratic(&base.a, &to_point(c), &base.b, WALL_ARC_SEGMENTS);
                segments.extend(points.windows(2).map(|pair| BalustradeSegment {
                    a: pair[0],
                    b: pair[1],
                    arc: true,
                    ..base.clone()
                }));
            }
        }
    }
    segments
}

/// Ring for a polygon whose vertices may carry a control point for their
/// incoming edge. The edge into vertex 0 comes from the last vertex.
pub fn tessellate_ring(poly: &[PolyVertex]) -> Ring {
    let n = poly.len();
    let mut ring = Vec::with_capacity(n);
    for (i, vertex) in poly.iter().enumerate() {
        let current = Point2::new(vertex.x, vertex.y);
        if let Some(c) = &vertex.c {
            let prev = &poly[(i + n - 1) % n];
            let prev = Point2::new(prev.x, prev.y);
            let samples = sample_quadratic(&prev, &to_point(c), &current, SURFACE_ARC_SEGMENTS);
            // Interior samples only; both ends are ring vertices already
            ring.extend_from_slice(&samples[1..samples.len() - 1]);
        }
        ring.push(current);
    }
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Largest distance from densely sampled curve points to the polyline
    fn max_deviation(a: &Point2<f64>, c: &Point2<f64>, b: &Point2<f64>, segments: usize) -> f64 {
        let polyline = sample_quadratic(a, c, b, segments);
        (0..=400)
            .map(|i| {
                let p = quadratic_bezier(a, c, b, i as f64 / 400.0);
                polyline
                    .windows(2)
                    .map(|w| distance_to_segment(&p, &w[0], &w[1]))
                    .fold(f64::MAX, f64::min)
            })
            .fold(0.0, f64::max)
    }

    fn distance_to_segment(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
        let ab = b - a;
        let t = ((p - a).dot(&ab) / ab.norm_squared()).clamp(0.0, 1.0);
        (p - (a + ab * t)).norm()
    }

    fn curved_wall() -> Wall {
        let mut wall = Wall::straight(Point2D::new(0.0, 0.0), Point2D::new(400.0, 0.0), 20.0);
        wall.c = Some(Point2D::new(200.0, 200.0));
        wall.height_a = Some(200.0);
        wall.height_b = Some(300.0);
        wall
    }

    #[test]
    fn test_bezier_endpoints_exact() {
        let a = Point2::new(1.5, -3.25);
        let c = Point2::new(40.0, 90.0);
        let b = Point2::new(123.456, 7.0);
        let points = sample_quadratic(&a, &c, &b, WALL_ARC_SEGMENTS);
        assert_eq!(points.len(), WALL_ARC_SEGMENTS + 1);
        assert_eq!(points[0], a);
        assert_eq!(points[WALL_ARC_SEGMENTS], b);
    }

    #[test]
    fn test_deviation_decreases_with_segments() {
        let a = Point2::new(0.0, 0.0);
        let c = Point2::new(150.0, 300.0);
        let b = Point2::new(300.0, 0.0);
        let deviations: Vec<f64> = [2, 4, 8, 16, 32]
            .iter()
            .map(|&n| max_deviation(&a, &c, &b, n))
            .collect();
        for pair in deviations.windows(2) {
            assert!(pair[1] < pair[0], "deviation did not shrink: {:?}", deviations);
        }
    }

    #[test]
    fn test_curved_wall_tessellation() {
        let segments = tessellate_walls(&[curved_wall()], 280.0);
        assert_eq!(segments.len(), WALL_ARC_SEGMENTS);
        assert!(segments.iter().all(|s| s.arc && s.openings.is_empty()));
        assert_eq!(segments[0].a, Point2::new(0.0, 0.0));
        assert_eq!(segments[WALL_ARC_SEGMENTS - 1].b, Point2::new(400.0, 0.0));
        for pair in segments.windows(2) {
            assert_eq!(pair[0].b, pair[1].a);
        }
        assert_relative_eq!(segments[0].height_a, 200.0);
        assert_relative_eq!(segments[WALL_ARC_SEGMENTS - 1].height_b, 300.0);
        assert_relative_eq!(segments[7].height_b, 250.0);
    }

    #[test]
    fn test_curved_wall_drops_openings() {
        let mut wall = curved_wall();
        wall.openings.push(plan_mesh_core::Opening::door(0.5));
        let segments = tessellate_walls(&[wall], 280.0);
        assert!(segments.iter().all(|s| s.openings.is_empty()));
    }

    #[test]
    fn test_straight_wall_passthrough() {
        let wall = Wall::straight(Point2D::new(0.0, 0.0), Point2D::new(100.0, 0.0), 20.0);
        let segments = tessellate_walls(&[wall.clone()], 280.0);
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].arc);
        let again = tessellate_walls(&[wall], 280.0);
        assert_eq!(segments, again);
    }

    #[test]
    fn test_tessellate_ring_with_curved_edge() {
        let mut poly = vec![
            PolyVertex::new(0.0, 0.0),
            PolyVertex::new(100.0, 0.0),
            PolyVertex::new(100.0, 100.0),
            PolyVertex::new(0.0, 100.0),
        ];
        poly[2].c = Some(Point2D::new(150.0, 50.0));
        let ring = tessellate_ring(&poly);
        assert_eq!(ring.len(), 4 + SURFACE_ARC_SEGMENTS - 1);
        assert_eq!(ring[2 + SURFACE_ARC_SEGMENTS - 1], Point2::new(100.0, 100.0));
        // Bulges outward past x = 100
        assert!(ring.iter().any(|p| p.x > 120.0));
    }

    #[test]
    fn test_tessellate_ring_drops_closing_duplicate() {
        let poly = vec![
            PolyVertex::new(0.0, 0.0),
            PolyVertex::new(10.0, 0.0),
            PolyVertex::new(10.0, 10.0),
            PolyVertex::new(0.0, 0.0),
        ];
        assert_eq!(tessellate_ring(&poly).len(), 3);
    }

    #[test]
    fn test_curved_balustrade() {
        let balustrade = Balustrade {
            a: Point2D::new(0.0, 0.0),
            b: Point2D::new(100.0, 0.0),
            c: Some(Point2D::new(50.0, 50.0)),
            thickness: None,
            height: None,
        };
        let segments = tessellate_balustrades(&[balustrade]);
        assert_eq!(segments.len(), WALL_ARC_SEGMENTS);
        assert!(segments.iter().all(|s| s.arc && s.thickness == 10.0));
    }
}
