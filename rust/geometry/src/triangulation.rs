// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Simple rings are ear-clipped directly; rings with holes go through earcutr.

use crate::{Error, Point2, Point3, Result, Vector3};

/// Cross products below this are treated as collinear
const CONVEX_EPSILON: f64 = 1e-10;

#[inline]
fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Inclusive point-in-triangle test for a counter-clockwise triangle
#[inline]
fn point_in_triangle(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    cross(a, b, p) >= -CONVEX_EPSILON
        && cross(b, c, p) >= -CONVEX_EPSILON
        && cross(c, a, p) >= -CONVEX_EPSILON
}

fn is_ear(points: &[Point2<f64>], remaining: &[usize], prev: usize, cur: usize, next: usize) -> bool {
    let (a, b, c) = (&points[prev], &points[cur], &points[next]);
    if cross(a, b, c) <= CONVEX_EPSILON {
        return false;
    }
    remaining.iter().all(|&v| {
        if v == prev || v == cur || v == next {
            return true;
        }
        let p = &points[v];
        if p == a || p == b || p == c {
            return true;
        }
        !point_in_triangle(p, a, b, c)
    })
}

/// Ear-clipping triangulation of a simple ring.
///
/// The ring is normalized to counter-clockwise order first. A ring of `n`
/// vertices always yields `n - 2` triangles; when no proper ear exists
/// (collinear or self-touching input) the most convex vertex is clipped so the
/// loop terminates.
pub fn ear_clip(points: &[Point2<f64>]) -> Result<Vec<[usize; 3]>> {
    let n = points.len();
    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    let mut remaining: Vec<usize> = if crate::bool2d::compute_signed_area(points) < 0.0 {
        (0..n).rev().collect()
    } else {
        (0..n).collect()
    };
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&k| {
            let prev = remaining[(k + m - 1) % m];
            let next = remaining[(k + 1) % m];
            is_ear(points, &remaining, prev, remaining[k], next)
        });

        let k = match ear {
            Some(k) => k,
            None => (0..m)
                .max_by(|&i, &j| {
                    let ci = cross(
                        &points[remaining[(i + m - 1) % m]],
                        &points[remaining[i]],
                        &points[remaining[(i + 1) % m]],
                    );
                    let cj = cross(
                        &points[remaining[(j + m - 1) % m]],
                        &points[remaining[j]],
                        &points[remaining[(j + 1) % m]],
                    );
                    ci.total_cmp(&cj)
                })
                .unwrap_or(0),
        };

        triangles.push([remaining[(k + m - 1) % m], remaining[k], remaining[(k + 1) % m]]);
        remaining.remove(k);
    }

    triangles.push([remaining[0], remaining[1], remaining[2]]);
    Ok(triangles)
}

/// Flat triangle index list for a simple ring
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    Ok(ear_clip(points)?.into_iter().flatten().collect())
}

/// Triangulate a ring with holes through earcutr.
///
/// Indices address the concatenation of the outer ring and every hole with
/// at least three points, in order. Without holes this is plain ear clipping.
pub fn triangulate_polygon_with_holes(outer: &[Point2<f64>], holes: &[Vec<Point2<f64>>]) -> Result<Vec<usize>> {
    let holes: Vec<&Vec<Point2<f64>>> = holes.iter().filter(|h| h.len() >= 3).collect();
    if holes.is_empty() {
        return triangulate_polygon(outer);
    }
    if outer.len() < 3 {
        return Err(Error::TriangulationError(
            "outer ring needs at least 3 points".to_string(),
        ));
    }

    let mut coords: Vec<f64> = outer.iter().flat_map(|p| [p.x, p.y]).collect();
    let mut hole_starts = Vec::with_capacity(holes.len());
    for hole in holes {
        hole_starts.push(coords.len() / 2);
        coords.extend(hole.iter().flat_map(|p| [p.x, p.y]));
    }

    earcutr::earcut(&coords, &hole_starts, 2).map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Unit normal of a planar face by Newell's method; `+Z` for degenerate faces
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::<f64>::zeros();
    for (i, current) in points.iter().enumerate() {
        let next = &points[(i + 1) % n];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal.try_normalize(1e-12).unwrap_or_else(Vector3::z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bool2d::compute_signed_area;
    use approx::assert_relative_eq;

    fn triangles_area(points: &[Point2<f64>], tris: &[[usize; 3]]) -> f64 {
        tris.iter()
            .map(|t| compute_signed_area(&[points[t[0]], points[t[1]], points[t[2]]]).abs())
            .sum()
    }

    fn l_shape() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 3.0),
            Point2::new(0.0, 3.0),
        ]
    }

    #[test]
    fn test_triangulate_square() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let indices = triangulate_polygon(&points).unwrap();
        assert_eq!(indices.len(), 6);
    }

    #[test]
    fn test_triangulate_insufficient_points() {
        let points = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(triangulate_polygon(&points).is_err());
        assert!(ear_clip(&points).is_err());
    }

    #[test]
    fn test_ear_clip_non_convex() {
        let points = l_shape();
        let tris = ear_clip(&points).unwrap();
        assert_eq!(tris.len(), points.len() - 2);
        assert_relative_eq!(
            triangles_area(&points, &tris),
            compute_signed_area(&points).abs(),
            epsilon = 1e-9
        );
        for tri in &tris {
            assert!(tri.iter().all(|&i| i < points.len()));
        }
    }

    #[test]
    fn test_ear_clip_clockwise_input() {
        let points: Vec<_> = l_shape().into_iter().rev().collect();
        let tris = ear_clip(&points).unwrap();
        assert_eq!(tris.len(), 4);
        assert_relative_eq!(triangles_area(&points, &tris), 7.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ear_clip_comb() {
        // Comb with several reflex vertices
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 5.0),
            Point2::new(8.0, 5.0),
            Point2::new(8.0, 2.0),
            Point2::new(6.0, 2.0),
            Point2::new(6.0, 5.0),
            Point2::new(4.0, 5.0),
            Point2::new(4.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 5.0),
            Point2::new(0.0, 5.0),
        ];
        let tris = ear_clip(&points).unwrap();
        assert_eq!(tris.len(), 10);
        assert_relative_eq!(
            triangles_area(&points, &tris),
            compute_signed_area(&points).abs(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_ear_clip_collinear_points_terminate() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let tris = ear_clip(&points).unwrap();
        assert_eq!(tris.len(), 3);
        assert_relative_eq!(triangles_area(&points, &tris), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_triangulate_square_with_hole() {
        let outer = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        let hole = vec![
            Point2::new(3.0, 3.0),
            Point2::new(7.0, 3.0),
            Point2::new(7.0, 7.0),
            Point2::new(3.0, 7.0),
        ];

        let indices = triangulate_polygon_with_holes(&outer, &[hole]).unwrap();
        assert!(indices.len() > 6);
        assert_eq!(indices.len() % 3, 0);
    }

    #[test]
    fn test_calculate_polygon_normal() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let normal = calculate_polygon_normal(&points);
        assert!((normal.z.abs() - 1.0).abs() < 0.001);
    }
}
