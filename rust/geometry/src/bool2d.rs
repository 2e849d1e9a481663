// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Polygon Set Operations
//!
//! Union and difference of polygon sets using the i_overlay crate, plus the
//! ring utilities shared by every reconstruction stage (winding, area,
//! ray-casting containment, centroid expansion).
//!
//! Boolean results are lists of [`Profile2D`]: outer ring counter-clockwise,
//! holes clockwise. Callers that must never abort use [`union_or_passthrough`]
//! and [`difference_or_passthrough`], which hand back the uncombined input when
//! the backend fails.

use crate::error::{Error, Result};
use crate::profile::{Profile2D, Ring};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

/// Epsilon for floating point comparisons in 2D operations
const EPSILON_2D: f64 = 1e-9;

/// Minimum area threshold - polygons smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-6;

/// Consecutive points closer than this are merged
const DUPLICATE_POINT_DISTANCE: f64 = 1e-6;

type Path = Vec<[f64; 2]>;

/// Result of a recoverable boolean operation
#[derive(Debug, Clone)]
pub struct BooleanOutcome {
    pub profiles: Vec<Profile2D>,
    /// Set when the backend failed and the input was passed through
    pub recovered: Option<String>,
}

/// Union a set of polygons-with-holes into disjoint connected regions
pub fn union(profiles: &[Profile2D]) -> Result<Vec<Profile2D>> {
    let cleaned = clean_profiles(profiles)?;
    match cleaned.len() {
        0 => return Ok(Vec::new()),
        1 => return Ok(cleaned),
        _ => {}
    }

    let subject = profile_to_paths(&cleaned[0]);
    let clip: Vec<Path> = cleaned[1..].iter().flat_map(profile_to_paths).collect();

    let shapes = run_overlay(&subject, &clip, OverlayRule::Union)?;
    let result = shapes_to_profiles(&shapes);

    if result.is_empty() {
        return Err(Error::PolygonOp(
            "union of non-empty input produced empty geometry".to_string(),
        ));
    }

    Ok(result)
}

/// Subtract every polygon in `clip` from the union of `subject`
pub fn difference(subject: &[Profile2D], clip: &[Profile2D]) -> Result<Vec<Profile2D>> {
    let subject = clean_profiles(subject)?;
    let clip = clean_profiles(clip)?;

    if subject.is_empty() {
        return Ok(Vec::new());
    }
    if clip.is_empty() {
        return Ok(subject);
    }

    let subject_paths: Vec<Path> = subject.iter().flat_map(profile_to_paths).collect();
    let clip_paths: Vec<Path> = clip.iter().flat_map(profile_to_paths).collect();

    let shapes = run_overlay(&subject_paths, &clip_paths, OverlayRule::Difference)?;
    Ok(shapes_to_profiles(&shapes))
}

/// Union that degrades to the uncombined input instead of failing
pub fn union_or_passthrough(profiles: &[Profile2D], context: &str) -> BooleanOutcome {
    match union(profiles) {
        Ok(profiles) => BooleanOutcome {
            profiles,
            recovered: None,
        },
        Err(e) => {
            warn!(context, error = %e, inputs = profiles.len(), "union failed, passing input through");
            BooleanOutcome {
                profiles: passthrough(profiles),
                recovered: Some(format!("{}: {}", context, e)),
            }
        }
    }
}

/// Difference that degrades to the unmodified subject instead of failing
pub fn difference_or_passthrough(
    subject: &[Profile2D],
    clip: &[Profile2D],
    context: &str,
) -> BooleanOutcome {
    match difference(subject, clip) {
        Ok(profiles) => BooleanOutcome {
            profiles,
            recovered: None,
        },
        Err(e) => {
            warn!(context, error = %e, voids = clip.len(), "difference failed, passing subject through");
            BooleanOutcome {
                profiles: passthrough(subject),
                recovered: Some(format!("{}: {}", context, e)),
            }
        }
    }
}

/// Check if a contour is valid (has area, not degenerate)
pub fn is_valid_contour(contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let area = compute_signed_area(contour).abs();
    area > MIN_AREA_THRESHOLD
}

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Ensure contour has counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Ring {
    let area = compute_signed_area(contour);
    if area < 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Ensure contour has clockwise winding (for holes)
pub fn ensure_cw(contour: &[Point2<f64>]) -> Ring {
    let area = compute_signed_area(contour);
    if area > 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Remove near-duplicate consecutive points and a repeated closing point.
///
/// Returns `None` for rings with non-finite coordinates.
pub fn sanitize_contour(contour: &[Point2<f64>]) -> Option<Ring> {
    if contour.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return None;
    }

    let mut result: Ring = Vec::with_capacity(contour.len());
    for p in contour {
        match result.last() {
            Some(last) if (p - last).norm() < DUPLICATE_POINT_DISTANCE => {}
            _ => result.push(*p),
        }
    }
    while result.len() > 1 {
        let (first, last) = (result[0], result[result.len() - 1]);
        if (first - last).norm() < DUPLICATE_POINT_DISTANCE {
            result.pop();
        } else {
            break;
        }
    }

    Some(result)
}

/// Simplify a contour by removing collinear points
pub fn simplify_contour(contour: &[Point2<f64>], epsilon: f64) -> Ring {
    if contour.len() <= 3 {
        return contour.to_vec();
    }

    let mut result = Vec::with_capacity(contour.len());
    let n = contour.len();

    for i in 0..n {
        let prev = &contour[(i + n - 1) % n];
        let curr = &contour[i];
        let next = &contour[(i + 1) % n];

        let cross = (curr.x - prev.x) * (next.y - prev.y) - (curr.y - prev.y) * (next.x - prev.x);

        if cross.abs() > epsilon {
            result.push(*curr);
        }
    }

    if result.len() < 3 {
        return contour.to_vec();
    }

    result
}

/// Check if a point is inside a contour using ray casting (even-odd).
///
/// Edges are treated half-open in y so a ray through a shared vertex is
/// counted once.
pub fn point_in_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Whether a point lies inside any profile of a set
pub fn point_in_any(point: &Point2<f64>, profiles: &[Profile2D]) -> bool {
    profiles.iter().any(|p| p.contains(point))
}

/// Compute bounding box of a contour
pub fn contour_bounds(contour: &[Point2<f64>]) -> Option<(Point2<f64>, Point2<f64>)> {
    if contour.is_empty() {
        return None;
    }

    let mut min = contour[0];
    let mut max = contour[0];

    for p in contour.iter().skip(1) {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }

    Some((min, max))
}

/// Area of a contour's bounding box
pub fn bounds_area(contour: &[Point2<f64>]) -> f64 {
    contour_bounds(contour)
        .map(|(min, max)| (max.x - min.x) * (max.y - min.y))
        .unwrap_or(0.0)
}

/// Vertex average of a contour
pub fn contour_centroid(contour: &[Point2<f64>]) -> Option<Point2<f64>> {
    if contour.is_empty() {
        return None;
    }
    let n = contour.len() as f64;
    let (sx, sy) = contour
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point2::new(sx / n, sy / n))
}

/// Push every vertex `offset` further away from the contour's centroid.
///
/// Closes hairline seams between independently generated neighbours: ray
/// casting is unreliable exactly on a shared boundary, so adjacent floor
/// sources are made to overlap slightly.
pub fn expand_from_centroid(contour: &[Point2<f64>], offset: f64) -> Ring {
    let Some(center) = contour_centroid(contour) else {
        return Vec::new();
    };
    contour
        .iter()
        .map(|p| match (p - center).try_normalize(EPSILON_2D) {
            Some(dir) => p + dir * offset,
            None => *p,
        })
        .collect()
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

/// Sanitize, drop degenerate rings and normalize winding
fn clean_profiles(profiles: &[Profile2D]) -> Result<Vec<Profile2D>> {
    let mut result = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let outer = sanitize_contour(&profile.outer)
            .ok_or_else(|| Error::PolygonOp("non-finite coordinate in polygon".to_string()))?;
        if !is_valid_contour(&outer) {
            continue;
        }
        let mut holes = Vec::with_capacity(profile.holes.len());
        for hole in &profile.holes {
            let hole = sanitize_contour(hole)
                .ok_or_else(|| Error::PolygonOp("non-finite coordinate in hole".to_string()))?;
            if is_valid_contour(&hole) {
                holes.push(ensure_cw(&hole));
            }
        }
        result.push(Profile2D::with_holes(ensure_ccw(&outer), holes));
    }
    Ok(result)
}

fn passthrough(profiles: &[Profile2D]) -> Vec<Profile2D> {
    profiles
        .iter()
        .filter(|p| p.outer.len() >= 3)
        .cloned()
        .collect()
}

fn run_overlay(
    subject: &[Path],
    clip: &[Path],
    rule: OverlayRule,
) -> Result<Vec<Vec<Path>>> {
    let subject = subject.to_vec();
    let clip = clip.to_vec();
    catch_unwind(AssertUnwindSafe(|| {
        subject.overlay(&clip, rule, FillRule::NonZero)
    }))
    .map_err(|_| Error::PolygonOp("boolean backend panicked".to_string()))
}

/// Convert Profile2D to i_overlay path format
fn profile_to_paths(profile: &Profile2D) -> Vec<Path> {
    profile.rings().map(|r| contour_to_path(r)).collect()
}

/// Convert a Point2 contour to i_overlay path format
fn contour_to_path(contour: &[Point2<f64>]) -> Path {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

fn path_to_contour(path: &[[f64; 2]]) -> Ring {
    path.iter().map(|p| Point2::new(p[0], p[1])).collect()
}

/// Convert i_overlay result shapes back to profiles
///
/// Each shape is a list of contours, the first being the outer boundary.
fn shapes_to_profiles(shapes: &[Vec<Path>]) -> Vec<Profile2D> {
    let mut profiles = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let Some(first) = shape.first() else {
            continue;
        };
        let outer = path_to_contour(first);
        if !is_valid_contour(&outer) {
            continue;
        }
        let holes = shape
            .iter()
            .skip(1)
            .map(|c| path_to_contour(c))
            .filter(|h| is_valid_contour(h))
            .map(|h| ensure_cw(&h))
            .collect();
        profiles.push(Profile2D::with_holes(ensure_ccw(&outer), holes));
    }
    profiles
}
