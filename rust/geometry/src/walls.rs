// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall topology healing
//!
//! Plan walls are centerlines with a thickness, so two walls meeting at a
//! corner leave a notch (or overlap) unless their footprints are adjusted.
//! Walls are routed to one of two paths:
//!
//! - **union**: plain full-height walls become footprint rectangles extended
//!   by the neighbour's half-thickness at straight junctions; diagonal and arc
//!   junctions get wedge fillers; everything is boolean-unioned into rings.
//! - **boxed**: walls with openings or custom heights keep individual boxes,
//!   extended by `min(h / sin, 3h)` at their junctions, and are cut around
//!   their openings later.
//!
//! All results are fresh copies; input segments are never modified.

use crate::bool2d::{union_or_passthrough, BooleanOutcome};
use crate::junctions::{
    end_contacts, extension_length, find_junctions, junction_filler, sin_between, MIN_JUNCTION_SIN,
};
use crate::profile::{Profile2D, Ring};
use crate::segment::{left_normal, End, WallSegment};
use nalgebra::Point2;
use tracing::debug;

/// Wall copy with its healed endpoint extensions
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedWall {
    pub segment: WallSegment,
    /// Extension beyond `a`, along `a - b`
    pub extend_a: f64,
    /// Extension beyond `b`, along `b - a`
    pub extend_b: f64,
}

impl ExtendedWall {
    pub fn new(segment: WallSegment, extend_a: f64, extend_b: f64) -> Self {
        Self {
            segment,
            extend_a,
            extend_b,
        }
    }

    /// Extended start point
    pub fn start(&self) -> Point2<f64> {
        match self.segment.direction() {
            Some(dir) => self.segment.a - dir * self.extend_a,
            None => self.segment.a,
        }
    }

    /// Extended end point
    pub fn end(&self) -> Point2<f64> {
        match self.segment.direction() {
            Some(dir) => self.segment.b + dir * self.extend_b,
            None => self.segment.b,
        }
    }

    pub fn footprint(&self) -> Option<Ring> {
        wall_rectangle(&self.segment, self.extend_a, self.extend_b)
    }
}

/// Which healing path a wall takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallRoute {
    Union,
    Boxed,
    Skipped,
}

/// Healed walls of one floor
#[derive(Debug, Clone, Default)]
pub struct WallUnion {
    /// Unioned footprints (outer ring CCW, holes CW)
    pub polygons: Vec<Profile2D>,
    /// Individually boxed walls, extended at their junctions
    pub boxed: Vec<ExtendedWall>,
    pub filler_count: usize,
    pub skipped: usize,
    /// Set when the union failed and the raw footprints were kept
    pub recovered: Option<String>,
}

impl WallUnion {
    /// Every wall footprint, unioned or boxed
    pub fn footprints(&self) -> Vec<Profile2D> {
        let mut all = self.polygons.clone();
        all.extend(
            self.boxed
                .iter()
                .filter_map(ExtendedWall::footprint)
                .map(Profile2D::new),
        );
        all
    }
}

pub fn route_wall(segment: &WallSegment, wall_height: f64) -> WallRoute {
    if segment.is_degenerate() || !is_finite(segment) {
        WallRoute::Skipped
    } else if !segment.openings.is_empty() || segment.has_custom_height(wall_height) {
        WallRoute::Boxed
    } else {
        WallRoute::Union
    }
}

fn is_finite(segment: &WallSegment) -> bool {
    segment.a.iter().chain(segment.b.iter()).all(|v| v.is_finite())
        && segment.thickness.is_finite()
        && segment.thickness > 0.0
}

/// Footprint rectangle of a wall, counter-clockwise, with end extensions
pub fn wall_rectangle(segment: &WallSegment, extend_a: f64, extend_b: f64) -> Option<Ring> {
    let dir = segment.direction()?;
    let offset = left_normal(&dir) * segment.half_thickness();
    let start = segment.a - dir * extend_a;
    let end = segment.b + dir * extend_b;
    Some(vec![
        start - offset,
        end - offset,
        end + offset,
        start + offset,
    ])
}

fn end_extension<F>(segments: &[WallSegment], index: usize, end: End, rule: F) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    let segment = &segments[index];
    if segment.arc || segment.is_diagonal() {
        return 0.0;
    }

    end_contacts(segments, index, end)
        .iter()
        .map(|contact| &segments[contact.other])
        .filter(|neighbor| !neighbor.is_diagonal())
        .map(|neighbor| {
            let sin = sin_between(segment, neighbor);
            if sin < MIN_JUNCTION_SIN {
                0.0
            } else {
                rule(neighbor.half_thickness(), sin)
            }
        })
        .fold(0.0, f64::max)
}

/// Union-path extensions: the neighbour's half-thickness at each straight join
pub fn union_extensions(segments: &[WallSegment], index: usize) -> (f64, f64) {
    let rule = |half: f64, _sin: f64| half;
    (
        end_extension(segments, index, End::A, rule),
        end_extension(segments, index, End::B, rule),
    )
}

/// Boxed-path extensions: `min(h / sin, 3h)` at each straight join
pub fn boxed_extensions(segments: &[WallSegment], index: usize) -> (f64, f64) {
    (
        end_extension(segments, index, End::A, extension_length),
        end_extension(segments, index, End::B, extension_length),
    )
}

/// Wedge fillers for junctions involving a diagonal wall, and for the joints
/// between arc pieces of one curved wall
pub fn junction_fillers(segments: &[WallSegment]) -> Vec<Ring> {
    find_junctions(segments)
        .iter()
        .filter(|j| j.has_diagonal(segments) || j.is_arc_joint(segments))
        .filter_map(|j| junction_filler(j, segments))
        .collect()
}

/// Heal every wall of a floor
pub fn heal_walls(segments: &[WallSegment], wall_height: f64) -> WallUnion {
    let routes: Vec<WallRoute> = segments.iter().map(|s| route_wall(s, wall_height)).collect();
    let usable: Vec<WallSegment> = segments
        .iter()
        .zip(&routes)
        .filter(|(_, route)| **route != WallRoute::Skipped)
        .map(|(s, _)| s.clone())
        .collect();
    let usable_routes: Vec<WallRoute> = routes
        .iter()
        .copied()
        .filter(|r| *r != WallRoute::Skipped)
        .collect();
    let skipped = segments.len() - usable.len();

    let mut footprints = Vec::new();
    let mut boxed = Vec::new();
    for (index, (segment, route)) in usable.iter().zip(&usable_routes).enumerate() {
        match route {
            WallRoute::Union => {
                let (ext_a, ext_b) = union_extensions(&usable, index);
                if let Some(rect) = wall_rectangle(segment, ext_a, ext_b) {
                    footprints.push(Profile2D::new(rect));
                }
            }
            WallRoute::Boxed => {
                let (ext_a, ext_b) = boxed_extensions(&usable, index);
                boxed.push(ExtendedWall::new(segment.clone(), ext_a, ext_b));
            }
            WallRoute::Skipped => {}
        }
    }

    let fillers = junction_fillers(&usable);
    let filler_count = fillers.len();
    footprints.extend(fillers.into_iter().map(Profile2D::new));

    debug!(
        walls = segments.len(),
        union_inputs = footprints.len(),
        boxed = boxed.len(),
        fillers = filler_count,
        skipped,
        "healed walls"
    );

    let BooleanOutcome {
        profiles,
        recovered,
    } = if footprints.is_empty() {
        BooleanOutcome {
            profiles: Vec::new(),
            recovered: None,
        }
    } else {
        union_or_passthrough(&footprints, "wall union")
    };

    WallUnion {
        polygons: profiles,
        boxed,
        filler_count,
        skipped,
        recovered,
    }
}
