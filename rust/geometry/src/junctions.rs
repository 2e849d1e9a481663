// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall junction detection
//!
//! Walls in a plan only meet at their centerlines. Two kinds of contact are
//! recognised:
//! - endpoint to endpoint (L and X joins), within [`JUNCTION_TOLERANCE`]
//! - endpoint landing on the interior of another wall's span (T joins)
//!
//! Arc pieces produced by tessellation never join other walls; they only meet
//! their own tessellation neighbours.

use crate::bool2d::{compute_signed_area, sanitize_contour};
use crate::profile::Ring;
use crate::segment::{left_normal, End, WallSegment};
use nalgebra::Point2;
use smallvec::SmallVec;

/// Distance under which endpoints are considered coincident (cm)
pub const JUNCTION_TOLERANCE: f64 = 3.0;

/// Parametric range of a span that counts as "interior" for T joins
pub const SPAN_T_MIN: f64 = 0.02;
pub const SPAN_T_MAX: f64 = 0.98;

/// Below this |sin(angle)| two walls have no discernible corner
pub const MIN_JUNCTION_SIN: f64 = 0.1;

/// How an endpoint touches another wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactKind {
    /// Coincides with the other wall's endpoint
    Endpoint(End),
    /// Lands on the other wall's interior at parameter `t`
    Span { t: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub other: usize,
    pub kind: ContactKind,
}

/// Participant of a junction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Member {
    End(usize, End),
    Span(usize, f64),
}

impl Member {
    pub fn index(&self) -> usize {
        match *self {
            Member::End(i, _) | Member::Span(i, _) => i,
        }
    }
}

/// Point where two or more walls meet
#[derive(Debug, Clone)]
pub struct Junction {
    pub point: Point2<f64>,
    pub members: SmallVec<[Member; 4]>,
}

impl Junction {
    pub fn has_diagonal(&self, segments: &[WallSegment]) -> bool {
        self.members.iter().any(|m| segments[m.index()].is_diagonal())
    }

    pub fn is_arc_joint(&self, segments: &[WallSegment]) -> bool {
        self.members.iter().all(|m| segments[m.index()].arc)
    }
}

/// Absolute sine of the angle between two walls
pub fn sin_between(a: &WallSegment, b: &WallSegment) -> f64 {
    match (a.direction(), b.direction()) {
        (Some(da), Some(db)) => (da.x * db.y - da.y * db.x).abs(),
        _ => 0.0,
    }
}

/// Extension that closes an angled join without running away near-parallel:
/// `min(h / sin, 3h)`, or nothing when the walls are nearly parallel
pub fn extension_length(neighbor_half_thickness: f64, sin: f64) -> f64 {
    if sin < MIN_JUNCTION_SIN {
        return 0.0;
    }
    (neighbor_half_thickness / sin).min(neighbor_half_thickness * 3.0)
}

/// Parameter and perpendicular distance of `p` relative to a segment
pub fn project_onto(seg: &WallSegment, p: &Point2<f64>) -> Option<(f64, f64)> {
    let ab = seg.b - seg.a;
    let len_sq = ab.norm_squared();
    if len_sq < 1e-12 {
        return None;
    }
    let t = (p - seg.a).dot(&ab) / len_sq;
    let closest = seg.a + ab * t;
    Some((t, (p - closest).norm()))
}

/// Contacts of one end of `segments[index]` with the other straight walls
pub fn end_contacts(segments: &[WallSegment], index: usize, end: End) -> Vec<Contact> {
    let seg = &segments[index];
    if seg.arc || seg.is_degenerate() {
        return Vec::new();
    }
    let p = seg.endpoint(end);
    let mut contacts = Vec::new();

    for (j, other) in segments.iter().enumerate() {
        if j == index || other.arc || other.is_degenerate() {
            continue;
        }
        if (p - other.a).norm() < JUNCTION_TOLERANCE {
            contacts.push(Contact {
                other: j,
                kind: ContactKind::Endpoint(End::A),
            });
        } else if (p - other.b).norm() < JUNCTION_TOLERANCE {
            contacts.push(Contact {
                other: j,
                kind: ContactKind::Endpoint(End::B),
            });
        } else if let Some((t, dist)) = project_onto(other, &p) {
            if (SPAN_T_MIN..=SPAN_T_MAX).contains(&t) && dist < JUNCTION_TOLERANCE {
                contacts.push(Contact {
                    other: j,
                    kind: ContactKind::Span { t },
                });
            }
        }
    }

    contacts
}

/// Group wall ends into junctions.
///
/// Straight walls cluster with straight walls (including T joins onto a
/// span); arc pieces cluster only with pieces of the same source wall.
pub fn find_junctions(segments: &[WallSegment]) -> Vec<Junction> {
    let mut junctions: Vec<Junction> = Vec::new();

    for (i, seg) in segments.iter().enumerate() {
        if seg.is_degenerate() {
            continue;
        }
        for end in [End::A, End::B] {
            let p = seg.endpoint(end);
            let existing = junctions.iter_mut().find(|j| {
                (j.point - p).norm() < JUNCTION_TOLERANCE
                    && j.members.iter().all(|m| compatible(&segments[m.index()], seg))
            });
            match existing {
                Some(junction) => junction.members.push(Member::End(i, end)),
                None => {
                    let mut members = SmallVec::new();
                    members.push(Member::End(i, end));
                    junctions.push(Junction { point: p, members });
                }
            }
        }
    }

    // T joins: an end landing on a straight span
    for junction in &mut junctions {
        if junction.members.iter().any(|m| segments[m.index()].arc) {
            continue;
        }
        for (j, other) in segments.iter().enumerate() {
            if other.arc || other.is_degenerate() || junction.members.iter().any(|m| m.index() == j) {
                continue;
            }
            if let Some((t, dist)) = project_onto(other, &junction.point) {
                if (SPAN_T_MIN..=SPAN_T_MAX).contains(&t) && dist < JUNCTION_TOLERANCE {
                    junction.members.push(Member::Span(j, t));
                }
            }
        }
    }

    junctions.retain(|j| j.members.len() >= 2);
    junctions
}

fn compatible(a: &WallSegment, b: &WallSegment) -> bool {
    match (a.arc, b.arc) {
        (false, false) => true,
        (true, true) => a.source == b.source,
        _ => false,
    }
}

/// Wedge polygon closing the gap at a junction.
///
/// The face offset points of every participating wall are sorted by angle
/// around the junction point and closed into a ring.
pub fn junction_filler(junction: &Junction, segments: &[WallSegment]) -> Option<Ring> {
    let mut points: Vec<Point2<f64>> = Vec::with_capacity(junction.members.len() * 2);

    for member in &junction.members {
        let seg = &segments[member.index()];
        let Some(dir) = seg.direction() else {
            continue;
        };
        let offset = left_normal(&dir) * seg.half_thickness();
        let base = match *member {
            Member::End(_, end) => seg.endpoint(end),
            Member::Span(_, t) => seg.a + (seg.b - seg.a) * t,
        };
        points.push(base + offset);
        points.push(base - offset);
    }

    if points.len() < 3 {
        return None;
    }

    let center = junction.point;
    points.sort_by(|p, q| {
        let ap = (p.y - center.y).atan2(p.x - center.x);
        let aq = (q.y - center.y).atan2(q.x - center.x);
        ap.total_cmp(&aq)
    });

    let ring = sanitize_contour(&points)?;
    if ring.len() < 3 || compute_signed_area(&ring).abs() < 1e-3 {
        return None;
    }
    Some(ring)
}
