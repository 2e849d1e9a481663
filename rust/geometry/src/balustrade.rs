// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Balustrade chains
//!
//! Railings arrive either as explicit balustrades or as thin, railing-height
//! furniture items. Segments are linked into ordered chains, offset into left
//! and right edges, and turned into floor-source polygons: a strip under every
//! chain, plus rim fills for chains long enough to enclose area (balconies).

use crate::bool2d::{bounds_area, ensure_ccw, is_valid_contour, sanitize_contour};
use crate::profile::Ring;
use crate::segment::{left_normal, BalustradeSegment, MIN_SEGMENT_LENGTH};
use crate::tessellate::tessellate_balustrades;
use nalgebra::{Point2, Vector2};
use plan_mesh_core::model::{Design, Item};
use std::collections::VecDeque;
use tracing::debug;

/// Endpoints closer than this link into one chain (cm)
pub const CHAIN_TOLERANCE: f64 = 15.0;

/// Long side / short side of an item that reads as a railing
pub const MIN_RAILING_ASPECT: f64 = 2.5;

/// Thin side of a railing item must be below this (cm)
pub const MAX_RAILING_THICKNESS: f64 = 20.0;

pub const MIN_RAILING_HEIGHT: f64 = 50.0;
pub const MAX_RAILING_HEIGHT: f64 = 130.0;

/// Chains need this many segments before they get rim fills
pub const MIN_FILL_SEGMENTS: usize = 3;

/// Segment reference inside a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink {
    pub segment: usize,
    /// Traversed b -> a
    pub flipped: bool,
}

/// Ordered, direction-consistent run of connected segments
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BalustradeChain {
    pub links: Vec<ChainLink>,
}

impl BalustradeChain {
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Joint positions along the chain, `len() + 1` points
    pub fn points(&self, segments: &[BalustradeSegment]) -> Vec<Point2<f64>> {
        let mut points = Vec::with_capacity(self.links.len() + 1);
        for (i, link) in self.links.iter().enumerate() {
            let (start, end) = oriented(&segments[link.segment], link.flipped);
            if i == 0 {
                points.push(start);
            }
            points.push(end);
        }
        points
    }
}

/// Left and right offset polylines of a chain
#[derive(Debug, Clone, PartialEq)]
pub struct ChainEdges {
    pub left: Vec<Point2<f64>>,
    pub right: Vec<Point2<f64>>,
}

/// Balustrade geometry for one floor
#[derive(Debug, Clone, Default)]
pub struct BalustradeGeometry {
    /// Extended working segments referenced by `chains`
    pub segments: Vec<BalustradeSegment>,
    pub chains: Vec<BalustradeChain>,
    /// Railing footprints
    pub strips: Vec<Ring>,
    /// Rim fill candidates for the floor polygon
    pub fills: Vec<Ring>,
    pub skipped: usize,
}

#[inline]
fn oriented(segment: &BalustradeSegment, flipped: bool) -> (Point2<f64>, Point2<f64>) {
    if flipped {
        (segment.b, segment.a)
    } else {
        (segment.a, segment.b)
    }
}

fn is_usable(segment: &BalustradeSegment) -> bool {
    segment.length() >= MIN_SEGMENT_LENGTH
        && segment.a.iter().chain(segment.b.iter()).all(|v| v.is_finite())
}

/// Railings inferred from elongated, railing-height items
pub fn detect_from_items(items: &[Item]) -> Vec<BalustradeSegment> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let long = item.width.max(item.height);
            let thin = item.width.min(item.height);
            if thin <= 0.0
                || long / thin <= MIN_RAILING_ASPECT
                || thin >= MAX_RAILING_THICKNESS
                || !(MIN_RAILING_HEIGHT..=MAX_RAILING_HEIGHT).contains(&item.z_height)
            {
                return None;
            }

            let angle = item.rotation.to_radians();
            let local_x = Vector2::new(angle.cos(), angle.sin());
            let axis = if item.width >= item.height {
                local_x
            } else {
                left_normal(&local_x)
            };
            let center = Point2::new(item.x, item.y);
            Some(BalustradeSegment {
                a: center - axis * (long / 2.0),
                b: center + axis * (long / 2.0),
                thickness: thin,
                height: item.z_height,
                arc: false,
                source: index,
            })
        })
        .collect()
}

/// Push each endpoint that touches another segment outward by that
/// neighbour's half-thickness
pub fn extend_endpoints(segments: &[BalustradeSegment]) -> Vec<BalustradeSegment> {
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let Some(dir) = segment.direction() else {
                return segment.clone();
            };
            let reach = |p: &Point2<f64>| {
                segments
                    .iter()
                    .enumerate()
                    .filter(|(j, other)| {
                        *j != i
                            && ((other.a - p).norm() < CHAIN_TOLERANCE
                                || (other.b - p).norm() < CHAIN_TOLERANCE)
                    })
                    .map(|(_, other)| other.half_thickness())
                    .fold(0.0, f64::max)
            };
            let mut extended = segment.clone();
            extended.a = segment.a - dir * reach(&segment.a);
            extended.b = segment.b + dir * reach(&segment.b);
            extended
        })
        .collect()
}

/// Greedy nearest-endpoint linking into maximal chains
pub fn build_chains(segments: &[BalustradeSegment]) -> Vec<BalustradeChain> {
    let mut used = vec![false; segments.len()];
    let mut chains = Vec::new();

    for seed in 0..segments.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let mut links = VecDeque::from([ChainLink {
            segment: seed,
            flipped: false,
        }]);

        // Forward from the tail
        loop {
            let Some(last) = links.back() else { break };
            let tail = oriented(&segments[last.segment], last.flipped).1;
            match nearest_link(segments, &used, &tail, false) {
                Some(link) => {
                    used[link.segment] = true;
                    links.push_back(link);
                }
                None => break,
            }
        }

        // Backward from the head
        loop {
            let Some(first) = links.front() else { break };
            let head = oriented(&segments[first.segment], first.flipped).0;
            match nearest_link(segments, &used, &head, true) {
                Some(link) => {
                    used[link.segment] = true;
                    links.push_front(link);
                }
                None => break,
            }
        }

        chains.push(BalustradeChain {
            links: links.into_iter().collect(),
        });
    }

    chains
}

/// Closest unused segment with an endpoint near `tip`. Appending needs the
/// candidate to start at the tip; prepending needs it to end there.
fn nearest_link(
    segments: &[BalustradeSegment],
    used: &[bool],
    tip: &Point2<f64>,
    prepend: bool,
) -> Option<ChainLink> {
    let mut best: Option<(f64, ChainLink)> = None;
    for (j, segment) in segments.iter().enumerate() {
        if used[j] {
            continue;
        }
        for (endpoint, at_a) in [(&segment.a, true), (&segment.b, false)] {
            let distance = (endpoint - tip).norm();
            if distance >= CHAIN_TOLERANCE {
                continue;
            }
            // Appending from `a` keeps direction; prepending onto `b` does too
            let flipped = if prepend { at_a } else { !at_a };
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((
                    distance,
                    ChainLink {
                        segment: j,
                        flipped,
                    },
                ));
            }
        }
    }
    best.map(|(_, link)| link)
}

/// Offset a chain to both sides, using each joint's local segment thickness
pub fn chain_edges(chain: &BalustradeChain, segments: &[BalustradeSegment]) -> Option<ChainEdges> {
    let points = chain.points(segments);
    let frames: Vec<(Vector2<f64>, f64)> = chain
        .links
        .iter()
        .map(|link| {
            let segment = &segments[link.segment];
            let (start, end) = oriented(segment, link.flipped);
            let dir = (end - start).try_normalize(1e-12)?;
            Some((left_normal(&dir), segment.half_thickness()))
        })
        .collect::<Option<_>>()?;
    if frames.is_empty() {
        return None;
    }

    let n = frames.len();
    let mut left = Vec::with_capacity(n + 1);
    let mut right = Vec::with_capacity(n + 1);
    for (k, point) in points.iter().enumerate() {
        let (normal, half) = if k == 0 {
            frames[0]
        } else if k == n {
            frames[n - 1]
        } else {
            let (incoming, _) = frames[k - 1];
            let (outgoing, half) = frames[k];
            let normal = (incoming + outgoing).try_normalize(1e-9).unwrap_or(outgoing);
            (normal, half)
        };
        left.push(point + normal * half);
        right.push(point - normal * half);
    }

    Some(ChainEdges { left, right })
}

/// Railing footprint: left edge forward, right edge back
pub fn strip_polygon(edges: &ChainEdges) -> Option<Ring> {
    let mut ring = edges.left.clone();
    ring.extend(edges.right.iter().rev());
    let ring = sanitize_contour(&ring)?;
    is_valid_contour(&ring).then(|| ensure_ccw(&ring))
}

/// Outer and inner rim rings of a curved or folded chain
pub fn fill_polygons(edges: &ChainEdges) -> Vec<Ring> {
    let (outer, inner) = if bounds_area(&edges.left) >= bounds_area(&edges.right) {
        (&edges.left, &edges.right)
    } else {
        (&edges.right, &edges.left)
    };
    [outer, inner]
        .into_iter()
        .filter_map(|edge| sanitize_contour(edge))
        .filter(|ring| is_valid_contour(ring))
        .map(|ring| ensure_ccw(&ring))
        .collect()
}

/// Everything balustrade-related for one design
pub fn build_balustrades(design: &Design) -> BalustradeGeometry {
    let mut raw = tessellate_balustrades(&design.balustrades);
    raw.extend(detect_from_items(&design.items));

    let total = raw.len();
    raw.retain(is_usable);
    let skipped = total - raw.len();

    // Link on the drawn endpoints; extension would pull joints apart
    let chains = build_chains(&raw);
    let segments = extend_endpoints(&raw);

    let mut strips = Vec::new();
    let mut fills = Vec::new();
    for chain in &chains {
        let Some(edges) = chain_edges(chain, &segments) else {
            continue;
        };
        strips.extend(strip_polygon(&edges));
        if chain.len() >= MIN_FILL_SEGMENTS {
            fills.extend(fill_polygons(&edges));
        }
    }

    debug!(
        segments = segments.len(),
        chains = chains.len(),
        strips = strips.len(),
        fills = fills.len(),
        skipped,
        "built balustrades"
    );

    BalustradeGeometry {
        segments,
        chains,
        strips,
        fills,
        skipped,
    }
}
