// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stair void detection
//!
//! Floor openings come from two places:
//! 1. surfaces explicitly marked as voids or cutouts on their own floor
//! 2. items sharing a reference id and position with an item on the floor
//!    below; the upper item's footprint, shrunk by a margin, is cut out of the
//!    upper slab (the opening above a staircase)

use crate::bool2d::{ensure_ccw, is_valid_contour, sanitize_contour};
use crate::profile::Ring;
use crate::tessellate::tessellate_ring;
use nalgebra::{Point2, Rotation2};
use plan_mesh_core::model::{Design, Floor, Item};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Same item on adjacent floors when both axes agree within this (cm)
pub const POSITION_TOLERANCE: f64 = 5.0;

/// Inset applied on every side of a matched item's footprint (cm)
pub const VOID_MARGIN: f64 = 10.0;

/// Inset voids narrower than this on either side are dropped (cm)
pub const MIN_VOID_SIZE: f64 = 30.0;

/// Index of the floor below's items by reference id
struct ItemIndex<'a> {
    by_refid: FxHashMap<&'a str, Vec<&'a Item>>,
}

impl<'a> ItemIndex<'a> {
    fn new(items: &'a [Item]) -> Self {
        let mut by_refid: FxHashMap<&'a str, Vec<&'a Item>> = FxHashMap::default();
        for item in items {
            if let Some(refid) = item.refid.as_deref() {
                by_refid.entry(refid).or_default().push(item);
            }
        }
        Self { by_refid }
    }

    /// First item with the same refid at the same position
    fn find_match(&self, item: &Item) -> Option<&'a Item> {
        let refid = item.refid.as_deref()?;
        self.by_refid.get(refid)?.iter().copied().find(|other| {
            (other.x - item.x).abs() <= POSITION_TOLERANCE
                && (other.y - item.y).abs() <= POSITION_TOLERANCE
        })
    }
}

/// Tessellated rings of surfaces flagged as voids
pub fn explicit_voids(design: &Design) -> Vec<Ring> {
    design
        .surfaces
        .iter()
        .filter(|s| s.is_void())
        .filter_map(|s| sanitize_contour(&tessellate_ring(&s.poly)))
        .filter(|ring| is_valid_contour(ring))
        .map(|ring| ensure_ccw(&ring))
        .collect()
}

/// Item footprint shrunk by [`VOID_MARGIN`] and rotated about its center
pub fn stair_void(item: &Item) -> Option<Ring> {
    let half_w = item.width / 2.0 - VOID_MARGIN;
    let half_h = item.height / 2.0 - VOID_MARGIN;
    if !(half_w * 2.0 >= MIN_VOID_SIZE && half_h * 2.0 >= MIN_VOID_SIZE) {
        return None;
    }

    let rotation = Rotation2::new(item.rotation.to_radians());
    let center = Point2::new(item.x, item.y);
    let corners = [
        Point2::new(-half_w, -half_h),
        Point2::new(half_w, -half_h),
        Point2::new(half_w, half_h),
        Point2::new(-half_w, half_h),
    ];
    let ring: Ring = corners
        .iter()
        .map(|corner| center + rotation * corner.coords)
        .collect();
    ring.iter()
        .all(|p| p.x.is_finite() && p.y.is_finite())
        .then_some(ring)
}

/// Voids inferred from items repeated at the same position on the floor below
pub fn inferred_voids(items: &[Item], prior_items: &[Item]) -> Vec<Ring> {
    let index = ItemIndex::new(prior_items);
    items
        .iter()
        .filter(|item| index.find_match(item).is_some())
        .filter_map(stair_void)
        .collect()
}

/// All voids of one floor
pub fn voids_for_floor(design: &Design, prior_items: Option<&[Item]>) -> Vec<Ring> {
    let mut voids = explicit_voids(design);
    if let Some(prior) = prior_items {
        voids.extend(inferred_voids(&design.items, prior));
    }
    voids
}

/// Voids for every floor, ordered bottom to top. Floors without a design get
/// an empty list.
pub fn detect_stair_voids(floors: &[Floor]) -> Vec<Vec<Ring>> {
    floors
        .iter()
        .enumerate()
        .map(|(i, floor)| {
            let Some(design) = floor.design() else {
                return Vec::new();
            };
            let prior = i.checked_sub(1).map(|below| floors[below].items());
            let voids = voids_for_floor(design, prior);
            if !voids.is_empty() {
                debug!(floor = i, voids = voids.len(), "detected voids");
            }
            voids
        })
        .collect()
}
