// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Railing chains are maximal and direction-consistent regardless of how the
//! segments were drawn

use plan_mesh_core::model::{Balustrade, Design, Point2D};
use plan_mesh_geometry::balustrade::CHAIN_TOLERANCE;
use plan_mesh_geometry::segment::BalustradeSegment;
use plan_mesh_geometry::{build_balustrades, BalustradeChain, BalustradeGeometry};

fn railing(ax: f64, ay: f64, bx: f64, by: f64) -> Balustrade {
    Balustrade {
        a: Point2D::new(ax, ay),
        b: Point2D::new(bx, by),
        c: None,
        thickness: None,
        height: None,
    }
}

fn geometry(balustrades: Vec<Balustrade>) -> BalustradeGeometry {
    build_balustrades(&Design {
        balustrades,
        ..Design::default()
    })
}

/// Every joint's outgoing segment starts where the incoming one ended
fn assert_consistent(chain: &BalustradeChain, segments: &[BalustradeSegment]) {
    let oriented: Vec<_> = chain
        .links
        .iter()
        .map(|link| {
            let s = &segments[link.segment];
            if link.flipped {
                (s.b, s.a)
            } else {
                (s.a, s.b)
            }
        })
        .collect();
    for pair in oriented.windows(2) {
        let gap = (pair[1].0 - pair[0].1).norm();
        assert!(gap < CHAIN_TOLERANCE, "joint gap {}", gap);
    }
}

#[test]
fn shuffled_and_reversed_segments_form_one_chain() {
    // U shape (0,200) -> (0,0) -> (300,0) -> (300,200), drawn out of order
    let geo = geometry(vec![
        railing(300.0, 0.0, 0.0, 0.0),
        railing(300.0, 200.0, 300.0, 0.0),
        railing(0.0, 200.0, 0.0, 0.0),
    ]);
    assert_eq!(geo.chains.len(), 1);
    let chain = &geo.chains[0];
    assert_eq!(chain.len(), 3);
    assert_consistent(chain, &geo.segments);

    let points = chain.points(&geo.segments);
    assert_eq!(points.len(), 4);
    // Open chain: both ends stay apart
    assert!((points[0] - points[3]).norm() > 200.0);
    assert_eq!(geo.strips.len(), 1);
    assert!(!geo.fills.is_empty());
}

#[test]
fn closed_loop_returns_to_its_start() {
    let geo = geometry(vec![
        railing(0.0, 0.0, 200.0, 0.0),
        railing(200.0, 200.0, 200.0, 0.0),
        railing(200.0, 200.0, 0.0, 200.0),
        railing(0.0, 0.0, 0.0, 200.0),
    ]);
    assert_eq!(geo.chains.len(), 1);
    let chain = &geo.chains[0];
    assert_eq!(chain.len(), 4);
    assert_consistent(chain, &geo.segments);
    let points = chain.points(&geo.segments);
    assert!((points[0] - points[4]).norm() < CHAIN_TOLERANCE);
}

#[test]
fn distant_railings_stay_separate() {
    let geo = geometry(vec![
        railing(0.0, 0.0, 100.0, 0.0),
        railing(130.0, 0.0, 230.0, 0.0),
    ]);
    assert_eq!(geo.chains.len(), 2);
    assert!(geo.chains.iter().all(|c| c.len() == 1));
    // Short chains never contribute rim fills
    assert!(geo.fills.is_empty());
    assert_eq!(geo.strips.len(), 2);
}

#[test]
fn curved_railing_is_one_chain_of_pieces() {
    let mut curved = railing(0.0, 0.0, 400.0, 0.0);
    curved.c = Some(Point2D::new(200.0, 300.0));
    let geo = geometry(vec![curved]);

    assert_eq!(geo.chains.len(), 1);
    let chain = &geo.chains[0];
    assert_eq!(chain.len(), geo.segments.len());
    assert!(chain.len() > 8);
    assert_consistent(chain, &geo.segments);
    assert_eq!(geo.fills.len(), 2);
}

#[test]
fn degenerate_railings_are_counted_and_skipped() {
    let geo = geometry(vec![
        railing(0.0, 0.0, 0.0, 0.0),
        railing(0.0, 0.0, f64::NAN, 10.0),
        railing(0.0, 0.0, 100.0, 0.0),
    ]);
    assert_eq!(geo.skipped, 2);
    assert_eq!(geo.chains.len(), 1);
}
