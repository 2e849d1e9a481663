// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door and window cutting for individually boxed walls
//!
//! A boxed wall is split along its length into full-height pieces between
//! openings, a sill box below and a header box above every opening, plus thin
//! trim boxes (two jambs, a head and, for raised openings, a sill) that stand
//! slightly proud of both wall faces.

use crate::config::MeshConfig;
use crate::segment::{left_normal, ResolvedOpening};
use crate::walls::ExtendedWall;
use nalgebra::{Point2, Vector2};

/// Spans shorter than this along the wall produce no box
const MIN_SPAN: f64 = 1e-3;

/// Vertical extents smaller than this produce no box
const MIN_RISE: f64 = 1e-3;

/// Vertical box over a quadrilateral footprint. The top may slope along the
/// wall (`top_start` at corners 0/3, `top_end` at corners 1/2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallBox {
    /// Counter-clockwise: start-right, end-right, end-left, start-left
    pub footprint: [Point2<f64>; 4],
    pub bottom: f64,
    pub top_start: f64,
    pub top_end: f64,
}

impl WallBox {
    /// Box between positions `s0..s1` along a wall axis
    #[allow(clippy::too_many_arguments)]
    pub fn along(
        origin: &Point2<f64>,
        dir: &Vector2<f64>,
        half_depth: f64,
        s0: f64,
        s1: f64,
        bottom: f64,
        top_start: f64,
        top_end: f64,
    ) -> Self {
        let offset = left_normal(dir) * half_depth;
        let p0 = origin + dir * s0;
        let p1 = origin + dir * s1;
        Self {
            footprint: [p0 - offset, p1 - offset, p1 + offset, p0 + offset],
            bottom,
            top_start,
            top_end,
        }
    }

    /// Height of the lower of the two top edges above the bottom
    pub fn min_rise(&self) -> f64 {
        self.top_start.min(self.top_end) - self.bottom
    }
}

/// Boxes produced for one wall
#[derive(Debug, Clone, Default)]
pub struct CutWall {
    pub boxes: Vec<WallBox>,
    pub frames: Vec<WallBox>,
}

/// Opening span resolved along the wall axis
#[derive(Debug, Clone, Copy)]
struct Span {
    start: f64,
    end: f64,
    opening: ResolvedOpening,
}

/// Cut a boxed wall around its openings.
///
/// Positions are measured from the original `a` endpoint; the extended wall
/// runs from `-extend_a` to `length + extend_b`.
pub fn cut_wall(wall: &ExtendedWall, config: &MeshConfig) -> CutWall {
    let segment = &wall.segment;
    let Some(dir) = segment.direction() else {
        return CutWall::default();
    };
    let length = segment.length();
    let half = segment.half_thickness();
    let origin = segment.a;
    let wall_start = -wall.extend_a;
    let wall_end = length + wall.extend_b;

    // Linear top along the original span, flat across the extensions
    let top_at = |s: f64| {
        let t = (s / length).clamp(0.0, 1.0);
        segment.height_a + (segment.height_b - segment.height_a) * t
    };
    let make = |s0: f64, s1: f64, bottom: f64, top_start: f64, top_end: f64| {
        WallBox::along(&origin, &dir, half, s0, s1, bottom, top_start, top_end)
    };

    let mut spans: Vec<Span> = segment
        .openings
        .iter()
        .filter_map(|opening| {
            let center = opening.t * length;
            let start = (center - opening.width / 2.0).max(wall_start);
            let end = (center + opening.width / 2.0).min(wall_end);
            (end - start > MIN_SPAN).then_some(Span {
                start,
                end,
                opening: *opening,
            })
        })
        .collect();
    spans.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut cut = CutWall::default();
    let mut cursor = wall_start;

    for span in &spans {
        if span.start - cursor > MIN_SPAN {
            cut.boxes
                .push(make(cursor, span.start, 0.0, top_at(cursor), top_at(span.start)));
        }

        // Overlapping openings share the already-open part
        let start = span.start.max(cursor);
        if span.end - start <= MIN_SPAN {
            continue;
        }
        let (top_start, top_end) = (top_at(start), top_at(span.end));
        let wall_top = top_start.min(top_end);
        let sill_top = span.opening.elevation.min(wall_top);
        let head_bottom = span.opening.elevation + span.opening.height;

        if sill_top > MIN_RISE {
            cut.boxes.push(make(start, span.end, 0.0, sill_top, sill_top));
        }
        if wall_top - head_bottom > MIN_RISE {
            cut.boxes
                .push(make(start, span.end, head_bottom, top_start, top_end));
        }

        cut.frames.extend(opening_frames(
            &origin,
            &dir,
            half,
            start,
            span.end,
            span.opening.elevation,
            head_bottom.min(wall_top),
            wall_top,
            config,
        ));

        cursor = span.end;
    }

    if wall_end - cursor > MIN_SPAN {
        cut.boxes
            .push(make(cursor, wall_end, 0.0, top_at(cursor), top_at(wall_end)));
    }

    cut
}

/// Trim around one opening: jambs, head and a sill for raised openings
#[allow(clippy::too_many_arguments)]
fn opening_frames(
    origin: &Point2<f64>,
    dir: &Vector2<f64>,
    half_thickness: f64,
    start: f64,
    end: f64,
    bottom: f64,
    top: f64,
    wall_top: f64,
    config: &MeshConfig,
) -> Vec<WallBox> {
    let width = config.frame_width;
    let depth = half_thickness * config.frame_depth_fraction;
    let frame = |s0: f64, s1: f64, z0: f64, z1: f64| {
        WallBox::along(origin, dir, depth, s0, s1, z0, z1, z1)
    };

    let mut frames = Vec::with_capacity(4);
    if top - bottom > MIN_RISE {
        frames.push(frame(start - width, start, bottom, top));
        frames.push(frame(end, end + width, bottom, top));
    }

    let head_top = (top + width).min(wall_top);
    if head_top - top > MIN_RISE {
        frames.push(frame(start - width, end + width, top, head_top));
    }

    if bottom > MIN_RISE {
        let sill_bottom = (bottom - width).max(0.0);
        frames.push(frame(start - width, end + width, sill_bottom, bottom));
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::WallSegment;
    use approx::assert_relative_eq;
    use plan_mesh_core::OpeningKind;

    fn boxed_wall(openings: Vec<ResolvedOpening>) -> ExtendedWall {
        ExtendedWall::new(
            WallSegment {
                a: Point2::new(0.0, 0.0),
                b: Point2::new(400.0, 0.0),
                thickness: 20.0,
                height_a: 280.0,
                height_b: 280.0,
                openings,
                arc: false,
                source: 0,
            },
            10.0,
            10.0,
        )
    }

    fn opening(t: f64, kind: OpeningKind) -> ResolvedOpening {
        let (height, elevation) = match kind {
            OpeningKind::Door => (210.0, 0.0),
            OpeningKind::Window => (120.0, 90.0),
        };
        ResolvedOpening {
            t,
            width: 90.0,
            height,
            elevation,
            kind,
        }
    }

    #[test]
    fn test_door_cut() {
        let cut = cut_wall(&boxed_wall(vec![opening(0.5, OpeningKind::Door)]), &MeshConfig::default());
        // left piece, header, right piece
        assert_eq!(cut.boxes.len(), 3);
        let left = &cut.boxes[0];
        assert_relative_eq!(left.footprint[0].x, -10.0);
        assert_relative_eq!(left.footprint[1].x, 155.0);
        let header = &cut.boxes[1];
        assert_relative_eq!(header.bottom, 210.0);
        assert_relative_eq!(header.top_start, 280.0);
        let right = &cut.boxes[2];
        assert_relative_eq!(right.footprint[1].x, 410.0);
        // jambs + head, no sill for a door
        assert_eq!(cut.frames.len(), 3);
    }

    #[test]
    fn test_window_cut_has_sill_box_and_sill_frame() {
        let cut = cut_wall(&boxed_wall(vec![opening(0.5, OpeningKind::Window)]), &MeshConfig::default());
        assert_eq!(cut.boxes.len(), 4);
        let sill = cut.boxes.iter().find(|b| b.bottom == 0.0 && b.top_start == 90.0).unwrap();
        assert_relative_eq!(sill.footprint[0].x, 155.0);
        assert_relative_eq!(sill.footprint[1].x, 245.0);
        assert_eq!(cut.frames.len(), 4);
    }

    #[test]
    fn test_frames_stand_proud_of_wall() {
        let config = MeshConfig::default();
        let cut = cut_wall(&boxed_wall(vec![opening(0.5, OpeningKind::Door)]), &config);
        let jamb = &cut.frames[0];
        assert_relative_eq!(jamb.footprint[2].y, 10.0 * config.frame_depth_fraction);
        assert_relative_eq!(jamb.footprint[1].x - jamb.footprint[0].x, config.frame_width);
    }

    #[test]
    fn test_openings_sorted_and_clamped() {
        let cut = cut_wall(
            &boxed_wall(vec![
                opening(0.8, OpeningKind::Door),
                opening(0.0, OpeningKind::Door),
            ]),
            &MeshConfig::default(),
        );
        // Opening at t=0 starts at -10 (clamped), so no leading piece
        assert_relative_eq!(cut.boxes[0].bottom, 210.0);
        assert_relative_eq!(cut.boxes[0].footprint[0].x, -10.0);
        // Full height pieces never overlap an opening span
        for b in cut.boxes.iter().filter(|b| b.bottom == 0.0) {
            assert!(b.footprint[1].x <= 275.0 + 1e-9 || b.footprint[0].x >= 365.0 - 1e-9);
        }
    }

    #[test]
    fn test_sloped_wall_header_follows_top() {
        let mut wall = boxed_wall(vec![opening(0.5, OpeningKind::Door)]);
        wall.segment.height_a = 240.0;
        wall.segment.height_b = 320.0;
        let cut = cut_wall(&wall, &MeshConfig::default());
        let header = cut.boxes.iter().find(|b| b.bottom == 210.0).unwrap();
        assert_relative_eq!(header.top_start, 240.0 + 80.0 * 155.0 / 400.0);
        assert_relative_eq!(header.top_end, 240.0 + 80.0 * 245.0 / 400.0);
    }

    #[test]
    fn test_opening_taller_than_wall_has_no_header() {
        let mut wall = boxed_wall(vec![opening(0.5, OpeningKind::Door)]);
        wall.segment.height_a = 200.0;
        wall.segment.height_b = 200.0;
        let cut = cut_wall(&wall, &MeshConfig::default());
        assert_eq!(cut.boxes.len(), 2);
        assert!(cut.boxes.iter().all(|b| b.bottom == 0.0));
    }
}
