// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan document types
//!
//! Field shapes follow the editor's JSON export. Optional numeric fields are
//! kept optional here; the accessors apply the documented defaults so that a
//! missing value never silently becomes zero.

use serde::{Deserialize, Serialize};

/// Default wall thickness (cm)
pub const DEFAULT_WALL_THICKNESS: f64 = 20.0;
/// Default balustrade thickness (cm)
pub const DEFAULT_BALUSTRADE_THICKNESS: f64 = 10.0;
/// Default balustrade height (cm)
pub const DEFAULT_BALUSTRADE_HEIGHT: f64 = 100.0;
/// Default opening width (cm)
pub const DEFAULT_OPENING_WIDTH: f64 = 90.0;
/// Default door height (cm)
pub const DEFAULT_DOOR_HEIGHT: f64 = 210.0;
/// Default door sill elevation (cm)
pub const DEFAULT_DOOR_ELEVATION: f64 = 0.0;
/// Default window height (cm)
pub const DEFAULT_WINDOW_HEIGHT: f64 = 120.0;
/// Default window sill elevation (cm)
pub const DEFAULT_WINDOW_ELEVATION: f64 = 90.0;

/// Surface roles that mark a floor cutout
const VOID_ROLES: [&str; 3] = ["void", "cutout", "stairwell"];

/// A 2D point in plan space (cm)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Door or window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OpeningKind {
    Window,
    /// Also used for unrecognized type names
    #[default]
    #[serde(other)]
    Door,
}

/// Opening placed along a wall
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Opening {
    /// Center position along the wall, 0 = `a`, 1 = `b`
    pub t: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(rename = "type", default)]
    pub kind: OpeningKind,
}

impl Opening {
    pub fn door(t: f64) -> Self {
        Self {
            t,
            width: None,
            height: None,
            elevation: None,
            kind: OpeningKind::Door,
        }
    }

    pub fn window(t: f64) -> Self {
        Self {
            kind: OpeningKind::Window,
            ..Self::door(t)
        }
    }

    pub fn width(&self) -> f64 {
        positive_or(self.width, DEFAULT_OPENING_WIDTH)
    }

    pub fn height(&self) -> f64 {
        let default = match self.kind {
            OpeningKind::Door => DEFAULT_DOOR_HEIGHT,
            OpeningKind::Window => DEFAULT_WINDOW_HEIGHT,
        };
        positive_or(self.height, default)
    }

    pub fn elevation(&self) -> f64 {
        let default = match self.kind {
            OpeningKind::Door => DEFAULT_DOOR_ELEVATION,
            OpeningKind::Window => DEFAULT_WINDOW_ELEVATION,
        };
        self.elevation
            .filter(|e| e.is_finite() && *e >= 0.0)
            .unwrap_or(default)
    }
}

/// Wall segment defined by its centerline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Wall {
    pub a: Point2D,
    pub b: Point2D,
    /// Quadratic Bezier control point; present for curved walls
    #[serde(default)]
    pub c: Option<Point2D>,
    #[serde(default)]
    pub thickness: Option<f64>,
    #[serde(default)]
    pub openings: Vec<Opening>,
    #[serde(default)]
    pub height_a: Option<f64>,
    #[serde(default)]
    pub height_b: Option<f64>,
}

impl Wall {
    pub fn straight(a: Point2D, b: Point2D, thickness: f64) -> Self {
        Self {
            a,
            b,
            c: None,
            thickness: Some(thickness),
            openings: Vec::new(),
            height_a: None,
            height_b: None,
        }
    }

    pub fn thickness(&self) -> f64 {
        positive_or(self.thickness, DEFAULT_WALL_THICKNESS)
    }

    pub fn is_curved(&self) -> bool {
        self.c.is_some()
    }

    pub fn length(&self) -> f64 {
        self.a.distance_to(&self.b)
    }

    /// Heights at `a` and `b`, falling back to `default` where unset
    pub fn end_heights(&self, default: f64) -> (f64, f64) {
        (
            positive_or(self.height_a, default),
            positive_or(self.height_b, default),
        )
    }
}

/// Railing segment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Balustrade {
    pub a: Point2D,
    pub b: Point2D,
    #[serde(default)]
    pub c: Option<Point2D>,
    #[serde(default)]
    pub thickness: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl Balustrade {
    pub fn thickness(&self) -> f64 {
        positive_or(self.thickness, DEFAULT_BALUSTRADE_THICKNESS)
    }

    pub fn height(&self) -> f64 {
        positive_or(self.height, DEFAULT_BALUSTRADE_HEIGHT)
    }
}

/// Polygon vertex; `c` is the control point of the edge arriving at this vertex
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PolyVertex {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub c: Option<Point2D>,
}

impl PolyVertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, c: None }
    }
}

/// Named floor region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Area {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poly: Vec<PolyVertex>,
}

/// Floor finish surface, possibly marking a cutout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Surface {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poly: Vec<PolyVertex>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_cutout: bool,
}

impl Surface {
    /// True when the surface marks a hole in the slab
    pub fn is_void(&self) -> bool {
        self.is_cutout
            || self
                .role
                .as_deref()
                .map(|role| VOID_ROLES.iter().any(|v| role.eq_ignore_ascii_case(v)))
                .unwrap_or(false)
    }
}

/// Placed item (furniture, stairs, railings drawn as objects)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default)]
    pub refid: Option<String>,
    /// Center in plan space
    pub x: f64,
    pub y: f64,
    /// Plan extent along the item's local x axis
    #[serde(default)]
    pub width: f64,
    /// Plan extent along the item's local y axis
    #[serde(default)]
    pub height: f64,
    /// Vertical size
    #[serde(default)]
    pub z_height: f64,
    /// Degrees, counter-clockwise
    #[serde(default)]
    pub rotation: f64,
}

/// Content of one floor variant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Design {
    #[serde(default)]
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub surfaces: Vec<Surface>,
    #[serde(default)]
    pub balustrades: Vec<Balustrade>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Design {
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
            && self.areas.is_empty()
            && self.surfaces.is_empty()
            && self.balustrades.is_empty()
            && self.items.is_empty()
    }
}

/// One building level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Floor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub designs: Vec<Design>,
}

impl Floor {
    pub fn with_design(design: Design) -> Self {
        Self {
            name: None,
            designs: vec![design],
        }
    }

    /// The design used for reconstruction (the first variant)
    pub fn design(&self) -> Option<&Design> {
        self.designs.first()
    }

    /// Items of the active design, empty when there is none
    pub fn items(&self) -> &[Item] {
        self.design().map(|d| d.items.as_slice()).unwrap_or(&[])
    }
}

#[inline]
fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(default)
}
