// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh generation settings

use serde::{Deserialize, Serialize};

/// How the floor slab is emitted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SlabMode {
    /// Closed slab solid with real thickness, for fabrication
    #[default]
    Solid,
    /// Top faces only, sampled on a grid; seam-free for previews
    Raster,
}

impl std::str::FromStr for SlabMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "solid" => Ok(SlabMode::Solid),
            "raster" => Ok(SlabMode::Raster),
            other => Err(format!("unknown slab mode '{}'", other)),
        }
    }
}

/// Configuration for per-floor mesh generation. Lengths in cm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    /// Standard wall height
    pub wall_height: f64,
    /// Slab thickness for [`SlabMode::Solid`]
    pub slab_thickness: f64,
    pub slab_mode: SlabMode,
    /// Grid cell edge for [`SlabMode::Raster`]
    pub raster_cell_size: f64,
    /// Outward push applied to floor-source polygons before the union
    pub floor_expansion: f64,
    /// Plan units to output units (cm -> m)
    pub unit_scale: f64,
    /// Width of opening trim members
    pub frame_width: f64,
    /// Trim depth as a multiple of the wall half-thickness
    pub frame_depth_fraction: f64,
    /// Surfaces with a centroid further than this outside the wall bounds are dropped
    pub surface_exclusion_margin: f64,
    /// Generate floors on the rayon pool
    pub parallel: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            wall_height: 280.0,
            slab_thickness: 30.0,
            slab_mode: SlabMode::Solid,
            raster_cell_size: 3.0,
            floor_expansion: 1.5,
            unit_scale: 0.01,
            frame_width: 6.0,
            frame_depth_fraction: 1.15,
            surface_exclusion_margin: 50.0,
            parallel: true,
        }
    }
}

impl MeshConfig {
    /// Seam-free preview output
    pub fn preview() -> Self {
        Self {
            slab_mode: SlabMode::Raster,
            ..Self::default()
        }
    }

    /// Overlay values from `PLAN_MESH_*` environment variables.
    ///
    /// Unset or unparsable variables keep the current value.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary key lookup
    pub fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).and_then(|v| v.trim().parse::<f64>().ok());
        Self {
            wall_height: get("PLAN_MESH_WALL_HEIGHT").unwrap_or(self.wall_height),
            slab_thickness: get("PLAN_MESH_SLAB_THICKNESS").unwrap_or(self.slab_thickness),
            slab_mode: lookup("PLAN_MESH_SLAB_MODE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.slab_mode),
            raster_cell_size: get("PLAN_MESH_RASTER_CELL").unwrap_or(self.raster_cell_size),
            unit_scale: get("PLAN_MESH_UNIT_SCALE").unwrap_or(self.unit_scale),
            parallel: lookup("PLAN_MESH_PARALLEL")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(self.parallel),
            ..self
        }
    }

    /// Reject settings the pipeline cannot work with
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("wall_height", self.wall_height),
            ("slab_thickness", self.slab_thickness),
            ("raster_cell_size", self.raster_cell_size),
            ("unit_scale", self.unit_scale),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{} must be positive, got {}", name, value));
            }
        }
        if !(self.floor_expansion.is_finite() && self.floor_expansion >= 0.0) {
            return Err(format!("floor_expansion must not be negative, got {}", self.floor_expansion));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: MeshConfig =
            serde_json::from_str(r#"{"wall_height": 250, "slab_mode": "raster"}"#).unwrap();
        assert_eq!(config.wall_height, 250.0);
        assert_eq!(config.slab_mode, SlabMode::Raster);
        assert_eq!(config.slab_thickness, 30.0);
        assert_eq!(config.unit_scale, 0.01);
    }

    #[test]
    fn test_overrides_keep_unparsable_values() {
        let vars = [
            ("PLAN_MESH_WALL_HEIGHT", "300"),
            ("PLAN_MESH_SLAB_MODE", "raster"),
            ("PLAN_MESH_RASTER_CELL", "tall"),
            ("PLAN_MESH_PARALLEL", "false"),
        ];
        let config = MeshConfig::default().with_overrides(|key| {
            vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
        });
        assert_eq!(config.wall_height, 300.0);
        assert_eq!(config.slab_mode, SlabMode::Raster);
        assert_eq!(config.raster_cell_size, 3.0);
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_height() {
        let config = MeshConfig {
            wall_height: 0.0,
            ..MeshConfig::default()
        };
        assert!(config.validate().unwrap_err().contains("wall_height"));
    }

    #[test]
    fn test_slab_mode_from_str() {
        assert_eq!("RASTER".parse::<SlabMode>(), Ok(SlabMode::Raster));
        assert!("mesh".parse::<SlabMode>().is_err());
    }
}
