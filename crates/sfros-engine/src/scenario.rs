//! Scenario description for the stand-in engine.
//!
//! ```toml
//! duration_steps = 600
//!
//! [[body]]
//! name = "girona500"
//! position = [1.0, 2.0, 3.0]
//! rpy = [0.0, 0.0, 1.5708]
//!
//! [[static]]
//! name = "seabed"
//!
//! [trackball]
//! eye = [0.0, -5.0, 2.0]
//! direction = [0.0, 1.0, 0.0]
//!
//! [ocean]
//! jerlov = 0.2
//! currents = true
//! ```

use std::path::Path;

use serde::Deserialize;
use sfros_types::SimError;

/// Entities and environment loaded by [`SimManager`][crate::sim::SimManager].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Scenario {
    /// Number of simulation steps after which the engine reports `Finished`.
    /// Runs until stopped when absent.
    #[serde(default)]
    pub duration_steps: Option<u64>,

    #[serde(default, rename = "body")]
    pub bodies: Vec<BodySpec>,

    #[serde(default, rename = "static")]
    pub statics: Vec<StaticSpec>,

    #[serde(default)]
    pub trackball: Option<TrackballSpec>,

    #[serde(default)]
    pub ocean: Option<OceanSpec>,
}

/// A moving rigid body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BodySpec {
    pub name: String,
    pub position: [f64; 3],
    /// Roll, pitch, yaw in radians.
    #[serde(default)]
    pub rpy: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StaticSpec {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackballSpec {
    pub eye: [f32; 3],
    pub direction: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OceanSpec {
    #[serde(default = "default_jerlov")]
    pub jerlov: f32,
    /// Whether ocean currents act on bodies from the first step.
    #[serde(default = "default_currents")]
    pub currents: bool,
}

fn default_jerlov() -> f32 {
    0.2
}

fn default_currents() -> bool {
    true
}

impl Scenario {
    /// Parse a scenario from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, SimError> {
        toml::from_str(raw)
            .map_err(|e| SimError::Scenario(format!("Failed to parse scenario: {e}")))
    }

    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SimError::Scenario(format!("Failed to read scenario at {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }
}
