use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse lifecycle state reported by the simulation engine.
///
/// `Finished` is terminal: once observed, the application tears the engine
/// down and no further ticks are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationState {
    /// Initialised but not advancing (never started, or paused).
    #[default]
    Stopped,
    /// Advancing every tick.
    Running,
    /// Reached the end of the scenario or was asked to quit.
    Finished,
}

impl SimulationState {
    /// `true` for the terminal [`SimulationState::Finished`] value.
    pub fn is_terminal(self) -> bool {
        matches!(self, SimulationState::Finished)
    }
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationState::Stopped => write!(f, "stopped"),
            SimulationState::Running => write!(f, "running"),
            SimulationState::Finished => write!(f, "finished"),
        }
    }
}

/// Per-effect render quality understood by the graphical engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderQuality {
    Disabled,
    Low,
    #[default]
    Medium,
    High,
}

/// Quality preset selected on the command line.
///
/// Parsing is lenient: anything other than `"low"` or `"high"` selects
/// [`QualityPreset::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl From<&str> for QualityPreset {
    fn from(s: &str) -> Self {
        match s {
            "low" => QualityPreset::Low,
            "high" => QualityPreset::High,
            _ => QualityPreset::Medium,
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityPreset::Low => write!(f, "low"),
            QualityPreset::Medium => write!(f, "medium"),
            QualityPreset::High => write!(f, "high"),
        }
    }
}

/// Window and effect settings forwarded unchanged to the graphical engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub window_w: u32,
    pub window_h: u32,
    pub shadows: RenderQuality,
    pub ao: RenderQuality,
    pub atmosphere: RenderQuality,
    pub ocean: RenderQuality,
    pub aa: RenderQuality,
    pub ssr: RenderQuality,
}

impl RenderSettings {
    /// Build settings for a `window_w` × `window_h` window from a preset.
    ///
    /// The low preset disables ambient occlusion and screen-space
    /// reflections; the other presets apply their level uniformly.
    pub fn with_preset(window_w: u32, window_h: u32, preset: QualityPreset) -> Self {
        let (level, ao, ssr) = match preset {
            QualityPreset::Low => (
                RenderQuality::Low,
                RenderQuality::Disabled,
                RenderQuality::Disabled,
            ),
            QualityPreset::Medium => (
                RenderQuality::Medium,
                RenderQuality::Medium,
                RenderQuality::Medium,
            ),
            QualityPreset::High => (
                RenderQuality::High,
                RenderQuality::High,
                RenderQuality::High,
            ),
        };
        Self {
            window_w,
            window_h,
            shadows: level,
            ao,
            atmosphere: level,
            ocean: level,
            aa: level,
            ssr,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::with_preset(1200, 800, QualityPreset::Medium)
    }
}

/// Toggles for the engine's built-in debug helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperSettings {
    pub show_fluid_dynamics: bool,
    pub show_coord_sys: bool,
    pub show_bullet_debug_info: bool,
    pub show_sensors: bool,
    pub show_actuators: bool,
    pub show_forces: bool,
}

/// Application identity forwarded to the engine at initialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Window / log title.
    pub title: String,
    /// Directory holding engine resources (shaders, meshes, textures).
    pub data_path: PathBuf,
}

impl AppSettings {
    pub fn new(title: impl Into<String>, data_path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            data_path: data_path.into(),
        }
    }
}

/// Global error type for engine faults, bad arguments and runtime plumbing.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimError {
    #[error("Engine Fault during {stage}: {details}")]
    Engine { stage: String, details: String },

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Scenario Error: {0}")]
    Scenario(String),

    #[error("Middleware Channel Error: {0}")]
    Channel(String),
}

impl SimError {
    /// Shorthand for [`SimError::Engine`].
    pub fn engine(stage: impl Into<String>, details: impl Into<String>) -> Self {
        SimError::Engine {
            stage: stage.into(),
            details: details.into(),
        }
    }
}
