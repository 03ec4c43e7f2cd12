//! Command-line arguments of the simulator binaries.

use std::path::PathBuf;

use clap::Parser;
use sfros_types::{QualityPreset, RenderSettings, SimError};

/// Arguments of `stonefish_simulator`.
#[derive(Debug, Parser)]
#[command(name = "stonefish_simulator")]
#[command(about = "Run a simulation scenario in a window and serve it as a node")]
#[command(long_about = None)]
pub struct GraphicalArgs {
    /// Directory with the engine's shaders, meshes and textures
    pub data_path: String,
    /// Scenario description file
    pub scenario: PathBuf,
    /// Simulation steps per second
    pub rate: f64,
    /// Window width in pixels
    pub window_w: u32,
    /// Window height in pixels
    pub window_h: u32,
    /// Render quality: low, medium or high (anything else means medium)
    pub quality: String,
    /// Configuration file (default: ~/.sfros/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl GraphicalArgs {
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings::with_preset(
            self.window_w,
            self.window_h,
            QualityPreset::from(self.quality.as_str()),
        )
    }
}

/// Arguments of `stonefish_simulator_nogpu`.
#[derive(Debug, Parser)]
#[command(name = "stonefish_simulator_nogpu")]
#[command(about = "Run a simulation scenario headless and serve it as a node", long_about = None)]
pub struct ConsoleArgs {
    /// Directory with the engine's resources
    pub data_path: String,
    /// Scenario description file
    pub scenario: PathBuf,
    /// Simulation steps per second
    pub rate: f64,
    /// Configuration file (default: ~/.sfros/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// The engine expects its data directory with a trailing separator.
pub fn data_dir(raw: &str) -> PathBuf {
    PathBuf::from(format!("{raw}/"))
}

/// Accept only a finite, positive step rate.
pub fn validate_rate(rate: f64) -> Result<f64, SimError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(SimError::InvalidArgument(format!(
            "rate must be a positive number of steps per second, got {rate}"
        )))
    }
}
