//! Render configuration loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable config files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rasterizer::{Camera, DEFAULT_MAX_EDGE_STEPS, HEIGHT, ROW_STRIDE, WHITE, WIDTH};

/// Error type for config loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Invalid display: {0}")]
    InvalidDisplay(String),
}

/// Geometry of the target 1-bit display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    /// Bytes per packed row
    pub row_stride: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            row_stride: ROW_STRIDE,
        }
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDisplay(format!(
                "{}x{} has no pixels",
                self.width, self.height
            )));
        }
        let min_stride = self.width.div_ceil(8);
        if self.row_stride < min_stride {
            return Err(ConfigError::InvalidDisplay(format!(
                "row stride {} is below {} bytes needed for width {}",
                self.row_stride, min_stride, self.width
            )));
        }
        Ok(())
    }
}

/// Everything a renderer needs at creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub display: DisplayConfig,
    /// Initial background shade
    pub background: i8,
    pub camera: Camera,
    /// Edge-walk iterations allowed per triangle
    pub max_edge_steps: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            background: WHITE,
            camera: Camera::default(),
            max_edge_steps: DEFAULT_MAX_EDGE_STEPS,
        }
    }
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load a config from a RON string
pub fn load_config_from_str(s: &str) -> Result<RenderConfig, ConfigError> {
    let config: RenderConfig = ron::from_str(s)?;
    config.display.validate()?;
    Ok(config)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &RenderConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}
