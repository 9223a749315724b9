//! Core types for the rasterizer

use serde::{Deserialize, Serialize};

use super::math::Vec3;

/// Display shade of a black pixel
pub const BLACK: i8 = 0;
/// Display shade of a white pixel
pub const WHITE: i8 = 127;
/// Cells strictly above this shade dither to white
pub const THRESHOLD: i8 = 64;

/// A flat-shaded world-space triangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub p0: Vec3,
    pub p1: Vec3,
    pub p2: Vec3,
    /// Shade id, 0 (black) to 127 (white)
    pub shade: i8,
}

impl Triangle {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3, shade: i8) -> Self {
        Self { p0, p1, p2, shade }
    }
}

/// Pinhole camera. Units are scene units (millimetres for the defaults).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Width of the sensor strip
    pub sensor_width: f32,
    /// Focal length
    pub focal_length: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            sensor_width: 25.0, // Super 35 strip width
            focal_length: 35.0,
        }
    }
}
