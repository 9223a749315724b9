//! 1-bit software rasterizer
//!
//! Pipeline per frame:
//! - Pinhole projection (integer screen coords, no clipping)
//! - Dual-edge scanline fill into a greyscale framebuffer
//! - Atkinson error diffusion down to two levels
//! - MSB-first bit packing into the host display

mod math;
mod types;
mod render;
mod dither;
mod pack;

pub use math::*;
pub use types::*;
pub use render::*;
pub use dither::*;
pub use pack::*;

/// Display dimensions (reference 1-bit LCD)
pub const WIDTH: usize = 400;
pub const HEIGHT: usize = 240;

/// Bytes per packed display row (includes padding past WIDTH / 8)
pub const ROW_STRIDE: usize = 52;
