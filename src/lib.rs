//! threelib: flat-shaded 3D triangles on a 1-bit display
//!
//! - Pinhole projection straight to integer pixels
//! - Scanline triangle fill into a greyscale framebuffer
//! - Atkinson dithering down to black and white
//! - MSB-first packing into the host's display rows
//! - `KW3D` binary model loading

pub mod model;
pub mod rasterizer;
pub mod renderer;
pub mod scene;

pub use model::{load_model, parse_model, Model, ModelError};
pub use rasterizer::{DisplaySurface, PackedDisplay, Triangle, Vec3};
pub use renderer::{FrameStats, Renderer};
pub use scene::{RenderConfig, Scene};
