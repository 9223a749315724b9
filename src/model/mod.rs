//! Model loading
//!
//! Decodes the compact `KW3D` binary container (materials plus meshes of
//! packed f32 vertices and normals) from any host byte stream.

mod error;
mod parser;
mod stream;
mod varint;
mod writer;

pub use error::{ModelError, ModelResult};
pub use parser::*;
pub use stream::{ByteStream, IoStream};
pub use varint::{decode_slice, encode as encode_varint, MAX_VARINT_BYTES};
pub use writer::write_model;
