//! `KW3D` model container decoding
//!
//! ```text
//! u8[4]        "KW3D"
//! u8[2]        version [major, minor]
//! varint       material count
//! per material
//!     u8       flags
//!     u8       shade
//! varint       mesh count
//! per mesh
//!     varint   material index
//!     varint   vertex count,  f32 LE x/y/z per vertex
//!     varint   normal count,  f32 LE x/y/z per normal
//!     varint   triangle count
//!     [varint v0, v1, v2, normal per triangle]  (TriangleLayout::Indexed)
//! ```

use std::path::Path;

use tracing::debug;

use crate::rasterizer::Vec3;

use super::error::{ModelError, ModelResult};
use super::stream::{ByteStream, IoStream, StreamGuard};
use super::varint::read_varint;

/// File tag
pub const MAGIC: [u8; 4] = *b"KW3D";

/// Bytes per material record
pub const MATERIAL_SIZE: u64 = 2;

/// What follows each mesh's triangle count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriangleLayout {
    /// Nothing: the count is the last field of a mesh
    #[default]
    CountOnly,
    /// Four varints per triangle: three vertex indices and a normal index
    Indexed,
}

/// Parser knobs
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub triangles: TriangleLayout,
    /// Seek past material records instead of decoding them
    pub skip_materials: bool,
}

/// A material record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Material {
    pub flags: u8,
    /// Display shade, 0 (black) to 127 (white)
    pub shade: u8,
}

/// Indices of one triangle within its mesh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriangleRecord {
    pub vertices: [u32; 3],
    pub normal: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub material_index: u32,
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub triangle_count: u64,
    /// Empty unless parsed with `TriangleLayout::Indexed`
    pub triangles: Vec<TriangleRecord>,
}

/// A decoded model file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub version: u16,
    pub materials: Vec<Material>,
    pub meshes: Vec<Mesh>,
}

impl Model {
    /// Shade of a mesh's material, if the index resolves.
    pub fn mesh_shade(&self, mesh: &Mesh) -> Option<u8> {
        self.materials
            .get(mesh.material_index as usize)
            .map(|m| m.shade)
    }
}

/// Parse a model from a stream with default options. The stream is closed
/// before returning, on success and on failure.
pub fn parse_model<S: ByteStream>(stream: S) -> ModelResult<Model> {
    parse_model_with(stream, ParseOptions::default())
}

pub fn parse_model_with<S: ByteStream>(stream: S, options: ParseOptions) -> ModelResult<Model> {
    let mut guard = StreamGuard::new(stream);
    let result = read_model(&mut guard, options);
    guard.finish(result)
}

/// Open and parse a model file.
pub fn load_model<P: AsRef<Path>>(path: P) -> ModelResult<Model> {
    load_model_with(path, ParseOptions::default())
}

pub fn load_model_with<P: AsRef<Path>>(path: P, options: ParseOptions) -> ModelResult<Model> {
    let stream = IoStream::open(path)?;
    parse_model_with(stream, options)
}

fn read_model<S: ByteStream>(
    stream: &mut StreamGuard<S>,
    options: ParseOptions,
) -> ModelResult<Model> {
    let mut magic = [0u8; 4];
    stream.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(ModelError::BadMagic { found: magic });
    }

    let mut version = [0u8; 2];
    stream.read_exact(&mut version)?;
    let version = u16::from_be_bytes(version);

    let material_count = read_varint(stream)?;
    debug!(version, material_count, "reading model");

    let mut materials = Vec::new();
    if options.skip_materials {
        stream.skip(MATERIAL_SIZE * material_count)?;
    } else {
        for _ in 0..material_count {
            let mut record = [0u8; MATERIAL_SIZE as usize];
            stream.read_exact(&mut record)?;
            materials.push(Material {
                flags: record[0],
                shade: record[1],
            });
        }
    }

    let mesh_count = read_varint(stream)?;
    let mut meshes = Vec::new();
    for idx in 0..mesh_count {
        let mesh = read_mesh(stream, options.triangles)?;
        debug!(
            mesh = idx,
            material = mesh.material_index,
            vertices = mesh.vertices.len(),
            normals = mesh.normals.len(),
            triangles = mesh.triangle_count,
            "mesh decoded"
        );
        meshes.push(mesh);
    }

    Ok(Model {
        version,
        materials,
        meshes,
    })
}

fn read_mesh<S: ByteStream>(
    stream: &mut StreamGuard<S>,
    layout: TriangleLayout,
) -> ModelResult<Mesh> {
    let material_index = read_index(stream)?;

    let vertex_count = read_varint(stream)?;
    let vertices = read_vec3s(stream, vertex_count)?;

    let normal_count = read_varint(stream)?;
    let normals = read_vec3s(stream, normal_count)?;

    let triangle_count = read_varint(stream)?;
    let mut triangles = Vec::new();
    if layout == TriangleLayout::Indexed {
        for _ in 0..triangle_count {
            triangles.push(TriangleRecord {
                vertices: [read_index(stream)?, read_index(stream)?, read_index(stream)?],
                normal: read_index(stream)?,
            });
        }
    }

    Ok(Mesh {
        material_index,
        vertices,
        normals,
        triangle_count,
        triangles,
    })
}

/// Varint narrowed to a `u32` index, saturating on absurd values
fn read_index<S: ByteStream>(stream: &mut StreamGuard<S>) -> ModelResult<u32> {
    Ok(u32::try_from(read_varint(stream)?).unwrap_or(u32::MAX))
}

/// Read `count` packed little-endian xyz triples. The buffer grows as data
/// arrives so a bogus count cannot trigger a huge allocation up front.
fn read_vec3s<S: ByteStream>(stream: &mut StreamGuard<S>, count: u64) -> ModelResult<Vec<Vec3>> {
    let mut out = Vec::with_capacity(count.min(1024) as usize);
    let mut buf = [0u8; 12];
    for _ in 0..count {
        stream.read_exact(&mut buf)?;
        out.push(read_vec3(&buf));
    }
    Ok(out)
}

fn read_vec3(buf: &[u8; 12]) -> Vec3 {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    Vec3::new(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::writer::write_model;
    use std::io::{self, Cursor};
    use std::rc::Rc;
    use std::cell::Cell;

    /// In-memory stream that counts `close` calls
    struct CountingStream {
        inner: IoStream<Cursor<Vec<u8>>>,
        closes: Rc<Cell<u32>>,
    }

    impl CountingStream {
        fn new(bytes: Vec<u8>) -> (Self, Rc<Cell<u32>>) {
            let closes = Rc::new(Cell::new(0));
            let stream = Self {
                inner: IoStream::new(Cursor::new(bytes)),
                closes: Rc::clone(&closes),
            };
            (stream, closes)
        }
    }

    impl ByteStream for CountingStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }

        fn seek_relative(&mut self, offset: i64) -> io::Result<()> {
            self.inner.seek_relative(offset)
        }

        fn close(&mut self) -> io::Result<()> {
            self.closes.set(self.closes.get() + 1);
            self.inner.close()
        }
    }

    /// Stream whose reads fail once `budget` bytes have been handed out
    struct FailingStream {
        data: Vec<u8>,
        pos: usize,
        budget: usize,
    }

    impl ByteStream for FailingStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pos >= self.budget {
                return Err(io::Error::new(io::ErrorKind::Other, "device gone"));
            }
            let n = buf.len().min(self.budget - self.pos).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }

        fn seek_relative(&mut self, offset: i64) -> io::Result<()> {
            self.pos = (self.pos as i64 + offset) as usize;
            Ok(())
        }

        fn close(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn sample_model() -> Model {
        Model {
            version: 1,
            materials: vec![
                Material { flags: 0, shade: 100 },
                Material { flags: 1, shade: 20 },
            ],
            meshes: vec![
                Mesh {
                    material_index: 1,
                    vertices: vec![
                        Vec3::new(0.0, 0.0, 1.0),
                        Vec3::new(1.0, 0.0, 1.0),
                        Vec3::new(0.0, 1.0, 1.0),
                    ],
                    normals: vec![Vec3::new(0.0, 0.0, -1.0)],
                    triangle_count: 1,
                    triangles: vec![TriangleRecord { vertices: [0, 1, 2], normal: 0 }],
                },
                Mesh {
                    material_index: 0,
                    vertices: vec![Vec3::new(-2.5, 3.25, 8.0); 200],
                    normals: vec![],
                    triangle_count: 0,
                    triangles: vec![],
                },
            ],
        }
    }

    fn encode(model: &Model, layout: TriangleLayout) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_model(&mut bytes, model, layout).unwrap();
        bytes
    }

    #[test]
    fn test_parse_indexed_model() {
        let model = sample_model();
        let bytes = encode(&model, TriangleLayout::Indexed);
        let options = ParseOptions {
            triangles: TriangleLayout::Indexed,
            ..Default::default()
        };
        let parsed = parse_model_with(IoStream::new(Cursor::new(bytes)), options).unwrap();
        assert_eq!(parsed, model);
        assert_eq!(parsed.mesh_shade(&parsed.meshes[0]), Some(20));
    }

    #[test]
    fn test_parse_count_only_model() {
        let mut model = sample_model();
        model.meshes.truncate(1);
        let bytes = encode(&model, TriangleLayout::CountOnly);
        let parsed = parse_model(IoStream::new(Cursor::new(bytes))).unwrap();
        assert_eq!(parsed.meshes.len(), 1);
        assert_eq!(parsed.meshes[0].triangle_count, 1);
        assert!(parsed.meshes[0].triangles.is_empty());
        assert_eq!(parsed.meshes[0].vertices, model.meshes[0].vertices);
    }

    #[test]
    fn test_skip_materials_consumes_same_bytes() {
        let model = sample_model();
        let bytes = encode(&model, TriangleLayout::Indexed);
        let options = ParseOptions {
            triangles: TriangleLayout::Indexed,
            skip_materials: true,
        };
        let parsed = parse_model_with(IoStream::new(Cursor::new(bytes)), options).unwrap();
        assert!(parsed.materials.is_empty());
        assert_eq!(parsed.meshes, model.meshes);
    }

    #[test]
    fn test_bad_magic() {
        let (stream, closes) = CountingStream::new(b"XX3D\x00\x01\x00\x00".to_vec());
        let err = parse_model(stream).unwrap_err();
        assert!(matches!(err, ModelError::BadMagic { found } if &found == b"XX3D"));
        assert!(err.is_format_error());
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_short_header_closes_once() {
        let (stream, closes) = CountingStream::new(b"KW3".to_vec());
        let err = parse_model(stream).unwrap_err();
        assert!(matches!(err, ModelError::UnexpectedEof { offset: 3 }));
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_success_closes_once() {
        let (stream, closes) = CountingStream::new(encode(&sample_model(), TriangleLayout::CountOnly));
        let model = parse_model(stream).unwrap();
        assert_eq!(model.meshes.len(), 2);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_truncated_vertex_data() {
        let mut bytes = encode(&sample_model(), TriangleLayout::Indexed);
        bytes.truncate(bytes.len() - 5);
        let (stream, closes) = CountingStream::new(bytes);
        let options = ParseOptions {
            triangles: TriangleLayout::Indexed,
            ..Default::default()
        };
        let err = parse_model_with(stream, options).unwrap_err();
        assert!(matches!(err, ModelError::UnexpectedEof { .. }));
        assert!(!err.is_format_error());
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_unterminated_count() {
        let mut bytes = b"KW3D\x00\x01".to_vec();
        bytes.extend_from_slice(&[0xFF; 5]);
        let err = parse_model(IoStream::new(Cursor::new(bytes))).unwrap_err();
        assert!(matches!(err, ModelError::TruncatedStream { offset: 6 }));
    }

    #[test]
    fn test_read_error_propagates() {
        let data = encode(&sample_model(), TriangleLayout::Indexed);
        let stream = FailingStream { data, pos: 0, budget: 20 };
        let err = parse_model(stream).unwrap_err();
        assert!(matches!(err, ModelError::Io(_)));
    }

    #[test]
    fn test_huge_count_fails_without_allocating() {
        let mut bytes = b"KW3D\x00\x01\x00\x01\x00".to_vec();
        // vertex count 2^35 - 1 with no data behind it
        bytes.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
        let err = parse_model(IoStream::new(Cursor::new(bytes))).unwrap_err();
        assert!(matches!(err, ModelError::UnexpectedEof { .. }));
    }
}
