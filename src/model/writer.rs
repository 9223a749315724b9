//! `KW3D` encoder, the inverse of the parser.

use std::io::{self, Write};

use super::parser::{Model, TriangleLayout, MAGIC};
use super::varint::encode;

/// Write `model` in the container format. Indexed layout writes each mesh's
/// triangle records after its count; count-only layout writes the count alone.
pub fn write_model<W: Write>(out: &mut W, model: &Model, layout: TriangleLayout) -> io::Result<()> {
    out.write_all(&MAGIC)?;
    out.write_all(&model.version.to_be_bytes())?;

    out.write_all(&encode(model.materials.len() as u64))?;
    for mat in &model.materials {
        out.write_all(&[mat.flags, mat.shade.min(127)])?;
    }

    out.write_all(&encode(model.meshes.len() as u64))?;
    for mesh in &model.meshes {
        out.write_all(&encode(u64::from(mesh.material_index)))?;

        out.write_all(&encode(mesh.vertices.len() as u64))?;
        for v in &mesh.vertices {
            for c in [v.x, v.y, v.z] {
                out.write_all(&c.to_le_bytes())?;
            }
        }

        out.write_all(&encode(mesh.normals.len() as u64))?;
        for n in &mesh.normals {
            for c in [n.x, n.y, n.z] {
                out.write_all(&c.to_le_bytes())?;
            }
        }

        match layout {
            TriangleLayout::CountOnly => {
                out.write_all(&encode(mesh.triangle_count))?;
            }
            TriangleLayout::Indexed => {
                out.write_all(&encode(mesh.triangles.len() as u64))?;
                for t in &mesh.triangles {
                    for idx in t.vertices {
                        out.write_all(&encode(u64::from(idx)))?;
                    }
                    out.write_all(&encode(u64::from(t.normal)))?;
                }
            }
        }
    }
    Ok(())
}
