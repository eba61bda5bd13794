use binrw::BinReaderExt;
use enumflags2::{bitflags, BitFlags};
use log::{debug, trace};
use shared::models::zone::{
    IndexRun, Mesh, MeshReference, Polygon, RawVertex, StaticMesh, Vector2, Vector3,
};
use tools_shared::{error::CursorResult, utils::cursor::Reader};

use crate::error::{WldError, WldResult};

use super::{find_by_id, one_based, read_array, read_reference, DecodeContext, FragmentHeader};

const UV_UNITS: f32 = 256.0;
const NORMAL_UNITS: f32 = 127.0;

#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticMeshFlags {
    HasParams1 = 1 << 0,
    HasParams2 = 1 << 1,
}

struct MeshCounts {
    vertices: u16,
    uvs: u16,
    normals: u16,
    colors: u16,
    polygons: u16,
    vertex_pieces: u16,
    polygon_materials: u16,
    vertex_materials: u16,
}

fn read_index_run(reader: &mut Reader) -> CursorResult<IndexRun> {
    reader.read_with(4, |c| c.read_le())
}

/// Decodes a mesh. Its texture list must already be decoded, anything else
/// is a broken file.
pub fn parse_mesh(
    header: FragmentHeader,
    reader: &mut Reader,
    context: &DecodeContext,
) -> WldResult<Mesh> {
    let _flags = reader.read_u32()?;
    let raw_texture_list = reader.read_u32()?;
    let texture_list = one_based(raw_texture_list)
        .and_then(|id| find_by_id(&context.texture_lists, id, |l| l.id))
        .ok_or(WldError::UnresolvedReference {
            id: header.id,
            kind: "mesh",
            target: "texture list",
            reference: raw_texture_list,
        })?;

    // Slots pointing at dropped materials stay in place so polygon runs keep
    // their indices
    let materials: Vec<Option<u32>> = texture_list
        .materials
        .iter()
        .map(|slot| slot.filter(|id| context.document.material(*id).is_some()))
        .collect();

    let animated_vertices = reader.read_u32()?;
    reader.skip(8);
    let center: Vector3 = reader.read_with(12, |c| c.read_le())?;
    reader.skip(40);

    let counts = MeshCounts {
        vertices: reader.read_u16()?,
        uvs: reader.read_u16()?,
        normals: reader.read_u16()?,
        colors: reader.read_u16()?,
        polygons: reader.read_u16()?,
        vertex_pieces: reader.read_u16()?,
        polygon_materials: reader.read_u16()?,
        vertex_materials: reader.read_u16()?,
    };
    let _size9 = reader.read_u16()?;
    let scale = 1.0 / 2_f32.powi(reader.read_u16()? as i32);

    let vertices = read_array(reader, counts.vertices as usize, |r| {
        r.read_with(6, |c| c.read_le::<RawVertex>())
    })?;
    let uvs = read_array(reader, counts.uvs as usize, |r| {
        Ok(Vector2::new(
            r.read_i16()? as f32 / UV_UNITS,
            r.read_i16()? as f32 / UV_UNITS,
        ))
    })?;
    let normals = read_array(reader, counts.normals as usize, |r| {
        Ok(Vector3::new(
            r.read_i8()? as f32 / NORMAL_UNITS,
            r.read_i8()? as f32 / NORMAL_UNITS,
            r.read_i8()? as f32 / NORMAL_UNITS,
        ))
    })?;
    let vertex_colors = read_array(reader, counts.colors as usize, |r| r.read_u32())?;
    let polygons = read_array(reader, counts.polygons as usize, |r| {
        r.read_with(8, |c| c.read_le::<Polygon>())
    })?;
    let vertex_pieces = read_array(reader, counts.vertex_pieces as usize, read_index_run)?;
    let polygon_materials = read_array(reader, counts.polygon_materials as usize, read_index_run)?;
    let vertex_materials = read_array(reader, counts.vertex_materials as usize, read_index_run)?;

    trace!(
        "mesh {} ({}): {} vertices, {} polygons",
        header.id,
        header.name,
        vertices.len(),
        polygons.len()
    );

    Ok(Mesh {
        id: header.id,
        name: header.name,
        scale,
        center,
        animated_vertices,
        vertices,
        uvs,
        normals,
        vertex_colors,
        polygons,
        vertex_pieces,
        polygon_materials,
        vertex_materials,
        materials,
    })
}

pub fn parse_static_mesh(header: FragmentHeader, reader: &mut Reader) -> WldResult<StaticMesh> {
    let flags = BitFlags::<StaticMeshFlags>::from_bits_truncate(reader.read_u32()?);
    reader.skip(4);
    let size1 = reader.read_u32()?;
    let size2 = reader.read_u32()?;
    reader.skip(4);
    if flags.contains(StaticMeshFlags::HasParams1) {
        reader.skip(4);
    }
    if flags.contains(StaticMeshFlags::HasParams2) {
        reader.skip(7 * 4);
    }

    for _i in 0..size1 {
        let entry_size = reader.read_u32()?;
        reader.skip((entry_size as usize).saturating_mul(8));
    }

    let references = read_array(reader, size2 as usize, read_reference)?;
    let mesh_references: Vec<u32> = references.into_iter().flatten().collect();
    if mesh_references.len() as u32 != size2 {
        debug!(
            "static mesh {} ({}) has {} empty mesh references",
            header.id,
            header.name,
            size2 as usize - mesh_references.len()
        );
    }

    Ok(StaticMesh {
        id: header.id,
        name: header.name,
        mesh_references,
    })
}

/// Meshes must come before the references citing them, a forward reference
/// resolves to `None`.
pub fn parse_mesh_reference(
    header: FragmentHeader,
    reader: &mut Reader,
    context: &DecodeContext,
) -> WldResult<Option<MeshReference>> {
    let target = read_reference(reader)?;
    let Some(mesh) = target.and_then(|id| context.document.mesh(id)) else {
        debug!(
            "mesh reference {} points at undecoded mesh {:?}, dropped",
            header.id, target
        );
        return Ok(None);
    };

    Ok(Some(MeshReference {
        id: header.id,
        name: mesh.name.clone(),
        mesh: mesh.id,
    }))
}
