use binrw::BinReaderExt;
use log::trace;
use shared::models::zone::{PlaceableObject, Vector2, Vector3, ROTATION_UNITS_PER_DEGREE};
use tools_shared::utils::cursor::Reader;

use crate::error::WldResult;

use super::{DecodeContext, FragmentHeader};

// Placements carrying these flags have no usable transform
pub const DEGENERATE_PLACEMENT_FLAGS: u32 = 0x2E;

pub fn parse_placeable_object(
    header: FragmentHeader,
    reader: &mut Reader,
    context: &DecodeContext,
) -> WldResult<Option<PlaceableObject>> {
    let object_name_ref = reader.read_i32()?;
    let flags = reader.read_u32()?;
    if flags == DEGENERATE_PLACEMENT_FLAGS {
        trace!("placement {} ({}) is degenerate, dropped", header.id, header.name);
        return Ok(None);
    }
    let object_name = context.strings.name(object_name_ref);

    reader.skip(4);
    let position: Vector3 = reader.read_with(12, |c| c.read_le())?;

    // Stored as z, y, x
    let rotation_z = reader.read_f32()? / ROTATION_UNITS_PER_DEGREE;
    let rotation_y = reader.read_f32()? / ROTATION_UNITS_PER_DEGREE;
    let rotation_x = reader.read_f32()? / ROTATION_UNITS_PER_DEGREE;
    reader.skip(4);

    // Stored as y, x
    let scale_y = reader.read_f32()?;
    let scale_x = reader.read_f32()?;
    let vertex_color_ref = reader.read_u32()?;

    Ok(Some(PlaceableObject {
        name: header.name,
        object_name,
        position,
        rotation: Vector3::new(rotation_x, rotation_y, rotation_z),
        scale: Vector2::new(scale_x, scale_y),
        vertex_color_ref,
    }))
}
