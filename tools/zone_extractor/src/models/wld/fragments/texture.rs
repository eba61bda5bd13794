use enumflags2::{bitflags, BitFlags};
use log::debug;
use shared::models::zone::Material;
use tools_shared::{
    constants::{BMP_HEIGHT_OFFSET, BMP_WIDTH_OFFSET},
    error::CursorResult,
    utils::{crypto::decrypt, cursor::Reader},
};

use crate::error::{WldError, WldResult};

use super::{find_by_id, read_array, read_reference, DecodeContext, FragmentHeader};

#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureInfoFlags {
    Animated = 1 << 3,
    HasParam2 = 1 << 4,
}

#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialFlags {
    HasPairField = 1 << 0,
}

// Render method bits of a material
#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFlags {
    Opaque = 1 << 0,
    MaskedOpaque = 1 << 1,
    SemiTransparent = 1 << 2,
    MaskedSemiTransparent = 1 << 3,
    MaskedAdditive = 1 << 4,
    UserDefined = 1 << 31,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TexturePath {
    pub id: u32,
    pub name: String,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

impl TexturePath {
    /// Returns `None` when the archive does not hold the named texture.
    pub fn parse(
        header: FragmentHeader,
        reader: &mut Reader,
        context: &DecodeContext,
    ) -> WldResult<Option<TexturePath>> {
        let _file_count = reader.read_u32()?;
        let length = reader.read_u16()?;
        let encoded = reader.read_bytes(length as usize)?;
        let file_name = decode_file_name(encoded);

        let Some(texture) = context.textures.iter().find(|t| t.name == file_name) else {
            debug!(
                "texture path {} names {} which is not in the archive",
                header.id, file_name
            );
            return Ok(None);
        };

        let (width, height) = bitmap_dimensions(&texture.data).map_err(|source| {
            WldError::TextureHeader {
                texture: texture.name.clone(),
                source,
            }
        })?;

        Ok(Some(TexturePath {
            id: header.id,
            name: header.name,
            file_name,
            width,
            height,
        }))
    }
}

fn decode_file_name(encoded: &[u8]) -> String {
    let decoded = decrypt(encoded);
    String::from_utf8_lossy(&decoded)
        .trim_end_matches('\0')
        .to_ascii_lowercase()
}

fn bitmap_dimensions(data: &[u8]) -> CursorResult<(u32, u32)> {
    let mut reader = Reader::new(data);
    reader.seek(BMP_WIDTH_OFFSET);
    let width = reader.read_u32()?;
    reader.seek(BMP_HEIGHT_OFFSET);
    let height = reader.read_u32()?;
    Ok((width, height))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub id: u32,
    pub name: String,
    pub flags: BitFlags<TextureInfoFlags>,
    /// Seconds, only present on animated textures
    pub frame_delay: Option<f32>,
    pub texture_paths: Vec<Option<u32>>,
}

impl TextureInfo {
    pub fn parse(header: FragmentHeader, reader: &mut Reader) -> WldResult<TextureInfo> {
        let flags = BitFlags::<TextureInfoFlags>::from_bits_truncate(reader.read_u32()?);
        let count = reader.read_u32()?;

        let frame_delay = if flags.contains(TextureInfoFlags::Animated) {
            Some(reader.read_u32()? as f32 / 1000.0)
        } else {
            None
        };
        if !flags.contains(TextureInfoFlags::HasParam2) {
            reader.skip(4);
        }

        let texture_paths = read_array(reader, count as usize, read_reference)?;

        Ok(TextureInfo {
            id: header.id,
            name: header.name,
            flags,
            frame_delay,
            texture_paths,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfoRef {
    pub id: u32,
    pub name: String,
    pub texture_info: Option<u32>,
}

impl TextureInfoRef {
    pub fn parse(header: FragmentHeader, reader: &mut Reader) -> WldResult<TextureInfoRef> {
        Ok(TextureInfoRef {
            id: header.id,
            name: header.name,
            texture_info: read_reference(reader)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureList {
    pub id: u32,
    pub name: String,
    /// Material ids, unresolved and in stored order
    pub materials: Vec<Option<u32>>,
}

impl TextureList {
    pub fn parse(header: FragmentHeader, reader: &mut Reader) -> WldResult<TextureList> {
        reader.skip(4);
        let count = reader.read_u32()?;
        let materials = read_array(reader, count as usize, read_reference)?;

        Ok(TextureList {
            id: header.id,
            name: header.name,
            materials,
        })
    }
}

/// Decodes a texture (material) fragment, following its info ref and info
/// down to the texture paths. Returns `None` when that chain is broken.
pub fn parse_material(
    header: FragmentHeader,
    reader: &mut Reader,
    context: &DecodeContext,
) -> WldResult<Option<Material>> {
    let flags = BitFlags::<MaterialFlags>::from_bits_truncate(reader.read_u32()?);
    let raw_render_flags = reader.read_u32()?;
    reader.skip(12);
    if flags.contains(MaterialFlags::HasPairField) {
        reader.skip(8);
    }
    let info_ref = read_reference(reader)?;

    let info = info_ref
        .and_then(|id| find_by_id(&context.texture_info_refs, id, |r| r.id))
        .and_then(|info_ref| info_ref.texture_info)
        .and_then(|id| find_by_id(&context.texture_infos, id, |i| i.id));
    let Some(info) = info else {
        debug!(
            "material {} ({}) has no texture info, dropped",
            header.id, header.name
        );
        return Ok(None);
    };

    let frames: Vec<&TexturePath> = info
        .texture_paths
        .iter()
        .flatten()
        .filter_map(|id| find_by_id(&context.texture_paths, *id, |p| p.id))
        .collect();
    let (width, height) = frames
        .first()
        .map(|frame| (frame.width, frame.height))
        .unwrap_or_default();

    let render = BitFlags::<RenderFlags>::from_bits_truncate(raw_render_flags);
    let transparent = (!render.contains(RenderFlags::Opaque)
        && !render.contains(RenderFlags::UserDefined))
        || render.contains(RenderFlags::MaskedSemiTransparent)
        || render.contains(RenderFlags::SemiTransparent);
    let masked = render.contains(RenderFlags::MaskedOpaque)
        || render.contains(RenderFlags::MaskedSemiTransparent)
        || render.contains(RenderFlags::MaskedAdditive);

    Ok(Some(Material {
        id: header.id,
        name: header.name,
        transparent,
        masked,
        clear: raw_render_flags == 0,
        textures: frames.iter().map(|frame| frame.file_name.clone()).collect(),
        width,
        height,
        frame_delay: info.frame_delay.unwrap_or(1.0),
    }))
}
