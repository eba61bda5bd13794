use binrw::{binread, BinReaderExt};
use log::{debug, trace};
use shared::models::zone::WldDocument;
use tools_shared::{models::ArchiveEntry, utils::cursor::Reader};

use crate::error::{WldError, WldResult};

use self::{
    fragments::{DecodeContext, Fragment, FragmentHeader, FragmentType},
    string_table::StringTable,
};

pub mod fragments;
pub mod string_table;

pub const WLD_MAGIC: u32 = 0x54503D02;
pub const WLD_HEADER_SIZE: usize = 7 * 4;

// Size, type code and name reference
const FRAGMENT_HEADER_SIZE: usize = 12;

#[binread]
#[derive(Debug)]
pub struct WldHeader {
    pub magic: u32,
    pub version: u32,
    pub fragment_count: u32,
    pub bsp_region_count: u32,
    _unknown1: u32,
    pub string_hash_size: u32,
    _unknown2: u32,
}

/// Decodes one `.wld` file. `textures` are the archive's texture entries,
/// which texture path fragments are resolved against.
pub fn decode_document(
    name: &str,
    data: &[u8],
    textures: &[ArchiveEntry],
) -> WldResult<WldDocument> {
    let mut reader = Reader::new(data);
    let header: WldHeader = reader.read_with(WLD_HEADER_SIZE, |c| c.read_le())?;
    if header.magic != WLD_MAGIC {
        return Err(WldError::InvalidMagic {
            found: header.magic,
        });
    }
    debug!(
        "{}: version {:#010X}, {} fragments, {} BSP regions",
        name, header.version, header.fragment_count, header.bsp_region_count
    );

    let strings = StringTable::decode(reader.read_bytes(header.string_hash_size as usize)?);
    let mut document = WldDocument::new(name);
    document.fragment_count = header.fragment_count;
    let mut context = DecodeContext::new(document, strings, textures);

    for id in 0..header.fragment_count {
        let offset = reader.position();
        let size = reader.read_u32()?;
        let type_code = reader.read_u32()?;
        let name_ref = reader.read_i32()?;
        let payload_size = size
            .checked_sub(4)
            .ok_or(WldError::FragmentSize { id, offset, size })? as usize;

        let Some(fragment_type) = FragmentType::n(type_code) else {
            trace!("fragment {}: skipping type {:#04X}, {} bytes", id, type_code, size);
            reader.skip(payload_size);
            context.insert(Fragment::Unrecognized { type_code, size });
            continue;
        };

        let payload_offset = offset + FRAGMENT_HEADER_SIZE;
        let payload = reader.read_bytes(payload_size)?;
        let header = FragmentHeader {
            id,
            name: context.strings.name(name_ref),
        };
        let fragment = context
            .decode(fragment_type, header, payload)
            .map_err(|err| match err {
                WldError::Cursor(source) => WldError::TruncatedFragment {
                    id,
                    offset: payload_offset,
                    source,
                },
                err => err,
            })?;

        match fragment {
            Some(fragment) => context.insert(fragment),
            None => trace!("fragment {} ({}) dropped", id, fragment_type.name()),
        }
    }

    let document = context.into_document();
    debug!(
        "{}: {} meshes, {} materials, {} static meshes, {} placements",
        name,
        document.meshes.len(),
        document.materials.len(),
        document.static_meshes.len(),
        document.placeable_objects.len()
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use tools_shared::{error::CursorError, utils::crypto::decrypt};

    use super::*;

    struct TestWld {
        strings: Vec<u8>,
        fragments: Vec<(u32, i32, Vec<u8>)>,
    }

    impl TestWld {
        fn new() -> Self {
            Self {
                strings: b"\0TREE_DMSPRITEDEF\0TREE_ACTORDEF\0\0".to_vec(),
                fragments: Vec::new(),
            }
        }

        fn fragment(mut self, type_code: u32, name_ref: i32, payload: Vec<u8>) -> Self {
            self.fragments.push((type_code, name_ref, payload));
            self
        }

        fn build(&self) -> Vec<u8> {
            let mut data = Vec::new();
            let header = [
                WLD_MAGIC,
                0x00015500,
                self.fragments.len() as u32,
                0,
                0,
                self.strings.len() as u32,
                0,
            ];
            for value in header {
                data.extend_from_slice(&value.to_le_bytes());
            }
            data.extend_from_slice(&decrypt(&self.strings));
            for (type_code, name_ref, payload) in &self.fragments {
                data.extend_from_slice(&(payload.len() as u32 + 4).to_le_bytes());
                data.extend_from_slice(&type_code.to_le_bytes());
                data.extend_from_slice(&name_ref.to_le_bytes());
                data.extend_from_slice(payload);
            }
            data
        }
    }

    fn u32s(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn empty_mesh(texture_list: u32) -> Vec<u8> {
        let mut payload = u32s(&[0, texture_list, 0, 0, 0]);
        payload.extend_from_slice(&[0; 12 + 40 + 20]);
        payload
    }

    #[test]
    fn test_unknown_fragments_are_skipped_exactly() {
        let data = TestWld::new()
            .fragment(0x22, 0, vec![0xEE; 37])
            .fragment(0x31, 0, u32s(&[0, 0]))
            .fragment(0x28, 0, vec![])
            .fragment(0x36, -1, empty_mesh(2))
            .build();

        let document = decode_document("tree_obj.wld", &data, &[]).unwrap();

        assert_eq!(document.fragment_count, 4);
        assert_eq!(document.meshes.len(), 1);
        assert_eq!(document.meshes[0].id, 3);
        assert_eq!(document.meshes[0].name, "TREE_DMSPRITEDEF");
    }

    #[test]
    fn test_ids_count_dropped_fragments() {
        let data = TestWld::new()
            .fragment(0x31, 0, u32s(&[0, 0]))
            .fragment(0x2D, 0, u32s(&[3]))
            .fragment(0x36, -1, empty_mesh(1))
            .fragment(0x2D, 0, u32s(&[3]))
            .fragment(0x14, -18, u32s(&[0, 0, 0, 2, 0, 4, 2]))
            .build();

        let document = decode_document("tree_obj.wld", &data, &[]).unwrap();

        assert_eq!(document.mesh_references.len(), 1);
        assert_eq!(document.mesh_references[0].id, 3);
        assert_eq!(document.mesh_references[0].mesh, 2);
        assert_eq!(document.static_meshes[0].id, 4);
        assert_eq!(document.static_meshes[0].name, "TREE_ACTORDEF");
        assert_eq!(document.static_meshes[0].mesh_references, vec![3, 1]);

        let parts: Vec<u32> = document
            .static_mesh_parts(&document.static_meshes[0])
            .map(|mesh| mesh.id)
            .collect();
        assert_eq!(parts, vec![2]);
    }

    #[test]
    fn test_invalid_magic_is_rejected() {
        let mut data = TestWld::new().build();
        data[0] = 0;

        let err = decode_document("bad.wld", &data, &[]).unwrap_err();

        assert!(matches!(err, WldError::InvalidMagic { .. }));
    }

    #[test]
    fn test_fragment_size_below_header_is_rejected() {
        let mut data = TestWld::new().fragment(0x22, 0, vec![]).build();
        let size_offset = WLD_HEADER_SIZE + TestWld::new().strings.len();
        data[size_offset..size_offset + 4].copy_from_slice(&3_u32.to_le_bytes());

        let err = decode_document("bad.wld", &data, &[]).unwrap_err();

        assert!(matches!(err, WldError::FragmentSize { id: 0, size: 3, .. }));
    }

    #[test]
    fn test_truncated_payload_reports_fragment() {
        let data = TestWld::new()
            .fragment(0x22, 0, vec![0; 8])
            .fragment(0x05, 0, vec![1, 0])
            .build();

        let err = decode_document("bad.wld", &data, &[]).unwrap_err();

        assert!(matches!(
            err,
            WldError::TruncatedFragment {
                id: 1,
                source: CursorError::OutOfBounds { need: 4, len: 2, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_mesh_before_its_texture_list_is_an_error() {
        let data = TestWld::new()
            .fragment(0x36, -1, empty_mesh(2))
            .fragment(0x31, 0, u32s(&[0, 0]))
            .build();

        let err = decode_document("bad.wld", &data, &[]).unwrap_err();

        assert!(matches!(err, WldError::UnresolvedReference { id: 0, .. }));
    }
}
