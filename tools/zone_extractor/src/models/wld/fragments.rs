use enumn::N;
pub use shared::models::zone::find_by_id;
use shared::models::zone::{
    Material, Mesh, MeshReference, PlaceableObject, StaticMesh, WldDocument,
};
use tools_shared::{error::CursorResult, models::ArchiveEntry, utils::cursor::Reader};

use crate::error::WldResult;

use self::texture::{TextureInfo, TextureInfoRef, TextureList, TexturePath};

use super::string_table::StringTable;

pub mod mesh;
pub mod placeable;
pub mod texture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, N)]
#[repr(u32)]
pub enum FragmentType {
    TexturePath = 0x03,
    TextureInfo = 0x04,
    TextureInfoRef = 0x05,
    StaticMesh = 0x14,
    PlaceableObject = 0x15,
    MeshReference = 0x2D,
    Texture = 0x30,
    TextureList = 0x31,
    Mesh = 0x36,
}

impl FragmentType {
    pub fn name(&self) -> &'static str {
        match self {
            FragmentType::TexturePath => "texture path",
            FragmentType::TextureInfo => "texture info",
            FragmentType::TextureInfoRef => "texture info ref",
            FragmentType::StaticMesh => "static mesh",
            FragmentType::PlaceableObject => "placeable object",
            FragmentType::MeshReference => "mesh reference",
            FragmentType::Texture => "texture",
            FragmentType::TextureList => "texture list",
            FragmentType::Mesh => "mesh",
        }
    }
}

/// Id and name shared by every fragment kind.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentHeader {
    /// Position of the fragment in the stream, unknown kinds included
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    TexturePath(TexturePath),
    TextureInfo(TextureInfo),
    TextureInfoRef(TextureInfoRef),
    Texture(Material),
    TextureList(TextureList),
    Mesh(Mesh),
    StaticMesh(StaticMesh),
    MeshReference(MeshReference),
    PlaceableObject(PlaceableObject),
    Unrecognized { type_code: u32, size: u32 },
}

/// Fragments decoded so far in a document, which later fragments resolve
/// their references against.
pub struct DecodeContext<'a> {
    pub textures: &'a [ArchiveEntry],
    pub strings: StringTable,
    pub texture_paths: Vec<TexturePath>,
    pub texture_infos: Vec<TextureInfo>,
    pub texture_info_refs: Vec<TextureInfoRef>,
    pub texture_lists: Vec<TextureList>,
    pub document: WldDocument,
}

impl<'a> DecodeContext<'a> {
    pub fn new(document: WldDocument, strings: StringTable, textures: &'a [ArchiveEntry]) -> Self {
        Self {
            textures,
            strings,
            texture_paths: Vec::new(),
            texture_infos: Vec::new(),
            texture_info_refs: Vec::new(),
            texture_lists: Vec::new(),
            document,
        }
    }

    pub fn decode(
        &self,
        fragment_type: FragmentType,
        header: FragmentHeader,
        payload: &[u8],
    ) -> WldResult<Option<Fragment>> {
        let mut reader = Reader::new(payload);
        let reader = &mut reader;

        Ok(match fragment_type {
            FragmentType::TexturePath => {
                TexturePath::parse(header, reader, self)?.map(Fragment::TexturePath)
            }
            FragmentType::TextureInfo => {
                Some(Fragment::TextureInfo(TextureInfo::parse(header, reader)?))
            }
            FragmentType::TextureInfoRef => {
                Some(Fragment::TextureInfoRef(TextureInfoRef::parse(header, reader)?))
            }
            FragmentType::Texture => {
                texture::parse_material(header, reader, self)?.map(Fragment::Texture)
            }
            FragmentType::TextureList => {
                Some(Fragment::TextureList(TextureList::parse(header, reader)?))
            }
            FragmentType::Mesh => Some(Fragment::Mesh(mesh::parse_mesh(header, reader, self)?)),
            FragmentType::StaticMesh => {
                Some(Fragment::StaticMesh(mesh::parse_static_mesh(header, reader)?))
            }
            FragmentType::MeshReference => {
                mesh::parse_mesh_reference(header, reader, self)?.map(Fragment::MeshReference)
            }
            FragmentType::PlaceableObject => {
                placeable::parse_placeable_object(header, reader, self)?
                    .map(Fragment::PlaceableObject)
            }
        })
    }

    pub fn insert(&mut self, fragment: Fragment) {
        match fragment {
            Fragment::TexturePath(path) => self.texture_paths.push(path),
            Fragment::TextureInfo(info) => self.texture_infos.push(info),
            Fragment::TextureInfoRef(info_ref) => self.texture_info_refs.push(info_ref),
            Fragment::Texture(material) => self.document.materials.push(material),
            Fragment::TextureList(list) => self.texture_lists.push(list),
            Fragment::Mesh(mesh) => self.document.meshes.push(mesh),
            Fragment::StaticMesh(static_mesh) => self.document.static_meshes.push(static_mesh),
            Fragment::MeshReference(reference) => self.document.mesh_references.push(reference),
            Fragment::PlaceableObject(object) => self.document.placeable_objects.push(object),
            Fragment::Unrecognized { .. } => (),
        }
    }

    pub fn into_document(self) -> WldDocument {
        self.document
    }
}

/// Converts an on-disk one-based reference to a zero-based id. `0` means no
/// reference.
pub fn one_based(raw: u32) -> Option<u32> {
    raw.checked_sub(1)
}

/// Reads a one-based reference.
pub fn read_reference(reader: &mut Reader) -> CursorResult<Option<u32>> {
    reader.read_u32().map(one_based)
}

pub fn read_array<'a, T>(
    reader: &mut Reader<'a>,
    count: usize,
    mut read: impl FnMut(&mut Reader<'a>) -> CursorResult<T>,
) -> CursorResult<Vec<T>> {
    let mut items = Vec::with_capacity(count.min(reader.remaining()));
    for _i in 0..count {
        items.push(read(reader)?);
    }
    Ok(items)
}
