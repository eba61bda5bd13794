#![allow(dead_code)]

use tools_shared::{
    constants::{DIRECTORY_CRC, PFS_MAGIC},
    utils::{crypto::decrypt, cursor::Writer},
};
use zone_extractor::models::wld::WLD_MAGIC;

pub fn u32s(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn f32s(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn u16s(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn bitmap(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![0_u8; 0x36];
    data[..2].copy_from_slice(b"BM");
    data[0x12..0x16].copy_from_slice(&width.to_le_bytes());
    data[0x16..0x1A].copy_from_slice(&height.to_le_bytes());
    data
}

/// Packs files into a container, each file compressed as a single chunk.
pub fn build_archive(files: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut directory = u32s(&[files.len() as u32]);
    for (name, _) in files {
        directory.extend_from_slice(&(name.len() as u32 + 1).to_le_bytes());
        directory.extend_from_slice(name.as_bytes());
        directory.push(0);
    }

    let mut blobs: Vec<(u32, u32, Vec<u8>)> = files
        .iter()
        .enumerate()
        .map(|(idx, (_, data))| (idx as u32 + 1, data.len() as u32, chunk(data)))
        .collect();
    blobs.push((DIRECTORY_CRC, directory.len() as u32, chunk(&directory)));

    let blobs_size: usize = blobs.iter().map(|(_, _, blob)| blob.len()).sum();
    let table_offset = 8 + blobs_size;
    let mut writer = Writer::with_capacity(table_offset + 4 + blobs.len() * 12);
    writer.write_u32(table_offset as u32).unwrap();
    writer.write_bytes(&PFS_MAGIC).unwrap();

    let mut table = Vec::new();
    for (crc, size, blob) in &blobs {
        table.push((*crc, writer.position() as u32, *size));
        writer.write_bytes(blob).unwrap();
    }
    writer.write_u32(table.len() as u32).unwrap();
    for (crc, offset, size) in table {
        writer.write_u32(crc).unwrap();
        writer.write_u32(offset).unwrap();
        writer.write_u32(size).unwrap();
    }

    writer.into_inner()
}

fn chunk(data: &[u8]) -> Vec<u8> {
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(data, 6);
    let mut out = u32s(&[compressed.len() as u32, data.len() as u32]);
    out.extend_from_slice(&compressed);
    out
}

/// WLD file builder. Names are appended to the string table and referenced
/// by their negated offset.
pub struct WldBuilder {
    strings: Vec<u8>,
    fragments: Vec<(u32, i32, Vec<u8>)>,
}

impl WldBuilder {
    pub fn new() -> Self {
        Self {
            strings: vec![0],
            fragments: Vec::new(),
        }
    }

    pub fn name(&mut self, name: &str) -> i32 {
        let offset = self.strings.len() as i32;
        self.strings.extend_from_slice(name.as_bytes());
        self.strings.push(0);
        -offset
    }

    /// Appends a fragment and returns its one-based reference.
    pub fn fragment(&mut self, type_code: u32, name: &str, payload: Vec<u8>) -> u32 {
        let name_ref = if name.is_empty() { 0 } else { self.name(name) };
        self.fragments.push((type_code, name_ref, payload));
        self.fragments.len() as u32
    }

    pub fn texture_path(&mut self, file_name: &str) -> u32 {
        let mut plain = file_name.as_bytes().to_vec();
        plain.push(0);
        let mut payload = u32s(&[1]);
        payload.extend_from_slice(&(plain.len() as u16).to_le_bytes());
        payload.extend_from_slice(&decrypt(&plain));
        self.fragment(0x03, "", payload)
    }

    /// Texture path, info and info ref chain, returns the info ref.
    pub fn texture_chain(&mut self, file_name: &str) -> u32 {
        let path = self.texture_path(file_name);
        let info = self.fragment(0x04, "", u32s(&[0x10, 1, path]));
        self.fragment(0x05, "", u32s(&[info]))
    }

    pub fn material(&mut self, name: &str, render_flags: u32, info_ref: u32) -> u32 {
        let mut payload = u32s(&[0, render_flags]);
        payload.extend_from_slice(&[0; 12]);
        payload.extend_from_slice(&u32s(&[info_ref]));
        self.fragment(0x30, name, payload)
    }

    pub fn texture_list(&mut self, materials: &[u32]) -> u32 {
        let mut payload = u32s(&[0, materials.len() as u32]);
        payload.extend_from_slice(&u32s(materials));
        self.fragment(0x31, "", payload)
    }

    /// A quad made of two triangles, split over two material slots.
    pub fn quad_mesh(&mut self, name: &str, texture_list: u32) -> u32 {
        let mut payload = u32s(&[0x0001_8003, texture_list, 0, 0, 0]);
        payload.extend_from_slice(&f32s(&[10.0, 20.0, 0.0]));
        payload.extend_from_slice(&[0; 40]);
        payload.extend_from_slice(&u16s(&[4, 4, 0, 0, 2, 0, 2, 0, 0, 1]));
        payload.extend_from_slice(&u16s(&[0, 0, 0, 2, 0, 0, 2, 2, 0, 0, 2, 0]));
        payload.extend_from_slice(&u16s(&[0, 0, 256, 0, 256, 256, 0, 256]));
        payload.extend_from_slice(&u16s(&[0, 0, 1, 2, 0, 0, 2, 3]));
        payload.extend_from_slice(&u16s(&[1, 0, 1, 1]));
        self.fragment(0x36, name, payload)
    }

    pub fn mesh_reference(&mut self, mesh: u32) -> u32 {
        self.fragment(0x2D, "", u32s(&[mesh]))
    }

    pub fn static_mesh(&mut self, name: &str, references: &[u32]) -> u32 {
        let mut payload = u32s(&[0, 0, 0, references.len() as u32, 0]);
        payload.extend_from_slice(&u32s(references));
        self.fragment(0x14, name, payload)
    }

    pub fn placeable(&mut self, name: &str, object_name: &str, flags: u32) -> u32 {
        let object_ref = self.name(object_name);
        let mut payload = object_ref.to_le_bytes().to_vec();
        payload.extend_from_slice(&u32s(&[flags, 0]));
        payload.extend_from_slice(&f32s(&[100.0, -50.0, 2.5, 0.0, 0.0, 128.0]));
        payload.extend_from_slice(&[0; 4]);
        payload.extend_from_slice(&f32s(&[1.0, 1.0]));
        payload.extend_from_slice(&u32s(&[0]));
        self.fragment(0x15, name, payload)
    }

    pub fn unknown(&mut self, type_code: u32, size: usize) -> u32 {
        self.fragment(type_code, "", vec![0xCD; size])
    }

    pub fn build(&self) -> Vec<u8> {
        let mut data = u32s(&[
            WLD_MAGIC,
            0x00015500,
            self.fragments.len() as u32,
            0,
            0,
            self.strings.len() as u32,
            0,
        ]);
        data.extend_from_slice(&decrypt(&self.strings));
        for (type_code, name_ref, payload) in &self.fragments {
            data.extend_from_slice(&u32s(&[payload.len() as u32 + 4, *type_code]));
            data.extend_from_slice(&name_ref.to_le_bytes());
            data.extend_from_slice(payload);
        }
        data
    }
}

/// A zone with one textured quad, preceded by fragments the decoder skips.
pub fn zone_wld() -> Vec<u8> {
    let mut wld = WldBuilder::new();
    wld.unknown(0x22, 13);
    let grass = wld.texture_chain("GRASS.BMP");
    let water = wld.texture_chain("water.bmp");
    let grass = wld.material("GRASS_MDF", 0x1, grass);
    let water = wld.material("WATER_MDF", 0x4 | 0x1, water);
    let missing = wld.material("MISSING_MDF", 0x1, 0);
    let list = wld.texture_list(&[grass, water, missing]);
    wld.unknown(0x21, 0);
    wld.quad_mesh("GFAY_DMSPRITEDEF", list);
    wld.build()
}

pub fn objects_wld() -> Vec<u8> {
    let mut wld = WldBuilder::new();
    wld.placeable("TREE", "TREE1_ACTORDEF", 0x32E);
    wld.placeable("BROKEN", "TREE1_ACTORDEF", 0x2E);
    wld.unknown(0x16, 8);
    wld.placeable("ROCK", "ROCK_ACTORDEF", 0x32E);
    wld.build()
}

pub fn object_archive_wld() -> Vec<u8> {
    let mut wld = WldBuilder::new();
    let grass = wld.texture_chain("grass.bmp");
    let grass = wld.material("GRASS_MDF", 0x1, grass);
    let list = wld.texture_list(&[grass, grass]);
    let early = wld.mesh_reference(5);
    let mesh = wld.quad_mesh("TREE_DMSPRITEDEF", list);
    assert_eq!(mesh, 7);
    let reference = wld.mesh_reference(mesh);
    wld.static_mesh("TREE_ACTORDEF", &[reference, early, 0]);
    wld.build()
}
