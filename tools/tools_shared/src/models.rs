use binrw::binread;

use crate::constants::{TEXTURE_EXTENSIONS, WLD_EXTENSION};

pub const PFS_HEADER_SIZE: usize = 8;

#[binread]
#[derive(Debug)]
pub struct PfsHeader {
    pub directory_offset: u32, // From the beginning of the archive
    pub magic: [u8; 4],        // Must be "PFS "
}

#[binread]
#[derive(Debug)]
pub struct PfsDirectoryEntry {
    pub crc: u32,
    pub file_offset: u32,
    pub inflated_size: u32,
}

// Each file is stored as a sequence of independently compressed chunks
#[binread]
#[derive(Debug)]
pub struct PfsChunkHeader {
    pub deflated_length: u32,
    pub inflated_length: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn is_texture(&self) -> bool {
        TEXTURE_EXTENSIONS
            .iter()
            .any(|extension| self.name.ends_with(extension))
    }

    pub fn is_wld(&self) -> bool {
        self.name.ends_with(WLD_EXTENSION)
    }

    pub fn is_asset(&self) -> bool {
        self.is_texture() || self.is_wld()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Archive {
    pub name: String,
    pub entries: Vec<ArchiveEntry>,
}

impl Archive {
    /// Archive name without its extension, e.g. `gfaydark` for `gfaydark.s3d`.
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.name)
    }

    pub fn entry(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn textures(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.iter().filter(|entry| entry.is_texture())
    }

    /// Splits the entries into (wld documents, textures), keeping archive order.
    pub fn into_parts(self) -> (Vec<ArchiveEntry>, Vec<ArchiveEntry>) {
        self.entries.into_iter().partition(ArchiveEntry::is_wld)
    }
}
