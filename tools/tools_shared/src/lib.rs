use std::{borrow::Cow, path::Path};

use binrw::BinReaderExt;
use constants::{
    CHUNK_HEADER_SIZE, DIRECTORY_CRC, DIRECTORY_ENTRY_SIZE, IGNORED_FILE_NAMES,
    MAX_INFLATE_RATIO, PFS_MAGIC,
};
use error::{ArchiveError, ArchiveResult};
use log::{debug, trace, warn};
use models::{
    Archive, ArchiveEntry, PfsChunkHeader, PfsDirectoryEntry, PfsHeader, PFS_HEADER_SIZE,
};
use utils::{
    compression::decompress_zlib,
    cursor::{Reader, Writer},
};

pub mod constants;
pub mod error;
pub mod models;
pub mod utils {
    pub mod compression;
    pub mod crypto;
    pub mod cursor;
}

struct PackedFile {
    offset: u32,
    data: Vec<u8>,
}

/// Reads a container from disk, naming it after its file name.
pub fn open_archive(path: impl AsRef<Path>) -> ArchiveResult<Archive> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or(Cow::Borrowed("unknown"));

    read_archive(&name, &data)
}

/// Decodes a whole container, keeping only the `.bmp`, `.dds` and `.wld` files.
pub fn read_archive(name: &str, data: &[u8]) -> ArchiveResult<Archive> {
    let mut reader = Reader::new(data);
    let header: PfsHeader = reader.read_with(PFS_HEADER_SIZE, |c| c.read_le())?;
    if header.magic != PFS_MAGIC {
        return Err(ArchiveError::InvalidMagic {
            found: header.magic,
        });
    }

    reader.seek(header.directory_offset as usize);
    let entry_count = reader.read_u32()?;
    trace!("{}: {} entries", name, entry_count);

    let mut directory: Option<Vec<u8>> = None;
    let mut files: Vec<PackedFile> = Vec::new();
    for _i in 0..entry_count {
        let entry: PfsDirectoryEntry = reader.read_with(DIRECTORY_ENTRY_SIZE, |c| c.read_le())?;
        let contents = inflate_entry(data, &entry)?;
        trace!(
            "entry crc {:#010X} at {:#X}: {} bytes",
            entry.crc,
            entry.file_offset,
            contents.len()
        );

        if entry.crc == DIRECTORY_CRC {
            directory = Some(contents);
        } else {
            files.push(PackedFile {
                offset: entry.file_offset,
                data: contents,
            });
        }
    }

    // The directory lists names in the order files appear in the archive
    files.sort_by_key(|file| file.offset);

    let directory = directory.ok_or(ArchiveError::MissingDirectory)?;
    let names = read_directory(&directory, files.len())?;

    let mut entries: Vec<ArchiveEntry> = Vec::new();
    for (file_name, file) in names.into_iter().zip(files) {
        if IGNORED_FILE_NAMES.contains(&file_name.as_str()) {
            continue;
        }
        let entry = ArchiveEntry::new(file_name, file.data);
        if !entry.is_asset() {
            trace!("skipping {}", entry.name);
            continue;
        }
        if entries.iter().any(|e| e.name == entry.name) {
            warn!("{}: duplicate entry {} ignored", name, entry.name);
            continue;
        }
        entries.push(entry);
    }

    debug!("{}: {} assets", name, entries.len());
    Ok(Archive {
        name: name.to_owned(),
        entries,
    })
}

fn inflate_entry(data: &[u8], entry: &PfsDirectoryEntry) -> ArchiveResult<Vec<u8>> {
    let available = data.len().saturating_sub(entry.file_offset as usize);
    if entry.inflated_size as usize > available.saturating_mul(MAX_INFLATE_RATIO) {
        return Err(ArchiveError::ImplausibleSize {
            offset: entry.file_offset as usize,
            declared: entry.inflated_size as usize,
            available,
        });
    }

    let mut reader = Reader::new(data);
    reader.seek(entry.file_offset as usize);
    let mut inflated = Writer::with_capacity(entry.inflated_size as usize);

    while !inflated.is_full() {
        let offset = reader.position();
        let chunk: PfsChunkHeader = reader.read_with(CHUNK_HEADER_SIZE, |c| c.read_le())?;
        let compressed = reader.read_bytes(chunk.deflated_length as usize)?;
        let decompressed = decompress_zlib(compressed, offset)?;

        if decompressed.len() != chunk.inflated_length as usize {
            return Err(ArchiveError::InflatedLengthMismatch {
                offset,
                expected: chunk.inflated_length as usize,
                actual: decompressed.len(),
            });
        }
        if decompressed.is_empty() {
            return Err(ArchiveError::EmptyChunk { offset });
        }
        if decompressed.len() > inflated.remaining() {
            return Err(ArchiveError::ChunkOverflow {
                offset,
                total: inflated.capacity(),
            });
        }

        inflated.write_bytes(&decompressed)?;
    }

    Ok(inflated.into_inner())
}

fn read_directory(directory: &[u8], file_count: usize) -> ArchiveResult<Vec<String>> {
    let mut reader = Reader::new(directory);
    let declared = reader.read_u32()?;
    // Some archives list one more name than they have files
    if declared as usize != file_count && declared as usize != file_count + 1 {
        return Err(ArchiveError::DirectoryMismatch {
            declared,
            files: file_count,
        });
    }

    let mut names: Vec<String> = Vec::with_capacity(file_count);
    for _i in 0..file_count {
        let length = reader.read_u32()?;
        let raw = reader.read_bytes(length as usize)?;
        let name = String::from_utf8_lossy(raw)
            .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_ascii_lowercase();
        names.push(name);
    }

    Ok(names)
}
