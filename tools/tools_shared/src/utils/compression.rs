use crate::error::{ArchiveError, ArchiveResult};

// Archive chunks are zlib streams (2 bytes header + DEFLATE + adler32)
pub fn decompress_zlib(input: &[u8], offset: usize) -> ArchiveResult<Vec<u8>> {
    miniz_oxide::inflate::decompress_to_vec_zlib(input).map_err(|err| {
        ArchiveError::Decompression {
            offset,
            reason: format!("{:?}", err),
        }
    })
}
