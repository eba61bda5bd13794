use thiserror::Error;

#[derive(Debug, Error)]
pub enum CursorError {
    #[error("read of {need} bytes at offset {offset:#x} runs past the end of a {len} bytes buffer")]
    OutOfBounds {
        offset: usize,
        need: usize,
        len: usize,
    },

    #[error("write of {need} bytes at offset {offset:#x} exceeds the {capacity} bytes capacity")]
    CapacityExceeded {
        offset: usize,
        need: usize,
        capacity: usize,
    },
}

pub type CursorResult<T> = Result<T, CursorError>;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("not a valid container: expected magic \"PFS \", found {found:?}")]
    InvalidMagic { found: [u8; 4] },

    #[error("decompression failed for chunk at offset {offset:#x}: {reason}")]
    Decompression { offset: usize, reason: String },

    #[error(
        "decompression failed for chunk at offset {offset:#x}: expected {expected} bytes, got {actual}"
    )]
    InflatedLengthMismatch {
        offset: usize,
        expected: usize,
        actual: usize,
    },

    #[error("chunk at offset {offset:#x} inflates past the declared file size of {total} bytes")]
    ChunkOverflow { offset: usize, total: usize },

    #[error("file at offset {offset:#x} declares {declared} bytes, more than its {available} compressed bytes can hold")]
    ImplausibleSize {
        offset: usize,
        declared: usize,
        available: usize,
    },

    #[error("chunk at offset {offset:#x} inflates to nothing before the file is complete")]
    EmptyChunk { offset: usize },

    #[error("container has no directory entry")]
    MissingDirectory,

    #[error("directory lists {declared} names for {files} files")]
    DirectoryMismatch { declared: u32, files: usize },

    #[error(transparent)]
    Cursor(#[from] CursorError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
