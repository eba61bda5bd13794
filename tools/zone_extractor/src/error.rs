use std::path::PathBuf;

use thiserror::Error;
use tools_shared::error::{ArchiveError, CursorError};

#[derive(Debug, Error)]
pub enum WldError {
    #[error("not a WLD file: magic {found:#010X}")]
    InvalidMagic { found: u32 },

    #[error("fragment {id} at offset {offset:#x} declares an invalid size of {size} bytes")]
    FragmentSize { id: u32, offset: usize, size: u32 },

    #[error("fragment {id} ({kind}) references missing {target} {reference}")]
    UnresolvedReference {
        id: u32,
        kind: &'static str,
        target: &'static str,
        reference: u32,
    },

    #[error("fragment {id} payload at offset {offset:#x} is truncated: {source}")]
    TruncatedFragment {
        id: u32,
        offset: usize,
        source: CursorError,
    },

    #[error("texture {texture} has no readable bitmap header: {source}")]
    TextureHeader {
        texture: String,
        source: CursorError,
    },

    #[error(transparent)]
    Cursor(#[from] CursorError),
}

pub type WldResult<T> = Result<T, WldError>;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{archive}: {source}")]
    Archive {
        archive: String,
        source: ArchiveError,
    },

    #[error("{archive}/{document}: {source}")]
    Document {
        archive: String,
        document: String,
        source: WldError,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{failed} of {total} archives failed")]
    Batch { failed: usize, total: usize },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ExtractError {
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

pub type ExtractResult<T> = Result<T, ExtractError>;
