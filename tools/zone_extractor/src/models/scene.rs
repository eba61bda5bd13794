use std::path::Path;

use log::info;
use shared::models::zone::WldDocument;
use tools_shared::models::{Archive, ArchiveEntry};

use crate::{
    error::{ExtractError, ExtractResult},
    models::wld::decode_document,
};

/// A decoded container: its WLD documents and the raw textures they use.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub name: String,
    pub documents: Vec<WldDocument>,
    pub textures: Vec<ArchiveEntry>,
}

impl Scene {
    pub fn from_archive(archive: Archive) -> ExtractResult<Scene> {
        let name = archive.name.clone();
        let (wld_entries, textures) = archive.into_parts();

        let documents = wld_entries
            .iter()
            .map(|entry| {
                decode_document(&entry.name, &entry.data, &textures).map_err(|source| {
                    ExtractError::Document {
                        archive: name.clone(),
                        document: entry.name.clone(),
                        source,
                    }
                })
            })
            .collect::<ExtractResult<Vec<_>>>()?;

        info!(
            "{}: {} documents, {} textures",
            name,
            documents.len(),
            textures.len()
        );
        Ok(Scene {
            name,
            documents,
            textures,
        })
    }

    /// Archive name without its extension.
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.name)
    }

    pub fn document(&self, name: &str) -> Option<&WldDocument> {
        self.documents.iter().find(|document| document.name == name)
    }

    /// The document named after the archive, e.g. `gfaydark.wld` in
    /// `gfaydark.s3d`, falling back to the first one.
    pub fn main_document(&self) -> Option<&WldDocument> {
        self.document(&format!("{}.wld", self.stem()))
            .or_else(|| self.documents.first())
    }

    pub fn texture(&self, name: &str) -> Option<&ArchiveEntry> {
        self.textures.iter().find(|texture| texture.name == name)
    }
}

/// Decodes an in-memory container and every WLD file inside it.
pub fn decode_scene(name: &str, data: &[u8]) -> ExtractResult<Scene> {
    let archive =
        tools_shared::read_archive(name, data).map_err(|source| ExtractError::Archive {
            archive: name.to_owned(),
            source,
        })?;
    Scene::from_archive(archive)
}

pub fn load_scene(path: impl AsRef<Path>) -> ExtractResult<Scene> {
    let path = path.as_ref();
    let archive = tools_shared::open_archive(path).map_err(|source| ExtractError::Archive {
        archive: path.display().to_string(),
        source,
    })?;
    Scene::from_archive(archive)
}
