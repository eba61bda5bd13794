use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use indicatif::ProgressBar;
use log::{error, info};
use tokio::sync::Semaphore;

use crate::{
    error::{ExtractError, ExtractResult},
    export::{self, ExportLayout, SKIES_DIR},
    models::scene::{load_scene, Scene},
};

pub const ARCHIVE_EXTENSION: &str = "s3d";

const SKY_ARCHIVE: &str = "sky";
const EQUIPMENT_MARKER: &str = "gequip";
const OBJECTS_WLD: &str = "objects.wld";
const LIGHTS_WLD: &str = "lights.wld";

/// What an archive holds, guessed from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Sky,
    Equipment,
    Objects,
    Characters,
    Armor,
    Lights,
    Zone,
}

impl ArchiveKind {
    pub fn classify(stem: &str) -> ArchiveKind {
        if stem == SKY_ARCHIVE {
            ArchiveKind::Sky
        } else if stem.contains(EQUIPMENT_MARKER) {
            ArchiveKind::Equipment
        } else if stem.ends_with("_obj") {
            ArchiveKind::Objects
        } else if stem.ends_with("_chr") || stem.ends_with("_chr1") {
            ArchiveKind::Characters
        } else if stem.ends_with("_amr") {
            ArchiveKind::Armor
        } else if stem.ends_with("_lit") {
            ArchiveKind::Lights
        } else {
            ArchiveKind::Zone
        }
    }

    pub fn is_exported(&self) -> bool {
        matches!(
            self,
            ArchiveKind::Sky | ArchiveKind::Objects | ArchiveKind::Zone
        )
    }
}

fn archive_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Writes out everything `scene` has to offer for its kind of archive.
pub fn export_scene(scene: &Scene, kind: ArchiveKind, layout: &ExportLayout) -> ExtractResult<()> {
    match kind {
        ArchiveKind::Sky => {
            export::export_textures(scene, layout)?;
            if let Some(document) = scene.documents.first() {
                export::export_materials(document, layout)?;
                export::export_meshes(document, layout, SKIES_DIR)?;
            }
        }
        ArchiveKind::Objects => {
            export::export_textures(scene, layout)?;
            if let Some(document) = scene.documents.first() {
                export::export_static_objects(document, layout)?;
            }
        }
        ArchiveKind::Zone => {
            export::export_textures(scene, layout)?;
            let zone = scene.stem();
            for document in &scene.documents {
                if document.stem() == zone {
                    export::export_materials(document, layout)?;
                    export::export_zone_mesh(document, layout)?;
                } else if document.name == OBJECTS_WLD {
                    export::export_placements(document, zone, layout)?;
                } else if document.name == LIGHTS_WLD {
                    info!("{}: skipping zone lights", scene.name);
                }
            }
        }
        ArchiveKind::Equipment
        | ArchiveKind::Characters
        | ArchiveKind::Armor
        | ArchiveKind::Lights => {
            info!("{}: {:?} archives are not exported", scene.name, kind);
        }
    }
    Ok(())
}

/// Decodes and exports a single archive.
pub fn extract_archive(path: &Path, layout: &ExportLayout) -> ExtractResult<ArchiveKind> {
    let kind = ArchiveKind::classify(&archive_stem(path));
    if !kind.is_exported() {
        info!("{}: skipping {:?} archive", path.display(), kind);
        return Ok(kind);
    }

    info!("loading {}", path.display());
    let scene = load_scene(path)?;
    export_scene(&scene, kind, layout)?;
    info!("done with {}", scene.name);
    Ok(kind)
}

/// Lists the `.s3d` archives of `zones_dir`, restricted to `only` (archive
/// names, with or without extension) when it is not empty.
pub fn list_archives(zones_dir: &Path, only: &[String]) -> ExtractResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(zones_dir).map_err(ExtractError::io(zones_dir))?;

    let mut archives = Vec::new();
    for entry in entries {
        let path = entry.map_err(ExtractError::io(zones_dir))?.path();
        let is_archive = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
            .unwrap_or(false);
        if !is_archive {
            continue;
        }

        let stem = archive_stem(&path);
        let wanted = only.is_empty()
            || only.iter().any(|name| {
                let name = name.to_ascii_lowercase();
                name == stem || name.strip_suffix(".s3d") == Some(stem.as_str())
            });
        if wanted {
            archives.push(path);
        }
    }

    archives.sort();
    Ok(archives)
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub total: usize,
    pub exported: usize,
    pub skipped: usize,
    pub failures: Vec<(PathBuf, ExtractError)>,
}

impl BatchReport {
    pub fn into_result(self) -> ExtractResult<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(ExtractError::Batch {
                failed: self.failures.len(),
                total: self.total,
            })
        }
    }
}

/// Extracts `archives` with at most `jobs` of them in flight. A failing
/// archive is logged and recorded, the others still run.
pub async fn run_batch(
    archives: Vec<PathBuf>,
    layout: Arc<ExportLayout>,
    jobs: usize,
) -> BatchReport {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let bar = ProgressBar::new(archives.len() as u64);
    let mut report = BatchReport {
        total: archives.len(),
        ..Default::default()
    };

    let mut handles = Vec::with_capacity(archives.len());
    for path in archives {
        let semaphore = semaphore.clone();
        let layout = layout.clone();
        handles.push(tokio::spawn(async move {
            // The semaphore is never closed
            let _permit = semaphore.acquire_owned().await;
            let task_path = path.clone();
            let result = tokio::task::spawn_blocking(move || extract_archive(&task_path, &layout))
                .await
                .map_err(ExtractError::from)
                .and_then(|result| result);
            (path, result)
        }));
    }

    for handle in handles {
        let outcome = handle.await;
        bar.inc(1);
        match outcome {
            Ok((_, Ok(kind))) if kind.is_exported() => report.exported += 1,
            Ok((_, Ok(_))) => report.skipped += 1,
            Ok((path, Err(err))) => {
                error!("error extracting {}: {}", path.display(), err);
                report.failures.push((path, err));
            }
            Err(err) => {
                error!("extraction task panicked: {}", err);
                report.failures.push((PathBuf::new(), ExtractError::from(err)));
            }
        }
    }
    bar.finish();

    info!(
        "{} archives: {} exported, {} skipped, {} failed",
        report.total,
        report.exported,
        report.skipped,
        report.failures.len()
    );
    report
}
