use std::path::{Path, PathBuf};

use log::{debug, trace};
use shared::models::zone::WldDocument;

use crate::{
    error::{ExtractError, ExtractResult},
    models::scene::Scene,
};

use self::{mtl::MtlWriter, obj::ObjWriter};

pub mod mtl;
pub mod obj;

pub const ZONES_DIR: &str = "zones";
pub const TEXTURES_DIR: &str = "textures";
pub const MATERIALS_DIR: &str = "materials";
pub const OBJECTS_DIR: &str = "objects";
pub const CHARACTERS_DIR: &str = "characters";
pub const SKIES_DIR: &str = "skies";
pub const OBJECT_POSITIONS_DIR: &str = "object_positions";

/// Directory tree every export is written into.
#[derive(Debug, Clone)]
pub struct ExportLayout {
    root: PathBuf,
}

impl ExportLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn create_dirs(&self) -> ExtractResult<()> {
        for name in [
            ZONES_DIR,
            TEXTURES_DIR,
            MATERIALS_DIR,
            OBJECTS_DIR,
            CHARACTERS_DIR,
            SKIES_DIR,
            OBJECT_POSITIONS_DIR,
        ] {
            let path = self.dir(name);
            std::fs::create_dir_all(&path).map_err(ExtractError::io(path))?;
        }
        Ok(())
    }
}

fn write_file(path: PathBuf, contents: impl AsRef<[u8]>) -> ExtractResult<()> {
    trace!("writing {}", path.display());
    std::fs::write(&path, contents).map_err(ExtractError::io(path))
}

fn mtl_lib_path(stem: &str) -> String {
    format!("../{}/{}.mtl", MATERIALS_DIR, stem)
}

pub fn export_textures(scene: &Scene, layout: &ExportLayout) -> ExtractResult<()> {
    let dir = layout.dir(TEXTURES_DIR);
    for texture in &scene.textures {
        write_file(dir.join(&texture.name), &texture.data)?;
    }
    debug!("{}: {} textures written", scene.name, scene.textures.len());
    Ok(())
}

/// Writes every material of `document` to `materials/<document>.mtl`.
pub fn export_materials(document: &WldDocument, layout: &ExportLayout) -> ExtractResult<()> {
    let mut mtl = MtlWriter::new();
    for material in &document.materials {
        mtl.add_material(material);
    }

    let path = layout
        .dir(MATERIALS_DIR)
        .join(format!("{}.mtl", document.stem()));
    write_file(path, mtl.to_string())
}

/// Writes all meshes of `document` to a single `zones/<document>.obj`.
pub fn export_zone_mesh(document: &WldDocument, layout: &ExportLayout) -> ExtractResult<()> {
    let mut obj = ObjWriter::new();
    obj.add_mtl_lib(mtl_lib_path(document.stem()));
    for mesh in &document.meshes {
        obj.add_mesh(mesh, document);
    }

    let path = layout.dir(ZONES_DIR).join(format!("{}.obj", document.stem()));
    write_file(path, obj.to_string())
}

/// Writes one `<mesh>.obj` per mesh of `document` into `folder`.
pub fn export_meshes(
    document: &WldDocument,
    layout: &ExportLayout,
    folder: &str,
) -> ExtractResult<()> {
    let dir = layout.dir(folder);
    for mesh in &document.meshes {
        let mut obj = ObjWriter::new();
        obj.add_mtl_lib(mtl_lib_path(document.stem()));
        obj.add_mesh(mesh, document);
        write_file(dir.join(format!("{}.obj", mesh.name)), obj.to_string())?;
    }
    Ok(())
}

/// Writes one OBJ and one MTL per static mesh, holding the meshes it
/// assembles and the materials they draw with.
pub fn export_static_objects(document: &WldDocument, layout: &ExportLayout) -> ExtractResult<()> {
    let objects_dir = layout.dir(OBJECTS_DIR);
    let materials_dir = layout.dir(MATERIALS_DIR);

    for static_mesh in &document.static_meshes {
        let mut obj = ObjWriter::new();
        let mut mtl = MtlWriter::new();
        obj.add_mtl_lib(mtl_lib_path(&static_mesh.name));

        for mesh in document.static_mesh_parts(static_mesh) {
            obj.add_mesh(mesh, document);
            for run in &mesh.polygon_materials {
                if let Some(material) = mesh.material_for(run).and_then(|id| document.material(id))
                {
                    mtl.add_material(material);
                }
            }
        }

        write_file(
            objects_dir.join(format!("{}.obj", static_mesh.name)),
            obj.to_string(),
        )?;
        write_file(
            materials_dir.join(format!("{}.mtl", static_mesh.name)),
            mtl.to_string(),
        )?;
    }

    debug!(
        "{}: {} static objects written",
        document.name,
        document.static_meshes.len()
    );
    Ok(())
}

/// Dumps the placeable objects of `document` to
/// `object_positions/<zone>.json`.
pub fn export_placements(
    document: &WldDocument,
    zone: &str,
    layout: &ExportLayout,
) -> ExtractResult<()> {
    let json = serde_json::to_string(&document.placeable_objects)?;
    let path = layout
        .dir(OBJECT_POSITIONS_DIR)
        .join(format!("{}.json", zone));
    write_file(path, json)
}
