use std::fmt;

use shared::models::zone::Material;

// Dissolve and illumination model of a material as understood by OBJ viewers
#[derive(Debug, Clone, PartialEq)]
struct MtlMaterial {
    name: String,
    diffuse_texture: Option<String>,
    dissolve: f32,
    illumination_mode: u8,
}

/// Material library (`.mtl`) writer.
#[derive(Debug, Default)]
pub struct MtlWriter {
    materials: Vec<MtlMaterial>,
}

impl MtlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a material unless one with the same name is already present.
    pub fn add_material(&mut self, material: &Material) {
        if self.materials.iter().any(|m| m.name == material.name) {
            return;
        }

        self.materials.push(MtlMaterial {
            name: material.name.clone(),
            diffuse_texture: material.diffuse_texture().map(str::to_owned),
            dissolve: if material.transparent && !material.masked {
                0.0
            } else {
                1.0
            },
            illumination_mode: if material.transparent { 9 } else { 1 },
        });
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl fmt::Display for MtlWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = Vec::new();
        for material in &self.materials {
            lines.push(format!("newmtl {}", material.name));
            lines.push("Ka 1 1 1".to_owned());
            lines.push("Kd 1 1 1".to_owned());
            lines.push(format!("d {}", material.dissolve));
            lines.push(format!("illum {}", material.illumination_mode));
            if let Some(texture) = &material.diffuse_texture {
                lines.push(format!("map_Kd ../textures/{}", texture));
            }
        }

        write!(f, "{}", lines.join("\n"))
    }
}
