use std::fmt;

use log::warn;
use shared::models::zone::{Mesh, Vector2, Vector3, WldDocument};

struct ObjGroup {
    name: String,
    material: Option<String>,
    faces: Vec<[usize; 3]>,
}

struct ObjObject {
    name: String,
    vertices: Vec<Vector3>,
    uvs: Vec<Vector2>,
    groups: Vec<ObjGroup>,
}

/// Wavefront `.obj` writer. Several meshes can go in one file, face indices
/// keep counting across them.
#[derive(Default)]
pub struct ObjWriter {
    mtl_libs: Vec<String>,
    objects: Vec<ObjObject>,
    vertex_count: usize,
}

// OBJ is Y-up, zone files are Z-up
fn to_obj_space(position: Vector3) -> Vector3 {
    // `+ 0.0` turns -0 into 0
    Vector3::new(position.x + 0.0, position.z + 0.0, -position.y + 0.0)
}

impl ObjWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mtl_lib(&mut self, path: impl Into<String>) {
        self.mtl_libs.push(path.into());
    }

    /// Adds a mesh, naming its polygon groups after the materials of
    /// `document`.
    pub fn add_mesh(&mut self, mesh: &Mesh, document: &WldDocument) {
        let vertices: Vec<Vector3> = mesh.positions().map(to_obj_space).collect();
        let uvs: Vec<Vector2> = (0..vertices.len())
            .map(|idx| mesh.uvs.get(idx).copied().unwrap_or_default())
            .collect();

        let mut groups = Vec::with_capacity(mesh.polygon_materials.len());
        let mut first_polygon = 0_usize;
        for (run_index, run) in mesh.polygon_materials.iter().enumerate() {
            let material = mesh
                .material_for(run)
                .and_then(|id| document.material(id))
                .map(|material| material.name.clone());

            let end = first_polygon + run.count as usize;
            let polygons = mesh.polygons.get(first_polygon..end).unwrap_or_else(|| {
                warn!(
                    "{}: polygon run {} overruns the {} polygons",
                    mesh.name,
                    run_index,
                    mesh.polygons.len()
                );
                mesh.polygons.get(first_polygon..).unwrap_or_default()
            });
            let faces = polygons
                .iter()
                .map(|polygon| {
                    [polygon.vertex1, polygon.vertex3, polygon.vertex2]
                        .map(|vertex| vertex as usize + self.vertex_count + 1)
                })
                .collect();

            groups.push(ObjGroup {
                name: format!("PI_{}", run_index),
                material,
                faces,
            });
            first_polygon = end;
        }

        self.vertex_count += vertices.len();
        self.objects.push(ObjObject {
            name: mesh.name.clone(),
            vertices,
            uvs,
            groups,
        });
    }
}

impl fmt::Display for ObjWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = Vec::new();
        for lib in &self.mtl_libs {
            lines.push(format!("mtllib {}", lib));
        }

        for object in &self.objects {
            lines.push(format!("o {}", object.name));
            for v in &object.vertices {
                lines.push(format!("v {} {} {}", v.x, v.y, v.z));
            }
            for uv in &object.uvs {
                lines.push(format!("vt {} {}", uv.x, uv.y));
            }
            for group in &object.groups {
                lines.push(format!("g {}", group.name));
                if let Some(material) = &group.material {
                    lines.push(format!("usemtl {}", material));
                }
                for [a, b, c] in &group.faces {
                    lines.push(format!("f {a}/{a} {b}/{b} {c}/{c}"));
                }
            }
        }

        write!(f, "{}", lines.join("\n"))
    }
}
