use binrw::binrw;
use serde::{Deserialize, Serialize};

/// Rotation values are stored on a 512-step circle.
pub const ROTATION_UNITS_PER_DEGREE: f32 = 512.0 / 360.0;

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn as_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// Raw fixed point position, needs Mesh::scale and Mesh::center to be usable
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVertex {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon {
    pub flags: u16,
    pub vertex1: u16,
    pub vertex2: u16,
    pub vertex3: u16,
}

/// A run of `count` consecutive items sharing the same `index`, e.g. `count`
/// polygons drawn with material slot `index`.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRun {
    pub count: u16,
    pub index: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub id: u32,
    pub name: String,
    pub scale: f32,
    pub center: Vector3,
    pub animated_vertices: u32,
    pub vertices: Vec<RawVertex>,
    pub uvs: Vec<Vector2>,
    pub normals: Vec<Vector3>,
    pub vertex_colors: Vec<u32>,
    pub polygons: Vec<Polygon>,
    pub vertex_pieces: Vec<IndexRun>,
    pub polygon_materials: Vec<IndexRun>,
    pub vertex_materials: Vec<IndexRun>,
    /// Material slots of the mesh texture list. A slot is `None` when the
    /// list points at a material that was never decoded.
    pub materials: Vec<Option<u32>>,
}

impl Mesh {
    pub fn vertex_position(&self, vertex: &RawVertex) -> Vector3 {
        Vector3 {
            x: vertex.x as f32 * self.scale + self.center.x,
            y: vertex.y as f32 * self.scale + self.center.y,
            z: vertex.z as f32 * self.scale + self.center.z,
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Vector3> + '_ {
        self.vertices.iter().map(|v| self.vertex_position(v))
    }

    /// Material id used by a polygon run, if its slot resolved.
    pub fn material_for(&self, run: &IndexRun) -> Option<u32> {
        self.materials.get(run.index as usize).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: u32,
    pub name: String,
    pub transparent: bool,
    pub masked: bool,
    pub clear: bool,
    /// Texture file names, one per animation frame.
    pub textures: Vec<String>,
    pub width: u32,
    pub height: u32,
    /// Seconds between frames.
    pub frame_delay: f32,
}

impl Material {
    pub fn diffuse_texture(&self) -> Option<&str> {
        self.textures.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticMesh {
    pub id: u32,
    pub name: String,
    pub mesh_references: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshReference {
    pub id: u32,
    pub name: String,
    pub mesh: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceableObject {
    pub name: String,
    pub object_name: String,
    pub position: Vector3,
    /// Degrees
    pub rotation: Vector3,
    pub scale: Vector2,
    pub vertex_color_ref: u32,
}

/// Everything a single `.wld` file decodes to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WldDocument {
    pub name: String,
    pub fragment_count: u32,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub static_meshes: Vec<StaticMesh>,
    pub mesh_references: Vec<MeshReference>,
    pub placeable_objects: Vec<PlaceableObject>,
}

// Collections are filled in stream order, so ids are sorted within each of them
pub fn find_by_id<T>(items: &[T], id: u32, key: impl Fn(&T) -> u32) -> Option<&T> {
    items
        .binary_search_by_key(&id, key)
        .ok()
        .map(|index| &items[index])
}

impl WldDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// File name without the `.wld` extension.
    pub fn stem(&self) -> &str {
        self.name.strip_suffix(".wld").unwrap_or(&self.name)
    }

    pub fn mesh(&self, id: u32) -> Option<&Mesh> {
        find_by_id(&self.meshes, id, |m| m.id)
    }

    pub fn material(&self, id: u32) -> Option<&Material> {
        find_by_id(&self.materials, id, |m| m.id)
    }

    pub fn mesh_reference(&self, id: u32) -> Option<&MeshReference> {
        find_by_id(&self.mesh_references, id, |r| r.id)
    }

    /// Meshes assembled by a static mesh, skipping references that did not
    /// resolve.
    pub fn static_mesh_parts<'a>(
        &'a self,
        static_mesh: &'a StaticMesh,
    ) -> impl Iterator<Item = &'a Mesh> + 'a {
        static_mesh
            .mesh_references
            .iter()
            .filter_map(|id| self.mesh_reference(*id))
            .filter_map(|reference| self.mesh(reference.mesh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(id: u32) -> Mesh {
        Mesh {
            id,
            name: format!("MESH{id}_DMSPRITEDEF"),
            scale: 0.25,
            center: Vector3::new(10.0, 20.0, 30.0),
            animated_vertices: 0,
            vertices: vec![RawVertex { x: 4, y: -8, z: 0 }],
            uvs: vec![],
            normals: vec![],
            vertex_colors: vec![],
            polygons: vec![],
            vertex_pieces: vec![],
            polygon_materials: vec![
                IndexRun { count: 1, index: 0 },
                IndexRun { count: 1, index: 1 },
                IndexRun { count: 1, index: 7 },
            ],
            vertex_materials: vec![],
            materials: vec![Some(3), None],
        }
    }

    #[test]
    fn test_vertex_position_applies_scale_then_center() {
        let mesh = mesh(0);
        let position = mesh.positions().next().unwrap();

        assert_eq!(position, Vector3::new(11.0, 18.0, 30.0));
    }

    #[test]
    fn test_material_for_run() {
        let mesh = mesh(0);

        assert_eq!(mesh.material_for(&mesh.polygon_materials[0]), Some(3));
        assert_eq!(mesh.material_for(&mesh.polygon_materials[1]), None);
        assert_eq!(mesh.material_for(&mesh.polygon_materials[2]), None);
    }

    #[test]
    fn test_static_mesh_parts_skip_dangling_references() {
        let mut document = WldDocument::new("tree_obj.wld");
        document.meshes = vec![mesh(2), mesh(5)];
        document.mesh_references = vec![
            MeshReference {
                id: 3,
                name: "MESH2_DMSPRITEDEF".into(),
                mesh: 2,
            },
            MeshReference {
                id: 6,
                name: "MESH5_DMSPRITEDEF".into(),
                mesh: 5,
            },
        ];
        let static_mesh = StaticMesh {
            id: 7,
            name: "TREE_ACTORDEF".into(),
            mesh_references: vec![6, 4, 3],
        };

        let ids: Vec<u32> = document
            .static_mesh_parts(&static_mesh)
            .map(|m| m.id)
            .collect();

        assert_eq!(ids, vec![5, 2]);
        assert_eq!(document.stem(), "tree_obj");
    }
}
