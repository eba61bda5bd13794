mod common;

use common::{bitmap, build_archive, object_archive_wld, objects_wld, zone_wld, WldBuilder};
use zone_extractor::{
    decode_scene,
    error::{ExtractError, WldError},
};

fn zone_archive() -> Vec<u8> {
    build_archive(&[
        ("gfaydark.wld", zone_wld()),
        ("objects.wld", objects_wld()),
        ("GRASS.BMP", bitmap(64, 32)),
        ("water.bmp", bitmap(128, 128)),
        ("trace.dbg", vec![1, 2, 3]),
    ])
}

#[test]
fn test_decode_zone_archive() {
    let scene = decode_scene("gfaydark.s3d", &zone_archive()).unwrap();

    assert_eq!(scene.stem(), "gfaydark");
    assert_eq!(scene.documents.len(), 2);
    assert_eq!(scene.textures.len(), 2);
    assert!(scene.texture("grass.bmp").is_some());

    let zone = scene.main_document().unwrap();
    assert_eq!(zone.name, "gfaydark.wld");
    assert_eq!(zone.fragment_count, 13);

    let names: Vec<&str> = zone.materials.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["GRASS_MDF", "WATER_MDF"]);
    let grass = &zone.materials[0];
    assert_eq!(grass.id, 7);
    assert_eq!(grass.textures, vec!["grass.bmp".to_owned()]);
    assert_eq!((grass.width, grass.height), (64, 32));
    assert!(!grass.transparent);
    let water = &zone.materials[1];
    assert!(water.transparent && !water.masked);
    assert_eq!(water.width, 128);

    assert_eq!(zone.meshes.len(), 1);
    let mesh = &zone.meshes[0];
    assert_eq!(mesh.id, 12);
    assert_eq!(mesh.name, "GFAY_DMSPRITEDEF");
    assert_eq!(mesh.scale, 0.5);
    assert_eq!(mesh.materials, vec![Some(7), Some(8), None]);
    assert_eq!(mesh.polygons.len(), 2);
}

#[test]
fn test_decode_placements() {
    let scene = decode_scene("gfaydark.s3d", &zone_archive()).unwrap();

    let objects = scene.document("objects.wld").unwrap();
    let names: Vec<&str> = objects
        .placeable_objects
        .iter()
        .map(|o| o.object_name.as_str())
        .collect();
    assert_eq!(names, ["TREE1_ACTORDEF", "ROCK_ACTORDEF"]);

    let tree = &objects.placeable_objects[0];
    assert_eq!(tree.name, "TREE");
    assert_eq!(tree.position.x, 100.0);
    assert!((tree.rotation.x - 90.0).abs() < 1e-3);
    assert_eq!(tree.rotation.z, 0.0);
}

#[test]
fn test_decode_static_objects() {
    let archive = build_archive(&[
        ("gfaydark_obj.wld", object_archive_wld()),
        ("grass.bmp", bitmap(16, 16)),
    ]);

    let scene = decode_scene("gfaydark_obj.s3d", &archive).unwrap();

    let document = scene.main_document().unwrap();
    assert_eq!(document.mesh_references.len(), 1);
    assert_eq!(document.mesh_references[0].id, 7);
    assert_eq!(document.mesh_references[0].name, "TREE_DMSPRITEDEF");

    let static_mesh = &document.static_meshes[0];
    assert_eq!(static_mesh.name, "TREE_ACTORDEF");
    assert_eq!(static_mesh.mesh_references, vec![7, 5]);
    let parts: Vec<&str> = document
        .static_mesh_parts(static_mesh)
        .map(|mesh| mesh.name.as_str())
        .collect();
    assert_eq!(parts, ["TREE_DMSPRITEDEF"]);
}

#[test]
fn test_bad_container_names_the_archive() {
    let mut data = zone_archive();
    data[4..8].copy_from_slice(b"PKZP");

    let err = decode_scene("gfaydark.s3d", &data).unwrap_err();

    assert!(matches!(err, ExtractError::Archive { ref archive, .. } if archive == "gfaydark.s3d"));
    assert!(err.to_string().starts_with("gfaydark.s3d: not a valid container"));
}

#[test]
fn test_broken_document_names_archive_and_document() {
    let mut wld = WldBuilder::new();
    wld.quad_mesh("ORPHAN_DMSPRITEDEF", 1);
    let archive = build_archive(&[("broken.wld", wld.build())]);

    let err = decode_scene("broken.s3d", &archive).unwrap_err();

    assert!(matches!(
        err,
        ExtractError::Document {
            ref archive,
            ref document,
            source: WldError::UnresolvedReference { .. },
        } if archive == "broken.s3d" && document == "broken.wld"
    ));
}
