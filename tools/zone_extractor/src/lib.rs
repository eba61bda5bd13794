pub mod batch;
pub mod config;
pub mod error;
pub mod export;
pub mod models {
    pub mod scene;
    pub mod wld;
}

pub use models::{
    scene::{decode_scene, load_scene, Scene},
    wld::decode_document,
};
