use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use env_logger::Env;
use log::info;
use zone_extractor::{
    batch::{list_archives, run_batch},
    config::ExtractorConfig,
    error::ExtractResult,
    export::ExportLayout,
};

#[tokio::main]
async fn main() -> ExtractResult<()> {
    let args = Cli::parse();
    let config = ExtractorConfig::load()?;

    env_logger::Builder::from_env(Env::default().default_filter_or(config.log.level.as_str()))
        .init();

    let zones_dir = args
        .zones_dir
        .unwrap_or_else(|| PathBuf::from(&config.extractor.zones_directory));
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&config.extractor.export_directory));
    let jobs = args.jobs.unwrap_or(config.extractor.max_concurrent_archives);

    let layout = ExportLayout::new(output_dir);
    layout.create_dirs()?;

    let archives = list_archives(&zones_dir, &args.archives)?;
    info!(
        "extracting {} archives from {} to {}",
        archives.len(),
        zones_dir.display(),
        layout.root().display()
    );

    run_batch(archives, Arc::new(layout), jobs)
        .await
        .into_result()
}

#[derive(Parser)]
#[command(name = "Zone Extractor")]
#[command(about = "Extracts zone meshes, materials and textures from .s3d archives", long_about = None)]
struct Cli {
    /// Folder containing the .s3d archives
    #[arg(short, long)]
    zones_dir: Option<PathBuf>,
    /// Where to extract the files to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// How many archives to extract at the same time
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Specific archives to extract, e.g. gfaydark or gfaydark_obj.s3d
    archives: Vec<String>,
}
