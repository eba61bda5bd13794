use config::{Config, ConfigBuilder, ConfigError, File, FileFormat};
use serde::Deserialize;

const TEMPLATE: &str = include_str!("../../../config.template.toml");

#[derive(Debug, Deserialize)]
pub struct ExtractorConfig {
    pub extractor: ExtractorSection,
    pub log: LogSection,
}

impl ExtractorConfig {
    // The checked in template is compiled in, so running outside of the
    // repository still has every key
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()
            .add_source(File::with_name("config.template.toml").required(false))
            .add_source(File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize()
    }

    pub fn from_toml(overrides: &str) -> Result<Self, ConfigError> {
        Self::builder()
            .add_source(File::from_str(overrides, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn builder() -> ConfigBuilder<config::builder::DefaultState> {
        Config::builder().add_source(File::from_str(TEMPLATE, FileFormat::Toml))
    }
}

#[derive(Debug, Deserialize)]
pub struct ExtractorSection {
    pub zones_directory: String,
    pub export_directory: String,
    pub max_concurrent_archives: usize,
}

#[derive(Debug, Deserialize)]
pub struct LogSection {
    pub level: String,
}
