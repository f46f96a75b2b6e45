//! Run configuration. Defaults reproduce the fixed sources and file names.

use std::path::PathBuf;

use crate::stats::DEFAULT_SIGNIFICANCE_LEVEL;

pub const OBESITY_URL: &str =
    "https://www.cdc.gov/obesity/media/files/2024/09/2023-Obesity-by-state.csv";
pub const INTEGRITY_URL: &str = "https://cloudfront-files-1.publicintegrity.org/apps/2015/10/stateintegrity/0.1.35/data/overview.json";
pub const OBESITY_CSV_PATH: &str = "2023-Obesity-by-state.csv";
pub const IMAGE_WIDTH: u32 = 1024;
pub const IMAGE_HEIGHT: u32 = 768;

/// How the three maps are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RenderMode {
    /// Save PNG images to the output directory.
    #[default]
    Png,
    /// Draw the maps in the terminal.
    Terminal,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub obesity_url: String,
    pub integrity_url: String,
    pub csv_path: PathBuf,
    pub output_dir: PathBuf,
    pub mode: RenderMode,
    pub width: u32,
    pub height: u32,
    pub merged_output: Option<PathBuf>,
    pub significance_level: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            obesity_url: OBESITY_URL.to_string(),
            integrity_url: INTEGRITY_URL.to_string(),
            csv_path: PathBuf::from(OBESITY_CSV_PATH),
            output_dir: PathBuf::from("."),
            mode: RenderMode::Png,
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
            merged_output: None,
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
        }
    }
}
