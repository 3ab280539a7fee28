use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Backend, OutputFormat, ResizeFilter};

/// Pipeline parameters suitable for config files and CLI presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Target `(height, width)` of content images
    pub content_size: (usize, usize),
    /// Target `(height, width)` of style images
    pub style_size: (usize, usize),
    pub preserve_aspect_ratio: bool,
    /// Average-pool style images before stylization
    pub smooth_style: bool,
    pub smooth_kernel: usize,
    pub smooth_stride: usize,
    pub filter: ResizeFilter,
    pub backend: Backend,
    pub warmup_runs: usize,
    pub timed_runs: usize,
    /// Directory holding downloaded image bytes
    pub cache_dir: PathBuf,
    /// Maximum number of preprocessed images kept in memory
    pub cache_capacity: usize,
    pub http_timeout_secs: u64,
    pub format: OutputFormat,
    pub jpeg_quality: u8,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            content_size: (384, 384),
            style_size: (256, 256),
            preserve_aspect_ratio: true,
            smooth_style: true,
            smooth_kernel: 3,
            smooth_stride: 1,
            filter: ResizeFilter::Bilinear,
            backend: Backend::Default,
            warmup_runs: 1,
            timed_runs: 10,
            cache_dir: std::env::temp_dir().join("stylepipe-cache"),
            cache_capacity: 32,
            http_timeout_secs: 30,
            format: OutputFormat::Jpeg,
            jpeg_quality: 95,
        }
    }
}

impl PipelineParams {
    /// Load parameters from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
