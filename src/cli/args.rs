use clap::Parser;
use std::path::PathBuf;

use stylepipe::{Backend, OutputFormat, ResizeFilter};

#[derive(Parser)]
#[command(name = "stylepipe", version, about = "Arbitrary-style transfer pipeline CLI")]
pub struct CliArgs {
    /// Content image URL or local path (repeatable)
    #[arg(short, long = "content", required = true)]
    pub content: Vec<String>,

    /// Style image URL or local path (repeatable)
    #[arg(short, long = "style", required = true)]
    pub style: Vec<String>,

    /// Output directory for stylized images
    #[arg(short, long, default_value = "stylized")]
    pub output_dir: PathBuf,

    /// JSON file with pipeline parameters; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format (jpeg or png)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Content image size. Options:
    /// - Square: a single positive integer (e.g., 384)
    /// - Rectangle: HEIGHTxWIDTH (e.g., 384x512)
    #[arg(long)]
    pub content_size: Option<String>,

    /// Style image size, same syntax as --content-size
    #[arg(long)]
    pub style_size: Option<String>,

    /// Stretch to the target size instead of fitting inside it
    #[arg(long, default_value_t = false)]
    pub no_preserve_aspect: bool,

    /// Skip average pooling of style images
    #[arg(long, default_value_t = false)]
    pub no_smooth: bool,

    /// Resize interpolation filter
    #[arg(long, value_enum)]
    pub filter: Option<ResizeFilter>,

    /// Compute backend for stylization
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Blend between content (0.0) and full style statistics (1.0)
    #[arg(long, default_value_t = 1.0)]
    pub strength: f32,

    /// Benchmark default vs accelerated backend on the first content/style pair
    #[arg(long, default_value_t = false)]
    pub benchmark: bool,

    /// Timed benchmark runs per backend
    #[arg(long)]
    pub runs: Option<usize>,

    /// Discarded warm-up runs per backend
    #[arg(long)]
    pub warmup: Option<usize>,

    /// Write the benchmark comparison as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Directory for downloaded image bytes
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Maximum number of preprocessed images kept in memory
    #[arg(long)]
    pub cache_capacity: Option<usize>,

    /// JPEG quality (1-100)
    #[arg(long)]
    pub jpeg_quality: Option<u8>,

    /// Continue with remaining pairs when one fails
    #[arg(long, default_value_t = false)]
    pub keep_going: bool,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
