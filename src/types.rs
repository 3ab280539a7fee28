//! Shared types and enums used across stylepipe.
//! Includes the compute `Backend`, the interpolation `ResizeFilter`, and the
//! file `OutputFormat` for stylized results.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Logical compute backend the stylization model runs on.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Default,
    Accelerated,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Backend::Default => "default",
            Backend::Accelerated => "accelerated",
        };
        write!(f, "{}", s)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    Nearest,
    Bilinear,
    CatmullRom,
    Lanczos3,
}

impl std::fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResizeFilter::Nearest => write!(f, "Nearest"),
            ResizeFilter::Bilinear => write!(f, "Bilinear"),
            ResizeFilter::CatmullRom => write!(f, "CatmullRom"),
            ResizeFilter::Lanczos3 => write!(f, "Lanczos3"),
        }
    }
}

#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    ValueEnum,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg, // Lossy, preview only
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}
