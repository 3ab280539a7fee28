//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, fetch, and JSON errors, and provides semantic variants
//! for tensor contract violations, backend availability, and argument validation.
use thiserror::Error;

use crate::types::Backend;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crate::io::FetchError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend `{backend}` is not available on this host")]
    BackendUnavailable { backend: Backend },

    #[error("Shape error: {0}")]
    Shape(String),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Size must be greater than 0, got: {size}")]
    ZeroSize { size: usize },

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("External error: {0}")]
    External(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::External(e.to_string())
    }

    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Error::Shape(msg.into())
    }
}
