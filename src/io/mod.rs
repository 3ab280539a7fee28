//! I/O layer: remote image retrieval with an on-disk byte cache (`fetch`),
//! the bounded in-memory cache of preprocessed images (`cache`), and
//! `writers` for JPEG/PNG output.
pub mod fetch;
pub use fetch::{ByteSource, FetchError, HttpSource, ImageFetcher};

pub mod cache;
pub use cache::{CacheStats, ImageCache, ImageSpec};

pub mod writers;
