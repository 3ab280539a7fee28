//! Core building blocks: the normalized `Image` tensor, pipeline parameters,
//! and the preprocessing primitives (center crop, resize, average pooling)
//! consumed by the cache and the high-level `api` module.
pub mod image;
pub mod params;
pub mod processing;
