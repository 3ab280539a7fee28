#![doc = r#"
stylepipe - an arbitrary-style transfer pipeline around an opaque stylization model.

This crate downloads content and style images (caching the raw bytes on disk),
preprocesses them (center crop, resize, average pooling), runs them through a
pluggable style-transfer model on a selectable compute backend, writes the
results as JPEG or PNG, and benchmarks the default backend against the
accelerated one. It powers the `stylepipe` CLI and can be embedded in your own
Rust applications.

Stability
---------
The public library API is experimental in initial releases and may evolve.

Quick start: stylize one pair to a file
---------------------------------------
```rust,no_run
use std::path::Path;
use std::sync::Arc;
use stylepipe::{ColorStatsModel, Pipeline, PipelineParams};

fn main() -> stylepipe::Result<()> {
    let params = PipelineParams {
        content_size: (384, 384),
        style_size: (256, 256),
        ..PipelineParams::default()
    };
    let mut pipeline = Pipeline::new(params, Arc::new(ColorStatsModel::new()))?;

    pipeline.stylize_to_path(
        "https://example.com/content.jpg",
        "https://example.com/style.jpg",
        Path::new("/out/stylized.jpg"),
    )
}
```

Plugging in a model
-------------------
The pre-trained network is an injectable capability. Implement [`StyleModel`]
for your runtime and hand it to the pipeline:

```rust
use ndarray::{Array4, ArrayView4};
use stylepipe::{Backend, StyleModel};

struct Identity;

impl StyleModel for Identity {
    fn name(&self) -> &str {
        "identity"
    }

    fn is_available(&self, backend: Backend) -> bool {
        backend == Backend::Default
    }

    fn stylize(
        &self,
        content: ArrayView4<'_, f32>,
        _style: ArrayView4<'_, f32>,
        _backend: Backend,
    ) -> stylepipe::Result<Vec<Array4<f32>>> {
        Ok(vec![content.to_owned()])
    }
}
```

Benchmarking backends
---------------------
```rust,no_run
use std::sync::Arc;
use stylepipe::{ColorStatsModel, Pipeline, PipelineParams};

fn main() -> stylepipe::Result<()> {
    let mut pipeline = Pipeline::new(PipelineParams::default(), Arc::new(ColorStatsModel::new()))?;
    let cmp = pipeline.benchmark("https://example.com/c.jpg", "https://example.com/s.jpg")?;
    println!("speedup {:.2}x", cmp.speedup);
    Ok(())
}
```

Error handling
--------------
All public functions return `stylepipe::Result<T>`; match on `stylepipe::Error`
to handle specific cases.

```rust,no_run
use std::sync::Arc;
use stylepipe::{Backend, ColorStatsModel, Error, Pipeline, PipelineParams};

fn main() {
    let mut pipeline = Pipeline::new(PipelineParams::default(), Arc::new(ColorStatsModel::new()))
        .expect("pipeline");

    match pipeline.stylize_on("https://example.com/c.jpg", "https://example.com/s.jpg", Backend::Accelerated) {
        Ok(_) => {}
        Err(Error::BackendUnavailable { backend }) => eprintln!("{backend} backend missing"),
        Err(Error::Fetch(e)) => eprintln!("Fetch error: {e}"),
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`] - the session-scoped `Pipeline` and batch helpers.
- [`core`] - the `Image` tensor, parameters, and preprocessing primitives.
- [`io`] - fetching, the bounded image cache, and JPEG/PNG writers.
- [`model`] - the `StyleModel` boundary and the `StylizationInvoker`.
- [`benchmark`] - backend timing and speedup reports.
- [`error`] - crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod benchmark;
pub mod core;
pub mod error;
pub mod io;
pub mod model;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::image::Image;
pub use crate::core::params::PipelineParams;
pub use error::{Error, Result};
pub use types::{Backend, OutputFormat, ResizeFilter};

// Preprocessing
pub use crate::core::processing::{
    CropWindow, calculate_resize_dimensions, center_crop_window, crop_center, resize, smooth,
};

// Fetching and caching
pub use io::{ByteSource, CacheStats, FetchError, HttpSource, ImageCache, ImageFetcher, ImageSpec};
pub use io::writers::save_image;

// Model boundary and benchmarking
pub use benchmark::{BenchmarkComparison, BenchmarkHarness, BenchmarkResult, speedup};
pub use model::{ColorStatsModel, StyleModel, StylizationInvoker};

// High-level API re-exports
pub use api::{BatchReport, Pipeline};
