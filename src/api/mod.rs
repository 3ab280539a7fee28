//! High-level, ergonomic library API: a session-scoped [`Pipeline`] that owns
//! the image cache and the model invoker, plus batch helpers for stylizing
//! every content/style pair into a directory. Prefer these entrypoints over the
//! low-level `core`, `io` and `model` modules when integrating stylepipe.
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use serde::Serialize;
use tracing::{info, warn};

use crate::benchmark::{BenchmarkComparison, BenchmarkHarness};
use crate::core::image::Image;
use crate::core::params::PipelineParams;
use crate::core::processing::smooth;
use crate::error::{Error, Result};
use crate::io::writers::save_image;
use crate::io::{CacheStats, ImageCache, ImageFetcher, ImageSpec};
use crate::model::{StyleModel, StylizationInvoker};
use crate::types::Backend;

/// Counts from a batch run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub errors: usize,
}

/// One stylization session. The cache lives exactly as long as the pipeline.
pub struct Pipeline {
    params: PipelineParams,
    cache: ImageCache,
    /// Pooled style images, keyed by spec and tied to the cached source they came from
    smoothed: LruCache<ImageSpec, (Arc<Image>, Arc<Image>)>,
    invoker: StylizationInvoker,
}

impl Pipeline {
    /// Pipeline fetching over HTTP into `params.cache_dir`.
    pub fn new(params: PipelineParams, model: Arc<dyn StyleModel>) -> Result<Self> {
        let fetcher = ImageFetcher::http(
            params.cache_dir.clone(),
            Duration::from_secs(params.http_timeout_secs),
        )?;
        Self::with_fetcher(params, fetcher, model)
    }

    pub fn with_fetcher(
        params: PipelineParams,
        fetcher: ImageFetcher,
        model: Arc<dyn StyleModel>,
    ) -> Result<Self> {
        let cache = ImageCache::new(fetcher, params.cache_capacity)?.with_filter(params.filter);
        let capacity = NonZeroUsize::new(params.cache_capacity).ok_or(Error::ZeroSize {
            size: params.cache_capacity,
        })?;
        Ok(Self {
            params,
            cache,
            smoothed: LruCache::new(capacity),
            invoker: StylizationInvoker::new(model),
        })
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    pub fn invoker(&self) -> &StylizationInvoker {
        &self.invoker
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn content_spec(&self, url: &str) -> ImageSpec {
        ImageSpec::new(url, self.params.content_size, self.params.preserve_aspect_ratio)
    }

    pub fn style_spec(&self, url: &str) -> ImageSpec {
        ImageSpec::new(url, self.params.style_size, self.params.preserve_aspect_ratio)
    }

    pub fn load_content(&mut self, url: &str) -> Result<Arc<Image>> {
        let spec = self.content_spec(url);
        self.cache.get(&spec)
    }

    /// Style images are average-pooled after loading when smoothing is enabled.
    /// The pooled result is reused while the cache keeps returning the same source.
    pub fn load_style(&mut self, url: &str) -> Result<Arc<Image>> {
        let spec = self.style_spec(url);
        let image = self.cache.get(&spec)?;
        if !self.params.smooth_style {
            return Ok(image);
        }
        if let Some((source, pooled)) = self.smoothed.get(&spec) {
            if Arc::ptr_eq(source, &image) {
                return Ok(Arc::clone(pooled));
            }
        }
        let pooled = Arc::new(smooth(
            &image,
            self.params.smooth_kernel,
            self.params.smooth_stride,
        )?);
        self.smoothed.put(spec, (image, Arc::clone(&pooled)));
        Ok(pooled)
    }

    pub fn stylize(&mut self, content_url: &str, style_url: &str) -> Result<Image> {
        self.stylize_on(content_url, style_url, self.params.backend)
    }

    pub fn stylize_on(&mut self, content_url: &str, style_url: &str, backend: Backend) -> Result<Image> {
        // Fail on a missing backend before any download happens
        self.invoker.ensure_available(backend)?;
        let content = self.load_content(content_url)?;
        let style = self.load_style(style_url)?;
        self.invoker.stylize(&content, &style, backend)
    }

    pub fn stylize_to_path(&mut self, content_url: &str, style_url: &str, output: &Path) -> Result<()> {
        let stylized = self.stylize(content_url, style_url)?;
        save_image(output, &stylized, self.params.format, self.params.jpeg_quality)
    }

    /// Stylize every content/style pair into `output_dir` as
    /// `stylized_<content>_<style>.<ext>` (indices are zero-based).
    /// If `continue_on_error` is true, errors are counted and processing
    /// continues; otherwise the first error is returned.
    pub fn stylize_grid_to_dir(
        &mut self,
        content_urls: &[String],
        style_urls: &[String],
        output_dir: &Path,
        continue_on_error: bool,
    ) -> Result<BatchReport> {
        std::fs::create_dir_all(output_dir)?;
        let mut report = BatchReport::default();

        for (ci, content_url) in content_urls.iter().enumerate() {
            for (si, style_url) in style_urls.iter().enumerate() {
                let output = grid_output_path(output_dir, ci, si, self.params.format.extension());
                info!("Stylizing {} with {} -> {:?}", content_url, style_url, output);
                match self.stylize_to_path(content_url, style_url, &output) {
                    Ok(()) => report.processed += 1,
                    Err(e) => {
                        report.errors += 1;
                        if !continue_on_error {
                            return Err(e);
                        }
                        warn!("Error stylizing {} with {}: {}", content_url, style_url, e);
                    }
                }
            }
        }

        Ok(report)
    }

    /// Benchmark `Backend::Default` against `Backend::Accelerated` on one pair.
    pub fn benchmark(&mut self, content_url: &str, style_url: &str) -> Result<BenchmarkComparison> {
        self.invoker.ensure_available(Backend::Accelerated)?;
        let content = self.load_content(content_url)?;
        let style = self.load_style(style_url)?;
        BenchmarkHarness::new(&self.invoker).compare(
            &content,
            &style,
            Backend::Default,
            Backend::Accelerated,
            self.params.warmup_runs,
            self.params.timed_runs,
        )
    }
}

pub fn grid_output_path(output_dir: &Path, content_index: usize, style_index: usize, ext: &str) -> PathBuf {
    output_dir.join(format!("stylized_{}_{}.{}", content_index, style_index, ext))
}
