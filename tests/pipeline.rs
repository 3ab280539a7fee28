use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use stylepipe::{
    Backend, ByteSource, ColorStatsModel, Error, FetchError, ImageFetcher, OutputFormat, Pipeline,
    PipelineParams, ResizeFilter, crop_center, resize,
};

/// Serves generated PNGs of fixed `(width, height)` per URL and counts requests.
struct FakeWeb {
    images: HashMap<String, (u32, u32)>,
    calls: Arc<AtomicUsize>,
}

impl FakeWeb {
    fn new(images: &[(&str, (u32, u32))]) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let web = Self {
            images: images
                .iter()
                .map(|(url, dims)| (url.to_string(), *dims))
                .collect(),
            calls: Arc::clone(&calls),
        };
        (web, calls)
    }
}

impl ByteSource for FakeWeb {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (width, height) = *self.images.get(url).ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })?;
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        Ok(buf)
    }
}

const CONTENT: &str = "https://images.example.com/content.png";
const STYLE: &str = "https://images.example.com/style.png";

fn params(cache_dir: &std::path::Path) -> PipelineParams {
    PipelineParams {
        content_size: (64, 64),
        style_size: (32, 32),
        cache_dir: cache_dir.to_path_buf(),
        timed_runs: 2,
        format: OutputFormat::Png,
        ..PipelineParams::default()
    }
}

fn pipeline(
    dir: &std::path::Path,
    model: ColorStatsModel,
) -> (Pipeline, Arc<AtomicUsize>) {
    let (web, calls) = FakeWeb::new(&[(CONTENT, (120, 80)), (STYLE, (50, 50))]);
    let params = params(dir);
    let fetcher = ImageFetcher::new(params.cache_dir.clone(), Box::new(web));
    let pipeline = Pipeline::with_fetcher(params, fetcher, Arc::new(model)).unwrap();
    (pipeline, calls)
}

#[test]
fn fetch_crop_resize_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://images.example.com/wide.png";
    let (web, _) = FakeWeb::new(&[(url, (500, 300))]);
    let fetcher = ImageFetcher::new(dir.path(), Box::new(web));

    let fetched = fetcher.fetch(url).unwrap();
    assert_eq!(fetched.as_array().dim(), (1, 300, 500, 3));

    let square = crop_center(&fetched).unwrap();
    assert_eq!(square.dims(), (300, 300));

    let resized = resize(&square, (256, 256), true, ResizeFilter::Bilinear).unwrap();
    assert_eq!(resized.as_array().dim(), (1, 256, 256, 3));
    assert!(resized.as_array().iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn stylize_writes_content_sized_output() {
    let dir = tempfile::tempdir().unwrap();
    let (mut pipeline, _) = pipeline(&dir.path().join("cache"), ColorStatsModel::new());
    let output = dir.path().join("out.png");

    pipeline.stylize_to_path(CONTENT, STYLE, &output).unwrap();

    let written = image::open(&output).unwrap();
    assert_eq!((written.width(), written.height()), (64, 64));
}

#[test]
fn repeated_requests_fetch_each_url_once() {
    let dir = tempfile::tempdir().unwrap();
    let (mut pipeline, calls) = pipeline(dir.path(), ColorStatsModel::new());

    let first = pipeline.stylize(CONTENT, STYLE).unwrap();
    let second = pipeline.stylize(CONTENT, STYLE).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.dims(), (64, 64));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let stats = pipeline.cache_stats();
    assert_eq!((stats.misses, stats.hits), (2, 2));
}

#[test]
fn style_images_are_smoothed_only_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let (mut smoothed, _) = pipeline(dir.path(), ColorStatsModel::new());
    let a = smoothed.load_style(STYLE).unwrap();

    let dir2 = tempfile::tempdir().unwrap();
    let (web, _) = FakeWeb::new(&[(STYLE, (50, 50))]);
    let raw_params = PipelineParams {
        smooth_style: false,
        ..params(dir2.path())
    };
    let fetcher = ImageFetcher::new(dir2.path(), Box::new(web));
    let mut raw = Pipeline::with_fetcher(raw_params, fetcher, Arc::new(ColorStatsModel::new())).unwrap();
    let b = raw.load_style(STYLE).unwrap();

    assert_eq!(a.dims(), (32, 32));
    assert_eq!(b.dims(), (32, 32));
    assert_ne!(a, b);
}

#[test]
fn smoothed_style_is_reused_across_calls() {
    let dir = tempfile::tempdir().unwrap();
    let (mut pipeline, calls) = pipeline(dir.path(), ColorStatsModel::new());

    let first = pipeline.load_style(STYLE).unwrap();
    let second = pipeline.load_style(STYLE).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(pipeline.cache_stats().hits, 1);
}

#[test]
fn grid_counts_failures_when_keeping_going() {
    let dir = tempfile::tempdir().unwrap();
    let (mut pipeline, _) = pipeline(&dir.path().join("cache"), ColorStatsModel::new());
    let out_dir = dir.path().join("out");

    let contents = vec![CONTENT.to_string()];
    let styles = vec![STYLE.to_string(), "https://images.example.com/missing.png".to_string()];
    let report = pipeline
        .stylize_grid_to_dir(&contents, &styles, &out_dir, true)
        .unwrap();
    assert_eq!((report.processed, report.errors), (1, 1));
    assert!(out_dir.join("stylized_0_0.png").is_file());
    assert!(!out_dir.join("stylized_0_1.png").exists());

    let err = pipeline
        .stylize_grid_to_dir(&contents, &styles, &out_dir, false)
        .unwrap_err();
    assert!(matches!(err, Error::Fetch(FetchError::Status { status: 404, .. })));
}

#[test]
fn unavailable_accelerated_backend_fails_before_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let (mut pipeline, calls) = pipeline(dir.path(), ColorStatsModel::new().with_accelerated(false));

    assert!(matches!(
        pipeline.benchmark(CONTENT, STYLE),
        Err(Error::BackendUnavailable {
            backend: Backend::Accelerated
        })
    ));
    assert!(matches!(
        pipeline.stylize_on(CONTENT, STYLE, Backend::Accelerated),
        Err(Error::BackendUnavailable { .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn default_backend_benchmark_runs_on_one_backend() {
    let dir = tempfile::tempdir().unwrap();
    let (mut pipeline, _) = pipeline(dir.path(), ColorStatsModel::new());
    let content = pipeline.load_content(CONTENT).unwrap();
    let style = pipeline.load_style(STYLE).unwrap();

    let result = stylepipe::BenchmarkHarness::new(pipeline.invoker())
        .run(&content, &style, Backend::Default, 1, 3)
        .unwrap();
    assert_eq!(result.runs, 3);
    assert_eq!(result.backend, Backend::Default);
}
