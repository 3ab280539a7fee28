use std::fs;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use stylepipe::{ColorStatsModel, Pipeline, PipelineParams};

use super::args::CliArgs;
use super::errors::AppError;

/// Parse `N` as `(N, N)` or `HxW` as `(H, W)`.
pub fn parse_size(size: &str) -> Result<(usize, usize), AppError> {
    let invalid = || AppError::InvalidSize {
        size: size.to_string(),
    };
    let parse = |s: &str| s.trim().parse::<usize>().map_err(|_| invalid());

    let (height, width) = match size.split_once(['x', 'X']) {
        Some((h, w)) => (parse(h)?, parse(w)?),
        None => {
            let n = parse(size)?;
            (n, n)
        }
    };
    if height == 0 || width == 0 {
        return Err(AppError::ZeroSize {
            size: height.min(width),
        });
    }
    Ok((height, width))
}

fn build_params(args: &CliArgs) -> Result<PipelineParams, AppError> {
    let mut params = match &args.config {
        Some(path) => {
            info!("Loading parameters from {:?}", path);
            PipelineParams::from_json_file(path)?
        }
        None => PipelineParams::default(),
    };

    if let Some(size) = &args.content_size {
        params.content_size = parse_size(size)?;
    }
    if let Some(size) = &args.style_size {
        params.style_size = parse_size(size)?;
    }
    if args.no_preserve_aspect {
        params.preserve_aspect_ratio = false;
    }
    if args.no_smooth {
        params.smooth_style = false;
    }
    if let Some(format) = args.format {
        params.format = format;
    }
    if let Some(filter) = args.filter {
        params.filter = filter;
    }
    if let Some(backend) = args.backend {
        params.backend = backend;
    }
    if let Some(runs) = args.runs {
        params.timed_runs = runs;
    }
    if let Some(warmup) = args.warmup {
        params.warmup_runs = warmup;
    }
    if let Some(dir) = &args.cache_dir {
        params.cache_dir = dir.clone();
    }
    if let Some(capacity) = args.cache_capacity {
        params.cache_capacity = capacity;
    }
    if let Some(quality) = args.jpeg_quality {
        params.jpeg_quality = quality;
    }
    Ok(params)
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let params = build_params(&args)?;
    let model = Arc::new(ColorStatsModel::new().with_strength(args.strength));
    let mut pipeline = Pipeline::new(params, model).map_err(AppError::from)?;

    if args.benchmark {
        // clap guarantees at least one of each
        let content = &args.content[0];
        let style = &args.style[0];
        let comparison = pipeline.benchmark(content, style).map_err(AppError::from)?;

        println!(
            "{}: default {:.3}s, accelerated {:.3}s over {} runs, speedup {:.2}x",
            comparison.model,
            comparison.baseline.total.as_secs_f64(),
            comparison.accelerated.total.as_secs_f64(),
            comparison.baseline.runs,
            comparison.speedup
        );
        if let Some(path) = &args.report {
            fs::write(path, serde_json::to_string_pretty(&comparison)?)?;
            info!("Benchmark report written to {:?}", path);
        }
        return Ok(());
    }

    info!(
        "Stylizing {} content x {} style images into {:?}",
        args.content.len(),
        args.style.len(),
        args.output_dir
    );
    let report = pipeline
        .stylize_grid_to_dir(&args.content, &args.style, &args.output_dir, args.keep_going)
        .map_err(AppError::from)?;

    let stats = pipeline.cache_stats();
    info!(
        "Image cache: {} hits, {} misses, {} evictions",
        stats.hits, stats.misses, stats.evictions
    );
    println!(
        "Processed: {}, Errors: {}, Output: {:?}",
        report.processed, report.errors, args.output_dir
    );

    Ok(())
}
