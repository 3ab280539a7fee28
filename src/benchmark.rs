//! Wall-clock benchmarking of the stylization call on one or two backends.
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};
use tracing::info;

use crate::core::image::Image;
use crate::error::{Error, Result};
use crate::model::StylizationInvoker;
use crate::types::Backend;

fn serialize_secs<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkResult {
    pub backend: Backend,
    /// Timed repetitions (warm-up excluded)
    pub runs: usize,
    #[serde(rename = "total_secs", serialize_with = "serialize_secs")]
    pub total: Duration,
}

impl BenchmarkResult {
    pub fn mean(&self) -> Duration {
        match u32::try_from(self.runs.max(1)) {
            Ok(runs) => self.total / runs,
            Err(_) => self.total.div_f64(self.runs as f64),
        }
    }
}

/// `time(baseline) / time(accelerated)`, compared per run.
pub fn speedup(baseline: &BenchmarkResult, accelerated: &BenchmarkResult) -> f64 {
    let base = baseline.mean().as_secs_f64();
    let fast = accelerated.mean().as_secs_f64();
    if fast > 0.0 {
        base / fast
    } else if base > 0.0 {
        f64::INFINITY
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkComparison {
    pub model: String,
    pub baseline: BenchmarkResult,
    pub accelerated: BenchmarkResult,
    pub speedup: f64,
    pub timestamp: String,
}

pub struct BenchmarkHarness<'a> {
    invoker: &'a StylizationInvoker,
}

impl<'a> BenchmarkHarness<'a> {
    pub fn new(invoker: &'a StylizationInvoker) -> Self {
        Self { invoker }
    }

    /// Run `warmup_runs` discarded calls, then time `timed_runs` consecutive calls.
    /// Any failure aborts the benchmark.
    pub fn run(
        &self,
        content: &Image,
        style: &Image,
        backend: Backend,
        warmup_runs: usize,
        timed_runs: usize,
    ) -> Result<BenchmarkResult> {
        if timed_runs == 0 {
            return Err(Error::ZeroSize { size: timed_runs });
        }
        self.invoker.ensure_available(backend)?;

        for _ in 0..warmup_runs {
            self.invoker.stylize(content, style, backend)?;
        }

        let mut total = Duration::ZERO;
        for _ in 0..timed_runs {
            let start = Instant::now();
            let out = self.invoker.stylize(content, style, backend)?;
            total += start.elapsed();
            drop(out);
        }

        let result = BenchmarkResult {
            backend,
            runs: timed_runs,
            total,
        };
        info!(
            "Backend {}: {} runs in {:.3}s ({:.3} ms/run)",
            backend,
            timed_runs,
            total.as_secs_f64(),
            result.mean().as_secs_f64() * 1000.0
        );
        Ok(result)
    }

    /// Benchmark both backends on identical inputs.
    pub fn compare(
        &self,
        content: &Image,
        style: &Image,
        baseline: Backend,
        accelerated: Backend,
        warmup_runs: usize,
        timed_runs: usize,
    ) -> Result<BenchmarkComparison> {
        // Both backends are checked before either runs
        self.invoker.ensure_available(baseline)?;
        self.invoker.ensure_available(accelerated)?;

        let base = self.run(content, style, baseline, warmup_runs, timed_runs)?;
        let fast = self.run(content, style, accelerated, warmup_runs, timed_runs)?;
        let ratio = speedup(&base, &fast);
        info!("Speedup {} over {}: {:.2}x", accelerated, baseline, ratio);

        Ok(BenchmarkComparison {
            model: self.invoker.model_name().to_string(),
            baseline: base,
            accelerated: fast,
            speedup: ratio,
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StyleModel;
    use ndarray::{Array4, ArrayView4};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Flaky {
        calls: Arc<AtomicUsize>,
        fail_on: Option<usize>,
        accelerated: bool,
    }

    impl StyleModel for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn is_available(&self, backend: Backend) -> bool {
            backend == Backend::Default || self.accelerated
        }

        fn stylize(
            &self,
            content: ArrayView4<'_, f32>,
            _style: ArrayView4<'_, f32>,
            _backend: Backend,
        ) -> Result<Vec<Array4<f32>>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if Some(n) == self.fail_on {
                return Err(Error::Processing("device lost".to_string()));
            }
            Ok(vec![content.to_owned()])
        }
    }

    fn setup(fail_on: Option<usize>, accelerated: bool) -> (StylizationInvoker, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let model = Flaky {
            calls: Arc::clone(&calls),
            fail_on,
            accelerated,
        };
        (StylizationInvoker::new(Arc::new(model)), calls)
    }

    fn img() -> Image {
        Image::from_fn(4, 4, |_, _, _| 0.5).unwrap()
    }

    #[test]
    fn warmup_is_excluded_from_run_count() {
        let (inv, calls) = setup(None, true);
        let result = BenchmarkHarness::new(&inv)
            .run(&img(), &img(), Backend::Default, 1, 5)
            .unwrap();
        assert_eq!(result.runs, 5);
        assert_eq!(result.backend, Backend::Default);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn failure_during_timing_aborts() {
        let (inv, calls) = setup(Some(3), true);
        let err = BenchmarkHarness::new(&inv)
            .run(&img(), &img(), Backend::Default, 1, 10)
            .unwrap_err();
        assert!(matches!(err, Error::Processing(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn unavailable_backend_runs_nothing() {
        let (inv, calls) = setup(None, false);
        let harness = BenchmarkHarness::new(&inv);
        assert!(matches!(
            harness.compare(&img(), &img(), Backend::Default, Backend::Accelerated, 1, 3),
            Err(Error::BackendUnavailable { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn compare_reports_both_backends() {
        let (inv, calls) = setup(None, true);
        let cmp = BenchmarkHarness::new(&inv)
            .compare(&img(), &img(), Backend::Default, Backend::Accelerated, 2, 3)
            .unwrap();
        assert_eq!(cmp.baseline.backend, Backend::Default);
        assert_eq!(cmp.accelerated.backend, Backend::Accelerated);
        assert!(cmp.speedup > 0.0);
        assert_eq!(calls.load(Ordering::SeqCst), 10);

        let json = serde_json::to_value(&cmp).unwrap();
        assert_eq!(json["baseline"]["backend"], "default");
        assert!(json["accelerated"]["total_secs"].is_f64());
    }

    #[test]
    fn speedup_is_ratio_of_mean_times() {
        let base = BenchmarkResult {
            backend: Backend::Default,
            runs: 4,
            total: Duration::from_millis(400),
        };
        let fast = BenchmarkResult {
            backend: Backend::Accelerated,
            runs: 4,
            total: Duration::from_millis(100),
        };
        assert!((speedup(&base, &fast) - 4.0).abs() < 1e-9);
        assert_eq!(base.mean(), Duration::from_millis(100));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn mean_handles_run_counts_beyond_u32() {
        let result = BenchmarkResult {
            backend: Backend::Default,
            runs: 1 << 32,
            total: Duration::from_secs(1 << 32),
        };
        assert_eq!(result.mean(), Duration::from_secs(1));
    }

    #[test]
    fn zero_timed_runs_is_rejected() {
        let (inv, _) = setup(None, true);
        assert!(matches!(
            BenchmarkHarness::new(&inv).run(&img(), &img(), Backend::Default, 0, 0),
            Err(Error::ZeroSize { size: 0 })
        ));
    }
}
