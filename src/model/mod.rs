//! Stylization model boundary. The pre-trained network is an injectable
//! capability behind [`StyleModel`]; [`StylizationInvoker`] validates tensors
//! and backend availability around the single inference call.
use ndarray::{Array4, ArrayView4};

use crate::error::Result;
use crate::types::Backend;

pub mod color_stats;
pub mod invoker;

pub use color_stats::ColorStatsModel;
pub use invoker::StylizationInvoker;

pub trait StyleModel: Send + Sync {
    fn name(&self) -> &str;

    /// Whether `backend` can run on this host. Queried before every call.
    fn is_available(&self, backend: Backend) -> bool;

    /// Inputs are already validated `[1, H, W, 3]` tensors in `[0, 1]`; their
    /// spatial sizes may differ. The first output must match the content size.
    fn stylize(
        &self,
        content: ArrayView4<'_, f32>,
        style: ArrayView4<'_, f32>,
        backend: Backend,
    ) -> Result<Vec<Array4<f32>>>;
}
