use std::sync::Arc;

use ndarray::{Array4, ArrayView4};
use tracing::debug;

use crate::core::image::{Image, validate_tensor};
use crate::error::{Error, Result};
use crate::model::StyleModel;
use crate::types::Backend;

/// Stable `(content, style) -> stylized` entry point over an opaque model.
#[derive(Clone)]
pub struct StylizationInvoker {
    model: Arc<dyn StyleModel>,
}

impl StylizationInvoker {
    pub fn new(model: Arc<dyn StyleModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn is_available(&self, backend: Backend) -> bool {
        self.model.is_available(backend)
    }

    /// Fails with `BackendUnavailable` instead of downgrading to another backend.
    pub fn ensure_available(&self, backend: Backend) -> Result<()> {
        if self.model.is_available(backend) {
            Ok(())
        } else {
            Err(Error::BackendUnavailable { backend })
        }
    }

    pub fn stylize(&self, content: &Image, style: &Image, backend: Backend) -> Result<Image> {
        let out = self.stylize_tensors(content.view(), style.view(), backend)?;
        Image::from_array_clamped(out)
    }

    /// Validates both inputs and the backend before the model runs, then returns
    /// the first element of the model's output collection.
    pub fn stylize_tensors(
        &self,
        content: ArrayView4<'_, f32>,
        style: ArrayView4<'_, f32>,
        backend: Backend,
    ) -> Result<Array4<f32>> {
        validate_tensor(&content, "content")?;
        validate_tensor(&style, "style")?;
        self.ensure_available(backend)?;

        let (_, rows, cols, _) = content.dim();
        debug!(
            "Stylizing {}x{} content with {}x{} style on {} backend ({})",
            cols,
            rows,
            style.dim().2,
            style.dim().1,
            backend,
            self.model.name()
        );

        let output = self
            .model
            .stylize(content, style, backend)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Processing("model returned no outputs".to_string()))?;

        validate_tensor(&output.view(), "stylized output")?;
        let (_, out_rows, out_cols, _) = output.dim();
        if (out_rows, out_cols) != (rows, cols) {
            return Err(Error::shape(format!(
                "stylized output is {out_cols}x{out_rows}, content is {cols}x{rows}"
            )));
        }
        Ok(output)
    }
}
