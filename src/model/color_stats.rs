use ndarray::{Array4, ArrayView4, Axis, Zip};
use tracing::debug;

use crate::core::image::CHANNELS;
use crate::error::{Error, Result};
use crate::model::StyleModel;
use crate::types::Backend;

const STD_EPS: f32 = 1e-6;

/// Built-in model transferring per-channel mean and standard deviation from
/// the style image onto the content image.
///
/// Stands in for a pre-trained network so the pipeline runs without an
/// external artifact. The accelerated backend runs the same math data-parallel
/// on the rayon pool.
#[derive(Debug, Clone)]
pub struct ColorStatsModel {
    strength: f32,
    accelerated: bool,
}

#[derive(Debug, Clone, Copy)]
struct ChannelStats {
    mean: f32,
    std: f32,
}

fn channel_stats(tensor: &ArrayView4<'_, f32>) -> Result<[ChannelStats; CHANNELS]> {
    let mut stats = [ChannelStats { mean: 0.0, std: 0.0 }; CHANNELS];
    for (c, slot) in stats.iter_mut().enumerate() {
        let lane = tensor.index_axis(Axis(3), c);
        let mean = lane
            .mean()
            .ok_or_else(|| Error::shape("cannot take statistics of an empty tensor"))?;
        *slot = ChannelStats {
            mean,
            std: lane.std(0.0),
        };
    }
    Ok(stats)
}

impl Default for ColorStatsModel {
    fn default() -> Self {
        Self {
            strength: 1.0,
            accelerated: true,
        }
    }
}

impl ColorStatsModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blend factor between the content (0.0) and the full transfer (1.0).
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        self
    }

    /// Allow or forbid the accelerated backend regardless of the thread pool.
    pub fn with_accelerated(mut self, enabled: bool) -> Self {
        self.accelerated = enabled;
        self
    }
}

impl StyleModel for ColorStatsModel {
    fn name(&self) -> &str {
        "color-stats"
    }

    fn is_available(&self, backend: Backend) -> bool {
        match backend {
            Backend::Default => true,
            Backend::Accelerated => self.accelerated && rayon::current_num_threads() > 1,
        }
    }

    fn stylize(
        &self,
        content: ArrayView4<'_, f32>,
        style: ArrayView4<'_, f32>,
        backend: Backend,
    ) -> Result<Vec<Array4<f32>>> {
        let content_stats = channel_stats(&content)?;
        let style_stats = channel_stats(&style)?;
        let strength = self.strength;

        let mut out = Array4::<f32>::zeros(content.raw_dim());
        for c in 0..CHANNELS {
            let src = content_stats[c];
            let dst_stats = style_stats[c];
            let scale = if src.std > STD_EPS {
                dst_stats.std / src.std
            } else {
                1.0
            };
            debug!(
                "channel {}: mean {:.4}->{:.4}, scale {:.4}",
                c, src.mean, dst_stats.mean, scale
            );
            let transfer = move |v: f32| {
                let styled = (v - src.mean) * scale + dst_stats.mean;
                (v + strength * (styled - v)).clamp(0.0, 1.0)
            };

            let zip = Zip::from(out.index_axis_mut(Axis(3), c)).and(content.index_axis(Axis(3), c));
            match backend {
                Backend::Default => zip.for_each(|o, &v| *o = transfer(v)),
                Backend::Accelerated => zip.par_for_each(|o, &v| *o = transfer(v)),
            }
        }
        Ok(vec![out])
    }
}
