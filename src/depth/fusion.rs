//! Recency-weighted per-pixel fusion over the depth history.
//!
//! Frame `i` of `n` (oldest first) gets weight `(i + 1) / n`, so the oldest
//! frame counts `1/n` and the newest counts `1`. The ramp follows arrival
//! index only; timestamp gaps between frames do not change the weights.
//! `NaN` samples are skipped per pixel, and a pixel with no valid sample in
//! any frame stays `NaN`.

use super::types::{ArcDepthFrame, DepthRaster, MetricDepthFrame, Resolution};
use crate::error::{FusionError, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct DepthFusionEngine;

impl DepthFusionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn weights(n: usize) -> Vec<f32> {
        (0..n).map(|i| (i as f32 + 1.0) / n as f32).collect()
    }

    /// Fuses `frames` into one raster of size `resolution`. An empty history
    /// yields an all-`NaN` raster.
    pub fn fuse(&self, frames: &[ArcDepthFrame], resolution: Resolution) -> Result<DepthRaster> {
        let wanted = (resolution.width, resolution.height);
        if let Some(frame) = frames.iter().find(|f| f.data.dimensions() != wanted) {
            let (width, height) = frame.data.dimensions();
            return Err(FusionError::input_contract(format!(
                "history frame at {} holds a {} raster, fusion requested {}",
                frame.timestamp,
                Resolution::new(width, height),
                resolution
            )));
        }

        let weights = Self::weights(frames.len());
        let layers: Vec<&[f32]> = frames.iter().map(|f| f.data.as_raw().as_slice()).collect();

        let fused: Vec<f32> = (0..resolution.pixel_count())
            .map(|idx| {
                let mut weighted_sum = 0.0f32;
                let mut total_weight = 0.0f32;

                for (layer, &weight) in layers.iter().zip(&weights) {
                    let depth = layer[idx];
                    if depth.is_nan() {
                        continue;
                    }
                    weighted_sum += depth * weight;
                    total_weight += weight;
                }

                if total_weight > 0.0 {
                    weighted_sum / total_weight
                } else {
                    f32::NAN
                }
            })
            .collect();

        DepthRaster::from_raw(resolution.width, resolution.height, fused).ok_or_else(|| {
            FusionError::input_contract(format!("cannot build {} raster", resolution))
        })
    }

    /// Same as [`DepthFusionEngine::fuse`], keeping the newest frame's timestamp.
    pub fn fuse_frame(
        &self,
        frames: &[ArcDepthFrame],
        resolution: Resolution,
    ) -> Result<MetricDepthFrame> {
        let data = self.fuse(frames, resolution)?;
        let timestamp = frames.last().map(|f| f.timestamp).unwrap_or_default();
        Ok(MetricDepthFrame::new(data, timestamp))
    }
}
