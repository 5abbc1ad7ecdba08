use super::types::{ByteOrder, DepthRaster, MetricDepthFrame, RawDepthSample};
use crate::error::{FusionError, Result};
use log::trace;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

const MILLIMETERS_PER_METER: f32 = 1000.0;

/// Turns device-unit depth plus confidence into meters, gating out
/// low-confidence samples as `NaN`.
#[derive(Debug, Clone)]
pub struct MetricDepthConverter {
    threshold: f32,
    // accepted[c] is true when confidence byte c passes the threshold
    accepted: [bool; 256],
}

impl Default for MetricDepthConverter {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl MetricDepthConverter {
    pub fn new(threshold: f32) -> Self {
        let mut accepted = [false; 256];
        for (byte, slot) in accepted.iter_mut().enumerate() {
            *slot = byte as f32 / 255.0 >= threshold;
        }
        Self {
            threshold,
            accepted,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Smallest confidence byte that is kept, if any.
    pub fn min_accepted_confidence(&self) -> Option<u8> {
        self.accepted.iter().position(|&ok| ok).map(|b| b as u8)
    }

    pub fn convert(&self, sample: &RawDepthSample) -> Result<MetricDepthFrame> {
        let expected = sample.resolution().pixel_count();

        if sample.depth.len() != expected {
            return Err(FusionError::input_contract(format!(
                "depth raster has {} samples, expected {} for {}",
                sample.depth.len(),
                expected,
                sample.resolution()
            )));
        }
        if sample.confidence.len() != expected {
            return Err(FusionError::input_contract(format!(
                "confidence raster has {} samples, expected {} for {}",
                sample.confidence.len(),
                expected,
                sample.resolution()
            )));
        }

        let meters: Vec<f32> = sample
            .depth
            .iter()
            .zip(&sample.confidence)
            .map(|(&raw, &confidence)| {
                if self.accepted[confidence as usize] {
                    raw as f32 / MILLIMETERS_PER_METER
                } else {
                    f32::NAN
                }
            })
            .collect();

        let data = DepthRaster::from_raw(sample.width, sample.height, meters).ok_or_else(|| {
            FusionError::input_contract(format!("cannot build {} raster", sample.resolution()))
        })?;

        trace!(
            "Converted depth frame at {} ({})",
            sample.timestamp,
            sample.resolution()
        );

        Ok(MetricDepthFrame::new(data, sample.timestamp))
    }
}

/// Decodes a raw 16-bit depth buffer delivered in `order` into host values,
/// going through a little-endian copy first.
pub fn decode_depth_bytes(bytes: &[u8], order: ByteOrder) -> Result<Vec<u16>> {
    if bytes.len() % 2 != 0 {
        return Err(FusionError::input_contract(format!(
            "depth buffer has odd length {}",
            bytes.len()
        )));
    }

    let little_endian = normalize_to_little_endian(bytes, order);
    Ok(little_endian
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

fn normalize_to_little_endian(bytes: &[u8], order: ByteOrder) -> Vec<u8> {
    let swap = match order {
        ByteOrder::Little => false,
        ByteOrder::Big => true,
        ByteOrder::Native => cfg!(target_endian = "big"),
    };

    if !swap {
        return bytes.to_vec();
    }
    bytes
        .chunks_exact(2)
        .flat_map(|pair| [pair[1], pair[0]])
        .collect()
}
