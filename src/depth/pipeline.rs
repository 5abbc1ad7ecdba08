use super::buffer::TemporalDepthBuffer;
use super::converter::MetricDepthConverter;
use super::fusion::DepthFusionEngine;
use super::intrinsics::IntrinsicsRescaler;
use super::types::{FusedDepthFrame, RawDepthSample, Resolution, Timestamp};
use crate::config::{FusionConfig, IntrinsicsConfig};
use crate::error::{FusionError, Result};
use log::{debug, warn};
use std::sync::Arc;

/// Runs convert, prune, insert, fuse and rescale for each incoming frame.
///
/// Owns its history exclusively. Callers sharing a pipeline across threads
/// must serialize whole `process` calls themselves.
pub struct FrameProcessingPipeline {
    converter: MetricDepthConverter,
    buffer: TemporalDepthBuffer,
    engine: DepthFusionEngine,
    rescaler: IntrinsicsRescaler,
    last_timestamp: Option<Timestamp>,
}

impl FrameProcessingPipeline {
    pub fn new(fusion: &FusionConfig, intrinsics: &IntrinsicsConfig) -> Result<Self> {
        fusion.validate()?;
        let rescaler = intrinsics.rescaler()?;

        debug!(
            "Depth pipeline ready: threshold {}, capacity {}, max age {}",
            fusion.confidence_threshold, fusion.history_capacity, fusion.max_frame_age
        );

        Ok(Self {
            converter: MetricDepthConverter::new(fusion.confidence_threshold),
            buffer: TemporalDepthBuffer::new(fusion.history_capacity, fusion.max_frame_age),
            engine: DepthFusionEngine::new(),
            rescaler,
            last_timestamp: None,
        })
    }

    /// Processes one frame. On error the history is left as it was before
    /// the call.
    pub fn process(&mut self, sample: &RawDepthSample) -> Result<FusedDepthFrame> {
        let resolution = sample.resolution();

        if let Some(retained) = self.buffer.retained_resolution(sample.timestamp) {
            if retained != resolution {
                return Err(FusionError::input_contract(format!(
                    "frame at {} is {}, history holds {} frames",
                    sample.timestamp, resolution, retained
                )));
            }
        }

        let converted = self.converter.convert(sample)?;
        let intrinsics = self.rescaler.rescale(resolution);

        self.buffer.prune(sample.timestamp);
        self.buffer.insert(Arc::new(converted));
        self.last_timestamp = Some(sample.timestamp);

        let history = self.buffer.snapshot();
        let data = self.engine.fuse(&history, resolution)?;

        debug!(
            "Fused frame at {} ({}) from {} frame(s)",
            sample.timestamp,
            resolution,
            history.len()
        );

        Ok(FusedDepthFrame {
            data,
            width: resolution.width,
            height: resolution.height,
            timestamp: sample.timestamp,
            intrinsics,
            history_len: history.len(),
        })
    }

    /// Like [`FrameProcessingPipeline::process`], but returns `Ok(None)` for a
    /// frame carrying the same timestamp as the last processed one.
    pub fn process_if_new(&mut self, sample: &RawDepthSample) -> Result<Option<FusedDepthFrame>> {
        if self.last_timestamp == Some(sample.timestamp) {
            debug!(
                "Skipping depth frame with repeated timestamp {}",
                sample.timestamp
            );
            return Ok(None);
        }
        self.process(sample).map(Some)
    }

    /// Drops all history, e.g. before switching to another depth resolution.
    pub fn reset(&mut self) {
        if !self.buffer.is_empty() {
            warn!("Discarding {} frame(s) of depth history", self.buffer.len());
        }
        self.buffer.clear();
        self.last_timestamp = None;
    }

    pub fn history_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer(&self) -> &TemporalDepthBuffer {
        &self.buffer
    }

    pub fn reference_resolution(&self) -> Resolution {
        self.rescaler.reference()
    }
}
