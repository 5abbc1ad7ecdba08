mod buffer;
mod converter;
mod fusion;
mod intrinsics;
mod pipeline;
mod types;

pub use buffer::{TemporalDepthBuffer, DEFAULT_HISTORY_CAPACITY, DEFAULT_MAX_FRAME_AGE};
pub use converter::{decode_depth_bytes, MetricDepthConverter, DEFAULT_CONFIDENCE_THRESHOLD};
pub use fusion::DepthFusionEngine;
pub use intrinsics::IntrinsicsRescaler;
pub use pipeline::FrameProcessingPipeline;
pub use types::{
    ArcDepthFrame, ByteOrder, CameraIntrinsics, DepthRaster, FusedDepthFrame, MetricDepthFrame,
    RawDepthSample, RescaledIntrinsics, Resolution, Timestamp,
};
