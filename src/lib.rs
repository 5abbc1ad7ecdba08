//! Multi-frame depth fusion for depth sensor pipelines.
//!
//! This library provides functionality for:
//! - Converting raw millimeter depth plus confidence into metric depth
//! - Keeping a short, age-bounded history of converted frames
//! - Fusing that history into one denoised, recency-weighted depth raster
//! - Rescaling camera intrinsics to the depth raster's resolution
//! - Replaying recorded frames and exporting fused results

pub mod cli;
pub mod config;
pub mod depth;
pub mod error;
pub mod export;
pub mod logging;
pub mod source;

pub use config::{Config, FusionConfig, IntrinsicsConfig};
pub use depth::{
    DepthFusionEngine, FrameProcessingPipeline, FusedDepthFrame, IntrinsicsRescaler,
    MetricDepthConverter, MetricDepthFrame, RawDepthSample, TemporalDepthBuffer,
};
pub use error::{FusionError, Result};
pub use source::{DepthSource, ManifestSource, SyntheticSource};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
///
/// Sets up logging and announces the library version. Call once, before any
/// other functionality, from a binary that wants this crate's log format.
///
/// # Arguments
///
/// * `debug` - Whether to enable debug logging
/// * `log_file` - Optional path to a log file. If None, logs will only be output to stdout.
pub fn initialize(debug: bool, log_file: Option<&str>) -> anyhow::Result<()> {
    logging::setup_logging(debug as u8, log_file)?;
    logging::log_app_start(VERSION);
    Ok(())
}

/// A convenience function to build a pipeline from a loaded configuration
pub fn new_pipeline(config: &Config) -> Result<FrameProcessingPipeline> {
    FrameProcessingPipeline::new(&config.fusion, &config.intrinsics)
}
