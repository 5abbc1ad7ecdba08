use depth_fusion::{
    cli::CliArgs,
    config::Config,
    export::{fused_frame_writer, WriterSettings},
    logging,
    source::{DepthSource, ManifestSource, SyntheticSource},
    FrameProcessingPipeline,
};

use anyhow::{Context, Result};
use log::{error, info, warn};
use std::thread;

const SYNTHETIC_SEED: u64 = 0x5eed;
const WRITER_QUEUE: usize = 8;

fn main() -> Result<()> {
    // Parse command-line arguments
    let cli_args = CliArgs::parse_args();

    // Setup logging
    logging::setup_logging(cli_args.debug, cli_args.log_file.as_deref())?;
    logging::log_app_start(env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load(&cli_args)?;
    logging::log_app_config(&config);

    let mut pipeline = FrameProcessingPipeline::new(&config.fusion, &config.intrinsics)
        .context("Failed to build depth pipeline")?;
    let mut source = open_source(&config)?;

    // Writing happens off the processing thread
    let save_folder = config.prepare_output()?;
    let (tx, rx) = crossbeam_channel::bounded(WRITER_QUEUE);
    let settings = WriterSettings {
        save_folder,
        reference: pipeline.reference_resolution(),
        stride: config.output.stride,
    };
    let writer = thread::spawn(move || fused_frame_writer(rx, settings));

    info!("Entering processing loop");
    let mut processed = 0usize;
    let mut rejected = 0usize;

    loop {
        let sample = match source.next_sample() {
            Ok(Some(sample)) => sample,
            Ok(None) => break,
            Err(e) if e.is_frame_local() => {
                warn!("Skipping unreadable frame: {}", e);
                rejected += 1;
                continue;
            }
            Err(e) => return Err(e).context("Depth source failed"),
        };

        let result = if config.output.skip_duplicate_timestamps {
            pipeline.process_if_new(&sample)
        } else {
            pipeline.process(&sample).map(Some)
        };

        match result {
            Ok(Some(fused)) => {
                processed += 1;
                if tx.send(fused).is_err() {
                    error!("Fused frame writer stopped early");
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                // history is untouched, carry on with the next frame
                error!("Rejected frame at {}: {}", sample.timestamp, e);
                rejected += 1;
            }
        }
    }

    drop(tx);
    let written = match writer.join() {
        Ok(result) => result?,
        Err(_) => anyhow::bail!("Fused frame writer panicked"),
    };

    info!(
        "Processed {} frame(s), rejected {}, wrote {}",
        processed, rejected, written
    );

    Ok(())
}

fn open_source(config: &Config) -> Result<Box<dyn DepthSource>> {
    let resolution = config.input.resolution();

    if let Some(manifest) = &config.input.manifest {
        let source = ManifestSource::open(manifest, resolution, config.input.byte_order)
            .with_context(|| format!("Failed to open manifest {}", manifest.display()))?;
        return Ok(Box::new(source));
    }

    let frames = config.input.synthetic_frames.unwrap_or_default();
    info!("Generating {} synthetic frame(s) at {}", frames, resolution);
    Ok(Box::new(SyntheticSource::new(resolution, frames, SYNTHETIC_SEED)))
}
