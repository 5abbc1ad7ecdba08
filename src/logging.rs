use anyhow::Result;
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use log::{debug, info, LevelFilter};
use std::io;

pub fn setup_logging(verbosity: u8, log_file: Option<&str>) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    let mut base_config = fern::Dispatch::new().level(level_for(verbosity));

    // Separate file config so we can include year, month and day in file logs
    let file_config = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            Local::now().format("[%Y-%m-%d][%H:%M:%S%.3f]"),
            record.target(),
            record.level(),
            message
        ))
    });

    let stdout_config = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                Local::now().format("[%H:%M:%S%.3f]"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .chain(io::stdout());

    base_config = base_config.chain(stdout_config);

    if let Some(log_file) = log_file {
        base_config = base_config.chain(file_config.chain(fern::log_file(log_file)?));
    }

    base_config.apply()?;

    debug!("Logging initialized at {}", level_for(verbosity));

    Ok(())
}

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn log_app_start(version: &str) {
    info!("Starting depth fusion v{}", version);
}

pub fn log_app_config(config: &crate::config::Config) {
    info!("Application configured with:");
    info!("  Fusion:");
    info!("    Confidence threshold: {}", config.fusion.confidence_threshold);
    info!("    History capacity: {}", config.fusion.history_capacity);
    info!("    Max frame age: {}", config.fusion.max_frame_age);
    info!("  Intrinsics:");
    info!(
        "    Focal length: ({}, {})",
        config.intrinsics.fx, config.intrinsics.fy
    );
    info!(
        "    Principal point: ({}, {})",
        config.intrinsics.cx, config.intrinsics.cy
    );
    info!("    Reference: {}", config.intrinsics.reference());
    info!("  Input:");
    match (&config.input.manifest, config.input.synthetic_frames) {
        (Some(manifest), _) => info!("    Manifest: {}", manifest.display()),
        (None, Some(count)) => info!("    Synthetic frames: {}", count),
        (None, None) => info!("    (none)"),
    }
    info!("    Resolution: {}", config.input.resolution());
    info!("    Byte order: {:?}", config.input.byte_order);
    info!("  Output:");
    info!("    Save folder: {}", config.output.save_folder);
    info!("    Stride: {}", config.output.stride);
    info!(
        "    Skip duplicate timestamps: {}",
        config.output.skip_duplicate_timestamps
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for(0), LevelFilter::Info);
        assert_eq!(level_for(1), LevelFilter::Debug);
        assert_eq!(level_for(2), LevelFilter::Trace);
        assert_eq!(level_for(9), LevelFilter::Trace);
    }
}
