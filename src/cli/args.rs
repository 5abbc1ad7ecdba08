use clap::Parser;
use std::path::PathBuf;

/// Replays recorded (or synthetic) depth frames through the fusion pipeline.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Configuration file; defaults to config/default.toml when present
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-d debug, -dd trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    #[arg(long)]
    pub log_file: Option<String>,

    /// CSV manifest of `timestamp,depth_path,confidence_path` rows
    #[arg(long, conflicts_with = "synthetic")]
    pub manifest: Option<PathBuf>,

    /// Generate this many synthetic frames instead of reading a manifest
    #[arg(long)]
    pub synthetic: Option<usize>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    #[arg(long)]
    pub confidence_threshold: Option<f32>,

    #[arg(long)]
    pub history_capacity: Option<usize>,

    #[arg(long)]
    pub max_frame_age: Option<i64>,

    #[arg(long)]
    pub save_folder: Option<String>,

    /// Keep every n-th depth sample in exported frames
    #[arg(long)]
    pub stride: Option<usize>,
}

impl CliArgs {
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let args = CliArgs::parse_from([
            "depth_fusion",
            "--synthetic",
            "12",
            "--history-capacity",
            "3",
            "--max-frame-age",
            "250",
            "-dd",
        ]);
        assert_eq!(args.synthetic, Some(12));
        assert_eq!(args.history_capacity, Some(3));
        assert_eq!(args.max_frame_age, Some(250));
        assert_eq!(args.debug, 2);
        assert!(args.manifest.is_none());
    }

    #[test]
    fn test_manifest_conflicts_with_synthetic() {
        let result = CliArgs::try_parse_from([
            "depth_fusion",
            "--manifest",
            "frames.csv",
            "--synthetic",
            "4",
        ]);
        assert!(result.is_err());
    }
}
