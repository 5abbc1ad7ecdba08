use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::fusion::{FusionConfig, IntrinsicsConfig};
use crate::cli::CliArgs;
use crate::depth::{ByteOrder, Resolution};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fusion: FusionConfig,
    pub intrinsics: IntrinsicsConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub manifest: Option<PathBuf>,
    pub synthetic_frames: Option<usize>,
    pub width: u32,
    pub height: u32,
    pub byte_order: ByteOrder,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            manifest: None,
            synthetic_frames: None,
            width: 160,
            height: 120,
            byte_order: ByteOrder::Little,
        }
    }
}

impl InputConfig {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub save_folder: String,
    pub stride: usize,
    pub skip_duplicate_timestamps: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_folder: "output".to_string(),
            stride: 1,
            skip_duplicate_timestamps: true,
        }
    }
}

impl Config {
    pub fn load(cli_args: &CliArgs) -> Result<Self> {
        let mut config = match cli_args.config.as_deref() {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => {
                warn!(
                    "No configuration file at {}, using defaults",
                    DEFAULT_CONFIG_PATH
                );
                Config::default()
            }
        };

        // Override config with CLI arguments
        config.override_with_cli_args(cli_args);

        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from {}", path.display());

        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        Ok(toml::from_str(config_str)?)
    }

    fn override_with_cli_args(&mut self, args: &CliArgs) {
        if let Some(threshold) = args.confidence_threshold {
            self.fusion.confidence_threshold = threshold;
        }
        if let Some(capacity) = args.history_capacity {
            self.fusion.history_capacity = capacity;
        }
        if let Some(max_age) = args.max_frame_age {
            self.fusion.max_frame_age = max_age;
        }

        // A source given on the command line replaces whichever one the file names
        if let Some(manifest) = &args.manifest {
            self.input.manifest = Some(manifest.clone());
            self.input.synthetic_frames = None;
        }
        if let Some(count) = args.synthetic {
            self.input.synthetic_frames = Some(count);
            self.input.manifest = None;
        }
        if let Some(width) = args.width {
            self.input.width = width;
        }
        if let Some(height) = args.height {
            self.input.height = height;
        }

        if let Some(save_folder) = &args.save_folder {
            self.output.save_folder = save_folder.clone();
        }
        if let Some(stride) = args.stride {
            self.output.stride = stride;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.fusion
            .validate()
            .context("Invalid fusion configuration")?;
        self.intrinsics
            .validate()
            .context("Invalid intrinsics configuration")?;

        if self.input.width == 0 || self.input.height == 0 {
            return Err(anyhow::anyhow!("Input width and height must be greater than 0"));
        }
        match (&self.input.manifest, self.input.synthetic_frames) {
            (Some(_), Some(_)) => {
                return Err(anyhow::anyhow!(
                    "Choose either a manifest or synthetic frames, not both"
                ))
            }
            (None, None) => {
                return Err(anyhow::anyhow!(
                    "No input configured: set input.manifest or input.synthetic_frames"
                ))
            }
            _ => {}
        }

        if self.output.stride == 0 {
            return Err(anyhow::anyhow!("Output stride must be greater than 0"));
        }
        if self.output.save_folder.is_empty() {
            return Err(anyhow::anyhow!("Save folder cannot be empty"));
        }

        Ok(())
    }

    /// Creates the save folder if needed.
    pub fn prepare_output(&self) -> Result<PathBuf> {
        let save_folder = PathBuf::from(&self.output.save_folder);
        if !save_folder.exists() {
            warn!("Save folder does not exist. Creating it.");
            fs::create_dir_all(&save_folder).with_context(|| {
                format!("Failed to create save folder: {}", self.output.save_folder)
            })?;
        }
        Ok(save_folder)
    }
}
