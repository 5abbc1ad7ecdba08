mod fusion;
mod loader;

pub use fusion::{FusionConfig, IntrinsicsConfig};
pub use loader::{Config, InputConfig, OutputConfig};
