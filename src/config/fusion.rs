use crate::depth::{
    CameraIntrinsics, IntrinsicsRescaler, Resolution, Timestamp, DEFAULT_CONFIDENCE_THRESHOLD,
    DEFAULT_HISTORY_CAPACITY, DEFAULT_MAX_FRAME_AGE,
};
use crate::error::{FusionError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub confidence_threshold: f32,
    pub history_capacity: usize,
    /// Same unit as frame timestamps.
    pub max_frame_age: Timestamp,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_frame_age: DEFAULT_MAX_FRAME_AGE,
        }
    }
}

impl FusionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn with_max_frame_age(mut self, max_age: Timestamp) -> Self {
        self.max_frame_age = max_age;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(FusionError::configuration(format!(
                "confidence threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.history_capacity == 0 {
            return Err(FusionError::configuration(
                "history capacity must be greater than 0",
            ));
        }
        if self.max_frame_age < 0 {
            return Err(FusionError::configuration(format!(
                "max frame age must not be negative, got {}",
                self.max_frame_age
            )));
        }
        Ok(())
    }
}

/// Nominal intrinsics and the resolution they were published at.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntrinsicsConfig {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
    pub reference_width: u32,
    pub reference_height: u32,
}

impl Default for IntrinsicsConfig {
    fn default() -> Self {
        Self {
            fx: 1440.0,
            fy: 1440.0,
            cx: 960.0,
            cy: 720.0,
            reference_width: 1920,
            reference_height: 1440,
        }
    }
}

impl IntrinsicsConfig {
    pub fn with_focal_length(mut self, fx: f32, fy: f32) -> Self {
        self.fx = fx;
        self.fy = fy;
        self
    }

    pub fn with_principal_point(mut self, cx: f32, cy: f32) -> Self {
        self.cx = cx;
        self.cy = cy;
        self
    }

    pub fn with_reference(mut self, width: u32, height: u32) -> Self {
        self.reference_width = width;
        self.reference_height = height;
        self
    }

    pub fn nominal(&self) -> CameraIntrinsics {
        CameraIntrinsics::new(self.fx, self.fy, self.cx, self.cy)
    }

    pub fn reference(&self) -> Resolution {
        Resolution::new(self.reference_width, self.reference_height)
    }

    /// Builds the rescaler these settings describe, rejecting a zero
    /// reference resolution or non-finite intrinsics.
    pub fn rescaler(&self) -> Result<IntrinsicsRescaler> {
        IntrinsicsRescaler::new(self.nominal(), self.reference())
    }

    pub fn validate(&self) -> Result<()> {
        self.rescaler().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FusionConfig::default();
        assert_eq!(config.confidence_threshold, 0.7);
        assert_eq!(config.history_capacity, 5);
        assert_eq!(config.max_frame_age, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = FusionConfig::new()
            .with_confidence_threshold(0.5)
            .with_history_capacity(8)
            .with_max_frame_age(250);

        assert_eq!(config.confidence_threshold, 0.5);
        assert_eq!(config.history_capacity, 8);
        assert_eq!(config.max_frame_age, 250);
    }

    #[test]
    fn test_validate_invalid_config() {
        let mut config = FusionConfig::default();
        config.history_capacity = 0;
        assert!(config.validate().is_err());

        config.history_capacity = 5;
        config.max_frame_age = -1;
        assert!(config.validate().is_err());

        config.max_frame_age = 0;
        assert!(config.validate().is_ok());

        config.confidence_threshold = 1.5;
        assert!(config.validate().is_err());

        config.confidence_threshold = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_intrinsics_validation() {
        let config = IntrinsicsConfig::default()
            .with_focal_length(500.0, 510.0)
            .with_principal_point(320.0, 240.0)
            .with_reference(640, 480);
        assert!(config.validate().is_ok());
        assert_eq!(config.nominal(), CameraIntrinsics::new(500.0, 510.0, 320.0, 240.0));
        assert_eq!(config.reference(), Resolution::new(640, 480));

        assert!(matches!(
            config.clone().with_reference(0, 480).validate(),
            Err(FusionError::Configuration(_))
        ));
        assert_eq!(config.rescaler().unwrap().reference(), config.reference());
        assert!(config
            .with_focal_length(f32::INFINITY, 1.0)
            .validate()
            .is_err());
    }
}
