use super::types::{CameraIntrinsics, RescaledIntrinsics, Resolution};
use crate::error::{FusionError, Result};

/// Maps intrinsics published at a reference resolution onto the resolution
/// of the depth raster actually produced. Assumes the target is a uniform
/// resampling of the same field of view.
#[derive(Debug, Clone)]
pub struct IntrinsicsRescaler {
    nominal: CameraIntrinsics,
    reference: Resolution,
}

impl IntrinsicsRescaler {
    pub fn new(nominal: CameraIntrinsics, reference: Resolution) -> Result<Self> {
        if reference.width == 0 || reference.height == 0 {
            return Err(FusionError::configuration(format!(
                "reference resolution must be positive, got {}",
                reference
            )));
        }
        let values = [nominal.fx, nominal.fy, nominal.cx, nominal.cy];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(FusionError::configuration(
                "nominal intrinsics must be finite",
            ));
        }

        Ok(Self { nominal, reference })
    }

    pub fn nominal(&self) -> CameraIntrinsics {
        self.nominal
    }

    pub fn reference(&self) -> Resolution {
        self.reference
    }

    pub fn rescale(&self, target: Resolution) -> RescaledIntrinsics {
        let scale_x = target.width as f32 / self.reference.width as f32;
        let scale_y = target.height as f32 / self.reference.height as f32;

        RescaledIntrinsics {
            fx: self.nominal.fx * scale_x,
            fy: self.nominal.fy * scale_y,
            cx: self.nominal.cx * scale_x,
            cy: self.nominal.cy * scale_y,
        }
    }
}
