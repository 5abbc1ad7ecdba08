use image::{ImageBuffer, Luma};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Row-major metric depth raster. `NaN` marks a pixel without a valid measurement.
pub type DepthRaster = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Sensor clock timestamp, in whatever unit the capture source uses.
pub type Timestamp = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Byte order of a raw 16-bit depth buffer as delivered by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
    Native,
}

/// One frame as handed over by the sensing source: device-unit depth
/// (millimeters) and a co-located confidence raster, both indexed `y * width + x`.
#[derive(Debug, Clone)]
pub struct RawDepthSample {
    pub depth: Vec<u16>,
    pub confidence: Vec<u8>,
    pub timestamp: Timestamp,
    pub width: u32,
    pub height: u32,
}

impl RawDepthSample {
    pub fn new(
        depth: Vec<u16>,
        confidence: Vec<u8>,
        timestamp: Timestamp,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            depth,
            confidence,
            timestamp,
            width,
            height,
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}

#[derive(Clone, Debug)]
pub struct MetricDepthFrame {
    pub data: DepthRaster,
    pub width: u32,
    pub height: u32,
    pub timestamp: Timestamp,
}

impl MetricDepthFrame {
    pub fn new(data: DepthRaster, timestamp: Timestamp) -> Self {
        let (width, height) = data.dimensions();
        Self {
            data,
            width,
            height,
            timestamp,
        }
    }

    /// Dimensions of the raster itself.
    pub fn resolution(&self) -> Resolution {
        let (width, height) = self.data.dimensions();
        Resolution::new(width, height)
    }

    /// Depth in meters at `(x, y)`, or `None` when out of bounds or invalid.
    pub fn depth_at(&self, x: u32, y: u32) -> Option<f32> {
        depth_at(&self.data, x, y)
    }

    pub fn valid_pixel_count(&self) -> usize {
        valid_pixel_count(&self.data)
    }
}

pub type ArcDepthFrame = Arc<MetricDepthFrame>;

/// Focal length and principal point, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

impl CameraIntrinsics {
    pub fn new(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        Self { fx, fy, cx, cy }
    }
}

/// Intrinsics expressed at the resolution of a produced depth raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RescaledIntrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

#[derive(Clone, Debug)]
pub struct FusedDepthFrame {
    pub data: DepthRaster,
    pub width: u32,
    pub height: u32,
    pub timestamp: Timestamp,
    pub intrinsics: RescaledIntrinsics,
    /// Number of history frames that went into this result.
    pub history_len: usize,
}

impl FusedDepthFrame {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    pub fn depth_at(&self, x: u32, y: u32) -> Option<f32> {
        depth_at(&self.data, x, y)
    }

    pub fn valid_pixel_count(&self) -> usize {
        valid_pixel_count(&self.data)
    }

    /// Every `stride`-th sample of the flattened raster, widened to `f64`.
    pub fn sampled(&self, stride: usize) -> Vec<f64> {
        self.data
            .as_raw()
            .iter()
            .step_by(stride.max(1))
            .map(|&d| f64::from(d))
            .collect()
    }
}

fn depth_at(data: &DepthRaster, x: u32, y: u32) -> Option<f32> {
    if x >= data.width() || y >= data.height() {
        return None;
    }
    let value = data.get_pixel(x, y)[0];
    (!value.is_nan()).then_some(value)
}

fn valid_pixel_count(data: &DepthRaster) -> usize {
    data.as_raw().iter().filter(|d| !d.is_nan()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(values: Vec<f32>, width: u32, height: u32) -> MetricDepthFrame {
        let data = DepthRaster::from_raw(width, height, values).unwrap();
        MetricDepthFrame::new(data, 0)
    }

    #[test]
    fn test_depth_at_skips_invalid_and_out_of_bounds() {
        let frame = frame(vec![1.5, f32::NAN, 0.25, 3.0], 2, 2);
        assert_eq!(frame.depth_at(0, 0), Some(1.5));
        assert_eq!(frame.depth_at(1, 0), None);
        assert_eq!(frame.depth_at(0, 1), Some(0.25));
        assert_eq!(frame.depth_at(2, 0), None);
        assert_eq!(frame.valid_pixel_count(), 3);
        assert_eq!(frame.resolution(), Resolution::new(2, 2));
    }

    #[test]
    fn test_resolution_follows_raster() {
        let mut frame = frame(vec![1.0], 1, 1);
        frame.height = 4;
        assert_eq!(frame.resolution(), Resolution::new(1, 1));
    }

    #[test]
    fn test_sampled_uses_stride() {
        let fused = FusedDepthFrame {
            data: DepthRaster::from_raw(4, 1, vec![1.0, 2.0, f32::NAN, 4.0]).unwrap(),
            width: 4,
            height: 1,
            timestamp: 7,
            intrinsics: RescaledIntrinsics {
                fx: 1.0,
                fy: 1.0,
                cx: 0.5,
                cy: 0.5,
            },
            history_len: 1,
        };
        let every_other = fused.sampled(2);
        assert_eq!(every_other.len(), 2);
        assert_eq!(every_other[0], 1.0);
        assert!(every_other[1].is_nan());
        assert_eq!(fused.sampled(0).len(), 4);
    }
}
