use crate::depth::{FusedDepthFrame, Resolution, Timestamp};
use crate::error::Result;
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// A fused frame flattened for a downstream consumer: depth as a list of
/// doubles (invalid pixels become `null`) plus the scalars needed to
/// unproject it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthExport {
    pub timestamp: Timestamp,
    pub intrinsics_width: u32,
    pub intrinsics_height: u32,
    pub depth_width: u32,
    pub depth_height: u32,
    pub focal_length_x: f32,
    pub focal_length_y: f32,
    pub principal_point_x: f32,
    pub principal_point_y: f32,
    pub stride: usize,
    pub depth_image: Vec<Option<f64>>,
}

impl DepthExport {
    pub fn from_fused(frame: &FusedDepthFrame, reference: Resolution, stride: usize) -> Self {
        let stride = stride.max(1);
        let depth_image = frame
            .sampled(stride)
            .into_iter()
            .map(|d| (!d.is_nan()).then_some(d))
            .collect();

        Self {
            timestamp: frame.timestamp,
            intrinsics_width: reference.width,
            intrinsics_height: reference.height,
            depth_width: frame.width,
            depth_height: frame.height,
            focal_length_x: frame.intrinsics.fx,
            focal_length_y: frame.intrinsics.fy,
            principal_point_x: frame.intrinsics.cx,
            principal_point_y: frame.intrinsics.cy,
            stride,
            depth_image,
        }
    }
}

pub fn save_depth_export(export: &DepthExport, save_path: &Path) -> Result<()> {
    debug!("Writing fused depth frame to {}", save_path.display());

    let writer = BufWriter::new(File::create(save_path)?);
    serde_json::to_writer(writer, export)?;

    Ok(())
}

/// Per-frame summary row written next to the exported frames.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionRecord {
    pub timestamp: Timestamp,
    pub width: u32,
    pub height: u32,
    pub valid_pixels: usize,
    pub history_len: usize,
}

impl From<&FusedDepthFrame> for FusionRecord {
    fn from(frame: &FusedDepthFrame) -> Self {
        Self {
            timestamp: frame.timestamp,
            width: frame.width,
            height: frame.height,
            valid_pixels: frame.valid_pixel_count(),
            history_len: frame.history_len,
        }
    }
}

pub fn save_fusion_metadata(records: &[FusionRecord], save_path: &Path) -> Result<()> {
    info!("Saving fusion metadata to {}", save_path.display());

    let mut file = BufWriter::new(File::create(save_path)?);

    writeln!(file, "timestamp,width,height,valid_pixels,history_len")?;

    for record in records {
        writeln!(
            file,
            "{},{},{},{},{}",
            record.timestamp, record.width, record.height, record.valid_pixels, record.history_len
        )?;
    }
    file.flush()?;

    info!("Successfully saved metadata for {} frames", records.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::{DepthRaster, RescaledIntrinsics};

    fn fused() -> FusedDepthFrame {
        FusedDepthFrame {
            data: DepthRaster::from_raw(2, 2, vec![1.0, f32::NAN, 0.5, 2.0]).unwrap(),
            width: 2,
            height: 2,
            timestamp: 99,
            intrinsics: RescaledIntrinsics {
                fx: 12.0,
                fy: 13.0,
                cx: 1.0,
                cy: 1.5,
            },
            history_len: 3,
        }
    }

    #[test]
    fn test_export_shape() {
        let export = DepthExport::from_fused(&fused(), Resolution::new(20, 20), 1);
        let json = serde_json::to_value(&export).unwrap();

        assert_eq!(json["timestamp"], 99);
        assert_eq!(json["intrinsicsWidth"], 20);
        assert_eq!(json["depthWidth"], 2);
        assert_eq!(json["focalLengthX"], 12.0);
        assert_eq!(json["principalPointY"], 1.5);
        assert_eq!(
            json["depthImage"],
            serde_json::json!([1.0, null, 0.5, 2.0])
        );
    }

    #[test]
    fn test_export_stride() {
        let export = DepthExport::from_fused(&fused(), Resolution::new(20, 20), 3);
        assert_eq!(export.depth_image, vec![Some(1.0), Some(2.0)]);
        assert_eq!(export.stride, 3);
    }

    #[test]
    fn test_metadata_csv() {
        let path = std::env::temp_dir().join(format!("depth_fusion_meta_{}.csv", std::process::id()));
        let record = FusionRecord::from(&fused());
        assert_eq!(record.valid_pixels, 3);

        save_fusion_metadata(&[record], &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "timestamp,width,height,valid_pixels,history_len\n99,2,2,3,3\n"
        );
        std::fs::remove_file(&path).unwrap();
    }
}
