use super::record::{save_depth_export, save_fusion_metadata, DepthExport, FusionRecord};
use crate::depth::{FusedDepthFrame, Resolution};
use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use log::{error, info};
use std::path::PathBuf;

pub struct WriterSettings {
    pub save_folder: PathBuf,
    pub reference: Resolution,
    pub stride: usize,
}

/// Drains fused frames until the sending side hangs up, writing one JSON
/// file per frame and a `metadata.csv` summary at the end. Fails after
/// draining if any frame could not be written; the summary lists only the
/// frames that were.
pub fn fused_frame_writer(rx: Receiver<FusedDepthFrame>, settings: WriterSettings) -> Result<usize> {
    info!("Starting fused frame writer");

    let mut records = Vec::new();
    let mut failed = 0usize;

    while let Ok(frame) = rx.recv() {
        let export = DepthExport::from_fused(&frame, settings.reference, settings.stride);
        let path = settings
            .save_folder
            .join(format!("fused_{}.json", frame.timestamp));

        if let Err(e) = save_depth_export(&export, &path) {
            error!("Failed to write {}: {}", path.display(), e);
            failed += 1;
            continue;
        }
        records.push(FusionRecord::from(&frame));
    }

    save_fusion_metadata(&records, &settings.save_folder.join("metadata.csv"))
        .context("Failed to save fusion metadata")?;

    if failed > 0 {
        anyhow::bail!(
            "Failed to write {} of {} fused frame(s)",
            failed,
            failed + records.len()
        );
    }

    info!("Fused frame writer finished after {} frame(s)", records.len());

    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::{DepthRaster, RescaledIntrinsics};
    use std::thread;

    fn fused_at(timestamp: i64) -> FusedDepthFrame {
        FusedDepthFrame {
            data: DepthRaster::from_raw(1, 1, vec![1.25]).unwrap(),
            width: 1,
            height: 1,
            timestamp,
            intrinsics: RescaledIntrinsics {
                fx: 1.0,
                fy: 1.0,
                cx: 0.0,
                cy: 0.0,
            },
            history_len: 1,
        }
    }

    #[test]
    fn test_writer_drains_channel() {
        let dir = std::env::temp_dir().join(format!("depth_fusion_writer_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let (tx, rx) = crossbeam_channel::bounded(2);
        let settings = WriterSettings {
            save_folder: dir.clone(),
            reference: Resolution::new(4, 4),
            stride: 1,
        };
        let handle = thread::spawn(move || fused_frame_writer(rx, settings));

        for timestamp in [10, 20, 30] {
            tx.send(fused_at(timestamp)).unwrap();
        }
        drop(tx);

        assert_eq!(handle.join().unwrap().unwrap(), 3);
        assert!(dir.join("fused_20.json").exists());
        let metadata = std::fs::read_to_string(dir.join("metadata.csv")).unwrap();
        assert_eq!(metadata.lines().count(), 4);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_export_is_reported() {
        let dir = std::env::temp_dir().join(format!("depth_fusion_writer_fail_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        // a directory in the way of one output file
        std::fs::create_dir_all(dir.join("fused_20.json")).unwrap();

        let (tx, rx) = crossbeam_channel::unbounded();
        for timestamp in [10, 20, 30] {
            tx.send(fused_at(timestamp)).unwrap();
        }
        drop(tx);

        let settings = WriterSettings {
            save_folder: dir.clone(),
            reference: Resolution::new(4, 4),
            stride: 1,
        };
        let err = fused_frame_writer(rx, settings).unwrap_err();
        assert!(err.to_string().contains("1 of 3"));

        let metadata = std::fs::read_to_string(dir.join("metadata.csv")).unwrap();
        assert_eq!(metadata.lines().count(), 3);
        assert!(!metadata.contains("\n20,"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
