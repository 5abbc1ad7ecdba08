use super::DepthSource;
use crate::depth::{decode_depth_bytes, ByteOrder, RawDepthSample, Resolution, Timestamp};
use crate::error::{FusionError, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// One row of a recording manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub timestamp: Timestamp,
    pub depth_path: PathBuf,
    pub confidence_path: PathBuf,
}

/// Replays a recording described by a CSV manifest with rows
/// `timestamp,depth_path,confidence_path`. Relative paths resolve against the
/// manifest's directory.
pub struct ManifestSource {
    entries: std::vec::IntoIter<ManifestEntry>,
    resolution: Resolution,
    byte_order: ByteOrder,
}

impl ManifestSource {
    pub fn open(path: &Path, resolution: Resolution, byte_order: ByteOrder) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let entries = parse_manifest(&contents, base)?;

        info!(
            "Loaded manifest {} with {} frame(s)",
            path.display(),
            entries.len()
        );

        Ok(Self {
            entries: entries.into_iter(),
            resolution,
            byte_order,
        })
    }

    fn load(&self, entry: &ManifestEntry) -> Result<RawDepthSample> {
        let depth_bytes = fs::read(&entry.depth_path)?;
        let depth = decode_depth_bytes(&depth_bytes, self.byte_order)?;
        let confidence = fs::read(&entry.confidence_path)?;

        debug!(
            "Read depth frame {} from {}",
            entry.timestamp,
            entry.depth_path.display()
        );

        Ok(RawDepthSample::new(
            depth,
            confidence,
            entry.timestamp,
            self.resolution.width,
            self.resolution.height,
        ))
    }
}

impl DepthSource for ManifestSource {
    fn next_sample(&mut self) -> Result<Option<RawDepthSample>> {
        match self.entries.next() {
            Some(entry) => self.load(&entry).map(Some),
            None => Ok(None),
        }
    }
}

pub fn parse_manifest(contents: &str, base: &Path) -> Result<Vec<ManifestEntry>> {
    let mut entries = Vec::new();

    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(FusionError::input_contract(format!(
                "manifest line {}: expected 3 fields, found {}",
                line_no + 1,
                fields.len()
            )));
        }

        let timestamp = match fields[0].parse::<Timestamp>() {
            Ok(timestamp) => timestamp,
            // header row
            Err(_) if entries.is_empty() && fields[0] == "timestamp" => continue,
            Err(e) => {
                return Err(FusionError::input_contract(format!(
                    "manifest line {}: bad timestamp {:?}: {}",
                    line_no + 1,
                    fields[0],
                    e
                )))
            }
        };

        entries.push(ManifestEntry {
            timestamp,
            depth_path: base.join(fields[1]),
            confidence_path: base.join(fields[2]),
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let contents = "timestamp,depth_path,confidence_path\n\
                        # warmup frames dropped\n\
                        \n\
                        100, d/0001.raw, c/0001.raw\n\
                        133,d/0002.raw,c/0002.raw\n";
        let entries = parse_manifest(contents, Path::new("/rec")).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].timestamp, 100);
        assert_eq!(entries[0].depth_path, PathBuf::from("/rec/d/0001.raw"));
        assert_eq!(entries[1].confidence_path, PathBuf::from("/rec/c/0002.raw"));
    }

    #[test]
    fn test_parse_manifest_rejects_bad_rows() {
        assert!(parse_manifest("100,only_depth.raw\n", Path::new("")).is_err());
        assert!(parse_manifest("soon,d.raw,c.raw\n", Path::new("")).is_err());
        // header is only accepted first
        assert!(parse_manifest(
            "1,d.raw,c.raw\ntimestamp,depth_path,confidence_path\n",
            Path::new("")
        )
        .is_err());
    }

    #[test]
    fn test_replay_from_disk() {
        let dir = std::env::temp_dir().join(format!("depth_fusion_manifest_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        // big-endian 1000 and 2000 mm
        fs::write(dir.join("depth.raw"), [0x03, 0xE8, 0x07, 0xD0]).unwrap();
        fs::write(dir.join("conf.raw"), [255, 100]).unwrap();
        fs::write(
            dir.join("frames.csv"),
            "timestamp,depth_path,confidence_path\n5,depth.raw,conf.raw\n",
        )
        .unwrap();

        let mut source = ManifestSource::open(
            &dir.join("frames.csv"),
            Resolution::new(2, 1),
            ByteOrder::Big,
        )
        .unwrap();

        let sample = source.next_sample().unwrap().unwrap();
        assert_eq!(sample.depth, vec![1000, 2000]);
        assert_eq!(sample.confidence, vec![255, 100]);
        assert_eq!(sample.timestamp, 5);
        assert!(source.next_sample().unwrap().is_none());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_raster_file_is_io_error() {
        let dir = std::env::temp_dir().join(format!("depth_fusion_missing_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("frames.csv"), "1,nope.raw,nope_conf.raw\n").unwrap();

        let mut source =
            ManifestSource::open(&dir.join("frames.csv"), Resolution::new(1, 1), ByteOrder::Little)
                .unwrap();
        assert!(matches!(source.next_sample(), Err(FusionError::Io(_))));

        fs::remove_dir_all(&dir).unwrap();
    }
}
