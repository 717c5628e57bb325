//! The `transforms.json` manifest and JSON file output.

use crate::error::DataError;
use crate::types::{CameraIntrinsics, FrameRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the manifest inside the dataset directory.
pub const MANIFEST_FILE: &str = "transforms.json";

/// Intrinsics plus an ordered, append-only list of frames.
///
/// Frames keep the order they were appended in. An export appends test frames before train
/// frames, so the manifest always reads `[test..] ++ [train..]` no matter which phase finishes
/// rendering first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(flatten)]
    pub intrinsics: CameraIntrinsics,
    pub frames: Vec<FrameRecord>,
}

impl Manifest {
    /// Start a manifest with no frames.
    pub fn new(intrinsics: CameraIntrinsics) -> Self {
        Self {
            intrinsics,
            frames: Vec::new(),
        }
    }

    /// Extend the frame list, preserving the order of `frames`.
    pub fn append(&mut self, frames: impl IntoIterator<Item = FrameRecord>) {
        let before = self.frames.len();
        self.frames.extend(frames);
        debug!(
            "Appended {} frames to manifest ({} total)",
            self.frames.len() - before,
            self.frames.len()
        );
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Write `data` as pretty-printed JSON to `dir/name`, returning the written path.
pub fn write_json<T: Serialize + ?Sized>(
    dir: &Path,
    name: &str,
    data: &T,
) -> Result<PathBuf, DataError> {
    let path = dir.join(name);
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

/// Load a manifest previously written by [`write_json`].
pub fn read_manifest(path: &Path) -> Result<Manifest, DataError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
