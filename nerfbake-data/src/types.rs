//! Core dataset types: phases, camera intrinsics and per-frame records.
//!
//! These are the CPU-side values that flow from pose extraction into `transforms.json`.

use glam::Mat4;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One half of a train/test dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Test,
    Train,
}

impl Phase {
    /// Submission and manifest order: test frames always come first.
    pub const ORDER: [Phase; 2] = [Phase::Test, Phase::Train];

    /// Filename prefix given to every image of this phase.
    pub fn prefix(self) -> &'static str {
        match self {
            Phase::Test => "eval_",
            Phase::Train => "train_",
        }
    }

    /// Output subdirectory holding this phase's rendered images.
    pub fn subdir(self) -> &'static str {
        match self {
            Phase::Test => "test",
            Phase::Train => "train",
        }
    }

    /// Prefix the last segment of `file_path`, leaving the directory part untouched.
    ///
    /// `"test/0001.png"` becomes `"test/eval_0001.png"` for [`Phase::Test`].
    pub fn prefix_file_path(self, file_path: &str) -> String {
        match file_path.rsplit_once('/') {
            Some((dir, name)) => format!("{dir}/{}{name}", self.prefix()),
            None => format!("{}{file_path}", self.prefix()),
        }
    }

    /// Undo [`Phase::prefix_file_path`]. Returns `None` if the filename lacks this phase's prefix.
    pub fn strip_prefix(self, file_path: &str) -> Option<String> {
        match file_path.rsplit_once('/') {
            Some((dir, name)) => name
                .strip_prefix(self.prefix())
                .map(|name| format!("{dir}/{name}")),
            None => file_path.strip_prefix(self.prefix()).map(str::to_owned),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Test => f.write_str("TEST"),
            Phase::Train => f.write_str("TRAIN"),
        }
    }
}

/// Pinhole intrinsics of the train camera, fixed for one export run.
///
/// Serialized flat at the top level of `transforms.json`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Horizontal field of view in radians.
    pub camera_angle_x: f32,
    /// Vertical field of view in radians.
    pub camera_angle_y: f32,
    /// Focal length in pixels along x.
    pub fl_x: f32,
    /// Focal length in pixels along y.
    pub fl_y: f32,
    pub k1: f32,
    pub k2: f32,
    pub p1: f32,
    pub p2: f32,
    /// Principal point.
    pub cx: f32,
    pub cy: f32,
    /// Image width in pixels.
    pub w: u32,
    /// Image height in pixels.
    pub h: u32,
    pub aabb_scale: u32,
}

/// A single posed frame of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Image path relative to the dataset root, e.g. `train/train_0001.png`.
    pub file_path: String,
    /// Camera-to-world matrix, row-major.
    pub transform_matrix: [[f32; 4]; 4],
    /// Scene frame this record was sampled at. Not written to the manifest.
    #[serde(skip)]
    pub frame: i32,
}

impl FrameRecord {
    /// Create a record from a camera-to-world transform.
    pub fn new(frame: i32, file_path: impl Into<String>, camera_to_world: Mat4) -> Self {
        Self {
            file_path: file_path.into(),
            transform_matrix: camera_to_world.transpose().to_cols_array_2d(),
            frame,
        }
    }

    /// The camera-to-world transform as a glam matrix.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.transform_matrix).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_prefix_keeps_directory() {
        assert_eq!(
            Phase::Test.prefix_file_path("test/0001.png"),
            "test/eval_0001.png"
        );
        assert_eq!(
            Phase::Train.prefix_file_path("train/0042.png"),
            "train/train_0042.png"
        );
    }

    #[test]
    fn test_prefix_without_directory() {
        assert_eq!(Phase::Train.prefix_file_path("0001"), "train_0001");
    }

    #[test]
    fn test_strip_prefix_recovers_original() {
        for phase in Phase::ORDER {
            for original in ["test/0001.png", "a/b/0007", "0003.png", "train/train_0001.png"] {
                let prefixed = phase.prefix_file_path(original);
                assert_eq!(phase.strip_prefix(&prefixed).as_deref(), Some(original));
            }
        }
    }

    #[test]
    fn test_strip_prefix_rejects_other_phase() {
        assert_eq!(Phase::Train.strip_prefix("test/eval_0001.png"), None);
    }

    #[test]
    fn test_frame_record_is_row_major() {
        let transform = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let record = FrameRecord::new(1, "train/0001.png", transform);
        assert_eq!(record.transform_matrix[0], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(record.transform_matrix[1], [0.0, 1.0, 0.0, 2.0]);
        assert_eq!(record.transform_matrix[2], [0.0, 0.0, 1.0, 3.0]);
        assert_eq!(record.transform_matrix[3], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(record.transform(), transform);
    }

    #[test]
    fn test_phase_order_puts_test_first() {
        assert_eq!(Phase::ORDER, [Phase::Test, Phase::Train]);
    }
}
