//! Render and export settings stored with the scene

use crate::scene::FrameRange;
use nerfbake_data::{Phase, clean_name};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Scene-wide render configuration read by the renderer at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Active camera name.
    pub camera: Option<String>,
    /// Output path prefix; frame numbers and the extension are appended to it.
    pub output_path: PathBuf,
    pub frame_start: i32,
    pub frame_end: i32,
    pub resolution_x: u32,
    pub resolution_y: u32,
    pub resolution_percentage: u32,
    pub pixel_aspect_x: f32,
    pub pixel_aspect_y: f32,
    pub file_extension: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            camera: None,
            output_path: PathBuf::from("/tmp/"),
            frame_start: 1,
            frame_end: 250,
            resolution_x: 1920,
            resolution_y: 1080,
            resolution_percentage: 100,
            pixel_aspect_x: 1.0,
            pixel_aspect_y: 1.0,
            file_extension: "png".to_string(),
        }
    }
}

impl RenderSettings {
    /// Output resolution after applying the percentage scale.
    pub fn scaled_resolution(&self) -> (u32, u32) {
        let scale = |size: u32| (size as u64 * self.resolution_percentage as u64 / 100) as u32;
        (scale(self.resolution_x), scale(self.resolution_y))
    }

    pub fn frame_range(&self) -> FrameRange {
        FrameRange::new(self.frame_start, self.frame_end)
    }

    /// Path of the image written for `frame`: the output prefix, a 4-digit frame number and the
    /// file extension, e.g. `out/train/train_0007.png`.
    pub fn frame_path(&self, frame: i32) -> PathBuf {
        prefixed_frame_path(&self.output_path, frame, &self.file_extension)
    }

    /// Capture the values an export overwrites.
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            camera: self.camera.clone(),
            output_path: self.output_path.clone(),
            frame_end: self.frame_end,
        }
    }

    pub fn restore(&mut self, snapshot: RenderSnapshot) {
        self.camera = snapshot.camera;
        self.output_path = snapshot.output_path;
        self.frame_end = snapshot.frame_end;
    }
}

/// `prefix` followed by the zero-padded frame number and `extension`.
pub fn prefixed_frame_path(prefix: &Path, frame: i32, extension: &str) -> PathBuf {
    let mut path = OsString::from(prefix.as_os_str());
    path.push(format!("{frame:04}.{extension}"));
    PathBuf::from(path)
}

/// Render settings as they were before an export started.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub camera: Option<String>,
    pub output_path: PathBuf,
    pub frame_end: i32,
}

/// Persisted configuration of a train/test camera export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory the dataset folder is created in.
    pub save_path: PathBuf,
    /// Dataset name; sanitized before use as a directory name.
    pub dataset_name: String,
    pub train_camera: Option<String>,
    pub test_camera: Option<String>,
    /// Export train frames.
    pub train_data: bool,
    /// Export test frames.
    pub test_data: bool,
    /// Render images in addition to writing transforms.
    pub render_frames: bool,
    /// Frames per phase.
    pub nb_frames: i32,
    /// Write `log.txt`.
    pub logs: bool,
    /// Write `points3d.ply` and extensionless frame paths for Gaussian splatting.
    pub splats: bool,
    pub aabb_scale: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from("."),
            dataset_name: "dataset".to_string(),
            train_camera: None,
            test_camera: None,
            train_data: true,
            test_data: true,
            render_frames: false,
            nb_frames: 100,
            logs: false,
            splats: false,
            aabb_scale: 16,
        }
    }
}

impl ExportSettings {
    /// `save_path/<clean dataset name>`.
    pub fn output_path(&self) -> PathBuf {
        self.save_path.join(clean_name(&self.dataset_name))
    }

    pub fn phase_enabled(&self, phase: Phase) -> bool {
        match phase {
            Phase::Test => self.test_data,
            Phase::Train => self.train_data,
        }
    }

    pub fn camera(&self, phase: Phase) -> Option<&str> {
        match phase {
            Phase::Test => self.test_camera.as_deref(),
            Phase::Train => self.train_camera.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_path_appends_number_and_extension() {
        let settings = RenderSettings {
            output_path: PathBuf::from("out/test/eval_"),
            ..Default::default()
        };
        assert_eq!(settings.frame_path(7), PathBuf::from("out/test/eval_0007.png"));
    }

    #[test]
    fn test_scaled_resolution() {
        let settings = RenderSettings {
            resolution_percentage: 50,
            ..Default::default()
        };
        assert_eq!(settings.scaled_resolution(), (960, 540));
    }

    #[test]
    fn test_snapshot_restore() {
        let mut settings = RenderSettings::default();
        let snapshot = settings.snapshot();
        settings.camera = Some("train".to_string());
        settings.frame_end = 5;
        settings.output_path = PathBuf::from("elsewhere/");
        settings.restore(snapshot);
        assert_eq!(settings, RenderSettings::default());
    }

    #[test]
    fn test_output_path_uses_clean_name() {
        let settings = ExportSettings {
            save_path: PathBuf::from("/data"),
            dataset_name: "Scene 01".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.output_path(), PathBuf::from("/data/Scene_01"));
    }
}
