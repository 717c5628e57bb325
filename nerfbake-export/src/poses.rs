//! Camera intrinsics and per-frame pose extraction
//!
//! [`PoseSource`] is the seam to whatever owns the cameras. [`TrackPoses`] is the built-in source
//! that samples a [`Camera`]'s keyframe track.

use crate::error::ExportError;
use crate::scene::{Camera, FrameRange, RenderSettings, SensorFit};
use nerfbake_data::{CameraIntrinsics, FrameRecord, Phase};
use tracing::debug;

/// How extracted frames name their image files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameNaming {
    pub extension: String,
    /// Drop the extension from `file_path` (Gaussian-splatting loaders add their own).
    pub strip_extension: bool,
}

impl FrameNaming {
    pub fn file_name(&self, frame: i32) -> String {
        if self.strip_extension {
            format!("{frame:04}")
        } else {
            format!("{frame:04}.{}", self.extension)
        }
    }
}

impl Default for FrameNaming {
    fn default() -> Self {
        Self {
            extension: "png".to_string(),
            strip_extension: false,
        }
    }
}

pub trait PoseSource {
    /// Intrinsics of `camera` under the current render settings.
    fn intrinsics(&self, camera: &Camera, render: &RenderSettings, aabb_scale: u32)
    -> CameraIntrinsics;

    /// One record per frame of `range`, in frame order, with `file_path` set to
    /// `<phase subdir>/<file name>` (not yet phase-prefixed).
    fn extrinsics(
        &self,
        name: &str,
        camera: &Camera,
        phase: Phase,
        range: FrameRange,
        naming: &FrameNaming,
    ) -> Result<Vec<FrameRecord>, ExportError>;
}

/// Pose source backed by keyframed camera tracks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackPoses;

impl PoseSource for TrackPoses {
    fn intrinsics(
        &self,
        camera: &Camera,
        render: &RenderSettings,
        aabb_scale: u32,
    ) -> CameraIntrinsics {
        let (width, height) = render.scaled_resolution();
        let pixel_aspect = render.pixel_aspect_y / render.pixel_aspect_x;

        let size_x = width as f32;
        let size_y = height as f32 * pixel_aspect;
        let horizontal = match camera.sensor_fit {
            SensorFit::Auto => size_x >= size_y,
            SensorFit::Horizontal => true,
            SensorFit::Vertical => false,
        };
        let sensor_mm = match camera.sensor_fit {
            SensorFit::Vertical => camera.sensor_height_mm,
            _ => camera.sensor_width_mm,
        };
        let view_px = if horizontal { size_x } else { size_y };

        let mm_per_px = (sensor_mm / camera.lens_mm) / view_px;
        let fl_x = 1.0 / mm_per_px;
        let fl_y = fl_x / pixel_aspect;

        CameraIntrinsics {
            camera_angle_x: 2.0 * (width as f32 / (2.0 * fl_x)).atan(),
            camera_angle_y: 2.0 * (height as f32 / (2.0 * fl_y)).atan(),
            fl_x,
            fl_y,
            k1: 0.0,
            k2: 0.0,
            p1: 0.0,
            p2: 0.0,
            cx: width as f32 / 2.0,
            cy: height as f32 / 2.0,
            w: width,
            h: height,
            aabb_scale,
        }
    }

    fn extrinsics(
        &self,
        name: &str,
        camera: &Camera,
        phase: Phase,
        range: FrameRange,
        naming: &FrameNaming,
    ) -> Result<Vec<FrameRecord>, ExportError> {
        let mut records = Vec::with_capacity(range.len());
        for frame in range.frames() {
            let transform = camera.matrix_world(frame).ok_or_else(|| {
                ExportError::Configuration(format!("Camera '{name}' has no keyframes"))
            })?;
            let file_path = format!("{}/{}", phase.subdir(), naming.file_name(frame));
            records.push(FrameRecord::new(frame, file_path, transform));
        }
        debug!(
            "Extracted {} {} poses from camera '{}'",
            records.len(),
            phase,
            name
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{CameraTrack, Keyframe};
    use glam::{Quat, Vec3};

    fn camera() -> Camera {
        Camera::perspective(CameraTrack::from(vec![
            Keyframe::new(1, Vec3::ZERO, Quat::IDENTITY),
            Keyframe::new(5, Vec3::new(4.0, 0.0, 0.0), Quat::IDENTITY),
        ]))
    }

    #[test]
    fn test_intrinsics_full_hd_50mm() {
        let intrinsics = TrackPoses.intrinsics(&camera(), &RenderSettings::default(), 16);
        assert!((intrinsics.fl_x - 2666.6667).abs() < 0.01);
        assert!((intrinsics.fl_y - intrinsics.fl_x).abs() < 1e-4);
        assert_eq!((intrinsics.w, intrinsics.h), (1920, 1080));
        assert_eq!((intrinsics.cx, intrinsics.cy), (960.0, 540.0));
        assert!((intrinsics.camera_angle_x - 0.6911).abs() < 1e-3);
        assert_eq!(intrinsics.aabb_scale, 16);
    }

    #[test]
    fn test_intrinsics_vertical_fit() {
        let camera = Camera {
            sensor_fit: SensorFit::Vertical,
            ..camera()
        };
        let intrinsics = TrackPoses.intrinsics(&camera, &RenderSettings::default(), 4);
        // 24mm sensor over 1080 rows at 50mm
        assert!((intrinsics.fl_y - 2250.0).abs() < 0.01);
    }

    #[test]
    fn test_extrinsics_cover_range_in_order() {
        let records = TrackPoses
            .extrinsics(
                "cam",
                &camera(),
                Phase::Train,
                FrameRange::new(1, 5),
                &FrameNaming::default(),
            )
            .unwrap();

        assert_eq!(records.len(), 5);
        let frames: Vec<i32> = records.iter().map(|r| r.frame).collect();
        assert_eq!(frames, vec![1, 2, 3, 4, 5]);
        assert_eq!(records[0].file_path, "train/0001.png");
        assert_eq!(records[2].transform_matrix[0][3], 2.0);
    }

    #[test]
    fn test_extrinsics_strip_extension() {
        let naming = FrameNaming {
            strip_extension: true,
            ..Default::default()
        };
        let records = TrackPoses
            .extrinsics("cam", &camera(), Phase::Test, FrameRange::new(3, 3), &naming)
            .unwrap();
        assert_eq!(records[0].file_path, "test/0003");
    }

    #[test]
    fn test_extrinsics_without_track_fail() {
        let err = TrackPoses
            .extrinsics(
                "empty",
                &Camera::default(),
                Phase::Test,
                FrameRange::new(1, 2),
                &FrameNaming::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ExportError::Configuration(_)));
    }
}
