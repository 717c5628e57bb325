//! Scene cameras and their keyframed pose tracks

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Camera projection type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    #[default]
    Perspective,
    Orthographic,
    Panoramic,
}

/// Which sensor dimension the lens maps onto the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorFit {
    /// Horizontal unless the image is taller than it is wide
    #[default]
    Auto,
    Horizontal,
    Vertical,
}

/// A camera pose at a given scene frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: i32,
    pub position: Vec3,
    /// Orientation quaternion (x, y, z, w). The camera looks down its local -Z.
    #[serde(default = "identity")]
    pub rotation: Quat,
}

fn identity() -> Quat {
    Quat::IDENTITY
}

impl Keyframe {
    pub fn new(frame: i32, position: Vec3, rotation: Quat) -> Self {
        Self {
            frame,
            position,
            rotation,
        }
    }
}

/// Keyframed camera path.
///
/// Poses between keyframes are interpolated (lerp for position, slerp for rotation); before the
/// first and after the last keyframe the nearest one is held.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct CameraTrack {
    keyframes: BTreeMap<i32, Keyframe>,
}

impl CameraTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a keyframe, replacing any existing one at the same frame.
    pub fn insert(&mut self, keyframe: Keyframe) {
        self.keyframes.insert(keyframe.frame, keyframe);
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Camera-to-world transform at `frame`, or `None` for an empty track.
    pub fn pose_at(&self, frame: i32) -> Option<Mat4> {
        let before = self.keyframes.range(..=frame).next_back().map(|(_, k)| k);
        let after = self.keyframes.range(frame..).next().map(|(_, k)| k);

        let (position, rotation) = match (before, after) {
            (Some(a), Some(b)) if a.frame != b.frame => {
                let t = (frame - a.frame) as f32 / (b.frame - a.frame) as f32;
                (a.position.lerp(b.position, t), a.rotation.slerp(b.rotation, t))
            }
            (Some(k), _) | (None, Some(k)) => (k.position, k.rotation),
            (None, None) => return None,
        };

        Some(Mat4::from_rotation_translation(rotation.normalize(), position))
    }
}

impl From<Vec<Keyframe>> for CameraTrack {
    fn from(keyframes: Vec<Keyframe>) -> Self {
        Self {
            keyframes: keyframes.into_iter().map(|k| (k.frame, k)).collect(),
        }
    }
}

impl From<CameraTrack> for Vec<Keyframe> {
    fn from(track: CameraTrack) -> Self {
        track.keyframes.into_values().collect()
    }
}

/// A scene camera: lens, sensor and animated pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    #[serde(default)]
    pub projection: Projection,
    /// Focal length in millimeters.
    #[serde(default = "default_lens")]
    pub lens_mm: f32,
    #[serde(default = "default_sensor_width")]
    pub sensor_width_mm: f32,
    #[serde(default = "default_sensor_height")]
    pub sensor_height_mm: f32,
    #[serde(default)]
    pub sensor_fit: SensorFit,
    #[serde(default)]
    pub track: CameraTrack,
}

fn default_lens() -> f32 {
    50.0
}

fn default_sensor_width() -> f32 {
    36.0
}

fn default_sensor_height() -> f32 {
    24.0
}

impl Camera {
    /// A default 50mm perspective camera following `track`.
    pub fn perspective(track: CameraTrack) -> Self {
        Self {
            track,
            ..Self::default()
        }
    }

    /// Camera-to-world transform at `frame`.
    pub fn matrix_world(&self, frame: i32) -> Option<Mat4> {
        self.track.pose_at(frame)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Projection::Perspective,
            lens_mm: default_lens(),
            sensor_width_mm: default_sensor_width(),
            sensor_height_mm: default_sensor_height(),
            sensor_fit: SensorFit::Auto,
            track: CameraTrack::new(),
        }
    }
}
