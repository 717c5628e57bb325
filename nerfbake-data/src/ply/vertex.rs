//! PLY vertex data structures

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A colored point as stored in a dataset's point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlyVertex {
    pub position: Vec3,
    /// RGB color (linear, 0-1 range).
    #[serde(default = "default_color")]
    pub color: Vec3,
}

fn default_color() -> Vec3 {
    Vec3::splat(0.5)
}

impl PlyVertex {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }

    /// Color quantized to 8-bit channels.
    pub fn rgb8(&self) -> [u8; 3] {
        let c = (self.color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
        [c.x as u8, c.y as u8, c.z as u8]
    }
}
