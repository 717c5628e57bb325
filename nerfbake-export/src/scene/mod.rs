//! Scene model consumed by the exporter
//!
//! A scene is loaded from a JSON description: named cameras with keyframed tracks, the render
//! settings a renderer reads at submission time, the export settings and an optional point cloud.
//! Render-job flags and the pre-export settings snapshot are runtime state and never serialized.

pub mod camera;
pub mod range;
pub mod settings;

pub use camera::{Camera, CameraTrack, Keyframe, Projection, SensorFit};
pub use range::FrameRange;
pub use settings::{ExportSettings, RenderSettings, RenderSnapshot, prefixed_frame_path};

use crate::error::ExportError;
use crate::render::RenderJobState;
use nerfbake_data::PlyVertex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub cameras: BTreeMap<String, Camera>,
    pub render: RenderSettings,
    pub export: ExportSettings,
    /// Point cloud written to `points3d.ply` when splats output is enabled.
    pub points: Vec<PlyVertex>,
    /// In-flight render phases.
    #[serde(skip)]
    pub rendering: RenderJobState,
    /// Render settings captured before an export mutated them.
    #[serde(skip)]
    pub initial: Option<RenderSnapshot>,
}

impl Scene {
    /// Load a scene description from a JSON file.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let reader = BufReader::new(File::open(path)?);
        let scene: Scene = serde_json::from_reader(reader)
            .map_err(|e| ExportError::Configuration(format!("invalid scene description: {e}")))?;
        info!(
            "Loaded scene with {} cameras and {} points",
            scene.cameras.len(),
            scene.points.len()
        );
        Ok(scene)
    }

    pub fn camera(&self, name: &str) -> Option<&Camera> {
        self.cameras.get(name)
    }

    /// Put back the render settings captured before the export, if any.
    pub fn restore_render_settings(&mut self) {
        if let Some(snapshot) = self.initial.take() {
            self.render.restore(snapshot);
        }
    }
}
