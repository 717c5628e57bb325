//! Frame collection for one export phase

use crate::error::ExportError;
use crate::poses::{FrameNaming, PoseSource};
use crate::scene::{FrameRange, Scene};
use nerfbake_data::{FrameRecord, Phase};
use tracing::debug;

/// Pulls a phase's frame records from a [`PoseSource`] and prefixes their file names.
pub struct FrameCollector<'a, P: PoseSource + ?Sized> {
    poses: &'a P,
}

impl<'a, P: PoseSource + ?Sized> FrameCollector<'a, P> {
    pub fn new(poses: &'a P) -> Self {
        Self { poses }
    }

    /// Collect `nb_frames` consecutive frames starting at the scene's first frame.
    ///
    /// Every returned `file_path` keeps its directory and gains the phase prefix on its file
    /// name (`test/0001.png` -> `test/eval_0001.png`).
    pub fn collect(
        &self,
        scene: &Scene,
        camera: Option<&str>,
        phase: Phase,
        nb_frames: i32,
    ) -> Result<Vec<FrameRecord>, ExportError> {
        if nb_frames <= 0 {
            return Err(ExportError::Configuration(format!(
                "Number of {phase} frames must be positive, got {nb_frames}"
            )));
        }
        let name = camera.ok_or_else(|| {
            ExportError::Configuration(format!("No {phase} camera selected"))
        })?;
        let cam = scene.camera(name).ok_or_else(|| {
            ExportError::Configuration(format!("Camera '{name}' is not in the scene"))
        })?;

        let range = FrameRange::from_count(scene.render.frame_start, nb_frames);
        let naming = FrameNaming {
            extension: scene.render.file_extension.clone(),
            strip_extension: scene.export.splats,
        };

        let mut frames = self.poses.extrinsics(name, cam, phase, range, &naming)?;
        for frame in &mut frames {
            frame.file_path = phase.prefix_file_path(&frame.file_path);
        }
        debug!(
            "Collected {} {} frames ({}..={})",
            frames.len(),
            phase,
            range.start,
            range.end
        );
        Ok(frames)
    }
}
