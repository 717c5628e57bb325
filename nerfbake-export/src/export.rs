//! Train/test camera dataset export
//!
//! [`DatasetExporter::execute`] runs the whole export on the caller's thread and never waits for
//! images. The order of operations:
//!
//! 1. pre-flight validation (no side effects on failure)
//! 2. intrinsics from the train camera, output directory, optional log and point cloud
//! 3. test frames, then train frames: collect and append; `transforms.json` is written once the
//!    train frames are in, and the phase directories are created
//! 4. submit the test render, then the train render
//! 5. [`try_finalize`]: archives right away unless a render is in flight
//!
//! When renders were submitted, the returned [`ExportSession`] receives the renderer's
//! completion signals and archives the dataset once the last phase is done.

use crate::collect::FrameCollector;
use crate::error::ExportError;
use crate::finalize::{FinalizeOutcome, try_finalize};
use crate::log::{ExportLog, write_log};
use crate::poses::{PoseSource, TrackPoses};
use crate::render::{QueuedRenderer, RenderCoordinator, RenderSubmissionError, Renderer};
use crate::scene::Scene;
use crate::validate::validate;
use nerfbake_data::{MANIFEST_FILE, Manifest, Phase, write_json, write_point_cloud};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const POINT_CLOUD_FILE: &str = "points3d.ply";

/// Exports a scene's train and test cameras as a posed-image dataset.
#[derive(Debug, Default)]
pub struct DatasetExporter<P = TrackPoses> {
    poses: P,
}

impl DatasetExporter<TrackPoses> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: PoseSource> DatasetExporter<P> {
    /// Use a custom pose source instead of the scene's keyframe tracks.
    pub fn with_poses(poses: P) -> Self {
        Self { poses }
    }

    /// Run one export. Must not be called again for the same scene while a previous session
    /// still has renders in flight; the render settings are scene-global.
    #[tracing::instrument(skip_all, fields(dataset = %scene.export.dataset_name))]
    pub fn execute<R: Renderer + ?Sized>(
        &self,
        scene: &mut Scene,
        renderer: &mut R,
    ) -> Result<ExportSession, ExportError> {
        let (Some(train_camera), Some(test_camera)) = (
            scene.export.train_camera.clone(),
            scene.export.test_camera.clone(),
        ) else {
            let message = "Be sure to have selected a train and test camera!".to_string();
            error!("{}", message);
            return Err(ExportError::Configuration(message));
        };
        if let Some(message) = validate(scene).into_iter().next() {
            error!("{}", message);
            return Err(ExportError::Configuration(message));
        }
        if !scene.rendering.is_idle() {
            let message = "A render from a previous export is still in flight".to_string();
            error!("{}", message);
            return Err(ExportError::Configuration(message));
        }

        let intrinsics = {
            let camera = scene.camera(&train_camera).ok_or_else(|| {
                ExportError::Configuration(format!("Camera '{train_camera}' is not in the scene"))
            })?;
            self.poses
                .intrinsics(camera, &scene.render, scene.export.aabb_scale)
        };
        let mut manifest = Manifest::new(intrinsics);

        let output_path = scene.export.output_path();
        fs::create_dir_all(&output_path)?;
        info!("Exporting dataset to {}", output_path.display());

        if scene.export.logs {
            write_log(&output_path, &ExportLog::from_scene(scene))?;
        }
        if scene.export.splats {
            write_point_cloud(&output_path, POINT_CLOUD_FILE, &scene.points)?;
        }

        scene.initial = Some(scene.render.snapshot());

        let collector = FrameCollector::new(&self.poses);
        let mut coordinator = RenderCoordinator::new();
        let mut manifest_path = None;
        let mut failures = Vec::new();
        let nb_frames = scene.export.nb_frames;

        let phases: Vec<(Phase, &str)> = Phase::ORDER
            .into_iter()
            .filter(|&phase| scene.export.phase_enabled(phase))
            .map(|phase| match phase {
                Phase::Test => (phase, test_camera.as_str()),
                Phase::Train => (phase, train_camera.as_str()),
            })
            .collect();

        // No fallible step may follow the first submission: an error return drops the session
        // that would receive the render's completion.
        for &(phase, camera) in &phases {
            let frames = collector.collect(scene, Some(camera), phase, nb_frames)?;
            manifest.append(frames);

            // Written once: after the train frames, or after the test frames if train is off.
            if phase == Phase::Train || !scene.export.train_data {
                manifest_path = Some(write_json(&output_path, MANIFEST_FILE, &manifest)?);
            }
            if scene.export.render_frames {
                fs::create_dir_all(output_path.join(phase.subdir()))?;
            }
        }

        if scene.export.render_frames {
            for &(phase, camera) in &phases {
                if let Err(err) =
                    coordinator.submit(scene, renderer, phase, camera, &output_path, nb_frames)
                {
                    failures.push(err);
                }
            }
        }

        if scene.rendering.is_idle() {
            scene.restore_render_settings();
        }
        let outcome = try_finalize(&scene.rendering, &output_path)?;
        match &outcome {
            FinalizeOutcome::Archived(archive) => info!("Dataset archived to {}", archive.display()),
            FinalizeOutcome::Deferred => info!("Archive deferred until rendering completes"),
            FinalizeOutcome::Missing => warn!("Output directory vanished before archiving"),
        }

        Ok(ExportSession {
            output_path,
            manifest,
            manifest_path,
            coordinator,
            failures,
            outcome,
        })
    }
}

/// State of one export after [`DatasetExporter::execute`] returned.
#[derive(Debug)]
pub struct ExportSession {
    output_path: PathBuf,
    manifest: Manifest,
    manifest_path: Option<PathBuf>,
    coordinator: RenderCoordinator,
    failures: Vec<RenderSubmissionError>,
    outcome: FinalizeOutcome,
}

impl ExportSession {
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Where `transforms.json` was written, if any phase was exported.
    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest_path.as_deref()
    }

    pub fn coordinator(&self) -> &RenderCoordinator {
        &self.coordinator
    }

    /// Render phases that failed to submit.
    pub fn failures(&self) -> &[RenderSubmissionError] {
        &self.failures
    }

    /// Latest finalization result.
    pub fn outcome(&self) -> &FinalizeOutcome {
        &self.outcome
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.outcome, FinalizeOutcome::Archived(_))
    }

    /// Render completion handler: lower `phase`'s flag, restore the render settings once
    /// nothing is in flight, and archive if this was the last outstanding phase.
    #[tracing::instrument(skip(self, scene, phase), fields(phase = %phase))]
    pub fn on_render_complete(
        &mut self,
        scene: &mut Scene,
        phase: Phase,
    ) -> Result<FinalizeOutcome, ExportError> {
        self.coordinator.complete(&mut scene.rendering, phase);
        if scene.rendering.is_idle() {
            scene.restore_render_settings();
        }

        let outcome = try_finalize(&scene.rendering, &self.output_path)?;
        if let FinalizeOutcome::Archived(archive) = &outcome {
            info!("Dataset archived to {}", archive.display());
        }
        if outcome != FinalizeOutcome::Missing || !self.is_finalized() {
            self.outcome = outcome.clone();
        }
        Ok(outcome)
    }

    /// Event loop for the in-process renderer: render queued jobs one at a time and feed each
    /// completion back to [`ExportSession::on_render_complete`].
    pub fn drive(
        &mut self,
        scene: &mut Scene,
        renderer: &mut QueuedRenderer,
    ) -> Result<&FinalizeOutcome, ExportError> {
        while let Some(request) = renderer.render_next()? {
            self.on_render_complete(scene, request.phase)?;
        }
        Ok(&self.outcome)
    }
}
