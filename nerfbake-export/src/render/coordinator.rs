//! Two-phase render submission

use crate::render::{PhaseState, RenderJobState, RenderRequest, RenderSubmissionError, Renderer};
use crate::scene::{FrameRange, Scene};
use nerfbake_data::Phase;
use std::path::Path;
use tracing::{debug, error, info};

/// Submits the test and train renders of one export run.
///
/// Each phase moves `Idle -> Submitted -> Complete`. Submission is the only transition driven
/// from here; completion arrives from the renderer through [`RenderCoordinator::complete`].
/// A test render is never submitted after a train render.
#[derive(Debug, Default)]
pub struct RenderCoordinator {
    states: [PhaseState; 2],
    submissions: Vec<Phase>,
}

fn slot(phase: Phase) -> usize {
    match phase {
        Phase::Test => 0,
        Phase::Train => 1,
    }
}

impl RenderCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, phase: Phase) -> PhaseState {
        self.states[slot(phase)]
    }

    /// Phases in the order they were submitted.
    pub fn submissions(&self) -> &[Phase] {
        &self.submissions
    }

    /// Point the scene's render settings at `phase` and hand the job to `renderer`.
    ///
    /// Sets the active camera, the frame range `[frame_start, frame_start + nb_frames - 1]` and
    /// the output prefix `output_dir/<subdir>/<prefix>`, raises the phase's in-flight flag, then
    /// submits. The phase directory must already exist. On failure the flag is lowered again, the
    /// phase stays idle and the error is logged here, once.
    #[tracing::instrument(skip(self, scene, renderer, phase, output_dir), fields(phase = %phase))]
    pub fn submit<R: Renderer + ?Sized>(
        &mut self,
        scene: &mut Scene,
        renderer: &mut R,
        phase: Phase,
        camera: &str,
        output_dir: &Path,
        nb_frames: i32,
    ) -> Result<(), RenderSubmissionError> {
        let result = self.try_submit(scene, renderer, phase, camera, output_dir, nb_frames);
        if let Err(err) = &result {
            error!("Failed to submit {} render: {}", phase, err);
        }
        result
    }

    fn try_submit<R: Renderer + ?Sized>(
        &mut self,
        scene: &mut Scene,
        renderer: &mut R,
        phase: Phase,
        camera: &str,
        output_dir: &Path,
        nb_frames: i32,
    ) -> Result<(), RenderSubmissionError> {
        if self.state(phase) != PhaseState::Idle {
            return Err(RenderSubmissionError::AlreadySubmitted(phase));
        }
        if phase == Phase::Test && self.state(Phase::Train) != PhaseState::Idle {
            return Err(RenderSubmissionError::OutOfOrder {
                phase,
                after: Phase::Train,
            });
        }
        if scene.camera(camera).is_none() {
            return Err(RenderSubmissionError::InvalidCamera {
                phase,
                camera: camera.to_string(),
            });
        }
        let start = scene.render.frame_start;
        let Some(frames) = FrameRange::checked_from_count(start, nb_frames) else {
            return Err(RenderSubmissionError::InvalidFrameRange {
                phase,
                start,
                count: nb_frames,
            });
        };
        let phase_dir = output_dir.join(phase.subdir());
        if !phase_dir.is_dir() {
            return Err(RenderSubmissionError::InvalidOutputPath {
                phase,
                path: phase_dir,
            });
        }

        scene.render.camera = Some(camera.to_string());
        scene.render.frame_end = frames.end;
        scene.render.output_path = phase_dir.join(phase.prefix());
        debug!(
            "Render settings: camera={}, frames={}..={}, output={}",
            camera,
            scene.render.frame_start,
            scene.render.frame_end,
            scene.render.output_path.display()
        );

        scene.rendering.set(phase);
        let request = RenderRequest::animation(phase, camera, &scene.render);
        if let Err(err) = renderer.submit(request) {
            scene.rendering.clear(phase);
            return Err(err);
        }

        self.states[slot(phase)] = PhaseState::Submitted;
        self.submissions.push(phase);
        info!("Submitted {} render ({} frames)", phase, nb_frames);
        Ok(())
    }

    /// Record that the renderer finished `phase` and lower its in-flight flag.
    ///
    /// Returns `false` if the phase was not in the submitted state; the flag is cleared either way.
    pub fn complete(&mut self, jobs: &mut RenderJobState, phase: Phase) -> bool {
        jobs.clear(phase);
        let state = &mut self.states[slot(phase)];
        if *state == PhaseState::Submitted {
            *state = PhaseState::Complete;
            info!("{} render complete", phase);
            true
        } else {
            debug!("Ignoring completion for {} render in state {:?}", phase, state);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Camera;

    #[derive(Default)]
    struct RecordingRenderer {
        requests: Vec<RenderRequest>,
        reject: Option<Phase>,
    }

    impl Renderer for RecordingRenderer {
        fn submit(&mut self, request: RenderRequest) -> Result<(), RenderSubmissionError> {
            if self.reject == Some(request.phase) {
                return Err(RenderSubmissionError::Rejected {
                    phase: request.phase,
                    reason: "busy".to_string(),
                });
            }
            self.requests.push(request);
            Ok(())
        }
    }

    fn setup() -> (tempfile::TempDir, Scene) {
        let dir = tempfile::tempdir().unwrap();
        for phase in Phase::ORDER {
            std::fs::create_dir_all(dir.path().join(phase.subdir())).unwrap();
        }
        let mut scene = Scene::default();
        scene.cameras.insert("train".to_string(), Camera::default());
        scene.cameras.insert("test".to_string(), Camera::default());
        scene.render.frame_start = 5;
        (dir, scene)
    }

    #[test]
    fn test_submit_mutates_render_settings() {
        let (dir, mut scene) = setup();
        let mut renderer = RecordingRenderer::default();
        let mut coordinator = RenderCoordinator::new();

        coordinator
            .submit(&mut scene, &mut renderer, Phase::Train, "train", dir.path(), 3)
            .unwrap();

        assert_eq!(scene.render.camera.as_deref(), Some("train"));
        assert_eq!(scene.render.frame_end, 7);
        assert_eq!(
            scene.render.output_path,
            dir.path().join("train").join("train_")
        );
        assert!(scene.rendering.is_in_flight(Phase::Train));
        assert_eq!(coordinator.state(Phase::Train), PhaseState::Submitted);

        let request = &renderer.requests[0];
        assert_eq!(request.frames.start, 5);
        assert_eq!(request.frames.end, 7);
        assert_eq!(request.camera, "train");
    }

    #[test]
    fn test_test_phase_submits_before_train() {
        let (dir, mut scene) = setup();
        let mut renderer = RecordingRenderer::default();
        let mut coordinator = RenderCoordinator::new();

        coordinator
            .submit(&mut scene, &mut renderer, Phase::Test, "test", dir.path(), 2)
            .unwrap();
        coordinator
            .submit(&mut scene, &mut renderer, Phase::Train, "train", dir.path(), 2)
            .unwrap();

        assert_eq!(coordinator.submissions(), &[Phase::Test, Phase::Train]);
        let phases: Vec<Phase> = renderer.requests.iter().map(|r| r.phase).collect();
        assert_eq!(phases, vec![Phase::Test, Phase::Train]);
        assert_eq!(scene.rendering.as_tuple(), (true, true, false));
    }

    #[test]
    fn test_test_after_train_is_rejected() {
        let (dir, mut scene) = setup();
        let mut renderer = RecordingRenderer::default();
        let mut coordinator = RenderCoordinator::new();

        coordinator
            .submit(&mut scene, &mut renderer, Phase::Train, "train", dir.path(), 2)
            .unwrap();
        let err = coordinator
            .submit(&mut scene, &mut renderer, Phase::Test, "test", dir.path(), 2)
            .unwrap_err();

        assert_eq!(
            err,
            RenderSubmissionError::OutOfOrder {
                phase: Phase::Test,
                after: Phase::Train
            }
        );
        assert!(!scene.rendering.is_in_flight(Phase::Test));
        assert_eq!(renderer.requests.len(), 1);
    }

    #[test]
    fn test_double_submit_is_rejected() {
        let (dir, mut scene) = setup();
        let mut renderer = RecordingRenderer::default();
        let mut coordinator = RenderCoordinator::new();

        coordinator
            .submit(&mut scene, &mut renderer, Phase::Test, "test", dir.path(), 2)
            .unwrap();
        let err = coordinator
            .submit(&mut scene, &mut renderer, Phase::Test, "test", dir.path(), 2)
            .unwrap_err();
        assert_eq!(err, RenderSubmissionError::AlreadySubmitted(Phase::Test));
    }

    #[test]
    fn test_invalid_camera_and_path() {
        let (dir, mut scene) = setup();
        let mut renderer = RecordingRenderer::default();
        let mut coordinator = RenderCoordinator::new();

        let err = coordinator
            .submit(&mut scene, &mut renderer, Phase::Test, "ghost", dir.path(), 2)
            .unwrap_err();
        assert!(matches!(err, RenderSubmissionError::InvalidCamera { .. }));

        let missing = dir.path().join("missing");
        let err = coordinator
            .submit(&mut scene, &mut renderer, Phase::Test, "test", &missing, 2)
            .unwrap_err();
        assert!(matches!(err, RenderSubmissionError::InvalidOutputPath { .. }));

        assert!(scene.rendering.is_idle());
        assert_eq!(coordinator.state(Phase::Test), PhaseState::Idle);
        assert!(renderer.requests.is_empty());
    }

    #[test]
    fn test_rejected_submission_lowers_flag() {
        let (dir, mut scene) = setup();
        let mut renderer = RecordingRenderer {
            reject: Some(Phase::Test),
            ..Default::default()
        };
        let mut coordinator = RenderCoordinator::new();

        let err = coordinator
            .submit(&mut scene, &mut renderer, Phase::Test, "test", dir.path(), 2)
            .unwrap_err();
        assert_eq!(err.phase(), Phase::Test);
        assert!(scene.rendering.is_idle());

        coordinator
            .submit(&mut scene, &mut renderer, Phase::Train, "train", dir.path(), 2)
            .unwrap();
        assert_eq!(scene.rendering.as_tuple(), (false, true, false));
    }

    #[test]
    fn test_complete_transitions_and_clears() {
        let (dir, mut scene) = setup();
        let mut renderer = RecordingRenderer::default();
        let mut coordinator = RenderCoordinator::new();
        coordinator
            .submit(&mut scene, &mut renderer, Phase::Train, "train", dir.path(), 2)
            .unwrap();

        assert!(coordinator.complete(&mut scene.rendering, Phase::Train));
        assert_eq!(coordinator.state(Phase::Train), PhaseState::Complete);
        assert!(scene.rendering.is_idle());
        assert!(!coordinator.complete(&mut scene.rendering, Phase::Train));
    }

    #[test]
    fn test_frame_range_past_last_frame_is_rejected() {
        let (dir, mut scene) = setup();
        let initial = scene.render.clone();
        let mut renderer = RecordingRenderer::default();
        let mut coordinator = RenderCoordinator::new();

        let err = coordinator
            .submit(&mut scene, &mut renderer, Phase::Train, "train", dir.path(), i32::MAX)
            .unwrap_err();

        assert_eq!(
            err,
            RenderSubmissionError::InvalidFrameRange {
                phase: Phase::Train,
                start: 5,
                count: i32::MAX
            }
        );
        assert_eq!(scene.render, initial);
        assert!(scene.rendering.is_idle());
        assert!(renderer.requests.is_empty());
    }
}
