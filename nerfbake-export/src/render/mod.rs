//! Render job bookkeeping
//!
//! Rendering itself is delegated to a [`Renderer`]. Submissions return immediately; the renderer
//! reports completion later, outside the exporting call, and the host clears the matching
//! [`RenderJobState`] flag through the export session's completion handler.

pub mod coordinator;
pub mod queue;

pub use coordinator::RenderCoordinator;
pub use queue::QueuedRenderer;

use crate::scene::{FrameRange, RenderSettings};
use nerfbake_data::Phase;
use std::path::PathBuf;
use thiserror::Error;

/// Which render phases are in flight.
///
/// Set on submission, cleared by the completion handler. Both run on the same thread, so each
/// flag has a single writer at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderJobState {
    test: bool,
    train: bool,
    /// Reserved for renders started by other export methods.
    other: bool,
}

impl RenderJobState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, phase: Phase) {
        *self.flag_mut(phase) = true;
    }

    pub fn clear(&mut self, phase: Phase) {
        *self.flag_mut(phase) = false;
    }

    pub fn set_other(&mut self, in_flight: bool) {
        self.other = in_flight;
    }

    pub fn is_in_flight(&self, phase: Phase) -> bool {
        match phase {
            Phase::Test => self.test,
            Phase::Train => self.train,
        }
    }

    /// True while any render, including the reserved one, is outstanding.
    pub fn any(&self) -> bool {
        self.test || self.train || self.other
    }

    pub fn is_idle(&self) -> bool {
        !self.any()
    }

    /// `(test, train, other)`
    pub fn as_tuple(&self) -> (bool, bool, bool) {
        (self.test, self.train, self.other)
    }

    fn flag_mut(&mut self, phase: Phase) -> &mut bool {
        match phase {
            Phase::Test => &mut self.test,
            Phase::Train => &mut self.train,
        }
    }
}

/// Per-phase lifecycle within one export run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhaseState {
    #[default]
    Idle,
    Submitted,
    Complete,
}

/// An animation render job, built from the render settings at submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub phase: Phase,
    pub camera: String,
    pub frames: FrameRange,
    /// Path prefix for written images, e.g. `dataset/train/train_`.
    pub output_prefix: PathBuf,
    pub resolution: (u32, u32),
    pub file_extension: String,
    pub animation: bool,
    pub write_still: bool,
}

impl RenderRequest {
    /// Snapshot `settings` into an animation request for `phase`.
    pub fn animation(phase: Phase, camera: &str, settings: &RenderSettings) -> Self {
        Self {
            phase,
            camera: camera.to_string(),
            frames: settings.frame_range(),
            output_prefix: settings.output_path.clone(),
            resolution: settings.scaled_resolution(),
            file_extension: settings.file_extension.clone(),
            animation: true,
            write_still: true,
        }
    }
}

/// External image renderer.
pub trait Renderer {
    /// Queue `request` and return without waiting for images.
    fn submit(&mut self, request: RenderRequest) -> Result<(), RenderSubmissionError>;
}

/// A render phase could not be submitted. Other phases are unaffected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderSubmissionError {
    #[error("{phase} render: camera '{camera}' is not in the scene")]
    InvalidCamera { phase: Phase, camera: String },

    #[error("{phase} render: output directory {} does not exist", .path.display())]
    InvalidOutputPath { phase: Phase, path: PathBuf },

    #[error("{phase} render: {count} frames from frame {start} run past the last frame")]
    InvalidFrameRange { phase: Phase, start: i32, count: i32 },

    #[error("{phase} render submitted after {after}")]
    OutOfOrder { phase: Phase, after: Phase },

    #[error("{0} render already submitted in this export")]
    AlreadySubmitted(Phase),

    #[error("{phase} render rejected: {reason}")]
    Rejected { phase: Phase, reason: String },
}

impl RenderSubmissionError {
    pub fn phase(&self) -> Phase {
        match self {
            Self::InvalidCamera { phase, .. }
            | Self::InvalidOutputPath { phase, .. }
            | Self::InvalidFrameRange { phase, .. }
            | Self::OutOfOrder { phase, .. }
            | Self::Rejected { phase, .. } => *phase,
            Self::AlreadySubmitted(phase) => *phase,
        }
    }
}
