//! Nerfbake Export Crate
//!
//! Turns a scene with a train camera and a test camera into a posed-image dataset for NeRF
//! training: `transforms.json` (intrinsics plus test frames followed by train frames), rendered
//! images under `test/` and `train/`, and finally a single `<dataset>.zip`.
//!
//! ## Modules
//!
//! - [`scene`]: cameras, keyframe tracks, render and export settings
//! - [`poses`]: intrinsics and per-frame pose extraction
//! - [`collect`]: phase frame collection with file-name prefixing
//! - [`render`]: render job flags, the two-phase coordinator and an in-process render queue
//! - [`finalize`]: archive-and-cleanup once no render is in flight
//! - [`export`]: the export pipeline and its completion handler

pub mod collect;
pub mod error;
pub mod export;
pub mod finalize;
pub mod log;
pub mod poses;
pub mod render;
pub mod scene;
pub mod validate;

pub use collect::FrameCollector;
pub use error::ExportError;
pub use export::{DatasetExporter, ExportSession};
pub use finalize::{FinalizeOutcome, try_finalize};
pub use poses::{FrameNaming, PoseSource, TrackPoses};
pub use render::{
    PhaseState, QueuedRenderer, RenderCoordinator, RenderJobState, RenderRequest,
    RenderSubmissionError, Renderer,
};
pub use scene::Scene;
pub use validate::validate;
