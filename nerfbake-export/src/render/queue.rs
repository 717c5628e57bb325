//! In-process render queue
//!
//! Accepts submissions immediately and renders them later, one job per
//! [`QueuedRenderer::render_next`] call, so the host's event loop decides when completion happens.
//! Images are placeholders: a gradient tinted per phase and frame, at the requested resolution.

use crate::error::ExportError;
use crate::render::{RenderRequest, RenderSubmissionError, Renderer};
use crate::scene::prefixed_frame_path;
use image::{Rgb, RgbImage};
use nerfbake_data::Phase;
use std::collections::VecDeque;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct QueuedRenderer {
    pending: VecDeque<RenderRequest>,
    frames_written: usize,
}

impl QueuedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of submitted jobs not yet rendered.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Total images written so far.
    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Render the oldest queued job. Returns the finished request, or `None` if the queue is empty.
    pub fn render_next(&mut self) -> Result<Option<RenderRequest>, ExportError> {
        let Some(request) = self.pending.pop_front() else {
            return Ok(None);
        };

        let (width, height) = request.resolution;
        for frame in request.frames.frames() {
            let path = prefixed_frame_path(&request.output_prefix, frame, &request.file_extension);
            placeholder(width, height, request.phase, frame).save(&path)?;
            self.frames_written += 1;
            debug!("Rendered {}", path.display());
        }

        info!(
            "Finished {} render: {} frames from camera '{}'",
            request.phase,
            request.frames.len(),
            request.camera
        );
        Ok(Some(request))
    }
}

impl Renderer for QueuedRenderer {
    fn submit(&mut self, request: RenderRequest) -> Result<(), RenderSubmissionError> {
        let target_dir = request.output_prefix.parent().filter(|dir| dir.is_dir());
        if target_dir.is_none() {
            return Err(RenderSubmissionError::Rejected {
                phase: request.phase,
                reason: format!(
                    "cannot write to {}",
                    request.output_prefix.display()
                ),
            });
        }
        debug!("Queued {} render for camera '{}'", request.phase, request.camera);
        self.pending.push_back(request);
        Ok(())
    }
}

fn placeholder(width: u32, height: u32, phase: Phase, frame: i32) -> RgbImage {
    let tint = match phase {
        Phase::Test => 64,
        Phase::Train => 192,
    };
    let pulse = (frame.rem_euclid(16) * 16) as u8;
    RgbImage::from_fn(width, height, |x, y| {
        let r = (x as u64 * 255 / width.max(1) as u64) as u8;
        let g = (y as u64 * 255 / height.max(1) as u64) as u8;
        Rgb([r, g, tint ^ pulse])
    })
}
