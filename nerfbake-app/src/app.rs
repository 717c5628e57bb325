//! Export run: scene loading, overrides, the render event loop and logging setup.

use nerfbake_data::{DataError, Phase, load_vertices_from_ply};
use nerfbake_export::{DatasetExporter, ExportError, FinalizeOutcome, QueuedRenderer, Scene};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Logging configuration.
pub struct LoggingConfig {
    pub level: String,
    pub enable_tracy: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_tracy: false,
        }
    }
}

/// Command-line values that replace the scene's export settings.
#[derive(Debug, Default, Clone)]
pub struct ExportOverrides {
    pub save_path: Option<PathBuf>,
    pub dataset_name: Option<String>,
    pub render_frames: Option<bool>,
    pub points: Option<PathBuf>,
}

impl ExportOverrides {
    pub fn apply(&self, scene: &mut Scene) -> Result<(), AppError> {
        if let Some(save_path) = &self.save_path {
            scene.export.save_path = save_path.clone();
        }
        if let Some(name) = &self.dataset_name {
            scene.export.dataset_name = name.clone();
        }
        if let Some(render_frames) = self.render_frames {
            scene.export.render_frames = render_frames;
        }
        if let Some(points) = &self.points {
            scene.points = load_vertices_from_ply(points)?;
            info!("Imported {} points from {}", scene.points.len(), points.display());
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("{0}")]
    Data(#[from] DataError),
}

/// What an export run produced.
#[derive(Debug)]
pub struct Summary {
    pub output_path: PathBuf,
    pub frames: usize,
    pub images: usize,
    /// Render phases that failed to submit; each was already logged when it failed.
    pub skipped: Vec<Phase>,
    pub outcome: FinalizeOutcome,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            FinalizeOutcome::Archived(archive) => write!(
                f,
                "Exported {} frames ({} images rendered) to {}",
                self.frames,
                self.images,
                archive.display()
            )?,
            _ => write!(
                f,
                "Exported {} frames; dataset left unarchived at {}",
                self.frames,
                self.output_path.display()
            )?,
        }
        if !self.skipped.is_empty() {
            let phases: Vec<String> = self.skipped.iter().map(ToString::to_string).collect();
            write!(f, " (skipped renders: {})", phases.join(", "))?;
        }
        Ok(())
    }
}

/// Export the scene at `scene_path` and render it to completion with the in-process renderer.
pub fn run(scene_path: &Path, overrides: &ExportOverrides) -> Result<Summary, AppError> {
    let mut scene = Scene::from_path(scene_path)?;
    overrides.apply(&mut scene)?;

    let mut renderer = QueuedRenderer::new();
    let mut session = DatasetExporter::new().execute(&mut scene, &mut renderer)?;

    if renderer.pending() > 0 {
        info!("Rendering {} queued phases", renderer.pending());
    }
    let outcome = session.drive(&mut scene, &mut renderer)?.clone();

    Ok(Summary {
        output_path: session.output_path().to_path_buf(),
        frames: session.manifest().len(),
        images: renderer.frames_written(),
        skipped: session.failures().iter().map(|failure| failure.phase()).collect(),
        outcome,
    })
}

pub fn init_logging(config: &LoggingConfig) {
    #[cfg(feature = "tracy")]
    {
        if config.enable_tracy {
            use tracing_subscriber::Layer;
            use tracing_subscriber::layer::SubscriberExt;
            use tracing_subscriber::util::SubscriberInitExt;
            tracing_subscriber::registry()
                .with(tracing_tracy::TracyLayer::default())
                .with(
                    tracing_subscriber::fmt::layer().with_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env()
                            .unwrap_or_else(|_| config.level.clone().into()),
                    ),
                )
                .init();
            return;
        }
    }
    #[cfg(not(feature = "tracy"))]
    {
        if config.enable_tracy {
            eprintln!("nerfbake was built without the `tracy` feature; ignoring --tracy");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level)),
        )
        .with_target(false)
        .init();
}
