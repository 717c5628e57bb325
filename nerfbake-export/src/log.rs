//! Export log file

use crate::scene::Scene;
use nerfbake_data::{DataError, write_json};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const LOG_FILE: &str = "log.txt";

/// Export method tag recorded in the log.
pub const METHOD: &str = "TTC";

/// Settings an export ran with, written as JSON to `log.txt`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportLog {
    pub version: &'static str,
    pub method: &'static str,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub dataset_name: String,
    pub train_camera: Option<String>,
    pub test_camera: Option<String>,
    pub train: bool,
    pub test: bool,
    pub render_frames: bool,
    pub frames: i32,
    pub frame_start: i32,
    pub aabb_scale: u32,
    pub file_format: String,
    pub save_splats: bool,
}

impl ExportLog {
    pub fn from_scene(scene: &Scene) -> Self {
        let export = &scene.export;
        Self {
            version: env!("CARGO_PKG_VERSION"),
            method: METHOD,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            dataset_name: export.dataset_name.clone(),
            train_camera: export.train_camera.clone(),
            test_camera: export.test_camera.clone(),
            train: export.train_data,
            test: export.test_data,
            render_frames: export.render_frames,
            frames: export.nb_frames,
            frame_start: scene.render.frame_start,
            aabb_scale: export.aabb_scale,
            file_format: scene.render.file_extension.to_uppercase(),
            save_splats: export.splats,
        }
    }
}

pub fn write_log(dir: &Path, log: &ExportLog) -> Result<PathBuf, DataError> {
    write_json(dir, LOG_FILE, log)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_records_settings() {
        let mut scene = Scene::default();
        scene.export.dataset_name = "Scene 01".to_string();
        scene.export.train_camera = Some("train".to_string());
        scene.export.nb_frames = 12;

        let dir = tempfile::tempdir().unwrap();
        let path = write_log(dir.path(), &ExportLog::from_scene(&scene)).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(value["method"], "TTC");
        assert_eq!(value["dataset_name"], "Scene 01");
        assert_eq!(value["train_camera"], "train");
        assert_eq!(value["test_camera"], serde_json::Value::Null);
        assert_eq!(value["frames"], 12);
        assert_eq!(value["file_format"], "PNG");
        assert!(value["timestamp"].as_u64().unwrap() > 0);
    }
}
