//! Pre-flight checks run before an export touches the filesystem

use crate::scene::{FrameRange, Projection, Scene};
use nerfbake_data::Phase;

/// Every problem that would stop a train/test export, in reporting order.
///
/// An empty list means the export may proceed. Callers report only the first message.
pub fn validate(scene: &Scene) -> Vec<String> {
    let export = &scene.export;
    let mut errors = Vec::new();

    let (Some(train), Some(test)) = (&export.train_camera, &export.test_camera) else {
        errors.push("Be sure to have selected a train and test camera!".to_string());
        return errors;
    };

    let mut all_present = true;
    for name in [train, test] {
        if scene.camera(name).is_none() {
            errors.push(format!("Camera '{name}' does not exist in the scene!"));
            all_present = false;
        }
    }

    if all_present {
        let perspective = [train, test]
            .iter()
            .filter_map(|name| scene.camera(name))
            .all(|camera| camera.projection == Projection::Perspective);
        if !perspective {
            errors.push("Only perspective cameras are supported!".to_string());
        }

        for phase in Phase::ORDER {
            let Some(name) = export.camera(phase) else {
                continue;
            };
            let tracked = scene.camera(name).is_some_and(|camera| !camera.track.is_empty());
            if export.phase_enabled(phase) && !tracked {
                errors.push(format!("{phase} camera '{name}' has no keyframes!"));
            }
        }
    }

    if export.dataset_name.trim().is_empty() {
        errors.push("Dataset name cannot be empty!".to_string());
    }
    if export.nb_frames <= 0 {
        errors.push("Number of frames must be positive!".to_string());
    } else if FrameRange::checked_from_count(scene.render.frame_start, export.nb_frames).is_none() {
        errors.push(format!(
            "{} frames starting at frame {} run past the last frame!",
            export.nb_frames, scene.render.frame_start
        ));
    }
    if !export.train_data && !export.test_data {
        errors.push("Select at least one of train or test data!".to_string());
    }
    let (width, height) = scene.render.scaled_resolution();
    if width == 0 || height == 0 {
        errors.push("Render resolution must be non-zero!".to_string());
    }
    if !export.save_path.is_dir() {
        errors.push(format!(
            "Save path {} is not an existing directory!",
            export.save_path.display()
        ));
    }

    errors
}
