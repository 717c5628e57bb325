//! PLY point cloud loading

use crate::error::DataError;
use crate::ply::PlyVertex;
use glam::Vec3;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info, warn};

// PLY file structure; faces, if any, are ignored
#[derive(Deserialize, Debug)]
struct PlyFile {
    #[serde(rename = "vertex")]
    vertex: Vec<HashMap<String, JsonValue>>,
}

fn get_f32(prop: Option<&JsonValue>) -> Option<f32> {
    prop.and_then(|v| match v {
        JsonValue::Number(n) => n.as_f64().map(|f| f as f32),
        _ => None,
    })
}

fn get_u8(prop: Option<&JsonValue>) -> Option<u8> {
    prop.and_then(|v| match v {
        JsonValue::Number(n) => n
            .as_u64()
            .map(|u| u as u8)
            .or_else(|| n.as_i64().map(|i| i as u8)),
        _ => None,
    })
}

/// Load colored vertices from a PLY file, e.g. to seed a scene's point cloud.
///
/// Accepts `red/green/blue` or `r/g/b` color properties; points without color come back grey.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_vertices_from_ply(path: &Path) -> Result<Vec<PlyVertex>, DataError> {
    debug!("Loading PLY vertices from: {}", path.display());
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let ply_data: PlyFile = serde_ply::from_reader(reader).map_err(|e| {
        warn!("Failed to parse PLY file: {}", e);
        DataError::Ply(e.to_string())
    })?;

    info!("PLY file parsed: {} vertices", ply_data.vertex.len());

    let mut vertices = Vec::with_capacity(ply_data.vertex.len());

    for (index, vertex) in ply_data.vertex.iter().enumerate() {
        let coord = |property: &'static str| {
            get_f32(vertex.get(property)).ok_or(DataError::MissingProperty { property, index })
        };
        let position = Vec3::new(coord("x")?, coord("y")?, coord("z")?);

        let color = if let (Some(r), Some(g), Some(b)) = (
            get_u8(vertex.get("red")),
            get_u8(vertex.get("green")),
            get_u8(vertex.get("blue")),
        ) {
            Vec3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
        } else if let (Some(r), Some(g), Some(b)) = (
            get_u8(vertex.get("r")),
            get_u8(vertex.get("g")),
            get_u8(vertex.get("b")),
        ) {
            Vec3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
        } else {
            Vec3::splat(0.5)
        };

        vertices.push(PlyVertex::new(position, color));
    }

    debug!("Loaded {} vertices from PLY file", vertices.len());
    Ok(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_vertices_from_ply(&dir.path().join("missing.ply")).unwrap_err();
        assert!(matches!(err, DataError::Io(_)));
    }

    #[test]
    fn test_get_u8_reads_integers() {
        let value = serde_json::json!(200);
        assert_eq!(get_u8(Some(&value)), Some(200));
        assert_eq!(get_u8(None), None);
    }
}
