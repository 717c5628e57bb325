//! ASCII PLY output

use crate::error::DataError;
use crate::ply::PlyVertex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Write `points` to `dir/name` as an ASCII PLY with xyz and uchar rgb properties.
#[tracing::instrument(skip_all, fields(dir = %dir.display(), points = points.len()))]
pub fn write_point_cloud(dir: &Path, name: &str, points: &[PlyVertex]) -> Result<PathBuf, DataError> {
    let path = dir.join(name);
    let mut file = BufWriter::new(File::create(&path)?);

    writeln!(file, "ply")?;
    writeln!(file, "format ascii 1.0")?;
    writeln!(file, "element vertex {}", points.len())?;
    writeln!(file, "property float x")?;
    writeln!(file, "property float y")?;
    writeln!(file, "property float z")?;
    writeln!(file, "property uchar red")?;
    writeln!(file, "property uchar green")?;
    writeln!(file, "property uchar blue")?;
    writeln!(file, "end_header")?;

    for point in points {
        let [r, g, b] = point.rgb8();
        writeln!(
            file,
            "{} {} {} {} {} {}",
            point.position.x, point.position.y, point.position.z, r, g, b
        )?;
    }
    file.flush()?;

    info!("Wrote {} points to {}", points.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_write_point_cloud_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let points = [
            PlyVertex::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 0.0, 0.0)),
            PlyVertex::new(Vec3::new(-0.5, 0.0, 0.25), Vec3::splat(0.5)),
        ];

        let path = write_point_cloud(dir.path(), "points3d.ply", &points).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "ply");
        assert_eq!(lines[2], "element vertex 2");
        assert_eq!(lines[9], "end_header");
        assert_eq!(lines[10], "1 2 3 255 0 0");
        assert_eq!(lines[11], "-0.5 0 0.25 128 128 128");
        assert_eq!(lines.len(), 12);
    }

    #[test]
    fn test_write_empty_point_cloud() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_point_cloud(dir.path(), "points3d.ply", &[]).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("element vertex 0"));
        assert!(text.trim_end().ends_with("end_header"));
    }
}
