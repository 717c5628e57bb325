//! Nerfbake Data Crate
//!
//! Dataset types and file formats shared by the exporter and its tools.
//! This crate knows nothing about scenes or renderers; it only describes what ends up on disk:
//! camera intrinsics, per-frame records, the `transforms.json` manifest and PLY point clouds.

pub mod error;
pub mod manifest;
pub mod naming;
pub mod ply;
pub mod types;

pub use error::DataError;
pub use manifest::{MANIFEST_FILE, Manifest, read_manifest, write_json};
pub use naming::clean_name;
pub use ply::{PlyVertex, load_vertices_from_ply, write_point_cloud};
pub use types::{CameraIntrinsics, FrameRecord, Phase};
