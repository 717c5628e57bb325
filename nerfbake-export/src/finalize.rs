//! Dataset archiving once rendering is done
//!
//! [`try_finalize`] is shared by the end of an export and by the render completion handler.
//! Whichever runs while no render is in flight and the dataset directory still exists zips the
//! directory into `<dir>.zip` and removes it; every later call is a no-op.

use crate::error::ExportError;
use crate::render::RenderJobState;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Result of a finalization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// The directory was compressed to this archive and removed.
    Archived(PathBuf),
    /// A render phase is still in flight; the completion handler will retry.
    Deferred,
    /// Nothing to archive: the directory is gone, most likely already archived.
    Missing,
}

/// `<output_path>.zip`
pub fn archive_path(output_path: &Path) -> PathBuf {
    let mut path = OsString::from(output_path.as_os_str());
    path.push(".zip");
    PathBuf::from(path)
}

/// Archive `output_path` if no render is in flight and the directory exists.
#[tracing::instrument(skip_all, fields(path = %output_path.display()))]
pub fn try_finalize(jobs: &RenderJobState, output_path: &Path) -> Result<FinalizeOutcome, ExportError> {
    if jobs.any() {
        debug!("Render in flight {:?}, deferring archive", jobs.as_tuple());
        return Ok(FinalizeOutcome::Deferred);
    }
    if !output_path.is_dir() {
        debug!("Nothing to archive");
        return Ok(FinalizeOutcome::Missing);
    }

    let archive = archive_path(output_path);
    let entries = match zip_directory(output_path, &archive) {
        Ok(entries) => entries,
        Err(err) => {
            if let Err(cleanup) = fs::remove_file(&archive) {
                debug!("Could not remove partial archive {}: {}", archive.display(), cleanup);
            }
            return Err(err);
        }
    };
    fs::remove_dir_all(output_path)?;

    info!("Archived {} entries to {}", entries, archive.display());
    Ok(FinalizeOutcome::Archived(archive))
}

/// Write every file and directory below `root` into a zip at `dest`, with paths relative to
/// `root`. Returns the number of entries written. Symlinked directories are not followed.
fn zip_directory(root: &Path, dest: &Path) -> Result<usize, ExportError> {
    let mut zip = ZipWriter::new(BufWriter::new(File::create(dest)?));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut entries = 0;
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let mut children = fs::read_dir(&dir)?
            .map(|entry| entry.and_then(|e| Ok((e.path(), e.file_type()?))))
            .collect::<Result<Vec<_>, io::Error>>()?;
        children.sort_by(|a, b| a.0.cmp(&b.0));

        for (path, file_type) in children {
            let name = entry_name(root, &path);
            if file_type.is_dir() {
                zip.add_directory(format!("{name}/"), options)?;
                stack.push(path);
            } else if file_type.is_symlink() && path.is_dir() {
                debug!("Skipping symlinked directory {}", path.display());
                continue;
            } else {
                zip.start_file(name, options)?;
                io::copy(&mut File::open(&path)?, &mut zip)?;
            }
            entries += 1;
        }
    }

    zip.finish()?;
    Ok(entries)
}

fn entry_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
