//! Results directory preparation and history carry-over.
//!
//! Allure draws its trend charts from the `history/` folder of the previous
//! report. Copying it into the fresh results directory before generation
//! keeps those trends continuous across runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PathsConfig;
use crate::error::{ConfigureError, IoResultExt, Result};

/// What the history step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum HistoryOutcome {
    /// No previous report history exists.
    Skipped,
    Copied { files: u64, dirs: u64, bytes: u64 },
}

#[derive(Debug, Default, Clone, Copy)]
struct CopyStats {
    files: u64,
    dirs: u64,
    bytes: u64,
}

/// Create the results root (and any missing parents). Returns `true` when it
/// did not exist before.
pub fn ensure_results_dir(paths: &PathsConfig) -> Result<bool> {
    let dir = &paths.results_dir;
    if dir.is_dir() {
        return Ok(false);
    }
    info!(path = %dir.display(), "Creating new report directory");
    fs::create_dir_all(dir).at_path(dir)?;
    Ok(true)
}

/// Copy the previous report's history into the results directory.
///
/// Missing history is not an error. Files already present in the destination
/// are overwritten; anything else there is left alone.
pub fn copy_history(paths: &PathsConfig) -> Result<HistoryOutcome> {
    let source = paths.report_history_dir();
    if !source.exists() {
        debug!(path = %source.display(), "no previous report history");
        return Ok(HistoryOutcome::Skipped);
    }
    if !source.is_dir() {
        return Err(ConfigureError::io(
            &source,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "report history path is not a directory",
            ),
        ));
    }

    let dest = paths.results_history_dir();
    let mut stats = CopyStats::default();
    copy_dir_recursive(&source, &dest, &mut stats, &mut Vec::new())?;

    info!(
        from = %source.display(),
        to = %dest.display(),
        files = stats.files,
        bytes = stats.bytes,
        "Copied history to results directory"
    );
    Ok(HistoryOutcome::Copied {
        files: stats.files,
        dirs: stats.dirs,
        bytes: stats.bytes,
    })
}

/// Recursively copy `src` into `dst`, following symlinks.
///
/// `ancestors` holds the canonical paths of the directories being copied; a
/// symlinked directory pointing back into that chain is skipped.
fn copy_dir_recursive(
    src: &Path,
    dst: &Path,
    stats: &mut CopyStats,
    ancestors: &mut Vec<PathBuf>,
) -> Result<()> {
    ancestors.push(fs::canonicalize(src).at_path(src)?);
    fs::create_dir_all(dst).at_path(dst)?;
    stats.dirs += 1;

    for entry in fs::read_dir(src).at_path(src)? {
        let entry = entry.at_path(src)?;
        let path = entry.path();
        let dest_path = dst.join(entry.file_name());
        let metadata = fs::metadata(&path).at_path(&path)?;

        if metadata.is_dir() {
            let target = fs::canonicalize(&path).at_path(&path)?;
            if ancestors.contains(&target) {
                warn!(path = %path.display(), "skipping symlink cycle in report history");
                continue;
            }
            copy_dir_recursive(&path, &dest_path, stats, ancestors)?;
        } else {
            stats.bytes += fs::copy(&path, &dest_path).at_path(&dest_path)?;
            stats.files += 1;
            preserve_mtime(&metadata, &dest_path)?;
        }
    }

    ancestors.pop();
    Ok(())
}

fn preserve_mtime(src_meta: &fs::Metadata, dest: &Path) -> Result<()> {
    let Ok(modified) = src_meta.modified() else {
        return Ok(());
    };
    let file = fs::OpenOptions::new()
        .write(true)
        .open(dest)
        .at_path(dest)?;
    file.set_modified(modified).at_path(dest)
}
