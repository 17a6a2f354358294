//! Input discovery: one work item per regular file under the input directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::exclude::ExcludeRules;
use super::{BatchError, WorkItem};

/// Walk `in_dir` in file-name order and map every file to its output path
/// under `out_dir`. Files under `out_dir` itself are never picked up.
pub fn discover(
    in_dir: &Path,
    out_dir: &Path,
    exclude: &ExcludeRules,
) -> Result<Vec<WorkItem>, BatchError> {
    let skip = output_prefix(in_dir, out_dir);
    let mut items = Vec::new();

    for entry in WalkDir::new(in_dir)
        .follow_links(true)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        let entry = entry.map_err(|source| BatchError::Discover {
            path: in_dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(rel_path) = entry.path().strip_prefix(in_dir) else {
            continue;
        };
        if skip.as_deref().is_some_and(|prefix| rel_path.starts_with(prefix)) {
            continue;
        }
        if exclude.is_excluded(rel_path) {
            debug!(path = %rel_path.display(), "excluded");
            continue;
        }

        items.push(WorkItem {
            index: items.len(),
            from: entry.path().to_path_buf(),
            to: out_dir.join(rel_path),
        });
    }

    Ok(items)
}

/// `out_dir` relative to `in_dir`, when it lies inside it.
fn output_prefix(in_dir: &Path, out_dir: &Path) -> Option<PathBuf> {
    if let (Ok(input), Ok(output)) = (fs::canonicalize(in_dir), fs::canonicalize(out_dir)) {
        return output.strip_prefix(&input).ok().map(Path::to_path_buf);
    }
    out_dir.strip_prefix(in_dir).ok().map(Path::to_path_buf)
}
