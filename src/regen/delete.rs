use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::protected::ProtectedPaths;

/// What a deletion pass removed (or, for a plan, would remove).
///
/// Paths are relative to the root that was cleared and use `/` separators.
/// Removed files and directories are listed in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub files_removed: Vec<String>,
    pub dirs_removed: Vec<String>,
    /// Protected entries left in place. A protected directory appears once;
    /// its contents are never visited.
    pub protected_skipped: Vec<String>,
}

impl DeletionReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files_removed.is_empty() && self.dirs_removed.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Execute,
    Plan,
}

fn relative(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Every proper ancestor of a `/`-separated relative path.
fn ancestors(rel: &str) -> impl Iterator<Item = &str> {
    rel.match_indices('/').map(move |(i, _)| &rel[..i])
}

fn run(
    root: &Path,
    protected: Option<&ProtectedPaths>,
    mode: Mode,
) -> anyhow::Result<DeletionReport> {
    if !root.is_dir() {
        debug!(root = %root.display(), "nothing to clear, directory does not exist");
        return Ok(DeletionReport::default());
    }

    let mut report = DeletionReport::default();

    // Pre-order pass. Protected entries are pruned here, so the walk never
    // descends into a protected directory.
    let mut entries = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let rel = relative(root, entry.path());
            if protected.is_some_and(|p| p.is_protected(&rel)) {
                debug!(path = %rel, "keeping protected path");
                report.protected_skipped.push(rel);
                return false;
            }
            true
        });
    for entry in walker {
        let entry =
            entry.with_context(|| format!("failed to walk directory {}", root.display()))?;
        entries.push(entry);
    }

    let kept: HashSet<&str> = report
        .protected_skipped
        .iter()
        .flat_map(|rel| ancestors(rel))
        .collect();

    // Reversed pre-order visits children before their parent, so a directory
    // is already empty by the time it is reached.
    let mut files_removed = Vec::new();
    let mut dirs_removed = Vec::new();
    for entry in entries.iter().rev() {
        let path = entry.path();
        let rel = relative(root, path);
        if entry.file_type().is_dir() {
            if kept.contains(rel.as_str()) {
                continue;
            }
            if mode == Mode::Execute {
                fs::remove_dir(path)
                    .with_context(|| format!("failed to remove directory {}", path.display()))?;
                debug!(path = %rel, "removed directory");
            }
            dirs_removed.push(rel);
        } else {
            if mode == Mode::Execute {
                fs::remove_file(path)
                    .with_context(|| format!("failed to remove file {}", path.display()))?;
            }
            files_removed.push(rel);
        }
    }

    files_removed.sort();
    dirs_removed.sort();
    report.files_removed = files_removed;
    report.dirs_removed = dirs_removed;
    Ok(report)
}

/// Delete everything under `root` except protected paths.
///
/// The root itself is kept. Protected entries are skipped whole: the walk
/// never descends into `src/domain` or `tests/domain`. Unprotected
/// directories are cleared and then removed if nothing protected remains in
/// them. A missing `root` is a no-op.
///
/// Filesystem errors abort the walk and are returned; whatever was removed
/// before the failure stays removed, so callers should re-list before retrying.
pub fn selective_delete_dir_contents(root: &Path) -> anyhow::Result<DeletionReport> {
    selective_delete_with(root, &ProtectedPaths::canonical())
}

/// [`selective_delete_dir_contents`] with a caller-supplied protected set.
pub fn selective_delete_with(
    root: &Path,
    protected: &ProtectedPaths,
) -> anyhow::Result<DeletionReport> {
    let report = run(root, Some(protected), Mode::Execute)?;
    info!(
        root = %root.display(),
        files = report.files_removed.len(),
        dirs = report.dirs_removed.len(),
        protected = report.protected_skipped.len(),
        "selective delete finished"
    );
    Ok(report)
}

/// Report what [`selective_delete_with`] would remove, without touching disk.
pub fn plan_selective_delete(
    root: &Path,
    protected: &ProtectedPaths,
) -> anyhow::Result<DeletionReport> {
    run(root, Some(protected), Mode::Plan)
}

/// Delete everything under `root` with no protection at all.
///
/// Only safe on trees known to hold no hand-written code, such as test
/// fixtures. A missing `root` is a no-op.
pub fn delete_dir_contents_if_exists(root: &Path) -> anyhow::Result<DeletionReport> {
    let report = run(root, None, Mode::Execute)?;
    info!(
        root = %root.display(),
        files = report.files_removed.len(),
        dirs = report.dirs_removed.len(),
        "destructive delete finished"
    );
    Ok(report)
}

