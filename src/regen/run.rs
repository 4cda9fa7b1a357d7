use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use super::delete::{selective_delete_with, DeletionReport};
use super::protected::ProtectedPaths;
use crate::manifest::{
    create_frontend_manifest, create_generation_manifest, write_frontend_manifest,
    write_manifest, FrontendManifestRequest, ManifestRequest,
};

/// Which manifest a regeneration records, with its provenance fields.
///
/// `generated_files` in either request is ignored: the manifest lists exactly
/// what the render step reports.
#[derive(Debug, Clone)]
pub enum RegenerationRequest {
    Backend(ManifestRequest),
    Frontend(FrontendManifestRequest),
}

impl RegenerationRequest {
    fn kind(&self) -> &'static str {
        match self {
            RegenerationRequest::Backend(_) => "backend",
            RegenerationRequest::Frontend(_) => "frontend",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegenerationReport {
    pub deletion: DeletionReport,
    /// Paths recorded in the fresh manifest, relative to the target root.
    pub generated_files: Vec<String>,
}

/// Clear `target`, render into it, and record what was rendered.
///
/// Runs three steps in order:
///
/// 1. [`selective_delete_with`] using `protected`;
/// 2. `render(target)`, which writes the new files and returns their paths
///    relative to `target`;
/// 3. a fresh manifest listing exactly those paths.
///
/// Rendered paths that are protected are left out of the manifest, since
/// regeneration must never claim hand-written files. Two regenerations of the
/// same target must not overlap; that is up to the caller.
pub fn regenerate_with<R>(
    target: &Path,
    request: RegenerationRequest,
    protected: &ProtectedPaths,
    render: R,
) -> anyhow::Result<RegenerationReport>
where
    R: FnOnce(&Path) -> anyhow::Result<Vec<String>>,
{
    let kind = request.kind();
    let deletion = selective_delete_with(target, protected)?;

    let rendered = render(target)
        .with_context(|| format!("render step failed for {}", target.display()))?;

    let mut generated_files: Vec<String> = Vec::with_capacity(rendered.len());
    for path in rendered {
        let path = path.replace('\\', "/");
        if protected.is_protected(&path) {
            warn!(path = %path, "render produced a protected path; not recording it");
            continue;
        }
        if !generated_files.contains(&path) {
            generated_files.push(path);
        }
    }

    match request {
        RegenerationRequest::Backend(request) => {
            let manifest = create_generation_manifest(ManifestRequest {
                generated_files: generated_files.clone(),
                ..request
            });
            write_manifest(target, &manifest)?;
        }
        RegenerationRequest::Frontend(request) => {
            let manifest = create_frontend_manifest(FrontendManifestRequest {
                generated_files: generated_files.clone(),
                ..request
            });
            write_frontend_manifest(target, &manifest)?;
        }
    }

    info!(
        target = %target.display(),
        kind,
        removed = deletion.files_removed.len(),
        generated = generated_files.len(),
        "regeneration finished"
    );
    Ok(RegenerationReport {
        deletion,
        generated_files,
    })
}

/// [`regenerate_with`] using the canonical protected set.
pub fn regenerate<R>(
    target: &Path,
    request: RegenerationRequest,
    render: R,
) -> anyhow::Result<RegenerationReport>
where
    R: FnOnce(&Path) -> anyhow::Result<Vec<String>>,
{
    regenerate_with(target, request, &ProtectedPaths::canonical(), render)
}
