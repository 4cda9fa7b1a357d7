use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ManifestError;
use super::generation::MANIFEST_VERSION;
use super::store::{read_json, write_json};
use crate::regen::ProtectedPaths;

/// Manifest location relative to a frontend root.
pub const FRONTEND_MANIFEST_PATH: &str = "src/core/.generated-manifest.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendManifestRequest {
    pub microservice_id: String,
    pub microservice_name: String,
    #[serde(default)]
    pub generated_files: Vec<String>,
}

/// Frontend provenance record. Same contract as the backend manifest but with
/// no per-model metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendManifest {
    pub microservice_id: String,
    pub microservice_name: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub generated_files: Vec<String>,
    #[serde(default)]
    pub protected_paths: Vec<String>,
    pub version: String,
}

#[must_use]
pub fn create_frontend_manifest(request: FrontendManifestRequest) -> FrontendManifest {
    FrontendManifest {
        microservice_id: request.microservice_id,
        microservice_name: request.microservice_name,
        generated_at: Utc::now(),
        generated_files: request.generated_files,
        protected_paths: ProtectedPaths::canonical().dir_list(),
        version: MANIFEST_VERSION.to_string(),
    }
}

fn frontend_manifest_path(frontend_dir: &Path) -> PathBuf {
    frontend_dir.join(FRONTEND_MANIFEST_PATH)
}

pub fn write_frontend_manifest(
    frontend_dir: &Path,
    manifest: &FrontendManifest,
) -> Result<(), ManifestError> {
    let path = frontend_manifest_path(frontend_dir);
    write_json(&path, manifest)?;
    info!(
        path = %path.display(),
        files = manifest.generated_files.len(),
        "frontend manifest written"
    );
    Ok(())
}

pub fn read_frontend_manifest(frontend_dir: &Path) -> Result<Option<FrontendManifest>, ManifestError> {
    read_json(&frontend_manifest_path(frontend_dir))
}

/// Frontend counterpart of [`is_generated_file`](super::is_generated_file).
pub fn is_frontend_generated_file(
    frontend_dir: &Path,
    relative_path: &str,
) -> Result<bool, ManifestError> {
    let wanted = relative_path.replace('\\', "/");
    Ok(read_frontend_manifest(frontend_dir)?
        .is_some_and(|manifest| manifest.generated_files.iter().any(|f| *f == wanted)))
}
