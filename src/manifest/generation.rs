use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::error::ManifestError;
use super::store::{read_json, write_json};
use crate::regen::ProtectedPaths;

/// File name of every manifest, backend and frontend alike.
pub const MANIFEST_FILE_NAME: &str = ".generated-manifest.json";

/// Manifest format version written by this generator.
pub const MANIFEST_VERSION: &str = "1.0.0";

/// A model as handed to the generator. Only the field definitions' count is
/// kept in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInput {
    pub name: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_defns: Option<Vec<Value>>,
}

impl ModelInput {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            field_defns: None,
        }
    }

    #[must_use]
    pub fn with_fields(mut self, field_defns: Vec<Value>) -> Self {
        self.field_defns = Some(field_defns);
        self
    }
}

/// Input to [`create_generation_manifest`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestRequest {
    pub microservice_id: String,
    pub microservice_name: String,
    #[serde(default)]
    pub models: Vec<ModelInput>,
    #[serde(default)]
    pub generated_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestModel {
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub field_count: usize,
}

/// Provenance record for one backend generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationManifest {
    pub microservice_id: String,
    pub microservice_name: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub models: Vec<ManifestModel>,
    #[serde(default)]
    pub generated_files: Vec<String>,
    #[serde(default)]
    pub protected_paths: Vec<String>,
    pub version: String,
}

impl GenerationManifest {
    /// `true` iff `relative_path` was written by the run this manifest records.
    #[must_use]
    pub fn contains(&self, relative_path: &str) -> bool {
        let wanted = relative_path.replace('\\', "/");
        self.generated_files.iter().any(|f| *f == wanted)
    }
}

/// Build a fresh manifest. Each model's `fieldCount` is the number of field
/// definitions supplied, or 0 when none were. `protectedPaths` is always the
/// canonical protected directory list.
#[must_use]
pub fn create_generation_manifest(request: ManifestRequest) -> GenerationManifest {
    let models = request
        .models
        .into_iter()
        .map(|m| ManifestModel {
            field_count: m.field_defns.as_ref().map_or(0, Vec::len),
            name: m.name,
            id: m.id,
        })
        .collect();

    GenerationManifest {
        microservice_id: request.microservice_id,
        microservice_name: request.microservice_name,
        generated_at: Utc::now(),
        models,
        generated_files: request.generated_files,
        protected_paths: ProtectedPaths::canonical().dir_list(),
        version: MANIFEST_VERSION.to_string(),
    }
}

/// Manifest location for a backend service root.
#[must_use]
pub fn manifest_path(target_dir: &Path) -> PathBuf {
    target_dir.join(MANIFEST_FILE_NAME)
}

/// Persist `manifest` under `target_dir`, replacing any previous manifest.
pub fn write_manifest(target_dir: &Path, manifest: &GenerationManifest) -> Result<(), ManifestError> {
    let path = manifest_path(target_dir);
    write_json(&path, manifest)?;
    info!(
        path = %path.display(),
        service = %manifest.microservice_id,
        files = manifest.generated_files.len(),
        "generation manifest written"
    );
    Ok(())
}

/// Load the manifest under `target_dir`; `Ok(None)` when none exists yet.
pub fn read_manifest(target_dir: &Path) -> Result<Option<GenerationManifest>, ManifestError> {
    read_json(&manifest_path(target_dir))
}

/// Whether `relative_path` is listed in the manifest under `target_dir`.
///
/// A missing manifest answers `Ok(false)`. A manifest that exists but cannot
/// be read or parsed is returned as an error, never reported as "not generated".
pub fn is_generated_file(target_dir: &Path, relative_path: &str) -> Result<bool, ManifestError> {
    Ok(read_manifest(target_dir)?.is_some_and(|manifest| manifest.contains(relative_path)))
}
