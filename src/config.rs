//! # Configuration Module
//!
//! YAML description of one generated microservice: where its backend and
//! frontend live, its identity, its models and any extra protected files.
//!
//! ```yaml
//! backend_dir: out/hr/backend
//! frontend_dir: out/hr/frontend
//! microservice_id: svc-1
//! microservice_name: HR
//! models:
//!   - name: Employee
//!     id: m1
//!     fieldDefns:
//!       - { name: firstName }
//!       - { name: lastName }
//! extra_protected_files:
//!   - LICENSE
//! ```
//!
//! ## Environment Variables
//!
//! - `MSGEN_BACKEND_DIR` overrides `backend_dir`
//! - `MSGEN_FRONTEND_DIR` overrides `frontend_dir`
//!
//! Extra protected files only ever add to the canonical set; the protected
//! directories `src/domain` and `tests/domain` cannot be changed here.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::manifest::{FrontendManifestRequest, ManifestRequest, ModelInput};
use crate::regen::ProtectedPaths;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub backend_dir: PathBuf,
    #[serde(default)]
    pub frontend_dir: Option<PathBuf>,
    pub microservice_id: String,
    pub microservice_name: String,
    #[serde(default)]
    pub models: Vec<ModelInput>,
    #[serde(default)]
    pub extra_protected_files: Vec<String>,
}

impl GeneratorConfig {
    /// Read and parse the YAML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        if config.microservice_id.trim().is_empty() {
            anyhow::bail!("microservice_id must not be empty");
        }
        Ok(config)
    }

    /// Apply `MSGEN_BACKEND_DIR` / `MSGEN_FRONTEND_DIR` overrides.
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// [`GeneratorConfig::apply_env`] against an arbitrary variable source.
    #[must_use]
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("MSGEN_BACKEND_DIR").filter(|s| !s.is_empty()) {
            self.backend_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("MSGEN_FRONTEND_DIR").filter(|s| !s.is_empty()) {
            self.frontend_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// The canonical protected set plus `extra_protected_files`.
    #[must_use]
    pub fn protected_paths(&self) -> ProtectedPaths {
        ProtectedPaths::canonical().with_extra_files(&self.extra_protected_files)
    }

    #[must_use]
    pub fn manifest_request(&self, generated_files: Vec<String>) -> ManifestRequest {
        ManifestRequest {
            microservice_id: self.microservice_id.clone(),
            microservice_name: self.microservice_name.clone(),
            models: self.models.clone(),
            generated_files,
        }
    }

    #[must_use]
    pub fn frontend_request(&self, generated_files: Vec<String>) -> FrontendManifestRequest {
        FrontendManifestRequest {
            microservice_id: self.microservice_id.clone(),
            microservice_name: self.microservice_name.clone(),
            generated_files,
        }
    }
}
