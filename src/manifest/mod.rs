//! # Generation Manifest Module
//!
//! A manifest records what a generation run produced so later tooling can ask
//! "did the generator write this file?" without guessing from paths.
//!
//! ## Locations
//!
//! | Target   | Manifest path                                   |
//! |----------|-------------------------------------------------|
//! | Backend  | `<service root>/.generated-manifest.json`       |
//! | Frontend | `<frontend root>/src/core/.generated-manifest.json` |
//!
//! Both files carry the protected name `.generated-manifest.json`, so a
//! selective delete of the target never removes the previous manifest; the
//! next generation run overwrites it instead.
//!
//! ## Read semantics
//!
//! A missing manifest is not an error: readers return `Ok(None)` and
//! [`is_generated_file`] answers `Ok(false)`. A manifest that exists but cannot
//! be parsed is [`ManifestError::Malformed`] from every reader, membership
//! queries included, so a corrupt file is never mistaken for "not generated".
//!
//! ## Example
//!
//! ```rust,no_run
//! use msgen::manifest::{create_generation_manifest, write_manifest, ManifestRequest, ModelInput};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), msgen::manifest::ManifestError> {
//! let manifest = create_generation_manifest(ManifestRequest {
//!     microservice_id: "svc-1".into(),
//!     microservice_name: "HR".into(),
//!     models: vec![ModelInput::new("Employee", "m1")],
//!     generated_files: vec!["src/core/controllers/employee.js".into()],
//! });
//! write_manifest(Path::new("out/hr"), &manifest)?;
//! # Ok(())
//! # }
//! ```

mod error;
mod frontend;
mod generation;
mod store;

pub use error::ManifestError;
pub use frontend::{
    create_frontend_manifest, is_frontend_generated_file, read_frontend_manifest,
    write_frontend_manifest, FrontendManifest, FrontendManifestRequest,
    FRONTEND_MANIFEST_PATH,
};
pub use generation::{
    create_generation_manifest, is_generated_file, manifest_path, read_manifest, write_manifest,
    GenerationManifest, ManifestModel, ManifestRequest, ModelInput, MANIFEST_FILE_NAME,
    MANIFEST_VERSION,
};
