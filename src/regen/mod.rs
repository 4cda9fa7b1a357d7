//! # Regeneration Module
//!
//! Decides what a regeneration run may erase, and erases it.
//!
//! ## Overview
//!
//! A generated service is regenerated many times over its life. Between runs,
//! developers add hand-written business logic, environment files and lock
//! files. Regeneration clears the output directory before rendering, so it must
//! know which of those paths to leave alone:
//!
//! ```text
//! service/
//! ├── .env                       # protected (file name)
//! ├── .generated-manifest.json   # protected (file name)
//! ├── package-lock.json          # protected (file name)
//! ├── src/
//! │   ├── core/                  # regenerated
//! │   └── domain/                # protected (directory)
//! ├── tests/
//! │   ├── core/                  # regenerated
//! │   ├── factories/             # regenerated
//! │   └── domain/                # protected (directory)
//! └── docs/                      # regenerated
//! ```
//!
//! ## Operations
//!
//! - [`is_protected_path`] - pure classifier over relative paths
//! - [`selective_delete_dir_contents`] - clear a root, keeping protected paths
//! - [`plan_selective_delete`] - the same walk without touching disk
//! - [`delete_dir_contents_if_exists`] - clear a root with no protection
//! - [`regenerate`] - delete, render, then record a fresh manifest
//!
//! ## Usage
//!
//! ```rust,no_run
//! use msgen::manifest::ManifestRequest;
//! use msgen::regen::{regenerate, RegenerationRequest};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let request = RegenerationRequest::Backend(ManifestRequest {
//!     microservice_id: "svc-1".into(),
//!     microservice_name: "HR".into(),
//!     ..Default::default()
//! });
//! let report = regenerate(Path::new("out/hr"), request, |root| {
//!     std::fs::create_dir_all(root.join("src/core"))?;
//!     std::fs::write(root.join("src/core/index.js"), "module.exports = {};\n")?;
//!     Ok(vec!["src/core/index.js".to_string()])
//! })?;
//! println!("removed {} files", report.deletion.files_removed.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure behavior
//!
//! Deletion stops at the first filesystem error and returns it with the path
//! attached. Nothing is rolled back; a retry simply walks what is left.

mod delete;
mod protected;
mod run;


pub use delete::{
    delete_dir_contents_if_exists, plan_selective_delete, selective_delete_dir_contents,
    selective_delete_with, DeletionReport,
};
pub use protected::{is_protected_path, ProtectedPaths, PROTECTED_DIRS, PROTECTED_FILES};
pub use run::{regenerate, regenerate_with, RegenerationReport, RegenerationRequest};
