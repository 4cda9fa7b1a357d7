//! # msgen
//!
//! **msgen** holds the regeneration-safety and extension-point machinery of a
//! microservice scaffolding generator: the parts that let generated CRUD
//! backends and frontends be regenerated over and over without destroying the
//! hand-written business logic layered on top of them.
//!
//! ## Overview
//!
//! A generator run renders templates into a service directory. Before it can
//! render, it has to clear the previous output, and that directory also holds
//! custom code, environment files and lock files. msgen decides what may be
//! erased, erases it, records what the new run produced, and defines the hook
//! contract through which custom code observes and alters generated handlers.
//! Template rendering itself is supplied by the caller.
//!
//! ## Architecture
//!
//! - **[`regen`]** - Protected-path classifier, selective and destructive
//!   deletion, and the delete → render → manifest orchestrator
//! - **[`manifest`]** - Generation manifests recording which files a run wrote
//! - **[`interceptor`]** - The fourteen lifecycle hooks, their registry, and
//!   the pipeline generated controllers use to invoke them
//! - **[`query`]** - Immutable query builder handed to list and read hooks
//! - **[`config`]** - YAML generator configuration
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `msgen` command-line tool
//!
//! ### Regeneration Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Regen as regen::regenerate
//!     participant Delete as regen::selective_delete_with
//!     participant Render as render step
//!     participant Manifest as manifest::write_manifest
//!     participant FS as File System
//!
//!     Caller->>Regen: regenerate(target, request, render)
//!     Regen->>Delete: clear target
//!     Delete->>FS: remove unprotected entries
//!     Note over Delete,FS: src/domain, tests/domain,<br/>.env*, lock files, manifest kept
//!     Regen->>Render: render(target)
//!     Render->>FS: write generated files
//!     Render-->>Regen: Vec<relative path>
//!     Regen->>Manifest: fresh manifest of rendered paths
//!     Manifest->>FS: .generated-manifest.json
//!     Regen-->>Caller: RegenerationReport
//! ```
//!
//! ### Request Flow Through Hooks
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Controller as generated controller
//!     participant Registry as InterceptorRegistry
//!     participant Pipeline as LifecyclePipeline
//!     participant Hooks as custom interceptor
//!     participant DB as data layer
//!
//!     Controller->>Registry: resolve("Employee")
//!     Registry-->>Controller: Arc<Interceptor> (never missing)
//!     Controller->>Pipeline: run(ctx, data, op)
//!     Pipeline->>Hooks: beforeCreate(data, ctx)
//!     alt halt
//!         Hooks-->>Pipeline: { halt, response }
//!         Pipeline-->>Controller: Halted(response)
//!     else continue
//!         Hooks-->>Pipeline: { data }
//!         Pipeline->>DB: op(data)
//!         DB-->>Pipeline: row
//!         Pipeline->>Hooks: afterCreate(row, ctx)
//!         Pipeline-->>Controller: Completed(data)
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use msgen::config::GeneratorConfig;
//! use msgen::regen::{regenerate_with, RegenerationRequest};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = GeneratorConfig::load(Path::new("msgen.yaml"))?.apply_env();
//! let request = RegenerationRequest::Backend(config.manifest_request(Vec::new()));
//!
//! let report = regenerate_with(&config.backend_dir, request, &config.protected_paths(), |root| {
//!     // render templates into `root`, returning the relative paths written
//!     std::fs::create_dir_all(root.join("src/core"))?;
//!     std::fs::write(root.join("src/core/app.js"), "")?;
//!     Ok(vec!["src/core/app.js".to_string()])
//! })?;
//! println!("{} files generated", report.generated_files.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Protected Paths
//!
//! | Kind      | Entries                                                       |
//! |-----------|---------------------------------------------------------------|
//! | Directory | `src/domain`, `tests/domain` (and everything beneath)         |
//! | File name | `.env`, `.env.local`, `.env.production`, `.env.test`,         |
//! |           | `package-lock.json`, `yarn.lock`, `pnpm-lock.yaml`,           |
//! |           | `.generated-manifest.json`                                    |
//!
//! Everything else (`src/core`, `tests/core`, `tests/factories`, `docs`, ...)
//! belongs to the generator and is cleared on every run.

pub mod cli;
pub mod config;
pub mod interceptor;
pub mod logging;
pub mod manifest;
pub mod query;
pub mod regen;

pub use interceptor::{InterceptorRegistry, LifecyclePipeline};
pub use regen::is_protected_path;
