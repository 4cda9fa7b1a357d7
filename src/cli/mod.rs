//! # CLI Module
//!
//! Command-line access to the regeneration machinery, for scripts and for
//! inspecting a generated service by hand.
//!
//! ## Commands
//!
//! ### `classify`
//!
//! Report whether paths survive regeneration:
//!
//! ```bash
//! msgen classify src/domain/orders/service.js src/core/app.js
//! ```
//!
//! ### `clean`
//!
//! Clear a generated directory, keeping protected paths:
//!
//! ```bash
//! msgen clean --dir out/hr --dry-run
//! msgen clean --dir out/hr --config msgen.yaml
//! msgen clean --dir tests/fixtures/scratch --destructive
//! ```
//!
//! Options:
//! - `--dry-run` - Print what would be removed without touching disk
//! - `--destructive` - Ignore protection entirely (fixtures only)
//! - `--config <FILE>` - Honour the config's extra protected files
//!
//! ### `manifest`
//!
//! ```bash
//! msgen manifest write --config msgen.yaml --files src/core/app.js,src/core/routes.js
//! msgen manifest show --dir out/hr
//! msgen manifest show --dir out/hr-web --frontend
//! ```
//!
//! ### `is-generated`
//!
//! ```bash
//! msgen is-generated --dir out/hr --path src/core/app.js
//! ```
//!
//! ## Logging
//!
//! Logs go to stderr and are configured through `MSGEN_LOG_*`; see
//! [`crate::logging`].

mod commands;


pub use commands::{execute, run_cli, Cli, Commands, ManifestCommands};
