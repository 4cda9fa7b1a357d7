use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::GeneratorConfig;
use crate::logging::{init_logging, LogConfig};
use crate::manifest::{
    create_frontend_manifest, create_generation_manifest, is_frontend_generated_file,
    is_generated_file, read_frontend_manifest, read_manifest, write_frontend_manifest,
    write_manifest,
};
use crate::regen::{
    delete_dir_contents_if_exists, is_protected_path, plan_selective_delete,
    selective_delete_with, DeletionReport, ProtectedPaths,
};

/// Command-line interface for msgen
///
/// Inspects and maintains the regeneration state of generated microservices.
#[derive(Parser)]
#[command(name = "msgen")]
#[command(about = "Microservice generator regeneration tools", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report whether each path survives regeneration
    Classify {
        /// Paths relative to a service root
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Clear a generated directory ahead of regeneration
    Clean {
        /// Root of the generated service
        #[arg(short, long)]
        dir: PathBuf,

        /// Show what would be removed without touching the filesystem
        #[arg(long, default_value_t = false, conflicts_with = "destructive")]
        dry_run: bool,

        /// Remove everything, protected paths included (fixtures only)
        #[arg(long, default_value_t = false)]
        destructive: bool,

        /// Generator config whose extra protected files should be honoured
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write or inspect generation manifests
    Manifest {
        #[command(subcommand)]
        command: ManifestCommands,
    },
    /// Ask the manifest whether a file was generated
    IsGenerated {
        /// Root of the generated service (or frontend)
        #[arg(short, long)]
        dir: PathBuf,

        /// Path relative to the root
        #[arg(short, long)]
        path: String,

        /// Use the frontend manifest location
        #[arg(long, default_value_t = false)]
        frontend: bool,
    },
}

#[derive(Subcommand)]
pub enum ManifestCommands {
    /// Record a manifest for the directories named in a generator config
    Write {
        /// Generator config (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Generated files, relative to the target root (comma-separated or repeated)
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        files: Vec<String>,

        /// Write the frontend manifest instead of the backend one
        #[arg(long, default_value_t = false)]
        frontend: bool,
    },
    /// Print a manifest as JSON
    Show {
        #[arg(short, long)]
        dir: PathBuf,

        #[arg(long, default_value_t = false)]
        frontend: bool,
    },
}

/// Parse arguments, set up logging and execute the command
///
/// # Errors
///
/// Returns an error if the command fails; see [`execute`].
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&LogConfig::from_env()) {
        eprintln!("Warning: {e:#}");
    }
    let stdout = std::io::stdout();
    execute(&cli, &mut stdout.lock())
}

/// Execute `cli`, writing command output to `out`
///
/// # Errors
///
/// Returns an error if:
/// - A config file cannot be read or parsed
/// - A deletion walk hits a filesystem error
/// - A manifest cannot be written, or exists but is malformed
pub fn execute(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Classify { paths } => {
            for path in paths {
                let class = if is_protected_path(path) {
                    "protected"
                } else {
                    "regenerated"
                };
                writeln!(out, "{class}\t{path}")?;
            }
        }
        Commands::Clean {
            dir,
            dry_run,
            destructive,
            config,
        } => {
            let report = if *destructive {
                delete_dir_contents_if_exists(dir)?
            } else {
                let protected = match config {
                    Some(path) => GeneratorConfig::load(path)?.protected_paths(),
                    None => ProtectedPaths::canonical(),
                };
                if *dry_run {
                    plan_selective_delete(dir, &protected)?
                } else {
                    selective_delete_with(dir, &protected)?
                }
            };
            print_report(out, &report, *dry_run)?;
        }
        Commands::Manifest { command } => match command {
            ManifestCommands::Write {
                config,
                files,
                frontend,
            } => write_from_config(out, config, files, *frontend)?,
            ManifestCommands::Show { dir, frontend } => {
                let body = if *frontend {
                    read_frontend_manifest(dir)?
                        .map(|m| serde_json::to_string_pretty(&m))
                        .transpose()?
                } else {
                    read_manifest(dir)?
                        .map(|m| serde_json::to_string_pretty(&m))
                        .transpose()?
                };
                match body {
                    Some(body) => writeln!(out, "{body}")?,
                    None => writeln!(out, "no manifest under {}", dir.display())?,
                }
            }
        },
        Commands::IsGenerated {
            dir,
            path,
            frontend,
        } => {
            let generated = if *frontend {
                is_frontend_generated_file(dir, path)?
            } else {
                is_generated_file(dir, path)?
            };
            writeln!(out, "{generated}")?;
        }
    }
    Ok(())
}

fn write_from_config(
    out: &mut dyn Write,
    config: &Path,
    files: &[String],
    frontend: bool,
) -> anyhow::Result<()> {
    let config = GeneratorConfig::load(config)?.apply_env();
    let files = files.to_vec();
    if frontend {
        let dir = config
            .frontend_dir
            .clone()
            .context("config has no frontend_dir")?;
        let manifest = create_frontend_manifest(config.frontend_request(files));
        write_frontend_manifest(&dir, &manifest)?;
        writeln!(
            out,
            "wrote frontend manifest ({} files) under {}",
            manifest.generated_files.len(),
            dir.display()
        )?;
    } else {
        let manifest = create_generation_manifest(config.manifest_request(files));
        write_manifest(&config.backend_dir, &manifest)?;
        writeln!(
            out,
            "wrote manifest ({} files, {} models) under {}",
            manifest.generated_files.len(),
            manifest.models.len(),
            config.backend_dir.display()
        )?;
    }
    Ok(())
}

fn print_report(out: &mut dyn Write, report: &DeletionReport, dry_run: bool) -> anyhow::Result<()> {
    let verb = if dry_run { "would remove" } else { "removed" };
    for file in &report.files_removed {
        writeln!(out, "{verb} {file}")?;
    }
    for dir in &report.dirs_removed {
        writeln!(out, "{verb} {dir}/")?;
    }
    for kept in &report.protected_skipped {
        writeln!(out, "kept {kept}")?;
    }
    writeln!(
        out,
        "{} files, {} directories {verb}; {} protected",
        report.files_removed.len(),
        report.dirs_removed.len(),
        report.protected_skipped.len()
    )?;
    Ok(())
}
