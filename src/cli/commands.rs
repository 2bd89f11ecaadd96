//! Command dispatch
//!
//! One command per process: every verb validates its inputs, short-circuits
//! before any subprocess or session write on failure, and maps every error
//! to exit code 1 through [`CliError`].

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Generator};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config;
use crate::config::Settings;
use crate::domain::artifact_path;
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Some(Commands::ListCells { file }) => list_cells(container, file.as_deref()),
        Some(Commands::Open3dCell { cellname }) => open_3d_cell(container, cellname),
        Some(Commands::ExportGltf { file, layerstack }) => {
            export_gltf(container, file.as_deref(), layerstack)
        }
        Some(Commands::Config { command }) => config_command(container, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            print_completions(*shell, &mut cmd);
            Ok(())
        }
        None => {
            // No verb is not an error: print usage and leave with exit 0.
            Cli::command().print_help().ok();
            Ok(())
        }
    }
}

/// `-f` wins; otherwise fall back to the remembered session file.
fn select_file(container: &ServiceContainer, file: Option<&Path>) -> CliResult<PathBuf> {
    match file {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(container.session.get()?.ok_or(ApplicationError::NoSession)?),
    }
}

#[instrument(skip(container))]
fn list_cells(container: &ServiceContainer, file: Option<&Path>) -> CliResult<()> {
    let input = select_file(container, file)?;
    debug!("listing cells of {}", input.display());

    let library = container.layout.load(&input)?;
    output::info(&library.names().join(" "));

    let stored = container.session.put(&input)?;
    debug!("session updated to {}", stored.display());
    Ok(())
}

#[instrument(skip(container))]
fn open_3d_cell(container: &ServiceContainer, cellname: &str) -> CliResult<()> {
    let cell = cellname.trim();
    if cell.is_empty() {
        return Err(CliError::Usage("cellname must not be empty".into()));
    }

    let input = container.session.get()?.ok_or(ApplicationError::NoSession)?;
    debug!("opening cell {} of {}", cell, input.display());
    container.tools.open_viewer(&input, cell)?;
    Ok(())
}

#[instrument(skip(container))]
fn export_gltf(container: &ServiceContainer, file: Option<&Path>, layerstack: &Path) -> CliResult<()> {
    let input = select_file(container, file)?;
    let stack = container
        .resolver
        .resolve(layerstack, &container.settings.aux_search_dirs())?;
    debug!(
        "exporting {} with layer stack {}",
        input.display(),
        stack.display()
    );

    container.tools.export_gltf(&input, &stack)?;

    // Exporters have been seen exiting 0 without producing output; check
    // before offering an upload of nothing.
    let artifact = artifact_path(&input, &container.settings.exporter.artifact_suffix);
    if !container.fs.is_file(&artifact) {
        return Err(ApplicationError::Artifact { path: artifact }.into());
    }
    output::success(&format!("exported {}", artifact.display()));

    let confirmed = container
        .prompter
        .confirm("Upload the exported file to the server? (y/n):")
        .map_err(|source| ApplicationError::Io {
            context: "cannot read confirmation".into(),
            source,
        })?;
    if !confirmed {
        debug!("upload declined, keeping {}", artifact.display());
        return Ok(());
    }

    container.upload.send(&artifact)?;
    output::success("uploaded to server");
    output::info(&format!("view it at {}", container.upload.browse_url()));
    Ok(())
}

fn config_command(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(container.settings.to_toml()?.trim_end());
            Ok(())
        }
        ConfigCommands::Init { force } => config_init(*force),
        ConfigCommands::Path => {
            match config::global_config_path() {
                Some(path) => output::action("config", &path.display()),
                None => output::warning("no config directory on this platform"),
            }
            output::action("session", &container.settings.session_file.display());
            Ok(())
        }
    }
}

fn config_init(force: bool) -> CliResult<()> {
    let path = config::global_config_path().ok_or_else(|| ApplicationError::Config {
        message: "no config directory on this platform".into(),
    })?;
    if path.exists() && !force {
        return Err(ApplicationError::Config {
            message: format!("{} already exists (use --force to overwrite)", path.display()),
        }
        .into());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ApplicationError::Io {
            context: format!("cannot create {}", parent.display()),
            source,
        })?;
    }
    std::fs::write(&path, Settings::template()).map_err(|source| ApplicationError::Io {
        context: format!("cannot write {}", path.display()),
        source,
    })?;
    output::success(&format!("wrote {}", path.display()));
    Ok(())
}

fn print_completions<G: Generator>(gen: G, cmd: &mut clap::Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
