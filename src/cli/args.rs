//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Session-based front end for GDSII layouts: list cells, open them in a
/// 3D viewer, export to glTF
#[derive(Parser, Debug)]
#[command(name = "gdst")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more detail)
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

// The verb names predate this implementation and use underscores, which
// clap's automatic kebab-case renaming would break; hence explicit names.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the cell names of a layout file and remember the file
    #[command(name = "list_cells", visible_alias = "lc")]
    ListCells {
        /// Layout file (defaults to the remembered one)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Open a cell from the remembered layout in the 3D viewer
    #[command(name = "open_3d_cell", visible_alias = "ocv")]
    Open3dCell {
        /// Cell name, as printed by list_cells
        #[arg(short, long)]
        cellname: String,
    },

    /// Export a layout to glTF and optionally upload the result
    #[command(name = "export_gltf", visible_alias = "eg")]
    ExportGltf {
        /// Layout file (defaults to the remembered one)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,

        /// Layer stack file; bare names are searched in the share directory
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        layerstack: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
