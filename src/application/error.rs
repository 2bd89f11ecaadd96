//! Application-level errors (wraps driver and transport errors)

use std::io;
use std::path::PathBuf;

use itertools::Itertools;
use thiserror::Error;

use crate::domain::ToolInvocation;
use crate::infrastructure::{DriverError, UploadError};

/// Application errors add orchestration context to the typed failures of
/// the layers below. Every variant maps to exit code 1 at the CLI.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("no layout file selected; run list_cells first")]
    NoSession,

    #[error("cannot load layout {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: DriverError,
    },

    #[error("auxiliary file {} does not exist (tried: {})", name.display(), candidate_list(searched))]
    AuxNotFound {
        name: PathBuf,
        searched: Vec<PathBuf>,
    },

    #[error("command failed: {invocation}{}", exit_label(code))]
    Tool {
        invocation: ToolInvocation,
        code: Option<i32>,
    },

    #[error("{program} not found; check that it is installed and on PATH")]
    ToolMissing { program: String },

    #[error("cannot upload {}: {source}", artifact.display())]
    Upload {
        artifact: PathBuf,
        #[source]
        source: UploadError,
    },

    #[error("exporter reported success but {} was not produced", path.display())]
    Artifact { path: PathBuf },

    #[error("session store: {context}: {source}")]
    Session {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

fn candidate_list(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).join(", ")
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" (exit code {code})"),
        None => " (terminated by signal)".to_string(),
    }
}
