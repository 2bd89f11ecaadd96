//! Infrastructure-level errors: driver and transport failures

use std::path::PathBuf;

use thiserror::Error;

/// Failures of the layout driver while probing or reading a file.
///
/// `Malformed` carries the stream offset and a reason instead of a bare
/// driver code, so a bad file can be diagnosed without re-running under a
/// debugger.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed GDSII stream in {} at byte {offset}: {reason}", path.display())]
    Malformed {
        path: PathBuf,
        offset: u64,
        reason: String,
    },
}

/// Failures of the artifact upload transport.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("cannot read artifact: {source}")]
    File {
        #[source]
        source: std::io::Error,
    },

    #[error("network error: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    #[error("server rejected upload: HTTP {status}")]
    Rejected { status: u16 },
}
