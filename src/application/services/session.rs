//! Session persistence across invocations

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::infrastructure::traits::FileSystem;

/// Records the last successfully listed layout file so later commands can
/// omit `-f`.
///
/// One file per user, shared by every invocation. There is no locking; the
/// write is atomic so readers never see a torn value, but the last writer
/// wins. The stored path is not re-checked on read, so a layout deleted
/// after listing surfaces as a load error at next use.
pub struct SessionStore {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl SessionStore {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Persist `path` as the current layout, normalized to an absolute
    /// path. Nothing is stored when normalization fails.
    pub fn put(&self, path: &Path) -> ApplicationResult<PathBuf> {
        let slot = &self.settings.session_file;
        let absolute = self.fs.canonicalize(path).map_err(|source| session_err(
            format!("cannot resolve {}", path.display()),
            source,
        ))?;
        self.fs.ensure_parent(slot).map_err(|source| session_err(
            format!("cannot create parent of {}", slot.display()),
            source,
        ))?;
        self.fs
            .write_atomic(slot, &format!("{}\n", absolute.display()))
            .map_err(|source| session_err(format!("cannot write {}", slot.display()), source))?;
        debug!("session now {}", absolute.display());
        Ok(absolute)
    }

    /// The stored layout path, or `None` when no session exists yet.
    ///
    /// The raw value is returned as stored; whether the file still exists
    /// is the caller's problem.
    pub fn get(&self) -> ApplicationResult<Option<PathBuf>> {
        let slot = &self.settings.session_file;
        match self.fs.read_to_string(slot) {
            Ok(content) => {
                let line = content.trim();
                if line.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(PathBuf::from(line)))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(session_err(format!("cannot read {}", slot.display()), source)),
        }
    }
}

fn session_err(context: String, source: io::Error) -> ApplicationError {
    ApplicationError::Session { context, source }
}
