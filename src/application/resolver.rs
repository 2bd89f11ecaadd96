//! Auxiliary file lookup
//!
//! Layer stack files may be given as bare names; those are searched for in
//! the configured share directories. Paths with directories in them are
//! taken as given.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::infrastructure::traits::FileSystem;

/// Resolves auxiliary file names to existing files.
pub struct PathResolver {
    fs: Arc<dyn FileSystem>,
}

impl PathResolver {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Find `name` among its candidates: as given first, then under each
    /// search directory in order. The first existing file wins and is
    /// canonicalized; nothing is ever created here.
    pub fn resolve(&self, name: &Path, search_dirs: &[PathBuf]) -> ApplicationResult<PathBuf> {
        let mut candidates = vec![name.to_path_buf()];
        if !name.is_absolute() {
            for dir in search_dirs {
                candidates.push(dir.join(name));
            }
        }

        for candidate in &candidates {
            if self.fs.is_file(candidate) {
                debug!("resolved {} as {}", name.display(), candidate.display());
                return self
                    .fs
                    .canonicalize(candidate)
                    .map_err(|source| ApplicationError::Io {
                        context: format!("cannot canonicalize {}", candidate.display()),
                        source,
                    });
            }
        }

        Err(ApplicationError::AuxNotFound {
            name: name.to_path_buf(),
            searched: candidates,
        })
    }
}
