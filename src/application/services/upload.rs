//! Artifact upload

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::infrastructure::http::Uploader;

/// Sends exported artifacts to the configured endpoint.
///
/// A failed upload leaves the artifact on disk; the export itself is never
/// undone.
pub struct UploadService {
    uploader: Arc<dyn Uploader>,
    settings: Arc<Settings>,
}

impl UploadService {
    pub fn new(uploader: Arc<dyn Uploader>, settings: Arc<Settings>) -> Self {
        Self { uploader, settings }
    }

    pub fn send(&self, artifact: &Path) -> ApplicationResult<()> {
        let endpoint = &self.settings.upload.endpoint;
        self.uploader
            .upload(artifact, endpoint)
            .map_err(|source| ApplicationError::Upload {
                artifact: artifact.to_path_buf(),
                source,
            })?;
        debug!("uploaded {} to {}", artifact.display(), endpoint);
        Ok(())
    }

    /// URL where uploaded artifacts can be browsed.
    pub fn browse_url(&self) -> &str {
        &self.settings.upload.browse_url
    }
}
