//! HTTP transport for artifact uploads

use std::path::Path;

use reqwest::blocking::multipart::Form;
use reqwest::blocking::Client;
use tracing::debug;

use crate::infrastructure::error::UploadError;

/// Multipart field name the upload server expects.
pub(crate) const UPLOAD_FIELD: &str = "uploaded_file";

/// Boundary to the component that moves artifacts over the network.
pub trait Uploader: Send + Sync {
    fn upload(&self, file: &Path, endpoint: &str) -> Result<(), UploadError>;
}

/// Multipart POST uploader over HTTPS.
#[derive(Debug, Default)]
pub struct HttpUploader;

impl Uploader for HttpUploader {
    fn upload(&self, file: &Path, endpoint: &str) -> Result<(), UploadError> {
        // Uploads block with no deadline; exported artifacts can be large.
        let client = Client::builder()
            .timeout(None)
            .build()
            .map_err(|source| UploadError::Network { source })?;

        let form = Form::new()
            .file(UPLOAD_FIELD, file)
            .map_err(|source| UploadError::File { source })?;

        debug!("uploading {} to {}", file.display(), endpoint);
        let response = client
            .post(endpoint)
            .multipart(form)
            .send()
            .map_err(|source| UploadError::Network { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Rejected {
                status: status.as_u16(),
            });
        }
        debug!("upload accepted with HTTP {}", status.as_u16());
        Ok(())
    }
}
