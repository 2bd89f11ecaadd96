//! Layout probing and cell inventory

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::CellLibrary;
use crate::infrastructure::gds::LayoutDriver;

/// Two-phase loader: a cheap metadata probe guards the full read, so an
/// unreadable or non-GDSII file is rejected before any cell parsing.
pub struct LayoutService {
    driver: Arc<dyn LayoutDriver>,
}

impl LayoutService {
    pub fn new(driver: Arc<dyn LayoutDriver>) -> Self {
        Self { driver }
    }

    pub fn load(&self, path: &Path) -> ApplicationResult<CellLibrary> {
        let meta = self.driver.probe(path).map_err(|source| ApplicationError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "{}: user unit {} m, database unit {} m",
            path.display(),
            meta.user_unit,
            meta.db_unit
        );

        let library = self.driver.read(path).map_err(|source| ApplicationError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "{}: {} cells in library {:?}",
            path.display(),
            library.len(),
            library.name()
        );
        Ok(library)
    }
}
