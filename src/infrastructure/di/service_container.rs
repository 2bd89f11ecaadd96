//! Service container for dependency injection
//!
//! Wires up all services with their I/O implementations.

use std::sync::Arc;

use crate::application::services::{LayoutService, SessionStore, ToolService, UploadService};
use crate::application::PathResolver;
use crate::config::Settings;
use crate::infrastructure::gds::{GdsDriver, LayoutDriver};
use crate::infrastructure::http::{HttpUploader, Uploader};
use crate::infrastructure::traits::{
    CommandRunner, FileSystem, Prompter, RealCommandRunner, RealFileSystem, StdinPrompter,
};

/// Container holding every service the command layer dispatches to.
///
/// Built once per invocation; tests swap the I/O boundaries through
/// [`ServiceContainer::with_deps`].
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Session persistence across invocations
    pub session: SessionStore,

    /// Auxiliary file lookup
    pub resolver: PathResolver,

    /// Layout probing and cell inventory
    pub layout: LayoutService,

    /// External viewer and exporter subprocesses
    pub tools: ToolService,

    /// Artifact upload
    pub upload: UploadService,

    /// Interactive confirmation
    pub prompter: Arc<dyn Prompter>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(RealCommandRunner),
            Arc::new(GdsDriver),
            Arc::new(HttpUploader),
            Arc::new(StdinPrompter),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
        driver: Arc<dyn LayoutDriver>,
        uploader: Arc<dyn Uploader>,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        let settings = Arc::new(settings);
        let session = SessionStore::new(Arc::clone(&fs), Arc::clone(&settings));
        let resolver = PathResolver::new(Arc::clone(&fs));
        let layout = LayoutService::new(driver);
        let tools = ToolService::new(runner, Arc::clone(&settings));
        let upload = UploadService::new(uploader, Arc::clone(&settings));

        Self {
            settings,
            fs,
            session,
            resolver,
            layout,
            tools,
            upload,
            prompter,
        }
    }
}
