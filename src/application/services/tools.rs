//! External viewer and exporter subprocesses

use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::ToolInvocation;
use crate::infrastructure::traits::CommandRunner;

/// Builds tool invocations from settings and runs them synchronously with
/// inherited stdio.
///
/// Arguments reach the OS as a vector; no shell is involved at any point,
/// so file names with spaces or metacharacters pass through unharmed.
pub struct ToolService {
    runner: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl ToolService {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: Arc<Settings>) -> Self {
        Self { runner, settings }
    }

    /// Open `cell` from `file` in the 3D viewer. Blocks until the viewer
    /// exits.
    pub fn open_viewer(&self, file: &Path, cell: &str) -> ApplicationResult<()> {
        let invocation = ToolInvocation::new(
            self.settings.viewer.command.as_str(),
            [
                "-i",
                file.to_string_lossy().as_ref(),
                "-p",
                self.settings.viewer.process_file.as_str(),
                "-t",
                cell,
            ],
        );
        self.run(invocation)
    }

    /// Run the exporter over `file` with the resolved layer stack.
    pub fn export_gltf(&self, file: &Path, layerstack: &Path) -> ApplicationResult<()> {
        let invocation = ToolInvocation::new(
            self.settings.exporter.command.as_str(),
            [
                file.to_string_lossy().as_ref(),
                layerstack.to_string_lossy().as_ref(),
            ],
        );
        self.run(invocation)
    }

    fn run(&self, invocation: ToolInvocation) -> ApplicationResult<()> {
        debug!("running {}", invocation);
        let args: Vec<&str> = invocation.args.iter().map(String::as_str).collect();
        let status = self
            .runner
            .run(&invocation.program, &args)
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => ApplicationError::ToolMissing {
                    program: invocation.program.clone(),
                },
                _ => ApplicationError::Io {
                    context: format!("cannot run {}", invocation.program),
                    source,
                },
            })?;

        if !status.success() {
            return Err(ApplicationError::Tool {
                code: status.code(),
                invocation,
            });
        }
        Ok(())
    }
}
