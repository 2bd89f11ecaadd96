//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults (original tool values)
//! 2. Global config: `$XDG_CONFIG_HOME/gdst/gdst.toml`
//! 3. Environment variables: `GDST_*` prefix (`GDST_VIEWER__COMMAND=...`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// 3D viewer invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Viewer executable, looked up on PATH
    pub command: String,
    /// Process definition file passed with `-p`, resolved by the viewer
    pub process_file: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            command: "GDS3D".into(),
            process_file: "sg13g2.txt".into(),
        }
    }
}

/// glTF exporter invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExporterConfig {
    /// Exporter executable, looked up on PATH
    pub command: String,
    /// Suffix appended to the input path to name the artifact
    pub artifact_suffix: String,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            command: "gds2gltf".into(),
            artifact_suffix: ".glb".into(),
        }
    }
}

/// Artifact upload settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UploadConfig {
    /// Endpoint receiving the multipart POST
    pub endpoint: String,
    /// URL shown to the user after a successful upload
    pub browse_url: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://anyvej11.dk/vr/upload_files".into(),
            browse_url: "https://anyvej11.dk/vr/".into(),
        }
    }
}

/// Raw viewer config for intermediate parsing (fields are Option to detect
/// "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawViewerConfig {
    pub command: Option<String>,
    pub process_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawExporterConfig {
    pub command: Option<String>,
    pub artifact_suffix: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawUploadConfig {
    pub endpoint: Option<String>,
    pub browse_url: Option<String>,
}

/// Raw settings for intermediate parsing.
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some(...)` → explicit value, overrides base
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub session_file: Option<PathBuf>,
    pub share_dir: Option<PathBuf>,
    pub viewer: RawViewerConfig,
    pub exporter: RawExporterConfig,
    pub upload: RawUploadConfig,
}

/// Unified configuration for gdst.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Where the last listed layout path is persisted between invocations
    pub session_file: PathBuf,
    /// Directory searched for auxiliary files such as layer stacks
    pub share_dir: PathBuf,
    /// 3D viewer settings
    pub viewer: ViewerConfig,
    /// glTF exporter settings
    pub exporter: ExporterConfig,
    /// Artifact upload settings
    pub upload: UploadConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_file: default_session_file(),
            share_dir: PathBuf::from("/usr/local/share/gdst"),
            viewer: ViewerConfig::default(),
            exporter: ExporterConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

/// Default session file: `<user cache dir>/gdst/session`.
fn default_session_file() -> PathBuf {
    ProjectDirs::from("", "", "gdst")
        .map(|dirs| dirs.cache_dir().join("session"))
        .unwrap_or_else(|| PathBuf::from("/var/tmp/.gdst_session"))
}

/// Get the XDG config directory for gdst.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "gdst").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("gdst.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Directories searched for auxiliary files (layer stacks) after the
    /// name as given.
    pub fn aux_search_dirs(&self) -> Vec<PathBuf> {
        vec![self.share_dir.clone()]
    }

    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax.
    fn expand_paths(&mut self) {
        self.session_file = PathBuf::from(expand(self.session_file.to_string_lossy().as_ref()));
        self.share_dir = PathBuf::from(expand(self.share_dir.to_string_lossy().as_ref()));
    }

    /// Merge overlay config onto self (base): overlay wins where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            session_file: overlay
                .session_file
                .clone()
                .unwrap_or_else(|| self.session_file.clone()),
            share_dir: overlay
                .share_dir
                .clone()
                .unwrap_or_else(|| self.share_dir.clone()),
            viewer: ViewerConfig {
                command: overlay
                    .viewer
                    .command
                    .clone()
                    .unwrap_or_else(|| self.viewer.command.clone()),
                process_file: overlay
                    .viewer
                    .process_file
                    .clone()
                    .unwrap_or_else(|| self.viewer.process_file.clone()),
            },
            exporter: ExporterConfig {
                command: overlay
                    .exporter
                    .command
                    .clone()
                    .unwrap_or_else(|| self.exporter.command.clone()),
                artifact_suffix: overlay
                    .exporter
                    .artifact_suffix
                    .clone()
                    .unwrap_or_else(|| self.exporter.artifact_suffix.clone()),
            },
            upload: UploadConfig {
                endpoint: overlay
                    .upload
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| self.upload.endpoint.clone()),
                browse_url: overlay
                    .upload
                    .browse_url
                    .clone()
                    .unwrap_or_else(|| self.upload.browse_url.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults (original tool values)
    /// 2. Global config: `$XDG_CONFIG_HOME/gdst/gdst.toml`
    /// 3. Environment variables: `GDST_*` prefix
    pub fn load() -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Overlay the global config file if present
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Apply environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        // Expand ~ and $VAR in path-like fields
        current.expand_paths();

        Ok(current)
    }

    /// Apply GDST_* environment variables as explicit overrides.
    ///
    /// `GDST_SESSION_FILE` maps to `session_file`; nested fields use a
    /// double underscore, e.g. `GDST_VIEWER__COMMAND` for `viewer.command`.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use the config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("GDST")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("session_file") {
            settings.session_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("share_dir") {
            settings.share_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("viewer.command") {
            settings.viewer.command = val;
        }
        if let Ok(val) = config.get_string("viewer.process_file") {
            settings.viewer.process_file = val;
        }
        if let Ok(val) = config.get_string("exporter.command") {
            settings.exporter.command = val;
        }
        if let Ok(val) = config.get_string("exporter.artifact_suffix") {
            settings.exporter.artifact_suffix = val;
        }
        if let Ok(val) = config.get_string("upload.endpoint") {
            settings.upload.endpoint = val;
        }
        if let Ok(val) = config.get_string("upload.browse_url") {
            settings.upload.browse_url = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# gdst configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/gdst/gdst.toml
#   Env:    GDST_* environment variables (GDST_VIEWER__COMMAND=...)

# Where the last listed layout path is persisted between invocations
# session_file = "~/.cache/gdst/session"

# Directory searched for layer stack files given by bare name
# share_dir = "/usr/local/share/gdst"

[viewer]
# 3D viewer executable, looked up on PATH
# command = "GDS3D"

# Process definition file passed to the viewer with -p
# process_file = "sg13g2.txt"

[exporter]
# glTF exporter executable, looked up on PATH
# command = "gds2gltf"

# Suffix appended to the input path to name the exported artifact
# artifact_suffix = ".glb"

[upload]
# Endpoint receiving exported artifacts as multipart POSTs
# endpoint = "https://anyvej11.dk/vr/upload_files"

# URL shown after a successful upload
# browse_url = "https://anyvej11.dk/vr/"
"#
        .to_string()
    }
}

/// Expand `~`, `$VAR`, and `${VAR}`; unexpandable input is kept as-is.
fn expand(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
