// Widget settings
// Loaded from ~/.config/pivotgrid/settings.json

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings load/save failure
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ConfigError::Parse { path, source } => {
                write!(f, "invalid settings in {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Grid
    #[serde(rename = "grid.emptyContentPlaceholder")]
    pub empty_content_placeholder: String,

    #[serde(rename = "grid.showCountBadge")]
    pub show_count_badge: bool,

    #[serde(rename = "grid.inferAlignment")]
    pub infer_alignment: bool,

    // Placeholder panels
    #[serde(rename = "messages.awaitingMapping")]
    pub awaiting_mapping_message: String,

    #[serde(rename = "messages.mappingIncomplete")]
    pub mapping_incomplete_message: String,

    #[serde(rename = "messages.noData")]
    pub no_data_message: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Grid
            empty_content_placeholder: "—".to_string(),
            show_count_badge: true,
            infer_alignment: true,
            // Messages
            awaiting_mapping_message: "Waiting for column mappings...".to_string(),
            mapping_incomplete_message: "Please configure the column mappings in the widget settings panel."
                .to_string(),
            no_data_message: "No data available in the selected table.".to_string(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pivotgrid")
            .join("settings.json")
    }

    /// Load settings from the user config dir, falling back to defaults
    pub fn load() -> Self {
        let path = Self::path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file. Lines starting with `//` are comments.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write settings as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }

    /// Save to the user config dir
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path())
    }
}
