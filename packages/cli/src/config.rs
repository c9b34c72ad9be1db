use jotter_editor::{HtmlOptions, SessionOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "jotter.config.json";

/// Jotter configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding the persisted notes
    #[serde(default = "default_notes_dir")]
    pub notes_dir: String,

    /// Undo levels kept per editing session (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default)]
    pub html: HtmlConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtmlConfig {
    /// One top-level block per line
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_notes_dir() -> String {
    "notes".to_string()
}

fn default_history_limit() -> usize {
    100
}

fn default_pretty() -> bool {
    true
}

impl Config {
    /// Load config from a directory, falling back to defaults
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!("loaded {}", config_path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get absolute path to the notes directory
    pub fn get_notes_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.notes_dir)
    }

    pub fn html_options(&self) -> HtmlOptions {
        if self.html.pretty {
            HtmlOptions::default()
        } else {
            HtmlOptions::compact()
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            history_limit: self.history_limit,
            ..SessionOptions::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_dir: default_notes_dir(),
            history_limit: default_history_limit(),
            html: HtmlConfig::default(),
        }
    }
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}
