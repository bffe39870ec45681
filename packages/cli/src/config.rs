use quire_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "quire.config.json";

/// Quire configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Document JSON file edited by `quire apply`
    #[serde(default = "default_document_path")]
    pub document_path: String,

    /// Where `quire apply` keeps the history log between runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_path: Option<String>,

    #[serde(default)]
    pub editor: EditorConfig,
}

fn default_document_path() -> String {
    "document.json".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the document file
    pub fn get_document_path(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.document_path)
    }

    pub fn get_history_path(&self, cwd: &str) -> Option<PathBuf> {
        self.history_path.as_ref().map(|path| PathBuf::from(cwd).join(path))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document_path: default_document_path(),
            history_path: None,
            editor: EditorConfig::default(),
        }
    }
}
