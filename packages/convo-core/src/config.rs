//! Application configuration and the known-models registry.

use crate::types::{CUSTOM_MODEL, USER_SENDER};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// A model the application ships with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
    /// Badge background, `#RRGGBB`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Prepended to the conversation when this model is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_prefix: Option<String>,
}

impl ModelEntry {
    fn new(id: &str, name: &str, color: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.map(str::to_string),
            prompt_prefix: None,
        }
    }
}

/// Configuration loaded from `~/.convo/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConvoConfig {
    /// Sender name written on user messages
    pub user_sender: String,
    /// Model id that selects the custom-label model
    pub custom_model: String,
    pub default_model: String,
    pub models: Vec<ModelEntry>,
}

impl Default for ConvoConfig {
    fn default() -> Self {
        Self {
            user_sender: USER_SENDER.to_string(),
            custom_model: CUSTOM_MODEL.to_string(),
            default_model: "chatgpt".to_string(),
            models: vec![
                ModelEntry::new("chatgpt", "ChatGPT", Some("#10a37f")),
                ModelEntry::new("chatgptBrowser", "ChatGPT Browser", Some("#19cfcf")),
                ModelEntry::new("bingai", "BingAI", None),
                ModelEntry::new("sydney", "Sydney", None),
                ModelEntry::new(CUSTOM_MODEL, "Custom", None),
            ],
        }
    }
}

impl ConvoConfig {
    /// Get the default config file path.
    ///
    /// Default path: `~/.convo/config.toml`
    /// Can be overridden with `CONVO_CONFIG_FILE` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("CONVO_CONFIG_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".convo/config.toml"))
            .unwrap_or_else(|| PathBuf::from("convo.toml"))
    }

    /// Load from the default path, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = Self::default_path();
        match Self::load_from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load from a specific path. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Custom label and prompt prefix submitted along with `model`.
    ///
    /// The label is only set for the custom model, from its entry name.
    pub fn model_params(&self, model: &str) -> (Option<String>, Option<String>) {
        let entry = self.models.iter().find(|m| m.id == model);
        let label = entry
            .filter(|_| model == self.custom_model)
            .map(|m| m.name.clone());
        let prompt_prefix = entry.and_then(|m| m.prompt_prefix.clone());
        (label, prompt_prefix)
    }

    /// Build the known-models registry.
    pub fn registry(&self) -> ModelRegistry {
        ModelRegistry::new(self.models.clone())
    }
}

/// Known models keyed by id. A model missing here is treated as custom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRegistry {
    models: HashMap<String, ModelEntry>,
}

impl ModelRegistry {
    pub fn new(models: Vec<ModelEntry>) -> Self {
        Self {
            models: models.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    pub fn get(&self, model: &str) -> Option<&ModelEntry> {
        self.models.get(model)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = ConvoConfig::load_from_path(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, ConvoConfig::default());
        assert!(config.registry().contains("chatgpt"));
        assert!(config.registry().contains(CUSTOM_MODEL));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r##"
default_model = "local"

[[models]]
id = "local"
name = "Local Llama"
color = "#336699"
"##,
        )
        .unwrap();

        let config = ConvoConfig::load_from_path(&path).unwrap();
        assert_eq!(config.default_model, "local");
        assert_eq!(config.user_sender, USER_SENDER);

        let registry = config.registry();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("local").unwrap().color.as_deref(), Some("#336699"));
        assert!(!registry.contains("chatgpt"));
    }

    #[test]
    fn test_model_params_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r##"
[[models]]
id = "chatgpt"
name = "ChatGPT"
prompt_prefix = "Answer briefly."

[[models]]
id = "chatgptCustom"
name = "Pirate"
prompt_prefix = "Talk like a pirate."
"##,
        )
        .unwrap();

        let config = ConvoConfig::load_from_path(&path).unwrap();
        assert_eq!(
            config.model_params("chatgpt"),
            (None, Some("Answer briefly.".to_string()))
        );
        assert_eq!(
            config.model_params(CUSTOM_MODEL),
            (
                Some("Pirate".to_string()),
                Some("Talk like a pirate.".to_string())
            )
        );
        assert_eq!(config.model_params("unknown"), (None, None));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "models = 3").unwrap();

        assert!(matches!(
            ConvoConfig::load_from_path(&path),
            Err(crate::Error::Toml(_))
        ));
    }
}
