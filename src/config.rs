use anyhow::{anyhow, Result};
use colored::Colorize;
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Provider used when nothing is configured.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Environment variables that override stored API keys.
const ENV_API_KEYS: &[(&str, &str)] = &[
    ("openai", "OPENAI_API_KEY"),
    ("claude", "ANTHROPIC_API_KEY"),
    ("gemini", "GEMINI_API_KEY"),
];

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_keys: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,
    /// Keys written by other tools or older versions, kept on save.
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
    #[serde(skip)]
    env_api_keys: BTreeMap<String, String>,
    #[serde(skip)]
    use_mock: bool,
    #[serde(skip)]
    path: PathBuf,
}

impl Config {
    /// Load configuration from file, then apply environment variables
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_dir(&Self::get_config_dir()?)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load `config.json` from `dir`, creating the directory if needed.
    ///
    /// A missing or unreadable file yields an empty configuration.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join("config.json");

        let mut config = if path.exists() {
            match fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|content| serde_json::from_str::<Config>(&content).map_err(Into::into))
            {
                Ok(config) => {
                    info!("Loaded config from: {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Ignoring unreadable config {}: {}", path.display(), e);
                    Self::default()
                }
            }
        } else {
            info!("No config file found, using defaults");
            Self::default()
        };

        config.path = path;
        Ok(config)
    }

    /// Applies environment overrides. `lookup` resolves a variable name.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (provider, var) in ENV_API_KEYS {
            if let Some(key) = lookup(var).filter(|k| !k.trim().is_empty()) {
                debug!("Using {} from environment", var);
                self.env_api_keys.insert(provider.to_string(), key);
            }
        }

        if lookup("XPLC_USE_MOCK").is_some() {
            self.use_mock = true;
        }
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&self.path, content)?;
        info!("Saved config to: {}", self.path.display());
        Ok(())
    }

    /// `$XPLC_HOME` when set, otherwise `~/.xplc`.
    pub fn get_config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os("XPLC_HOME") {
            return Ok(PathBuf::from(dir));
        }
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".xplc"))
    }

    /// Set API key and save config
    pub fn set_api_key(&mut self, provider: &str, key: &str) -> Result<()> {
        let provider = normalize(provider);
        self.api_keys.insert(provider.clone(), key.to_string());
        self.save()?;
        println!("{}", format!("✓ {} API key saved", provider).green());
        Ok(())
    }

    /// Environment first, then the config file.
    pub fn get_api_key(&self, provider: &str) -> Option<&str> {
        let provider = normalize(provider);
        self.env_api_keys
            .get(&provider)
            .or_else(|| self.api_keys.get(&provider))
            .map(String::as_str)
    }

    pub fn set_default_provider(&mut self, provider: &str) -> Result<()> {
        let provider = normalize(provider);
        self.default_provider = Some(provider.clone());
        self.save()?;
        println!("{}", format!("✓ Default provider set to {}", provider).green());
        Ok(())
    }

    pub fn get_default_provider(&self) -> &str {
        self.default_provider.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }

    /// Providers with a key stored in the config file.
    pub fn configured_providers(&self) -> Vec<&str> {
        self.api_keys.keys().map(String::as_str).collect()
    }

    pub fn is_mock_mode(&self) -> bool {
        self.use_mock
    }

    pub fn show_config_info(&self) {
        println!("Current configuration:");
        println!("Config file: {}", self.path.display());
        println!("Default provider: {}", self.get_default_provider());
        println!("API keys configured for: {}", self.configured_providers().join(", "));
    }
}

fn normalize(provider: &str) -> String {
    provider.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap();

        assert!(config.api_keys.is_empty());
        assert_eq!(config.get_default_provider(), "openai");
        assert!(!config.is_mock_mode());
    }

    #[test]
    fn test_load_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        Config::load_from_dir(&nested).unwrap();

        assert!(nested.is_dir());
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.json"), "{ not json").unwrap();

        let config = Config::load_from_dir(dir.path()).unwrap();

        assert!(config.api_keys.is_empty());
        assert!(config.default_provider.is_none());
    }

    #[test]
    fn test_set_api_key_persists() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::load_from_dir(dir.path()).unwrap();
        config.set_api_key("gemini", "g-123").unwrap();

        let reloaded = Config::load_from_dir(dir.path()).unwrap();
        assert_eq!(reloaded.get_api_key("gemini"), Some("g-123"));
        assert_eq!(reloaded.configured_providers(), vec!["gemini"]);
    }

    #[test]
    fn test_provider_names_are_normalized() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::load_from_dir(dir.path()).unwrap();
        config.set_api_key(" Claude ", "c-1").unwrap();
        config.set_default_provider("GEMINI").unwrap();

        assert_eq!(config.get_api_key("claude"), Some("c-1"));
        assert_eq!(config.get_api_key("CLAUDE"), Some("c-1"));
        assert_eq!(config.get_default_provider(), "gemini");
    }

    #[test]
    fn test_saved_file_layout() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::load_from_dir(dir.path()).unwrap();
        config.set_api_key("openai", "sk-1").unwrap();
        config.set_default_provider("claude").unwrap();

        let raw = fs::read_to_string(dir.path().join("config.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["api_keys"]["openai"], "sk-1");
        assert_eq!(value["default_provider"], "claude");
        assert!(raw.contains("\n  \"api_keys\""), "expected 2-space indent: {}", raw);
    }

    #[test]
    fn test_unknown_keys_survive_save() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.json"),
            r#"{"api_keys": {}, "theme": "dark"}"#,
        )
        .unwrap();

        let mut config = Config::load_from_dir(dir.path()).unwrap();
        config.set_default_provider("gemini").unwrap();

        let raw = fs::read_to_string(dir.path().join("config.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["theme"], "dark");
    }

    #[test]
    fn test_env_key_overrides_file_and_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::load_from_dir(dir.path()).unwrap();
        config.set_api_key("claude", "from-file").unwrap();

        config.apply_env_overrides(env(&[("ANTHROPIC_API_KEY", "from-env")]));
        assert_eq!(config.get_api_key("claude"), Some("from-env"));

        config.set_default_provider("claude").unwrap();
        let raw = fs::read_to_string(dir.path().join("config.json")).unwrap();
        assert!(!raw.contains("from-env"));
    }

    #[test]
    fn test_blank_env_key_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::load_from_dir(dir.path()).unwrap();

        config.apply_env_overrides(env(&[("OPENAI_API_KEY", "  ")]));

        assert_eq!(config.get_api_key("openai"), None);
    }

    #[test]
    fn test_mock_mode_from_env() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::load_from_dir(dir.path()).unwrap();

        config.apply_env_overrides(env(&[("XPLC_USE_MOCK", "1")]));

        assert!(config.is_mock_mode());
    }
}
