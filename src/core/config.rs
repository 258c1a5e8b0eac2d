use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use super::currency::CurrencyCode;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeminiProviderConfig {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// Falls back to `GEMINI_API_KEY`, then `API_KEY`, when unset.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_gemini_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

impl Default for GeminiProviderConfig {
    fn default() -> Self {
        GeminiProviderConfig {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GeminiProviderConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub gemini: GeminiProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Currency the history's total profit/loss is reported in.
    #[serde(default = "default_reference_currency")]
    pub reference_currency: CurrencyCode,
    #[serde(default = "default_visible_currencies")]
    pub visible_currencies: Vec<CurrencyCode>,
    pub data_path: Option<String>,
}

fn default_reference_currency() -> CurrencyCode {
    CurrencyCode::Twd
}

pub fn default_visible_currencies() -> Vec<CurrencyCode> {
    vec![
        CurrencyCode::Usd,
        CurrencyCode::Twd,
        CurrencyCode::Cny,
        CurrencyCode::Vnd,
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            reference_currency: default_reference_currency(),
            visible_currencies: default_visible_currencies(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or defaults if there is none.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "quickswap", "quickswap")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "quickswap", "quickswap")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        if config.visible_currencies.is_empty() {
            anyhow::bail!("visible_currencies must list at least one currency");
        }
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  gemini:
    base_url: "http://localhost:8080"
    model: "gemini-test"
    api_key: "secret"
    timeout_secs: 5
reference_currency: "USD"
visible_currencies: ["JPY", "EUR"]
data_path: "/tmp/quickswap"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.providers.gemini.base_url, "http://localhost:8080");
        assert_eq!(config.providers.gemini.model, "gemini-test");
        assert_eq!(config.providers.gemini.api_key.as_deref(), Some("secret"));
        assert_eq!(config.providers.gemini.timeout_secs, 5);
        assert_eq!(config.reference_currency, CurrencyCode::Usd);
        assert_eq!(
            config.visible_currencies,
            vec![CurrencyCode::Jpy, CurrencyCode::Eur]
        );
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/quickswap")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("data_path: ~").unwrap();
        assert_eq!(config.providers.gemini.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.providers.gemini.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.providers.gemini.timeout_secs, 20);
        assert!(config.providers.gemini.api_key.is_none());
        assert_eq!(config.reference_currency, CurrencyCode::Twd);
        assert_eq!(config.visible_currencies, default_visible_currencies());

        let partial: AppConfig =
            serde_yaml::from_str("providers:\n  gemini:\n    timeout_secs: 3\n").unwrap();
        assert_eq!(partial.providers.gemini.timeout_secs, 3);
        assert_eq!(partial.providers.gemini.model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_unknown_currency_is_rejected() {
        let result: Result<AppConfig, _> = serde_yaml::from_str("reference_currency: XYZ");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_path_rejects_empty_visible_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "visible_currencies: []").unwrap();
        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("visible_currencies"));
    }

    #[test]
    fn test_configured_api_key_wins() {
        let config = GeminiProviderConfig {
            api_key: Some("from-config".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("from-config"));
    }
}
