mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    debug!("Loading configuration from: {}", config_path);

    let config_str = tokio::fs::read_to_string(&config_path).await?;
    from_yaml(&config_str, env::var(API_KEY_ENV).ok())
}

/// Parses a YAML document, applies the credential override and validates the result.
pub fn from_yaml(yaml: &str, api_key_override: Option<String>) -> Result<Config> {
    let mut config: Config = serde_yaml::from_str(yaml)?;

    if let Some(key) = api_key_override.filter(|k| !k.trim().is_empty()) {
        config.model.api_key = key;
    }

    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.model.api_key.trim().is_empty() {
            return Err(Error::config(format!(
                "model.api_key is required (set it in the config file or via {})",
                API_KEY_ENV
            )));
        }
        if self.model.name.trim().is_empty() {
            return Err(Error::config("model.name must not be empty"));
        }
        if self.model.timeout_secs == 0 {
            return Err(Error::config("model.timeout_secs must be greater than zero"));
        }
        Ok(())
    }
}

impl LogsConfig {
    /// Builds the subscriber filter. `RUST_LOG`, when set, replaces the
    /// configured level and may hold any `EnvFilter` directive list.
    pub fn env_filter(&self, rust_log: Option<String>) -> Result<EnvFilter> {
        let directives = rust_log.unwrap_or_else(|| self.level.clone());
        EnvFilter::try_new(&directives)
            .map_err(|e| Error::config(format!("invalid log filter '{}': {}", directives, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"
model:
  api_key: "file-key"
"#;

    #[test]
    fn test_defaults_applied() {
        let config = from_yaml(MINIMAL, None).unwrap();

        assert_eq!(config.model.transport, Transport::Rest);
        assert_eq!(config.model.name, "gemini-1.5-flash");
        assert_eq!(config.model.timeout_secs, 60);
        assert!(config.model.preferences.is_empty());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.logs.level, "info");
        assert_eq!(config.server.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_env_key_overrides_file() {
        let config = from_yaml(MINIMAL, Some("env-key".to_string())).unwrap();
        assert_eq!(config.model.api_key, "env-key");
    }

    #[test]
    fn test_blank_env_key_is_ignored() {
        let config = from_yaml(MINIMAL, Some("  ".to_string())).unwrap();
        assert_eq!(config.model.api_key, "file-key");
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let result = from_yaml("model:\n  name: gemini-pro\n", None);
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let yaml = "model:\n  api_key: k\n  timeout_secs: 0\n";
        assert!(matches!(from_yaml(yaml, None), Err(Error::Config(_))));
    }

    #[test]
    fn test_openai_transport() {
        let yaml = r#"
model:
  transport: openai
  base_url: "http://localhost:11434/v1"
  api_key: k
  name: llava
"#;
        let config = from_yaml(yaml, None).unwrap();
        assert_eq!(config.model.transport, Transport::Openai);
        assert_eq!(config.model.base_url(), Some("http://localhost:11434/v1"));
    }

    #[test]
    fn test_openai_transport_without_base_url_uses_sdk_default() {
        let yaml = "model:\n  transport: openai\n  api_key: k\n  name: gpt-4o\n";
        let config = from_yaml(yaml, None).unwrap();

        assert_eq!(config.model.base_url, None);
        assert_eq!(config.model.base_url(), None);
    }

    #[test]
    fn test_rest_transport_defaults_to_native_endpoint() {
        let config = from_yaml(MINIMAL, None).unwrap();
        assert_eq!(config.model.base_url(), Some(GEMINI_BASE_URL));
    }

    #[test]
    fn test_log_filter_accepts_target_directives() {
        let logs = LogsConfig::default();

        assert!(logs.env_filter(None).is_ok());
        assert!(logs.env_filter(Some("defect_analyzer=debug".to_string())).is_ok());
        assert!(logs.env_filter(Some("warn,tower_http=trace".to_string())).is_ok());
    }

    #[test]
    fn test_log_filter_rejects_bad_level() {
        let logs = LogsConfig::default();
        let err = logs
            .env_filter(Some("defect_analyzer=loudest".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
