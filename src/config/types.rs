use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub transport: Transport,
    /// Endpoint override; see [`ModelConfig::base_url`] for the per-transport default.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Required. May be left empty in the file and supplied through `GEMINI_API_KEY`.
    #[serde(default)]
    pub api_key: String,
    /// Model used when no preference matches or preferences are not configured.
    #[serde(default = "default_model")]
    pub name: String,
    /// Ordered model-name preferences resolved against the provider's model list at startup.
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ModelConfig {
    /// Configured endpoint, or the transport's default. `None` leaves the
    /// OpenAI-compatible transport on the SDK's own default endpoint.
    pub fn base_url(&self) -> Option<&str> {
        match (&self.base_url, self.transport) {
            (Some(url), _) if !url.trim().is_empty() => Some(url.as_str()),
            (_, Transport::Rest) => Some(GEMINI_BASE_URL),
            (_, Transport::Openai) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Direct calls to the `generateContent` REST endpoint.
    #[default]
    Rest,
    /// Chat completions through an OpenAI-compatible endpoint.
    Openai,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}
