use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Upstream bodies are cut to this many characters before they reach an end caller.
const MAX_UPSTREAM_BODY_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API Error {status}: {}", truncate(.body))]
    Upstream { status: u16, body: String },

    #[error("Model call timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Malformed model reply: {message}")]
    Shape { message: String, raw: String },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("OpenAI error: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),
}

/// Coarse classification used when an error is mapped to a sentinel result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Input,
    Transport,
    Shape,
    Internal,
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn shape(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
            raw: raw.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Yaml(_) | Self::AddrParse(_) => ErrorKind::Config,
            Self::Input(_) => ErrorKind::Input,
            Self::Transport(_)
            | Self::Upstream { .. }
            | Self::Timeout { .. }
            | Self::Network(_)
            | Self::OpenAi(_) => ErrorKind::Transport,
            Self::Shape { .. } => ErrorKind::Shape,
            Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// Raw model text attached to a shape error.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::Shape { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_UPSTREAM_BODY_CHARS {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(MAX_UPSTREAM_BODY_CHARS).collect();
    cut.push_str("...");
    cut
}
