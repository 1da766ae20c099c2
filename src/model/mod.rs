pub mod client;
pub mod selection;
pub mod types;

pub use client::{GeminiRestClient, ModelClient, OpenAiCompatClient, create_model_client};
pub use selection::{FixedModel, ModelSelection, PreferenceList, resolve_model, strategy_for};
pub use types::{ImagePayload, ModelInfo, ModelReply};
