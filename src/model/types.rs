use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// Image bytes with the MIME type detected during validation.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// Text produced by a model, possibly wrapped in markdown fences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    pub raw_text: String,
}

impl ModelReply {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub supported_methods: Vec<String>,
}

impl ModelInfo {
    pub const GENERATE_CONTENT: &'static str = "generateContent";

    pub fn supports_generation(&self) -> bool {
        self.supported_methods
            .iter()
            .any(|m| m == Self::GENERATE_CONTENT)
    }
}

// Wire format of the generateContent endpoint.

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl GenerateContentRequest {
    pub fn new(prompt: &str, image: &ImagePayload) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.to_base64(),
                        },
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    pub fn first_text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListModelsResponse {
    #[serde(default)]
    pub models: Vec<WireModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireModel {
    pub name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl From<WireModel> for ModelInfo {
    fn from(model: WireModel) -> Self {
        let name = model
            .name
            .strip_prefix("models/")
            .unwrap_or(&model.name)
            .to_string();
        Self {
            name,
            supported_methods: model.supported_generation_methods,
        }
    }
}
