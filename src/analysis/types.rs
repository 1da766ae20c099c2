use crate::{Error, Result, model::ImagePayload};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// BIM metadata about the photographed element, as supplied by the client.
pub type ContextFields = serde_json::Map<String, serde_json::Value>;

/// Metric name to value; `None` when the note gave no number for it.
pub type Metrics = BTreeMap<String, Option<f64>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DefectKind {
    Crack,
    Leakage,
    Peeling,
    Efflorescence,
    /// The model answered but gave no classification.
    Unknown,
    /// Sentinel for a failed analysis.
    Error,
    Other(String),
}

impl DefectKind {
    pub const KNOWN: [DefectKind; 4] = [
        DefectKind::Crack,
        DefectKind::Leakage,
        DefectKind::Peeling,
        DefectKind::Efflorescence,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Crack => "CRACK",
            Self::Leakage => "LEAKAGE",
            Self::Peeling => "PEELING",
            Self::Efflorescence => "EFFLORESCENCE",
            Self::Unknown => "UNKNOWN",
            Self::Error => "ERROR",
            Self::Other(label) => label,
        }
    }

    /// Classification as reported by the model. The failure sentinel is
    /// reserved for this service, so a model answering `ERROR` is unclassified.
    pub fn from_model_label(label: String) -> Self {
        match Self::from(label) {
            Self::Error => Self::Unknown,
            kind => kind,
        }
    }
}

impl From<String> for DefectKind {
    fn from(label: String) -> Self {
        let trimmed = label.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "" | "UNKNOWN" => Self::Unknown,
            "CRACK" => Self::Crack,
            "LEAKAGE" => Self::Leakage,
            "PEELING" => Self::Peeling,
            "EFFLORESCENCE" => Self::Efflorescence,
            "ERROR" => Self::Error,
            _ => Self::Other(trimmed.to_string()),
        }
    }
}

impl From<DefectKind> for String {
    fn from(kind: DefectKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for DefectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One upload, alive for a single request.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub image: Vec<u8>,
    pub context: ContextFields,
    pub user_note: String,
}

impl AnalysisRequest {
    /// Builds a request from the raw upload fields. `bim_info` must be a JSON
    /// object; a blank value is treated as empty context.
    pub fn from_parts(image: Vec<u8>, bim_info: &str, user_note: impl Into<String>) -> Result<Self> {
        Ok(Self {
            image,
            context: parse_context(bim_info)?,
            user_note: user_note.into(),
        })
    }

    /// Checks that the upload decodes as an image and detects its MIME type.
    pub fn image_payload(&self) -> Result<ImagePayload> {
        if self.image.is_empty() {
            return Err(Error::input("image is empty"));
        }

        let format = image::guess_format(&self.image)
            .map_err(|e| Error::input(format!("unrecognized image format: {}", e)))?;
        image::load_from_memory_with_format(&self.image, format)
            .map_err(|e| Error::input(format!("image could not be decoded: {}", e)))?;

        Ok(ImagePayload {
            bytes: self.image.clone(),
            mime_type: format.to_mime_type().to_string(),
        })
    }
}

pub fn parse_context(bim_info: &str) -> Result<ContextFields> {
    if bim_info.trim().is_empty() {
        return Ok(ContextFields::new());
    }

    match serde_json::from_str::<serde_json::Value>(bim_info) {
        Ok(serde_json::Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(Error::input("bim_info must be a JSON object")),
        Err(e) => Err(Error::input(format!("bim_info is not valid JSON: {}", e))),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub defect_kind: DefectKind,
    pub metrics: Metrics,
}

/// Body returned by the `/analyze` endpoint for both outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(rename = "defectType")]
    pub defect_type: DefectKind,
    pub metrics: Metrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResponse {
    pub fn success(result: AnalysisResult, raw_response: String) -> Self {
        Self {
            defect_type: result.defect_kind,
            metrics: result.metrics,
            raw_response: Some(raw_response),
            error: None,
        }
    }

    pub fn failure(error: &Error) -> Self {
        Self {
            defect_type: DefectKind::Error,
            metrics: Metrics::new(),
            raw_response: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.defect_type == DefectKind::Error && self.error.is_some()
    }
}
