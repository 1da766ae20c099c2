//! Recovery of a typed result from free-form model output.
//!
//! Absent fields fall back to defaults; anything that is present but
//! malformed is a shape error carrying the original reply text.

use super::types::{AnalysisResult, DefectKind, Metrics};
use crate::{Error, Result, model::ModelReply};
use serde::Deserialize;

const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub result: AnalysisResult,
    /// Reply text with the fences removed, as it was parsed.
    pub cleaned: String,
}

#[derive(Debug, Deserialize)]
struct ReplyDocument {
    #[serde(default, rename = "defectType")]
    defect_type: Option<String>,
    #[serde(default)]
    metrics: Option<Metrics>,
}

/// Removes a leading fence (with or without a language tag) and a trailing
/// fence. Text without fences is only trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')))
            .unwrap_or(rest.len());
        text = rest[tag_len..].trim_start();
    }

    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest.trim_end();
    }

    text
}

pub fn extract(reply: &ModelReply) -> Result<Extraction> {
    let cleaned = strip_code_fences(&reply.raw_text);

    let document: ReplyDocument = serde_json::from_str(cleaned)
        .map_err(|e| Error::shape(e.to_string(), reply.raw_text.clone()))?;

    let defect_kind = document
        .defect_type
        .map(DefectKind::from_model_label)
        .unwrap_or(DefectKind::Unknown);

    Ok(Extraction {
        result: AnalysisResult {
            defect_kind,
            metrics: document.metrics.unwrap_or_default(),
        },
        cleaned: cleaned.to_string(),
    })
}
