use super::{
    extract::{Extraction, extract},
    prompt::build_prompt,
    types::{AnalysisRequest, AnalysisResponse},
};
use crate::{
    Error, Result,
    error::ErrorKind,
    model::ModelClient,
};
use std::time::Duration;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

/// Runs one upload through prompt building, the model call and extraction.
/// Every failure is turned into a sentinel response; nothing is raised to the caller.
pub struct Analyzer {
    client: Box<dyn ModelClient>,
    model: String,
    timeout: Duration,
}

impl Analyzer {
    pub fn new(client: Box<dyn ModelClient>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            model: model.into(),
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn analyze(&self, request: AnalysisRequest) -> AnalysisResponse {
        let request_id = Uuid::new_v4();
        let span = info_span!("analysis", %request_id, model = %self.model);

        async {
            info!("Analyzing upload of {} bytes", request.image.len());

            match self.run(&request).await {
                Ok(extraction) => {
                    info!("Classified as {}", extraction.result.defect_kind);
                    AnalysisResponse::success(extraction.result, extraction.cleaned)
                }
                Err(e) => {
                    report(&e);
                    AnalysisResponse::failure(&e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: &AnalysisRequest) -> Result<Extraction> {
        let image = request.image_payload()?;
        let prompt = build_prompt(&request.context, &request.user_note);

        debug!("Prompt is {} chars, image is {}", prompt.len(), image.mime_type);

        let reply = tokio::time::timeout(
            self.timeout,
            self.client.generate(&self.model, &prompt, &image),
        )
        .await
        .map_err(|_| Error::Timeout {
            secs: self.timeout.as_secs(),
        })??;

        extract(&reply)
    }
}

/// Records the full diagnostic detail of a failed analysis.
pub fn report(e: &Error) {
    match e.kind() {
        ErrorKind::Input => warn!(error = ?e, "Rejected upload: {}", e),
        ErrorKind::Shape => error!(
            raw = e.raw_text().unwrap_or_default(),
            error = ?e,
            "Model reply could not be parsed: {}",
            e
        ),
        _ => error!(error = ?e, "Analysis failed: {}", e),
    }
}
