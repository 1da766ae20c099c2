use super::types::StatusResponse;
use crate::{
    Error, Result,
    analysis::{AnalysisRequest, AnalysisResponse, Analyzer, analyzer::report},
};
use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    response::Json,
};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: format!("AI Server Running (Model: {})", state.analyzer.model()),
    })
}

/// Always answers with a well-formed body; failures come back as the `ERROR` sentinel.
pub async fn analyze(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Json<AnalysisResponse> {
    let request = match multipart {
        Ok(multipart) => read_upload(multipart).await,
        Err(rejection) => Err(Error::input(format!(
            "expected a multipart/form-data body: {}",
            rejection
        ))),
    };

    match request {
        Ok(request) => {
            info!(
                "Received analysis request ({} image bytes, {} context fields)",
                request.image.len(),
                request.context.len()
            );
            Json(state.analyzer.analyze(request).await)
        }
        Err(e) => {
            report(&e);
            Json(AnalysisResponse::failure(&e))
        }
    }
}

/// Reads the `image`, `bim_info` and `user_input` form fields. Unknown fields are skipped.
async fn read_upload(mut multipart: Multipart) -> Result<AnalysisRequest> {
    let mut image = None;
    let mut bim_info = None;
    let mut user_input = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => image = Some(field.bytes().await.map_err(multipart_error)?.to_vec()),
            "bim_info" => bim_info = Some(field.text().await.map_err(multipart_error)?),
            "user_input" => user_input = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    let image = image.ok_or_else(|| Error::input("missing form field: image"))?;
    let bim_info = bim_info.ok_or_else(|| Error::input("missing form field: bim_info"))?;

    AnalysisRequest::from_parts(image, &bim_info, user_input.unwrap_or_default())
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> Error {
    Error::input(format!("malformed multipart body: {}", e))
}
