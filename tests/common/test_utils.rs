use axum::{Router, body::Body, http::Request, response::Response};
use defect_analyzer::{
    analysis::{AnalysisResponse, Analyzer},
    config::{ModelConfig, Transport},
    model::{ModelClient, ModelInfo},
    server::{self, handlers::AppState},
};
use std::{io::Cursor, sync::Arc, time::Duration};

pub const BOUNDARY: &str = "defect-analyzer-test-boundary";

/// Create a model configuration pointing at the given base URL
pub fn create_test_model_config(base_url: &str) -> ModelConfig {
    ModelConfig {
        transport: Transport::Rest,
        base_url: Some(base_url.to_string()),
        api_key: "test-api-key".to_string(),
        name: "gemini-test".to_string(),
        preferences: vec![],
        timeout_secs: 5,
    }
}

/// Same as [`create_test_model_config`] but for the OpenAI-compatible transport
pub fn create_test_openai_config(base_url: &str) -> ModelConfig {
    ModelConfig {
        transport: Transport::Openai,
        ..create_test_model_config(base_url)
    }
}

/// Build the application router around any model client
pub fn create_test_app(client: Box<dyn ModelClient>) -> Router {
    let analyzer = Analyzer::new(client, "gemini-test", Duration::from_secs(5));
    let state = AppState {
        analyzer: Arc::new(analyzer),
    };
    server::router(state, 1024 * 1024)
}

/// A small but real PNG
pub fn png_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    image::RgbImage::from_pixel(4, 4, image::Rgb([120, 120, 120]))
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("Failed to encode test image");
    buf
}

pub fn generating_model(name: &str) -> ModelInfo {
    ModelInfo {
        name: name.to_string(),
        supported_methods: vec![ModelInfo::GENERATE_CONTENT.to_string()],
    }
}

/// A form field for `multipart_request`; `filename` marks a file part.
pub struct FormPart<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub data: Vec<u8>,
}

impl<'a> FormPart<'a> {
    pub fn text(name: &'a str, value: &str) -> Self {
        Self {
            name,
            filename: None,
            data: value.as_bytes().to_vec(),
        }
    }

    pub fn file(name: &'a str, filename: &'a str, data: Vec<u8>) -> Self {
        Self {
            name,
            filename: Some(filename),
            data,
        }
    }
}

pub fn multipart_request(uri: &str, parts: Vec<FormPart<'_>>) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
            ),
        }
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// The standard three-field upload
pub fn analyze_request(bim_info: &str, user_input: &str) -> Request<Body> {
    multipart_request(
        "/analyze",
        vec![
            FormPart::file("image", "crack.png", png_bytes()),
            FormPart::text("bim_info", bim_info),
            FormPart::text("user_input", user_input),
        ],
    )
}

pub async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not valid JSON")
}

pub async fn analysis_body(response: Response) -> AnalysisResponse {
    body_json(response).await
}
