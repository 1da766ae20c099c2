use super::types::*;
use crate::{
    Error, Result,
    config::{GEMINI_BASE_URL, ModelConfig, Transport},
};
use async_openai::{Client, config::OpenAIConfig, types as openai_types};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Capability the analyzer depends on: send a prompt plus image, get reply text back.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str, image: &ImagePayload)
    -> Result<ModelReply>;

    async fn list_models(&self) -> Result<Vec<ModelInfo>>;
}

pub fn create_model_client(config: &ModelConfig) -> Box<dyn ModelClient> {
    match config.transport {
        Transport::Rest => Box::new(GeminiRestClient::new(config)),
        Transport::Openai => Box::new(OpenAiCompatClient::new(config)),
    }
}

/// Raw HTTP client for the `generateContent` endpoint, image sent inline as base64.
pub struct GeminiRestClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiRestClient {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            base_url: config
                .base_url()
                .unwrap_or(GEMINI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: config.api_key.clone(),
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Upstream {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ModelClient for GeminiRestClient {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<ModelReply> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let request = GenerateContentRequest::new(prompt, image);

        debug!(
            "Calling generateContent on {} ({} image bytes)",
            model,
            image.bytes.len()
        );

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body: GenerateContentResponse = response.json().await?;
        body.first_text()
            .map(ModelReply::new)
            .ok_or_else(|| Error::transport("model reply contained no text"))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/models", self.base_url);

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let body: ListModelsResponse = response.json().await?;
        debug!("Provider listed {} models", body.models.len());

        Ok(body.models.into_iter().map(ModelInfo::from).collect())
    }
}

/// Vendor SDK transport: chat completions against any OpenAI-compatible endpoint.
pub struct OpenAiCompatClient {
    client: Client<OpenAIConfig>,
}

impl OpenAiCompatClient {
    pub fn new(config: &ModelConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key.clone());

        if let Some(base_url) = config.base_url() {
            openai_config = openai_config.with_api_base(base_url.trim_end_matches('/'));
        }

        Self {
            client: Client::with_config(openai_config),
        }
    }

    fn build_request(
        model: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<openai_types::CreateChatCompletionRequest> {
        let parts = vec![
            openai_types::ChatCompletionRequestUserMessageContentPart::Text(
                openai_types::ChatCompletionRequestMessageContentPartText {
                    text: prompt.to_string(),
                },
            ),
            openai_types::ChatCompletionRequestUserMessageContentPart::ImageUrl(
                openai_types::ChatCompletionRequestMessageContentPartImage {
                    image_url: openai_types::ImageUrl {
                        url: image.to_data_url(),
                        detail: None,
                    },
                },
            ),
        ];

        let message = openai_types::ChatCompletionRequestUserMessageArgs::default()
            .content(openai_types::ChatCompletionRequestUserMessageContent::Array(
                parts,
            ))
            .build()?;

        let messages: Vec<openai_types::ChatCompletionRequestMessage> = vec![message.into()];

        let request = openai_types::CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()?;

        Ok(request)
    }
}

#[async_trait]
impl ModelClient for OpenAiCompatClient {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<ModelReply> {
        let request = Self::build_request(model, prompt, image)?;

        debug!("Creating chat completion on {}", model);

        let response = self.client.chat().create(request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.is_empty())
            .map(ModelReply::new)
            .ok_or_else(|| Error::transport("model reply contained no text"))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self.client.models().list().await?;

        Ok(response
            .data
            .into_iter()
            .map(|model| ModelInfo {
                name: model.id.strip_prefix("models/").unwrap_or(&model.id).to_string(),
                // The compatibility listing does not report capabilities.
                supported_methods: vec![ModelInfo::GENERATE_CONTENT.to_string()],
            })
            .collect())
    }
}
