use async_trait::async_trait;
use defect_analyzer::{
    Error, Result,
    model::{ImagePayload, ModelClient, ModelInfo, ModelReply},
};
use std::sync::{Arc, Mutex};

/// One recorded `generate` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
    pub mime_type: String,
}

/// Mock model client for testing
#[derive(Debug, Clone, Default)]
pub struct MockModelClient {
    pub reply: Option<String>,
    pub error: Option<String>,
    pub models: Vec<ModelInfo>,
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_models(mut self, models: Vec<ModelInfo>) -> Self {
        self.models = models;
        self
    }

    pub fn get_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<ModelReply> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            prompt: prompt.to_string(),
            mime_type: image.mime_type.clone(),
        });

        if let Some(ref error) = self.error {
            return Err(Error::transport(error.clone()));
        }

        self.reply
            .clone()
            .map(ModelReply::new)
            .ok_or_else(|| Error::transport("No mock reply configured"))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        if let Some(ref error) = self.error {
            return Err(Error::transport(error.clone()));
        }
        Ok(self.models.clone())
    }
}
