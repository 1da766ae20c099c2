//! Explicit model-selection strategies.
//!
//! The provider's model listing is resolved once at startup against an ordered
//! preference list. Selection is deterministic: preferences are tried in order
//! and, within one preference, models are tried in listing order.

use super::{ModelClient, ModelInfo};
use crate::config::ModelConfig;
use std::time::Duration;
use tracing::{info, warn};

pub trait ModelSelection: Send + Sync {
    fn select(&self, available: &[ModelInfo]) -> Option<String>;
}

/// Always the configured model, regardless of the listing.
pub struct FixedModel(pub String);

impl ModelSelection for FixedModel {
    fn select(&self, _available: &[ModelInfo]) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Ordered preferences; each entry matches a model name exactly or as a
/// case-insensitive substring.
pub struct PreferenceList {
    preferences: Vec<String>,
}

impl PreferenceList {
    pub fn new(preferences: Vec<String>) -> Self {
        Self { preferences }
    }
}

impl ModelSelection for PreferenceList {
    fn select(&self, available: &[ModelInfo]) -> Option<String> {
        let candidates: Vec<&ModelInfo> =
            available.iter().filter(|m| m.supports_generation()).collect();

        self.preferences.iter().find_map(|preference| {
            let needle = preference.to_lowercase();
            candidates
                .iter()
                .find(|m| m.name == *preference)
                .or_else(|| {
                    candidates
                        .iter()
                        .find(|m| m.name.to_lowercase().contains(&needle))
                })
                .map(|m| m.name.clone())
        })
    }
}

pub fn strategy_for(config: &ModelConfig) -> Box<dyn ModelSelection> {
    if config.preferences.is_empty() {
        Box::new(FixedModel(config.name.clone()))
    } else {
        Box::new(PreferenceList::new(config.preferences.clone()))
    }
}

/// Resolves the model to use for this process. The provider is only listed
/// when preferences are configured; a failed or stalled listing, or no match,
/// falls back to `config.name`.
pub async fn resolve_model(client: &dyn ModelClient, config: &ModelConfig) -> String {
    let strategy = strategy_for(config);

    let available = if config.preferences.is_empty() {
        Vec::new()
    } else {
        let limit = Duration::from_secs(config.timeout_secs);
        match tokio::time::timeout(limit, client.list_models()).await {
            Ok(Ok(models)) => models,
            Ok(Err(e)) => {
                warn!("Model listing failed, using {}: {}", config.name, e);
                return config.name.clone();
            }
            Err(_) => {
                warn!(
                    "Model listing timed out after {}s, using {}",
                    config.timeout_secs, config.name
                );
                return config.name.clone();
            }
        }
    };

    match strategy.select(&available) {
        Some(model) => {
            info!("Selected model {} ({} listed)", model, available.len());
            model
        }
        None => {
            warn!(
                "No available model matched preferences {:?}, using {}",
                config.preferences, config.name
            );
            config.name.clone()
        }
    }
}
