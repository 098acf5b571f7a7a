//! YandexGPT completion client.

use std::time::Duration;

use async_trait::async_trait;
use newscaster_core::{EnhanceError, EnhancedText, Settings, TextEnhancer};
use reqwest::Client;
use tracing::debug;

use crate::prompt::{build_prompt, parse_proposal};
use crate::protocol::{CompletionOptions, CompletionRequest, CompletionResponse, Message};

/// Foundation Models completion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";

/// Model used for rewriting.
pub const DEFAULT_MODEL: &str = "yandexgpt-lite";

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const TEMPERATURE: f32 = 0.4;
const MAX_TOKENS: u32 = 1500;

/// Rewrites entries with YandexGPT.
#[derive(Debug, Clone)]
pub struct YandexGpt {
    client: Client,
    api_key: String,
    folder_id: String,
    endpoint: String,
    model: String,
}

impl YandexGpt {
    /// Create a client for the given API key and cloud folder.
    pub fn new(api_key: impl Into<String>, folder_id: impl Into<String>) -> Result<Self, EnhanceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| EnhanceError::Request(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            folder_id: folder_id.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Build a client when enhancement is active in `settings`.
    pub fn from_settings(settings: &Settings) -> Option<Result<Self, EnhanceError>> {
        if !settings.enhancement_active() {
            return None;
        }
        let api_key = settings.yandex_api_key.as_deref()?;
        let folder_id = settings.yandex_folder_id.as_deref()?;
        Some(Self::new(api_key, folder_id))
    }

    /// Point the client at another endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model_uri(&self) -> String {
        format!("gpt://{}/{}", self.folder_id, self.model)
    }

    /// Send one prompt and return the text of the first alternative.
    pub async fn complete(&self, prompt: &str) -> Result<String, EnhanceError> {
        let request = CompletionRequest {
            model_uri: self.model_uri(),
            completion_options: CompletionOptions {
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            },
            messages: vec![Message::user(prompt)],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Api-Key {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| EnhanceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnhanceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| EnhanceError::Parse(e.to_string()))?;

        completion
            .first_text()
            .map(|s| s.to_string())
            .ok_or_else(|| EnhanceError::Parse("No alternatives in response".to_string()))
    }
}

#[async_trait]
impl TextEnhancer for YandexGpt {
    async fn enhance(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Option<EnhancedText>, EnhanceError> {
        let answer = self.complete(&build_prompt(title, description)).await?;
        let proposal = parse_proposal(&answer, title, description)?;

        if proposal.title == title && proposal.description == description {
            debug!("Model returned the original text unchanged");
            return Ok(None);
        }

        Ok(Some(proposal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn settings(api_key: Option<&str>, folder_id: Option<&str>, disabled: bool) -> Settings {
        Settings {
            telegram_token: "token".to_string(),
            channel_id: "@channel".to_string(),
            owner_id: 1,
            rss_urls: vec![],
            check_interval: StdDuration::from_secs(300),
            yandex_api_key: api_key.map(str::to_string),
            yandex_folder_id: folder_id.map(str::to_string),
            disable_yagpt: disabled,
            fonts_dir: "fonts".into(),
            templates_dir: "templates".into(),
            output_dir: "temp_images".into(),
            default_font: "Montserrat-Bold.ttf".to_string(),
        }
    }

    #[test]
    fn test_model_uri() {
        let client = YandexGpt::new("key", "b1gfolder").unwrap();
        assert_eq!(client.model_uri(), "gpt://b1gfolder/yandexgpt-lite");
        let client = client.with_model("yandexgpt");
        assert_eq!(client.model_uri(), "gpt://b1gfolder/yandexgpt");
    }

    #[test]
    fn test_from_settings_respects_activation() {
        assert!(YandexGpt::from_settings(&settings(Some("key"), Some("folder"), false)).is_some());
        assert!(YandexGpt::from_settings(&settings(Some("key"), Some("folder"), true)).is_none());
        assert!(YandexGpt::from_settings(&settings(None, Some("folder"), false)).is_none());
        assert!(YandexGpt::from_settings(&settings(Some("key"), None, false)).is_none());
    }
}
