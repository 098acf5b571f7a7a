//! Wire types of the completion API.

use serde::{Deserialize, Serialize};

/// A chat message, both in requests and in returned alternatives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Body of `POST /foundationModels/v1/completion`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub model_uri: String,
    pub completion_options: CompletionOptions,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub result: CompletionResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResult {
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Alternative {
    pub message: Message,
}

impl CompletionResponse {
    /// Text of the first alternative.
    pub fn first_text(&self) -> Option<&str> {
        self.result
            .alternatives
            .first()
            .map(|alt| alt.message.text.as_str())
    }
}
