use anyhow::{Context as _, anyhow};
use serde::{Deserialize, Serialize};

use crate::domain::repository::LanguageModel;
use crate::error::PortalError;

/// OpenAI-compatible `/chat/completions` client. No base URL = no model.
#[derive(Clone)]
pub struct HttpLanguageModel {
    pub client: reqwest::Client,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn first_content(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

impl LanguageModel for HttpLanguageModel {
    fn model_name(&self) -> Option<&str> {
        self.base_url.as_ref().map(|_| self.model.as_str())
    }

    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, PortalError> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| PortalError::Internal(anyhow!("language model not configured")))?;

        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens,
            temperature: 0.3,
        };

        let mut request = self.client.post(completions_url(base_url)).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response: ChatResponse = request
            .send()
            .await
            .context("send chat completion")?
            .error_for_status()
            .context("chat completion status")?
            .json()
            .await
            .context("decode chat completion")?;

        first_content(response).ok_or_else(|| PortalError::Internal(anyhow!("empty completion")))
    }
}
