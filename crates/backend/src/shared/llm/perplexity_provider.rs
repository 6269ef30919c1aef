use super::types::{ChatMessage, LlmError, LlmProvider, LlmResponse};
use async_trait::async_trait;
use contracts::domain::a001_ai_assistant::dto::AiConfig;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Текст, возвращаемый когда API ответил без содержимого
pub const EMPTY_COMPLETION: &str = "No response from AI";

/// Провайдер Perplexity (OpenAI-совместимый chat-completion endpoint)
pub struct PerplexityProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    model: Option<String>,
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    total_tokens: Option<i32>,
}

impl PerplexityProvider {
    /// Создать провайдер для заданного endpoint
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Извлечь текст ошибки из тела ответа (`{"error": {"message": ...}}`)
    fn error_message(body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message").or(Some(e)))
                    .and_then(|m| m.as_str().map(str::to_string))
            })
            .unwrap_or_else(|| "Error calling Perplexity API".to_string())
    }
}

#[async_trait]
impl LlmProvider for PerplexityProvider {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        params: &AiConfig,
    ) -> Result<LlmResponse, LlmError> {
        let request = CompletionRequest {
            model: &params.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            let message = Self::error_message(&body);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthError(message),
                StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
                _ => LlmError::ApiError(format!("HTTP {}: {}", status.as_u16(), message)),
            });
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = parsed.choices.into_iter().next();
        let finish_reason = choice.as_ref().and_then(|c| c.finish_reason.clone());
        let content = choice
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| EMPTY_COMPLETION.to_string());

        Ok(LlmResponse {
            content,
            tokens_used: parsed.usage.and_then(|u| u.total_tokens),
            model: parsed.model.unwrap_or_else(|| params.model.clone()),
            finish_reason,
        })
    }

    fn provider_name(&self) -> &str {
        "Perplexity"
    }
}
