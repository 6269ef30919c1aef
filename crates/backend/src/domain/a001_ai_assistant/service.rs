//! Шлюз к LLM: одна попытка вызова upstream, при любой неудаче
//! или отсутствии ключа возвращается заготовленный ответ.

use std::sync::Arc;

use contracts::domain::a001_ai_assistant::dto::AiConfig;
use serde_json::Value;

use super::error::AiError;
use super::mock_responder::MockResponder;
use super::sanitizer::sanitize;
use crate::shared::config::AiSettings;
use crate::shared::llm::{ChatMessage, LlmProvider, PerplexityProvider};

/// Откуда получен ответ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Upstream,
    Mock,
}

#[derive(Debug, Clone)]
pub struct AiReply {
    pub message: String,
    pub source: ReplySource,
}

/// Проверенный запрос к `/api/ai`
#[derive(Debug, Clone)]
pub struct AiQuery {
    pub query: String,
    pub config: AiConfig,
}

/// Разобрать тело запроса. Невалидный JSON трактуется как пустой объект.
pub fn parse_request(body: &[u8], defaults: &AiConfig) -> Result<AiQuery, AiError> {
    let payload: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

    let query = payload
        .get("query")
        .and_then(Value::as_str)
        .filter(|q| !q.is_empty())
        .ok_or(AiError::InvalidInput)?;

    Ok(AiQuery {
        query: query.to_string(),
        config: resolve_config(payload.get("config"), defaults),
    })
}

fn config_field<'a>(raw: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    raw.and_then(|c| c.get(name))
}

/// Параметры генерации из запроса; отсутствующие или невалидные поля
/// заменяются значениями по умолчанию.
pub fn resolve_config(raw: Option<&Value>, defaults: &AiConfig) -> AiConfig {
    let model = config_field(raw, "model")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| defaults.model.clone());

    let temperature = config_field(raw, "temperature")
        .and_then(Value::as_f64)
        .filter(|t| (0.0..=1.0).contains(t))
        .map(|t| t as f32)
        .unwrap_or(defaults.temperature);

    let max_tokens = config_field(raw, "maxTokens")
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(defaults.max_tokens);

    AiConfig {
        model,
        temperature,
        max_tokens,
    }
}

pub struct AiGateway {
    settings: Arc<AiSettings>,
    provider: Option<Arc<dyn LlmProvider>>,
    mock: MockResponder,
}

impl AiGateway {
    /// Провайдер создаётся только при наличии ключа
    pub fn new(settings: Arc<AiSettings>) -> Self {
        let provider = settings.api_key.as_ref().map(|key| {
            Arc::new(PerplexityProvider::new(settings.endpoint.clone(), key.clone()))
                as Arc<dyn LlmProvider>
        });
        Self::with_provider(settings, provider)
    }

    pub fn with_provider(settings: Arc<AiSettings>, provider: Option<Arc<dyn LlmProvider>>) -> Self {
        let mock = MockResponder::new(settings.mock_delay);
        Self {
            settings,
            provider,
            mock,
        }
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    /// Ответ на вопрос пользователя.
    ///
    /// `InvalidInput` для пустого текста. Ошибки upstream не выходят наружу:
    /// они логируются и заменяются заготовленным ответом.
    pub async fn query(&self, text: &str, config: Option<&AiConfig>) -> Result<AiReply, AiError> {
        if text.is_empty() {
            return Err(AiError::InvalidInput);
        }
        let config = config.unwrap_or(&self.settings.defaults);

        let reply = match &self.provider {
            None => {
                tracing::debug!("AI credential not configured, using mock response");
                self.mock_reply(text).await
            }
            Some(provider) => match self.ask_upstream(provider.as_ref(), text, config).await {
                Ok(message) => AiReply {
                    message,
                    source: ReplySource::Upstream,
                },
                Err(e) => {
                    tracing::error!("{} API call failed: {}", provider.provider_name(), e);
                    tracing::warn!("Falling back to mock response");
                    self.mock_reply(text).await
                }
            },
        };

        if reply.message.trim().is_empty() {
            return Err(AiError::Internal(
                "AI service returned an empty message".to_string(),
            ));
        }
        Ok(reply)
    }

    async fn ask_upstream(
        &self,
        provider: &dyn LlmProvider,
        text: &str,
        config: &AiConfig,
    ) -> Result<String, AiError> {
        let messages = vec![
            ChatMessage::system(self.settings.system_prompt.as_str()),
            ChatMessage::user(text),
        ];

        let response = provider.chat_completion(messages, config).await?;
        tracing::info!(
            "{} replied: model={}, tokens={:?}, finish_reason={:?}",
            provider.provider_name(),
            response.model,
            response.tokens_used,
            response.finish_reason
        );

        Ok(sanitize(&response.content))
    }

    async fn mock_reply(&self, text: &str) -> AiReply {
        AiReply {
            message: self.mock.respond(text).await,
            source: ReplySource::Mock,
        }
    }
}
