use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contracts::domain::a001_ai_assistant::dto::AiErrorResponse;
use thiserror::Error;

use crate::shared::llm::LlmError;

/// Ошибки обработки запроса к ассистенту
#[derive(Debug, Error)]
pub enum AiError {
    /// Отсутствует или некорректен `query` (400, без повторов)
    #[error("Missing or invalid query parameter")]
    InvalidInput,

    /// Сбой внешнего LLM. Внутри шлюза заменяется заготовленным ответом.
    #[error("Upstream provider failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("Failed to process your request")]
    Internal(String),
}

impl IntoResponse for AiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AiError::InvalidInput => (
                StatusCode::BAD_REQUEST,
                AiErrorResponse {
                    error: AiError::InvalidInput.to_string(),
                    details: None,
                },
            ),
            other => {
                let details = match &other {
                    AiError::Internal(details) => details.clone(),
                    _ => other.to_string(),
                };
                tracing::error!("AI processing error: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    AiErrorResponse {
                        error: "Failed to process your request".to_string(),
                        details: Some(details),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
