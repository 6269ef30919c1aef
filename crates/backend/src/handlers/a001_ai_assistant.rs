use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use contracts::domain::a001_ai_assistant::dto::AiResponse;

use crate::domain::a001_ai_assistant::error::AiError;
use crate::domain::a001_ai_assistant::service::parse_request;
use crate::shared::app_state::AppState;

/// POST /api/ai
///
/// Тело читается как сырые байты: невалидный JSON должен давать 400
/// с тем же текстом ошибки, что и отсутствующий `query`.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AiResponse>, AiError> {
    let request = parse_request(&body, &state.gateway.settings().defaults)?;

    tracing::info!(
        "A001 AI: query of {} chars, model={}",
        request.query.chars().count(),
        request.config.model
    );

    let reply = state
        .gateway
        .query(&request.query, Some(&request.config))
        .await?;

    tracing::info!(
        "A001 AI: returning {:?} reply of {} chars",
        reply.source,
        reply.message.chars().count()
    );

    Ok(Json(AiResponse {
        message: reply.message,
    }))
}
