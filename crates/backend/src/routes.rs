use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::shared::app_state::AppState;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // AI ASSISTANT
        // ========================================
        .route("/api/ai", post(handlers::a001_ai_assistant::ask))
        // ========================================
        // DASHBOARDS
        // ========================================
        .route(
            "/api/d001/financial-overview",
            get(handlers::d001_financial_overview::get_financial_overview),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_ai_assistant::mock_responder::canned_reply;
    use crate::domain::a001_ai_assistant::service::AiGateway;
    use crate::shared::config::{default_config, AiSettings};
    use crate::shared::llm::perplexity_provider::tests::spawn_upstream;
    use serde_json::{json, Value};

    fn settings(endpoint: Option<&str>) -> AiSettings {
        let mut config = default_config().unwrap();
        config.ai.mock_delay_ms = 0;
        let mut settings = AiSettings::with_api_key(&config.ai, endpoint.map(|_| "test-key".into()));
        if let Some(endpoint) = endpoint {
            settings.endpoint = endpoint.to_string();
        }
        settings
    }

    async fn spawn_app(settings: AiSettings) -> String {
        let state = Arc::new(AppState::with_gateway(AiGateway::new(Arc::new(settings))));
        let app = configure_routes(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn post_raw(base: &str, body: &str) -> (u16, Value) {
        let response = reqwest::Client::new()
            .post(format!("{}/api/ai", base))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    fn completion(content: &str) -> Value {
        json!({ "model": "sonar", "choices": [{ "message": { "content": content } }] })
    }

    #[tokio::test]
    async fn test_health() {
        let base = spawn_app(settings(None)).await;
        let body = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_missing_or_malformed_query_is_400() {
        let base = spawn_app(settings(None)).await;

        for body in ["{}", "{not json", r#"{"query": ""}"#, r#"{"query": 7}"#] {
            let (status, json) = post_raw(&base, body).await;
            assert_eq!(status, 400, "body: {}", body);
            assert_eq!(json["error"], "Missing or invalid query parameter");
        }
    }

    #[tokio::test]
    async fn test_without_credential_returns_canned_reply() {
        let base = spawn_app(settings(None)).await;
        let (status, json) =
            post_raw(&base, r#"{"query": "Help with reconciliation please"}"#).await;
        assert_eq!(status, 200);
        assert_eq!(json["message"], canned_reply("reconciliation"));
    }

    #[tokio::test]
    async fn test_upstream_reply_is_cleaned_and_params_forwarded() {
        let (url, captured) = spawn_upstream(
            200,
            completion("Based on the search results, your profit is up [2]."),
        )
        .await;
        let base = spawn_app(settings(Some(&url))).await;

        let (status, json) = post_raw(
            &base,
            r#"{"query": "How is profit?", "config": {"model": "sonar-pro", "temperature": 0.1, "maxTokens": 50}}"#,
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(json["message"], "your **profit** is up.");

        let captured = captured.lock().unwrap();
        let body = captured.body.as_ref().unwrap();
        assert_eq!(body["model"], "sonar-pro");
        assert_eq!(body["max_tokens"], 50);
        assert_eq!(body["messages"][1]["content"], "How is profit?");
        assert_eq!(captured.authorization.as_deref(), Some("Bearer test-key"));
    }

    #[tokio::test]
    async fn test_upstream_failure_falls_back_to_canned_reply() {
        let (url, _) = spawn_upstream(500, json!({ "error": "boom" })).await;
        let base = spawn_app(settings(Some(&url))).await;

        let (status, json) = post_raw(&base, r#"{"query": "show my sales"}"#).await;
        assert_eq!(status, 200);
        assert_eq!(json["message"], canned_reply("sales"));
    }

    #[tokio::test]
    async fn test_reply_empty_after_cleanup_is_500_with_details() {
        let (url, _) = spawn_upstream(200, completion("[1] [2]")).await;
        let base = spawn_app(settings(Some(&url))).await;

        let (status, json) = post_raw(&base, r#"{"query": "hello"}"#).await;
        assert_eq!(status, 500);
        assert_eq!(json["error"], "Failed to process your request");
        assert_eq!(json["details"], "AI service returned an empty message");
    }

    #[tokio::test]
    async fn test_financial_overview() {
        let base = spawn_app(settings(None)).await;
        let json: Value = reqwest::get(format!("{}/api/d001/financial-overview", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(json["discrepancies"].as_array().unwrap().len(), 3);
        assert_eq!(json["discrepancies"][2]["status"], "Under Review");
        assert_eq!(json["trend"].as_array().unwrap().len(), 6);
    }
}
