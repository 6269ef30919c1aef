//! AI Chat - Model (API client)

use async_trait::async_trait;
use contracts::domain::a001_ai_assistant::dto::{AiConfig, AiErrorResponse, AiRequest, AiResponse};
use gloo_net::http::Request;

use crate::domain::a001_ai_assistant::controller::AiClient;
use crate::shared::api_utils::api_url;

/// Клиент `POST /api/ai`; параметры генерации фиксированы на всё время жизни
pub struct HttpAiClient {
    config: AiConfig,
}

impl HttpAiClient {
    pub fn new() -> Self {
        Self {
            config: AiConfig::default(),
        }
    }
}

impl Default for HttpAiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl AiClient for HttpAiClient {
    async fn ask(&self, query: &str) -> Result<String, String> {
        if query.is_empty() {
            return Err("Query is required".to_string());
        }

        let request = AiRequest {
            query: query.to_string(),
            config: Some(self.config.clone()),
        };

        let response = Request::post(&api_url("/api/ai"))
            .json(&request)
            .map_err(|e| e.to_string())?
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if !response.ok() {
            let status = response.status();
            let error = response
                .json::<AiErrorResponse>()
                .await
                .ok()
                .map(|body| body.error);
            return Err(error_message(status, error));
        }

        let data: AiResponse = response
            .json()
            .await
            .map_err(|_| "Invalid response from AI service".to_string())?;

        accept_message(data)
    }
}

fn error_message(status: u16, error: Option<String>) -> String {
    error
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| format!("API request failed with status {}", status))
}

fn accept_message(data: AiResponse) -> Result<String, String> {
    if data.message.is_empty() {
        return Err("Invalid response from AI service".to_string());
    }
    Ok(data.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_server_text() {
        assert_eq!(
            error_message(400, Some("Missing or invalid query parameter".into())),
            "Missing or invalid query parameter"
        );
        assert_eq!(error_message(502, None), "API request failed with status 502");
        assert_eq!(
            error_message(500, Some(String::new())),
            "API request failed with status 500"
        );
    }

    #[test]
    fn test_empty_message_is_rejected() {
        let empty = AiResponse { message: String::new() };
        assert!(accept_message(empty).is_err());
        let ok = AiResponse { message: "hi".into() };
        assert_eq!(accept_message(ok).unwrap(), "hi");
    }
}
