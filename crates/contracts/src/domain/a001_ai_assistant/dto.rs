use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "sonar";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Параметры генерации, передаваемые с каждым запросом
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    pub model: String,
    /// Диапазон [0, 1]
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// POST /api/ai
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<AiConfig>,
}

/// 200 OK
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiResponse {
    pub message: String,
}

/// 400 / 500
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
