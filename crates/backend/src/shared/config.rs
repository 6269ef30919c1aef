use contracts::domain::a001_ai_assistant::dto::AiConfig;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ai: AiSection,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the compiled frontend, served as fallback
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiSection {
    pub endpoint: String,
    /// Name of the environment variable holding the upstream API key
    pub api_key_env: String,
    pub default_model: String,
    pub default_temperature: f32,
    pub default_max_tokens: u32,
    pub mock_delay_ms: u64,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000
static_dir = "dist"

[ai]
endpoint = "https://api.perplexity.ai/chat/completions"
api_key_env = "PERPLEXITY_API_KEY"
default_model = "sonar"
default_temperature = 0.7
default_max_tokens = 500
mock_delay_ms = 500
"#;

/// Fixed instruction sent as the system turn of every upstream request
pub const SYSTEM_PROMPT: &str = "You are a financial assistant for bookkeeping called QuantoBooks AI. 

1. DO NOT cite sources, references, or numbered citations in your responses.
2. DO NOT include phrases like \"based on the search results\" or \"according to the information provided\".
3. Format your responses in a clean, professional style using Markdown:
   - Use **bold** for important terms and headers
   - Use bullet points (* item) or numbered lists (1. item) for multiple points
   - Keep paragraphs short (2-3 sentences maximum)
   - Use line breaks between paragraphs for readability
4. Avoid adding citations like [1], [2], or [source] at the end of sentences.
5. Speak with authority and confidence about financial topics.
6. Always provide actionable advice when appropriate.
7. Use professional financial terminology but explain complex concepts simply.
8. Keep sentences concise and avoid long, complex explanations.";

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    default_config()
}

pub fn default_config() -> anyhow::Result<Config> {
    Ok(toml::from_str(DEFAULT_CONFIG)?)
}

/// Immutable AI settings, built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct AiSettings {
    pub endpoint: String,
    /// `None` switches the gateway to canned responses
    pub api_key: Option<String>,
    pub system_prompt: String,
    pub defaults: AiConfig,
    pub mock_delay: Duration,
}

impl AiSettings {
    /// Build settings from the config file, reading the key from the environment
    pub fn from_config(section: &AiSection) -> Self {
        let api_key = std::env::var(&section.api_key_env).ok();
        Self::with_api_key(section, api_key)
    }

    pub fn with_api_key(section: &AiSection, api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Self {
            endpoint: section.endpoint.clone(),
            api_key,
            system_prompt: SYSTEM_PROMPT.to_string(),
            defaults: AiConfig {
                model: section.default_model.clone(),
                temperature: section.default_temperature,
                max_tokens: section.default_max_tokens,
            },
            mock_delay: Duration::from_millis(section.mock_delay_ms),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = default_config().unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.ai.default_model, "sonar");
        assert_eq!(config.ai.default_max_tokens, 500);
        assert_eq!(config.ai.api_key_env, "PERPLEXITY_API_KEY");
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = default_config().unwrap();
        let settings = AiSettings::with_api_key(&config.ai, Some("   ".into()));
        assert!(!settings.has_credential());

        let settings = AiSettings::with_api_key(&config.ai, Some("pplx-123".into()));
        assert_eq!(settings.api_key.as_deref(), Some("pplx-123"));
        assert_eq!(settings.defaults, AiConfig::default());
        assert_eq!(settings.mock_delay, Duration::from_millis(500));
    }
}
