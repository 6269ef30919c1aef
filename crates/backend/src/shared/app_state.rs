use std::sync::Arc;

use crate::domain::a001_ai_assistant::service::AiGateway;
use crate::shared::config::AiSettings;

/// Общее состояние роутера, создаётся один раз в `main`
pub struct AppState {
    pub gateway: AiGateway,
}

impl AppState {
    pub fn new(settings: AiSettings) -> Self {
        Self::with_gateway(AiGateway::new(Arc::new(settings)))
    }

    pub fn with_gateway(gateway: AiGateway) -> Self {
        Self { gateway }
    }
}
