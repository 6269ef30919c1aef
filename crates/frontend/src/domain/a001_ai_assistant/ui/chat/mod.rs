//! AI Chat UI Module (MVVM Standard)
//!
//! Structure:
//! - model.rs: HTTP client for /api/ai
//! - view_model.rs: ChatVm with RwSignals
//! - view.rs: ChatPage component

mod model;
mod view;
mod view_model;

pub use model::HttpAiClient;
pub use view::ChatPage;
pub use view_model::ChatVm;
