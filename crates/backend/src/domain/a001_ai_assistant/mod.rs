pub mod error;
pub mod mock_responder;
pub mod sanitizer;
pub mod service;
