pub mod perplexity_provider;
pub mod types;

pub use perplexity_provider::PerplexityProvider;
pub use types::*;
