// Aggregate handlers
pub mod a001_ai_assistant;

// Dashboard handlers
pub mod d001_financial_overview;
