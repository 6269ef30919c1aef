pub mod a001_ai_assistant;
