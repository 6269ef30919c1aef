pub mod controller;
pub mod session_store;
pub mod ui;
