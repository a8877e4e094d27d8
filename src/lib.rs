// Public API for integration tests and embedding the game flow

pub mod api;
pub mod assign;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod reveal;
pub mod session;
pub mod setup;
pub mod store;
pub mod types;
pub mod words;
