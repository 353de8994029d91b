// Configuration loading
pub mod config;

// Session authentication
pub mod auth;

// Endpoints and command dispatch
pub mod api;

// Wire types
pub mod protocol;

// Turtle table and reconciliation
pub mod state;

// State channel lifecycle
pub mod connection;

// Coordinator
pub mod app;

// Tokio event loop
pub mod runtime;

// Operator console parsing
pub mod console;
