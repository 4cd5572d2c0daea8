// Social Feed - GraphQL API over a SQLite store

// Runtime wiring
pub mod app_state;
pub mod config;
pub mod routes;

// Infrastructure - Database, security, viewer context, outbound collaborators
pub mod infrastructure;

// Entities - row types and their database methods
pub mod entities;

// Services - business operations
pub mod services;

// GraphQL schema
pub mod schemas;

// Common utilities
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
