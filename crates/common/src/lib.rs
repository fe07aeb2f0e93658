//! PayScope Common Library
//!
//! Shared code for the PayScope services including:
//! - Compensation logic (normalization, breakdown, slugs, formatting)
//! - Database models, store traits and repository
//! - Salary, vote and comment services
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Metrics and observability

pub mod auth;
pub mod compensation;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{MemoryStore, Repository, Store};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
