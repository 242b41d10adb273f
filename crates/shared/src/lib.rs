//! Shared types, errors, and configuration for Lekha.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for tenants, actors, periods, accounts and journal entries
//! - The application-wide error taxonomy
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorKind};
