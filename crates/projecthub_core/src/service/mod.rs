//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep callers (CLI, future HTTP layer) decoupled from storage details.

pub mod account_service;
pub mod edit_service;
pub mod password_reset;
pub mod project_service;
pub mod spark_data;
pub mod tag_service;
