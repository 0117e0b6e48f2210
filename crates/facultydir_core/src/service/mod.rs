//! Import use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the reconciliation run.
//! - Keep the CLI decoupled from storage details.

pub mod import_service;
pub mod resolver;
pub mod slug;
