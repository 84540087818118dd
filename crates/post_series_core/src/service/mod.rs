//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep request adapters decoupled from storage details.

pub mod item_service;
pub mod series_service;
