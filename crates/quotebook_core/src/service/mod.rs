//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into quote book use cases.
//! - Return outcomes as values; presentation is the caller's concern.

pub mod quote_service;
