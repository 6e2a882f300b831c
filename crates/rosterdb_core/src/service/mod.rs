//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and query calls into use-case level APIs.
//! - Keep callers decoupled from storage details.

pub mod member_service;
