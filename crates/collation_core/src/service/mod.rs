//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI/adapter layers decoupled from storage details.

pub mod quire_service;
