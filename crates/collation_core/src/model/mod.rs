//! Domain model for manuscripts, quires and leaves.
//!
//! # Responsibility
//! - Define the persisted records the diagram pipeline reads.
//! - Own write-side validation shared by repository and service layers.
//!
//! # Invariants
//! - Every persisted object is identified by a stable `Uuid`.
//! - Leaf and quire positions are 1-based.

pub mod folio;
pub mod leaf;
pub mod quire;
