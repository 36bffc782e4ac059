//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the ordered-collection contract quires are stored behind.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `ensure_even_bifolia` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod quire_repo;
