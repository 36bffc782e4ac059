//! Core domain logic for manuscript quire collation.
//! This crate is the single source of truth for quire and conjoin invariants.

pub mod db;
pub mod diagram;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use diagram::{
    build_filled_diagram, build_units, expand_units, fill_placeholders, has_any_conjoins,
    ExpandedLeaf, LeafSlot, Slot, Unit,
};
pub use logging::{
    default_log_level, init_logging, init_logging_with, logging_status, LoggingConfig,
};
pub use model::folio::{generate_leaves, next_folio_number, previous_folio_number};
pub use model::leaf::{Leaf, LeafId, NewLeaf};
pub use model::quire::{
    ensure_even_bifolia, Manuscript, ManuscriptId, Quire, QuireId, QuireValidationError,
};
pub use repo::quire_repo::{QuireRepository, RepoError, RepoResult, SqliteQuireRepository};
pub use service::quire_service::{
    CreateQuireRequest, QuireService, QuireServiceError, QuireServiceResult,
};

/// Minimal health-check API for adapter wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
