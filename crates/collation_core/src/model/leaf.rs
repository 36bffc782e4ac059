//! Leaf domain model.
//!
//! # Responsibility
//! - Define the persisted leaf record a quire is built from.
//! - Define the write-side leaf input used by create/replace paths.
//!
//! # Invariants
//! - `position` is 1-based and unique within one quire.
//! - `single == true` means the leaf has no physical partner.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a persisted leaf.
pub type LeafId = Uuid;

/// One physical leaf of a quire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    /// Stable leaf id.
    pub id: LeafId,
    /// 1-based order key within the owning quire.
    pub position: u32,
    /// Printed folio label such as `"1"` or `"1v"`.
    pub folio_number: Option<String>,
    /// Marks a leaf with no conjoin partner.
    pub single: bool,
}

impl Leaf {
    /// Creates a leaf with a generated id.
    pub fn new(position: u32, folio_number: Option<String>, single: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            folio_number,
            single,
        }
    }

    /// Shorthand for a paired leaf labelled with its own position.
    pub fn paired(position: u32) -> Self {
        Self::new(position, Some(position.to_string()), false)
    }

    /// Shorthand for a single leaf labelled with its own position.
    pub fn single(position: u32) -> Self {
        Self::new(position, Some(position.to_string()), true)
    }
}

/// Write-side leaf input. Positions are assigned from slice order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLeaf {
    pub folio_number: Option<String>,
    pub single: bool,
}

impl NewLeaf {
    pub fn new(folio_number: Option<String>, single: bool) -> Self {
        Self {
            folio_number,
            single,
        }
    }
}
