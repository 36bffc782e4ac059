//! Filled quire diagram pipeline.
//!
//! # Responsibility
//! - Turn a quire's leaves into the placeholder-filled slot sequence used to
//!   draw quire diagrams.
//! - Stages run one way: units -> expanded leaves -> filled slots.
//!
//! # Invariants
//! - The pipeline never writes back to the leaves it reads.
//! - Output length is leaf count plus lone-leaf count.
//! - Invalid leaf sets (odd paired count) are rejected before any stage runs.

mod expand;
mod fill;
mod slot;
mod unit;

pub use expand::{expand_units, has_any_conjoins, ExpandedLeaf};
pub use fill::fill_placeholders;
pub use slot::{LeafSlot, Slot};
pub use unit::{build_units, Unit};

use crate::model::leaf::Leaf;
use crate::model::quire::{ensure_even_bifolia, QuireValidationError};
use log::{debug, warn};

/// Builds the filled diagram for a leaf snapshot.
///
/// # Errors
/// - Returns `OddBifoliaCount` when the non-single leaf count is odd.
pub fn build_filled_diagram(leaves: &[Leaf]) -> Result<Vec<Slot>, QuireValidationError> {
    if let Err(err) = ensure_even_bifolia(leaves.iter().map(|leaf| leaf.single)) {
        warn!(
            "event=diagram_build module=diagram status=rejected error_code=odd_bifolia_count leaves={}",
            leaves.len()
        );
        return Err(err);
    }

    let units = build_units(leaves);
    let expanded = expand_units(&units);
    let slots = fill_placeholders(expanded);

    debug!(
        "event=diagram_build module=diagram status=ok leaves={} units={} slots={}",
        leaves.len(),
        units.len(),
        slots.len()
    );
    Ok(slots)
}
