//! Leaf-pair expander: units back into a flat, conjoin-annotated sequence.

use crate::diagram::unit::Unit;
use crate::model::leaf::Leaf;
use serde::{Deserialize, Serialize};

/// Leaf snapshot annotated with its partner's sequence rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedLeaf {
    /// Dense 1-based rank of the leaf in position order.
    pub position: u32,
    /// Position value carried by the source leaf.
    pub leaf_position: u32,
    pub folio_number: Option<String>,
    pub single: bool,
    /// Rank of the conjoined leaf; `None` for lone leaves.
    pub conjoin: Option<u32>,
}

impl ExpandedLeaf {
    fn from_leaf(leaf: &Leaf, rank: u32, conjoin: Option<u32>) -> Self {
        Self {
            position: rank,
            leaf_position: leaf.position,
            folio_number: leaf.folio_number.clone(),
            single: leaf.single,
            conjoin,
        }
    }
}

/// Expands units into leaves with reciprocal conjoin references.
///
/// Leaf positions only need to be unique and ascending; the result is
/// renumbered `1..=n` in position order so gaps in the source numbering
/// never read as missing partners.
pub fn expand_units(units: &[Unit]) -> Vec<ExpandedLeaf> {
    let mut ordered: Vec<u32> = units
        .iter()
        .flat_map(Unit::leaves)
        .map(|leaf| leaf.position)
        .collect();
    ordered.sort_unstable();
    let rank = |leaf: &Leaf| {
        ordered
            .binary_search(&leaf.position)
            .map_or(leaf.position, |index| index as u32 + 1)
    };

    let mut expanded = Vec::with_capacity(ordered.len());
    for unit in units {
        match unit {
            Unit::Single(leaf) => expanded.push(ExpandedLeaf::from_leaf(leaf, rank(leaf), None)),
            Unit::Bifolium(first, second) => {
                let (first_rank, second_rank) = (rank(first), rank(second));
                expanded.push(ExpandedLeaf::from_leaf(first, first_rank, Some(second_rank)));
                expanded.push(ExpandedLeaf::from_leaf(second, second_rank, Some(first_rank)));
            }
        }
    }
    expanded.sort_by_key(|leaf| leaf.position);
    expanded
}

/// Returns `true` if `leaves` contains at least one conjoin pair.
pub fn has_any_conjoins(leaves: &[ExpandedLeaf]) -> bool {
    leaves.iter().any(|leaf| leaf.conjoin.is_some())
}
