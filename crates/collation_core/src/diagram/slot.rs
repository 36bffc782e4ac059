//! Final diagram slot types.

use serde::{Deserialize, Serialize};

/// Real leaf placed in the filled diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafSlot {
    /// 1-based index in the filled sequence.
    pub position: u32,
    /// Position the leaf has in its quire.
    pub leaf_position: u32,
    pub folio_number: Option<String>,
    pub single: bool,
    /// Filled-sequence position of the partner slot. `None` for lone leaves;
    /// their partner placeholder points back at them instead.
    pub conjoin: Option<u32>,
}

/// One entry of a filled quire diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Slot {
    Leaf(LeafSlot),
    /// Stand-in for the missing partner of a lone leaf.
    Placeholder {
        position: u32,
        /// Filled-sequence position of the lone leaf this slot balances.
        conjoin: u32,
    },
}

impl Slot {
    /// 1-based index in the filled sequence.
    pub fn position(&self) -> u32 {
        match self {
            Self::Leaf(leaf) => leaf.position,
            Self::Placeholder { position, .. } => *position,
        }
    }

    /// Filled-sequence position of the conjoined slot, if any.
    pub fn conjoin(&self) -> Option<u32> {
        match self {
            Self::Leaf(leaf) => leaf.conjoin,
            Self::Placeholder { conjoin, .. } => Some(*conjoin),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }

    /// The real leaf, unless this is a placeholder.
    pub fn as_leaf(&self) -> Option<&LeafSlot> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Placeholder { .. } => None,
        }
    }
}
