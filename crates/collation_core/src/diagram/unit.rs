//! Unit builder: groups a leaf sequence into physical sheets.
//!
//! # Responsibility
//! - Pair leaves outermost-first from both ends of the quire.
//! - Keep single leaves out of pairing so they never consume a partner.
//!
//! # Invariants
//! - Every input leaf appears in exactly one unit.
//! - Output is ordered by the position of each unit's first leaf.

use crate::model::leaf::Leaf;
use log::warn;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// One physical sheet: a lone leaf or a bifolium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// Leaf without a partner.
    Single(Leaf),
    /// Two conjoined leaves; the first occurs earlier in the quire.
    Bifolium(Leaf, Leaf),
}

impl Unit {
    /// Earliest leaf of the unit.
    pub fn first(&self) -> &Leaf {
        match self {
            Self::Single(leaf) | Self::Bifolium(leaf, _) => leaf,
        }
    }

    /// Leaves of the unit in sequence order.
    pub fn leaves(&self) -> Vec<&Leaf> {
        match self {
            Self::Single(leaf) => vec![leaf],
            Self::Bifolium(first, second) => vec![first, second],
        }
    }

    pub fn is_bifolium(&self) -> bool {
        matches!(self, Self::Bifolium(..))
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Single(_) => "single",
            Self::Bifolium(..) => "bifolium",
        }
    }
}

/// Serialized as `{"kind": "single" | "bifolium", "leaves": [...]}`.
impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Unit", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("leaves", &self.leaves())?;
        state.end()
    }
}

/// Groups `leaves` into units, scanning inward from both ends.
///
/// A paired front leaf takes the nearest paired leaf from the back; single
/// leaves met at the back on the way become their own units.
///
/// Expects an even number of paired leaves. When that precondition is broken
/// the unpaired leaf is emitted as a lone unit.
pub fn build_units(leaves: &[Leaf]) -> Vec<Unit> {
    let mut ordered: Vec<&Leaf> = leaves.iter().collect();
    ordered.sort_by_key(|leaf| leaf.position);

    let mut units = Vec::with_capacity(ordered.len());
    let mut front = 0;
    let mut back = ordered.len();

    while front < back {
        let leaf = ordered[front];
        front += 1;

        if leaf.single {
            units.push(Unit::Single(leaf.clone()));
            continue;
        }

        while back > front && ordered[back - 1].single {
            back -= 1;
            units.push(Unit::Single(ordered[back].clone()));
        }

        if back > front {
            back -= 1;
            units.push(Unit::Bifolium(leaf.clone(), ordered[back].clone()));
        } else {
            warn!(
                "event=unit_build module=diagram status=degraded error_code=unpaired_leaf position={}",
                leaf.position
            );
            units.push(Unit::Single(leaf.clone()));
        }
    }

    units.sort_by_key(|unit| unit.first().position);
    units
}
