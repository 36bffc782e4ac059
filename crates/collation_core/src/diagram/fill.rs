//! Placeholder inserter: balances every lone leaf with a ghost slot.
//!
//! # Responsibility
//! - Insert one placeholder per lone leaf where the conjoin numbering skips.
//! - Renumber the filled sequence and resolve conjoins to final positions.
//!
//! # Invariants
//! - Every lone leaf gets exactly one placeholder.
//! - Each insertion pass is pure: it reads one sequence and returns a new one.
//! - Conjoin numbers step by one from each end of a balanced sequence; a
//!   larger step marks where a missing partner belongs.

use crate::diagram::expand::{has_any_conjoins, ExpandedLeaf};
use crate::diagram::slot::{LeafSlot, Slot};
use std::collections::HashMap;

/// Working-sequence entry used while placeholders are being inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Entry {
    Leaf(ExpandedLeaf),
    /// Carries the rank of the lone leaf it balances.
    Placeholder { conjoin: u32 },
}

impl Entry {
    /// Rank this entry is conjoined with, if any.
    fn conjoin_number(&self) -> Option<u32> {
        match self {
            Self::Leaf(leaf) => leaf.conjoin,
            Self::Placeholder { conjoin } => Some(*conjoin),
        }
    }

    fn is_leaf_at(&self, position: u32) -> bool {
        matches!(self, Self::Leaf(leaf) if leaf.position == position)
    }
}

/// Fills placeholders into a position-ordered expanded leaf sequence and
/// returns the renumbered slots.
pub fn fill_placeholders(leaves: Vec<ExpandedLeaf>) -> Vec<Slot> {
    let entries = if has_any_conjoins(&leaves) {
        let lone_positions: Vec<u32> = leaves
            .iter()
            .filter(|leaf| leaf.conjoin.is_none())
            .map(|leaf| leaf.position)
            .collect();
        let initial: Vec<Entry> = leaves.into_iter().map(Entry::Leaf).collect();
        lone_positions
            .into_iter()
            .fold(initial, |entries, position| {
                insert_placeholder(&entries, position)
            })
    } else {
        mirror_lone_leaves(leaves)
    };
    number_slots(entries)
}

/// Appends the mirror image of an all-single quire as placeholders.
fn mirror_lone_leaves(leaves: Vec<ExpandedLeaf>) -> Vec<Entry> {
    let mirrored: Vec<Entry> = leaves
        .iter()
        .rev()
        .map(|leaf| Entry::Placeholder {
            conjoin: leaf.position,
        })
        .collect();
    let mut entries: Vec<Entry> = leaves.into_iter().map(Entry::Leaf).collect();
    entries.extend(mirrored);
    entries
}

/// Returns a copy of `entries` with a placeholder for the lone leaf at
/// `lone_position` inserted.
///
/// Lone leaves in the front half are searched for from the back, the rest
/// from the front, so the search starts at the end nearer the gap.
pub(crate) fn insert_placeholder(entries: &[Entry], lone_position: u32) -> Vec<Entry> {
    let index = entries
        .iter()
        .position(|entry| entry.is_leaf_at(lone_position))
        .map_or(0, |found| found + 1);
    let reversed = index < entries.len() / 2;
    let insert_at = insertion_point(entries, reversed);

    let mut filled = Vec::with_capacity(entries.len() + 1);
    filled.extend_from_slice(&entries[..insert_at]);
    filled.push(Entry::Placeholder {
        conjoin: lone_position,
    });
    filled.extend_from_slice(&entries[insert_at..]);
    filled
}

/// Physical index at which the next placeholder belongs.
///
/// Scans in the requested orientation for the first conjoin number that is
/// more than one step from its predecessor. Without such a skip the
/// placeholder goes to the near end of the orientation: the front when
/// scanning forwards, the back when `reversed`.
pub(crate) fn insertion_point(entries: &[Entry], reversed: bool) -> usize {
    let len = entries.len();
    let at = |logical: usize| {
        if reversed {
            &entries[len - 1 - logical]
        } else {
            &entries[logical]
        }
    };
    let to_physical = |logical: usize| if reversed { len - logical } else { logical };

    let Some(first) = (0..len).find_map(|logical| at(logical).conjoin_number()) else {
        return to_physical(0);
    };
    let mut expected = i64::from(first) + if reversed { -1 } else { 1 };

    for logical in 0..len {
        let Some(conjoin) = at(logical).conjoin_number() else {
            continue;
        };
        let conjoin = i64::from(conjoin);
        if (conjoin - expected).abs() > 1 {
            return to_physical(logical);
        }
        expected = conjoin;
    }

    to_physical(0)
}

/// Assigns final 1-based positions and maps conjoins onto them.
fn number_slots(entries: Vec<Entry>) -> Vec<Slot> {
    let final_positions: HashMap<u32, u32> = entries
        .iter()
        .zip(1u32..)
        .filter_map(|(entry, position)| match entry {
            Entry::Leaf(leaf) => Some((leaf.position, position)),
            Entry::Placeholder { .. } => None,
        })
        .collect();
    let resolve = |rank: u32| final_positions.get(&rank).copied();

    entries
        .into_iter()
        .zip(1u32..)
        .map(|(entry, position)| match entry {
            Entry::Leaf(leaf) => Slot::Leaf(LeafSlot {
                position,
                leaf_position: leaf.leaf_position,
                conjoin: leaf.conjoin.and_then(resolve),
                folio_number: leaf.folio_number,
                single: leaf.single,
            }),
            Entry::Placeholder { conjoin } => Slot::Placeholder {
                position,
                conjoin: resolve(conjoin).unwrap_or(conjoin),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{fill_placeholders, insert_placeholder, insertion_point, Entry};
    use crate::diagram::expand::{expand_units, ExpandedLeaf};
    use crate::diagram::slot::Slot;
    use crate::diagram::unit::build_units;
    use crate::model::leaf::Leaf;

    fn expanded(singles: &[u32], count: u32) -> Vec<ExpandedLeaf> {
        let leaves: Vec<_> = (1..=count)
            .map(|position| {
                if singles.contains(&position) {
                    Leaf::single(position)
                } else {
                    Leaf::paired(position)
                }
            })
            .collect();
        expand_units(&build_units(&leaves))
    }

    fn entries(singles: &[u32], count: u32) -> Vec<Entry> {
        expanded(singles, count).into_iter().map(Entry::Leaf).collect()
    }

    /// `Some(n)` for a real leaf of rank `n`, `None` for a placeholder.
    fn layout(entries: &[Entry]) -> Vec<Option<u32>> {
        entries
            .iter()
            .map(|entry| match entry {
                Entry::Leaf(leaf) => Some(leaf.position),
                Entry::Placeholder { .. } => None,
            })
            .collect()
    }

    #[test]
    fn insertion_point_finds_skip_scanning_backwards() {
        // joins: 8 - 7 5 4 - 3 1
        let entries = entries(&[2, 6], 8);
        assert_eq!(insertion_point(&entries, true), 7);
    }

    #[test]
    fn insertion_point_finds_skip_scanning_forwards() {
        let entries = entries(&[2, 6], 8);
        // 1(8) 3(7) 4(5): skip from 7 to 5 sits at index 3.
        assert_eq!(insertion_point(&entries, false), 3);
    }

    #[test]
    fn insertion_point_without_skip_uses_near_end() {
        let entries = entries(&[7, 8], 8);
        assert_eq!(insertion_point(&entries, false), 0);
        assert_eq!(insertion_point(&entries, true), entries.len());
    }

    #[test]
    fn insert_placeholder_leaves_input_untouched() {
        let before = entries(&[2, 6], 8);
        let after = insert_placeholder(&before, 2);

        assert_eq!(before.len(), 8);
        assert_eq!(after.len(), 9);
        assert_eq!(after[7], Entry::Placeholder { conjoin: 2 });
        assert_eq!(
            layout(&after),
            vec![
                Some(1),
                Some(2),
                Some(3),
                Some(4),
                Some(5),
                Some(6),
                Some(7),
                None,
                Some(8),
            ]
        );
    }

    #[test]
    fn placeholders_for_leading_singles_go_to_the_back() {
        let slots = fill_placeholders(expanded(&[1, 2], 8));
        assert_eq!(slots.len(), 10);
        assert_eq!(slots[8], Slot::Placeholder { position: 9, conjoin: 2 });
        assert_eq!(slots[9], Slot::Placeholder { position: 10, conjoin: 1 });
    }

    #[test]
    fn placeholders_for_trailing_singles_go_to_the_front() {
        let slots = fill_placeholders(expanded(&[7, 8], 8));
        assert_eq!(slots.len(), 10);
        assert_eq!(slots[0], Slot::Placeholder { position: 1, conjoin: 10 });
        assert_eq!(slots[1], Slot::Placeholder { position: 2, conjoin: 9 });
    }

    #[test]
    fn adjacent_middle_singles_get_adjacent_placeholders() {
        let slots = fill_placeholders(expanded(&[4, 5], 8));
        let placeholders: Vec<_> = slots.iter().filter(|slot| slot.is_placeholder()).collect();
        assert_eq!(
            placeholders,
            vec![
                &Slot::Placeholder { position: 6, conjoin: 5 },
                &Slot::Placeholder { position: 7, conjoin: 4 },
            ]
        );
    }

    #[test]
    fn singles_at_both_ends_follow_scan_order() {
        let slots = fill_placeholders(expanded(&[1, 6], 6));
        assert_eq!(slots.len(), 8);
        assert_eq!(slots[0], Slot::Placeholder { position: 1, conjoin: 7 });
        assert_eq!(slots[7], Slot::Placeholder { position: 8, conjoin: 2 });
    }

    #[test]
    fn all_singles_are_mirrored_at_the_end() {
        let slots = fill_placeholders(expanded(&[1, 2, 3], 3));
        let conjoins: Vec<_> = slots.iter().map(Slot::conjoin).collect();
        assert_eq!(
            conjoins,
            vec![None, None, None, Some(3), Some(2), Some(1)]
        );
    }

    #[test]
    fn empty_sequence_stays_empty() {
        assert!(fill_placeholders(Vec::new()).is_empty());
    }
}
