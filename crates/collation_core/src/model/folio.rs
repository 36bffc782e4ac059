//! Folio label arithmetic and bulk leaf generation.
//!
//! # Responsibility
//! - Derive successive folio labels for generated leaves.
//! - Read the numeric tail of the previous quire's labelling.
//!
//! # Invariants
//! - Label parsing never fails; non-numeric labels degrade to `None` or `0`.

use crate::model::leaf::NewLeaf;
use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid leading integer regex"));

/// Returns the label following `label`, or `None` when `label` is not a plain integer.
///
/// `"7"` -> `"8"`, `"1v"` -> `None`, `None` -> `None`.
pub fn next_folio_number(label: Option<&str>) -> Option<String> {
    let value = label?.trim().parse::<i64>().ok()?;
    value.checked_add(1).map(|next| next.to_string())
}

/// Leading integer of a previous quire's last folio label, `0` when there is none.
///
/// `"12v"` -> `12`, `"ii"` -> `0`, `None` -> `0`.
pub fn previous_folio_number(label: Option<&str>) -> i64 {
    label
        .and_then(|value| LEADING_INTEGER_RE.captures(value))
        .and_then(|captures| captures[1].parse::<i64>().ok())
        .unwrap_or(0)
}

/// Synthesizes `count` paired leaves labelled in sequence after `starting_folio`.
///
/// Once a label has no numeric successor every remaining label is unset.
pub fn generate_leaves(count: u32, starting_folio: Option<&str>) -> Vec<NewLeaf> {
    let mut current = starting_folio.map(str::to_string);
    let mut leaves = Vec::with_capacity(count as usize);
    for _ in 0..count {
        current = next_folio_number(current.as_deref());
        leaves.push(NewLeaf::new(current.clone(), false));
    }
    leaves
}
