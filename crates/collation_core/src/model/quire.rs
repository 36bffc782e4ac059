//! Manuscript and quire domain model.
//!
//! # Responsibility
//! - Define the quire aggregate (quire + ordered leaves) and its owner.
//! - Enforce the even-bifolia invariant before writes and diagram builds.
//! - Expose the filled diagram entry point on the aggregate.
//!
//! # Invariants
//! - The number of non-single leaves in a quire is even.
//! - `Quire::position` is the 1-based quire number within its manuscript.
//! - `Quire::leaves` is ordered by `Leaf::position` ascending.

use crate::diagram::{build_filled_diagram, build_units, Slot, Unit};
use crate::model::leaf::Leaf;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a manuscript.
pub type ManuscriptId = Uuid;

/// Stable identifier for a quire.
pub type QuireId = Uuid;

/// Domain validation failures for manuscripts and quires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuireValidationError {
    /// Paired leaves cannot all have partners.
    OddBifoliaCount { found: usize },
    /// Manuscript title is blank after trim.
    BlankTitle,
}

impl Display for QuireValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OddBifoliaCount { found } => write!(
                f,
                "the number of non-single leaves cannot be odd; found: {found}"
            ),
            Self::BlankTitle => write!(f, "manuscript title must not be blank"),
        }
    }
}

impl Error for QuireValidationError {}

/// Document that owns an ordered list of quires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manuscript {
    pub id: ManuscriptId,
    pub title: String,
}

/// One gathering of leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quire {
    /// Stable quire id.
    pub id: QuireId,
    /// Owning manuscript.
    pub manuscript_id: ManuscriptId,
    /// 1-based quire number among the manuscript's quires.
    pub position: u32,
    /// Leaves ordered by position.
    pub leaves: Vec<Leaf>,
}

impl Quire {
    /// Builds an unsaved quire snapshot with a generated id.
    ///
    /// Useful for diagram computation over leaves that never touch storage.
    pub fn new(manuscript_id: ManuscriptId, position: u32, leaves: Vec<Leaf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            manuscript_id,
            position,
            leaves,
        }
    }

    /// Checks the even-bifolia invariant for this quire's leaves.
    pub fn validate(&self) -> Result<(), QuireValidationError> {
        ensure_even_bifolia(self.leaves.iter().map(|leaf| leaf.single))
    }

    /// Display name composed from the owning manuscript and quire number.
    pub fn name(&self, manuscript: &Manuscript) -> String {
        format!("{} Quire {}", manuscript.title, self.position)
    }

    /// Groups leaves into single-leaf and bifolium units.
    ///
    /// # Errors
    /// - Returns `OddBifoliaCount` when leaves cannot all be paired.
    pub fn units(&self) -> Result<Vec<Unit>, QuireValidationError> {
        self.validate()?;
        Ok(build_units(&self.leaves))
    }

    /// Builds the placeholder-filled slot sequence for diagram rendering.
    ///
    /// Pure over the current leaf snapshot; repeated calls return equal output.
    ///
    /// # Errors
    /// - Returns `OddBifoliaCount` when leaves cannot all be paired.
    pub fn filled_diagram(&self) -> Result<Vec<Slot>, QuireValidationError> {
        build_filled_diagram(&self.leaves)
    }
}

/// Rejects leaf sets whose non-single count is odd.
///
/// Takes the `single` flag of every leaf in the set.
pub fn ensure_even_bifolia(
    singles: impl IntoIterator<Item = bool>,
) -> Result<(), QuireValidationError> {
    let found = singles.into_iter().filter(|single| !single).count();
    if found % 2 == 1 {
        return Err(QuireValidationError::OddBifoliaCount { found });
    }
    Ok(())
}

/// Trims and validates a manuscript title.
pub fn normalize_title(title: &str) -> Result<String, QuireValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(QuireValidationError::BlankTitle);
    }
    Ok(trimmed.to_string())
}
