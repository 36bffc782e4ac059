//! Quire use-case service.
//!
//! # Responsibility
//! - Create quires from explicit leaves or from a requested leaf count.
//! - Provide reorder, delete, navigation and naming over sibling quires.
//! - Build filled diagrams from the current persisted leaf snapshot.
//!
//! # Invariants
//! - Leaf sets are validated before any write and before any diagram build.
//! - Generated folio labels continue from the previous sibling's last leaf.
//! - Diagram builds never write to storage.

use crate::diagram::Slot;
use crate::model::folio::{generate_leaves, previous_folio_number};
use crate::model::leaf::NewLeaf;
use crate::model::quire::{
    ensure_even_bifolia, normalize_title, Manuscript, ManuscriptId, Quire, QuireId,
    QuireValidationError,
};
use crate::repo::quire_repo::{QuireRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from quire service operations.
#[derive(Debug)]
pub enum QuireServiceError {
    /// Input breaks a domain invariant.
    Validation(QuireValidationError),
    /// Target manuscript does not exist.
    ManuscriptNotFound(ManuscriptId),
    /// Target quire does not exist.
    QuireNotFound(QuireId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for QuireServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ManuscriptNotFound(id) => write!(f, "manuscript not found: {id}"),
            Self::QuireNotFound(id) => write!(f, "quire not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for QuireServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QuireValidationError> for QuireServiceError {
    fn from(value: QuireValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for QuireServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

pub type QuireServiceResult<T> = Result<T, QuireServiceError>;

/// Request model for creating a quire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateQuireRequest {
    /// Number of leaves to generate when `leaves` is empty.
    pub leaf_count: Option<u32>,
    /// Explicit leaves; takes precedence over `leaf_count`.
    pub leaves: Vec<NewLeaf>,
}

/// Quire service facade.
pub struct QuireService<R: QuireRepository> {
    repo: R,
}

impl<R: QuireRepository> QuireService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one manuscript.
    pub fn create_manuscript(&self, title: &str) -> QuireServiceResult<Manuscript> {
        let normalized = normalize_title(title)?;
        Ok(self.repo.create_manuscript(normalized.as_str())?)
    }

    /// Appends a quire to a manuscript.
    ///
    /// # Contract
    /// - Explicit `leaves` are stored as given.
    /// - Otherwise `leaf_count` paired leaves are generated, labelled after the
    ///   last leaf of the manuscript's current last quire (or after `0`).
    /// - The resulting leaf set must have an even paired count.
    pub fn create_quire(
        &self,
        manuscript_id: ManuscriptId,
        request: &CreateQuireRequest,
    ) -> QuireServiceResult<Quire> {
        self.require_manuscript(manuscript_id)?;

        let leaves = match (request.leaves.is_empty(), request.leaf_count) {
            (true, Some(count)) => {
                let start = self.starting_folio(manuscript_id)?;
                generate_leaves(count, Some(start.as_str()))
            }
            _ => request.leaves.clone(),
        };
        ensure_even_bifolia(leaves.iter().map(|leaf| leaf.single))?;

        let quire = self
            .repo
            .create_quire(manuscript_id, &leaves)
            .map_err(|err| map_manuscript_error(err, manuscript_id))?;
        info!(
            "event=quire_create module=service status=ok position={} leaves={}",
            quire.position,
            quire.leaves.len()
        );
        Ok(quire)
    }

    /// Replaces the leaves of one quire.
    pub fn update_leaves(
        &self,
        quire_id: QuireId,
        leaves: &[NewLeaf],
    ) -> QuireServiceResult<Quire> {
        ensure_even_bifolia(leaves.iter().map(|leaf| leaf.single))?;
        self.repo
            .replace_leaves(quire_id, leaves)
            .map_err(|err| map_quire_error(err, quire_id))
    }

    /// Loads one quire.
    pub fn get_quire(&self, quire_id: QuireId) -> QuireServiceResult<Quire> {
        self.repo
            .get_quire(quire_id)?
            .ok_or(QuireServiceError::QuireNotFound(quire_id))
    }

    /// Lists quires of one manuscript in position order.
    pub fn list_quires(&self, manuscript_id: ManuscriptId) -> QuireServiceResult<Vec<Quire>> {
        self.require_manuscript(manuscript_id)?;
        Ok(self.repo.list_quires(manuscript_id)?)
    }

    /// Display name such as `"Book of Hours Quire 2"`.
    pub fn quire_name(&self, quire_id: QuireId) -> QuireServiceResult<String> {
        let quire = self.get_quire(quire_id)?;
        let manuscript = self.require_manuscript(quire.manuscript_id)?;
        Ok(quire.name(&manuscript))
    }

    /// Sibling quire directly before `quire_id`.
    pub fn previous_quire(&self, quire_id: QuireId) -> QuireServiceResult<Option<Quire>> {
        self.repo
            .previous_quire(quire_id)
            .map_err(|err| map_quire_error(err, quire_id))
    }

    /// Sibling quire directly after `quire_id`.
    pub fn next_quire(&self, quire_id: QuireId) -> QuireServiceResult<Option<Quire>> {
        self.repo
            .next_quire(quire_id)
            .map_err(|err| map_quire_error(err, quire_id))
    }

    /// Moves one quire to a 1-based position among its siblings.
    pub fn move_quire(&self, quire_id: QuireId, target_position: u32) -> QuireServiceResult<()> {
        self.repo
            .move_quire(quire_id, target_position)
            .map_err(|err| map_quire_error(err, quire_id))
    }

    /// Deletes one quire and its leaves.
    pub fn delete_quire(&self, quire_id: QuireId) -> QuireServiceResult<()> {
        self.repo
            .delete_quire(quire_id)
            .map_err(|err| map_quire_error(err, quire_id))?;
        info!("event=quire_delete module=service status=ok");
        Ok(())
    }

    /// Builds the filled diagram for the quire's current leaves.
    pub fn filled_diagram(&self, quire_id: QuireId) -> QuireServiceResult<Vec<Slot>> {
        let quire = self.get_quire(quire_id)?;
        Ok(quire.filled_diagram()?)
    }

    fn require_manuscript(&self, manuscript_id: ManuscriptId) -> QuireServiceResult<Manuscript> {
        self.repo
            .get_manuscript(manuscript_id)?
            .ok_or(QuireServiceError::ManuscriptNotFound(manuscript_id))
    }

    fn starting_folio(&self, manuscript_id: ManuscriptId) -> QuireServiceResult<String> {
        let previous = self.repo.last_quire(manuscript_id)?;
        let last_label = previous
            .as_ref()
            .and_then(|quire| quire.leaves.last())
            .and_then(|leaf| leaf.folio_number.as_deref());
        Ok(previous_folio_number(last_label).to_string())
    }
}

fn map_manuscript_error(err: RepoError, manuscript_id: ManuscriptId) -> QuireServiceError {
    match err {
        RepoError::NotFound(id) if id == manuscript_id => {
            QuireServiceError::ManuscriptNotFound(manuscript_id)
        }
        other => other.into(),
    }
}

fn map_quire_error(err: RepoError, quire_id: QuireId) -> QuireServiceError {
    match err {
        RepoError::NotFound(id) if id == quire_id => QuireServiceError::QuireNotFound(quire_id),
        other => other.into(),
    }
}
