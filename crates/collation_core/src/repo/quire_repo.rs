//! Manuscript/quire/leaf repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist manuscripts, their ordered quires, and each quire's leaves.
//! - Maintain quire positions as a gap-free 1-based list per manuscript.
//!
//! # Invariants
//! - Leaf writes replace a quire's whole leaf set inside one transaction.
//! - Write paths call `ensure_even_bifolia` before SQL mutations.
//! - Read paths reject invalid persisted state as `InvalidData`.
//! - Quire listing is deterministic: `position ASC, uuid ASC`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::leaf::{Leaf, NewLeaf};
use crate::model::quire::{
    ensure_even_bifolia, normalize_title, Manuscript, ManuscriptId, Quire, QuireId,
    QuireValidationError,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const QUIRE_SELECT_SQL: &str = "SELECT
    uuid,
    manuscript_uuid,
    position
FROM quires";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for manuscript/quire persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(QuireValidationError),
    Db(DbError),
    /// Manuscript or quire id does not exist.
    NotFound(Uuid),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "quire repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted quire data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<QuireValidationError> for RepoError {
    fn from(value: QuireValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Ordered-collection store for manuscripts, quires and leaves.
pub trait QuireRepository {
    /// Creates one manuscript with a trimmed, non-blank title.
    fn create_manuscript(&self, title: &str) -> RepoResult<Manuscript>;
    /// Loads one manuscript by id.
    fn get_manuscript(&self, id: ManuscriptId) -> RepoResult<Option<Manuscript>>;
    /// Appends a quire at the end of the manuscript with the given leaves.
    fn create_quire(&self, manuscript_id: ManuscriptId, leaves: &[NewLeaf]) -> RepoResult<Quire>;
    /// Loads one quire with its leaves.
    fn get_quire(&self, id: QuireId) -> RepoResult<Option<Quire>>;
    /// Lists quires of one manuscript in position order.
    fn list_quires(&self, manuscript_id: ManuscriptId) -> RepoResult<Vec<Quire>>;
    /// Last quire of one manuscript, if any.
    fn last_quire(&self, manuscript_id: ManuscriptId) -> RepoResult<Option<Quire>>;
    /// Sibling directly before `id`.
    fn previous_quire(&self, id: QuireId) -> RepoResult<Option<Quire>>;
    /// Sibling directly after `id`.
    fn next_quire(&self, id: QuireId) -> RepoResult<Option<Quire>>;
    /// Replaces the whole leaf set of one quire.
    fn replace_leaves(&self, quire_id: QuireId, leaves: &[NewLeaf]) -> RepoResult<Quire>;
    /// Moves one quire to `target_position`, clamped to the sibling range.
    fn move_quire(&self, id: QuireId, target_position: u32) -> RepoResult<()>;
    /// Deletes one quire with its leaves and closes the position gap.
    fn delete_quire(&self, id: QuireId) -> RepoResult<()>;
}

/// SQLite-backed quire repository.
pub struct SqliteQuireRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuireRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl QuireRepository for SqliteQuireRepository<'_> {
    fn create_manuscript(&self, title: &str) -> RepoResult<Manuscript> {
        let manuscript = Manuscript {
            id: Uuid::new_v4(),
            title: normalize_title(title)?,
        };
        self.conn.execute(
            "INSERT INTO manuscripts (uuid, title) VALUES (?1, ?2);",
            params![manuscript.id.to_string(), manuscript.title.as_str()],
        )?;
        Ok(manuscript)
    }

    fn get_manuscript(&self, id: ManuscriptId) -> RepoResult<Option<Manuscript>> {
        let title: Option<String> = self
            .conn
            .query_row(
                "SELECT title FROM manuscripts WHERE uuid = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(title.map(|title| Manuscript { id, title }))
    }

    fn create_quire(&self, manuscript_id: ManuscriptId, leaves: &[NewLeaf]) -> RepoResult<Quire> {
        ensure_even_bifolia(leaves.iter().map(|leaf| leaf.single))?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM manuscripts WHERE uuid = ?1);",
            [manuscript_id.to_string()],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(RepoError::NotFound(manuscript_id));
        }

        let quire_id = Uuid::new_v4();
        let position = next_quire_position(&tx, manuscript_id)?;
        tx.execute(
            "INSERT INTO quires (uuid, manuscript_uuid, position) VALUES (?1, ?2, ?3);",
            params![quire_id.to_string(), manuscript_id.to_string(), position],
        )?;
        insert_leaves(&tx, quire_id, leaves)?;
        tx.commit()?;

        load_required_quire(self.conn, quire_id)
    }

    fn get_quire(&self, id: QuireId) -> RepoResult<Option<Quire>> {
        load_quire(self.conn, id)
    }

    fn list_quires(&self, manuscript_id: ManuscriptId) -> RepoResult<Vec<Quire>> {
        let mut stmt = self.conn.prepare(&format!(
            "{QUIRE_SELECT_SQL}
             WHERE manuscript_uuid = ?1
             ORDER BY position ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([manuscript_id.to_string()])?;
        let mut quires = Vec::new();
        while let Some(row) = rows.next()? {
            quires.push(parse_quire_row(row)?);
        }
        for quire in &mut quires {
            quire.leaves = load_leaves(self.conn, quire.id)?;
            ensure_persisted_valid(&quire)?;
        }
        Ok(quires)
    }

    fn last_quire(&self, manuscript_id: ManuscriptId) -> RepoResult<Option<Quire>> {
        let id: Option<String> = self
            .conn
            .query_row(
                "SELECT uuid
                 FROM quires
                 WHERE manuscript_uuid = ?1
                 ORDER BY position DESC, uuid DESC
                 LIMIT 1;",
                [manuscript_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        match id {
            Some(value) => load_quire(self.conn, parse_uuid(&value, "quires.uuid")?),
            None => Ok(None),
        }
    }

    fn previous_quire(&self, id: QuireId) -> RepoResult<Option<Quire>> {
        sibling_quire(self.conn, id, -1)
    }

    fn next_quire(&self, id: QuireId) -> RepoResult<Option<Quire>> {
        sibling_quire(self.conn, id, 1)
    }

    fn replace_leaves(&self, quire_id: QuireId, leaves: &[NewLeaf]) -> RepoResult<Quire> {
        ensure_even_bifolia(leaves.iter().map(|leaf| leaf.single))?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE quires
             SET updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [quire_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(quire_id));
        }
        tx.execute(
            "DELETE FROM leaves WHERE quire_uuid = ?1;",
            [quire_id.to_string()],
        )?;
        insert_leaves(&tx, quire_id, leaves)?;
        tx.commit()?;

        load_required_quire(self.conn, quire_id)
    }

    fn move_quire(&self, id: QuireId, target_position: u32) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let manuscript_id = quire_manuscript(&tx, id)?.ok_or(RepoError::NotFound(id))?;

        let mut sibling_ids = list_quire_ids(&tx, manuscript_id)?;
        sibling_ids.retain(|sibling| *sibling != id);
        let target_index = (target_position.max(1) as usize - 1).min(sibling_ids.len());
        sibling_ids.insert(target_index, id);

        renumber_quires(&tx, &sibling_ids)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_quire(&self, id: QuireId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let manuscript_id = quire_manuscript(&tx, id)?.ok_or(RepoError::NotFound(id))?;

        tx.execute("DELETE FROM quires WHERE uuid = ?1;", [id.to_string()])?;
        let remaining = list_quire_ids(&tx, manuscript_id)?;
        renumber_quires(&tx, &remaining)?;
        tx.commit()?;
        Ok(())
    }
}

fn load_required_quire(conn: &Connection, id: QuireId) -> RepoResult<Quire> {
    load_quire(conn, id)?.ok_or(RepoError::NotFound(id))
}

fn load_quire(conn: &Connection, id: QuireId) -> RepoResult<Option<Quire>> {
    let mut stmt = conn.prepare(&format!("{QUIRE_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };
    let mut quire = parse_quire_row(row)?;
    quire.leaves = load_leaves(conn, id)?;
    ensure_persisted_valid(&quire)?;
    Ok(Some(quire))
}

fn ensure_persisted_valid(quire: &Quire) -> RepoResult<()> {
    quire
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("quire {}: {err}", quire.id)))
}

fn sibling_quire(conn: &Connection, id: QuireId, offset: i64) -> RepoResult<Option<Quire>> {
    let current: Option<(String, i64)> = conn
        .query_row(
            "SELECT manuscript_uuid, position FROM quires WHERE uuid = ?1;",
            [id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    let Some((manuscript_uuid, position)) = current else {
        return Err(RepoError::NotFound(id));
    };

    let sibling: Option<String> = conn
        .query_row(
            "SELECT uuid
             FROM quires
             WHERE manuscript_uuid = ?1
               AND position = ?2
             ORDER BY uuid ASC
             LIMIT 1;",
            params![manuscript_uuid, position + offset],
            |row| row.get(0),
        )
        .optional()?;
    match sibling {
        Some(value) => load_quire(conn, parse_uuid(&value, "quires.uuid")?),
        None => Ok(None),
    }
}

fn load_leaves(conn: &Connection, quire_id: QuireId) -> RepoResult<Vec<Leaf>> {
    let mut stmt = conn.prepare(
        "SELECT uuid, position, folio_number, single
         FROM leaves
         WHERE quire_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([quire_id.to_string()])?;
    let mut leaves = Vec::new();
    while let Some(row) = rows.next()? {
        leaves.push(parse_leaf_row(row)?);
    }
    Ok(leaves)
}

fn insert_leaves(tx: &Transaction<'_>, quire_id: QuireId, leaves: &[NewLeaf]) -> RepoResult<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO leaves (uuid, quire_uuid, position, folio_number, single)
         VALUES (?1, ?2, ?3, ?4, ?5);",
    )?;
    for (leaf, position) in leaves.iter().zip(1i64..) {
        stmt.execute(params![
            Uuid::new_v4().to_string(),
            quire_id.to_string(),
            position,
            leaf.folio_number.as_deref(),
            bool_to_int(leaf.single),
        ])?;
    }
    Ok(())
}

fn next_quire_position(conn: &Connection, manuscript_id: ManuscriptId) -> RepoResult<i64> {
    let next = conn.query_row(
        "SELECT COALESCE(MAX(position), 0) + 1
         FROM quires
         WHERE manuscript_uuid = ?1;",
        [manuscript_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(next)
}

fn quire_manuscript(conn: &Connection, id: QuireId) -> RepoResult<Option<ManuscriptId>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT manuscript_uuid FROM quires WHERE uuid = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    value
        .map(|value| parse_uuid(&value, "quires.manuscript_uuid"))
        .transpose()
}

fn list_quire_ids(conn: &Connection, manuscript_id: ManuscriptId) -> RepoResult<Vec<QuireId>> {
    let mut stmt = conn.prepare(
        "SELECT uuid
         FROM quires
         WHERE manuscript_uuid = ?1
         ORDER BY position ASC, uuid ASC;",
    )?;
    let mut rows = stmt.query([manuscript_id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "quires.uuid")?);
    }
    Ok(ids)
}

fn renumber_quires(tx: &Transaction<'_>, ordered_ids: &[QuireId]) -> RepoResult<()> {
    for (id, position) in ordered_ids.iter().zip(1i64..) {
        tx.execute(
            "UPDATE quires
             SET position = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND position <> ?2;",
            params![id.to_string(), position],
        )?;
    }
    Ok(())
}

fn parse_quire_row(row: &Row<'_>) -> RepoResult<Quire> {
    let id_text: String = row.get("uuid")?;
    let manuscript_text: String = row.get("manuscript_uuid")?;
    Ok(Quire {
        id: parse_uuid(&id_text, "quires.uuid")?,
        manuscript_id: parse_uuid(&manuscript_text, "quires.manuscript_uuid")?,
        position: parse_position(row.get("position")?, "quires.position")?,
        leaves: Vec::new(),
    })
}

fn parse_leaf_row(row: &Row<'_>) -> RepoResult<Leaf> {
    let id_text: String = row.get("uuid")?;
    let single = match row.get::<_, i64>("single")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid single value `{other}` in leaves.single"
            )));
        }
    };
    Ok(Leaf {
        id: parse_uuid(&id_text, "leaves.uuid")?,
        position: parse_position(row.get("position")?, "leaves.position")?,
        folio_number: row.get("folio_number")?,
        single,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn parse_position(value: i64, column: &'static str) -> RepoResult<u32> {
    u32::try_from(value)
        .ok()
        .filter(|position| *position >= 1)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid position `{value}` in {column}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
