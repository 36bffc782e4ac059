use collation_core::db::migrations::latest_version;
use collation_core::db::open_db_in_memory;
use collation_core::{
    NewLeaf, Quire, QuireRepository, QuireValidationError, RepoError, SqliteQuireRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn labelled(labels: &[&str]) -> Vec<NewLeaf> {
    labels
        .iter()
        .map(|label| NewLeaf::new(Some(label.to_string()), false))
        .collect()
}

fn positions(quires: &[Quire]) -> Vec<(Uuid, u32)> {
    quires.iter().map(|quire| (quire.id, quire.position)).collect()
}

#[test]
fn create_and_get_roundtrip_keeps_leaf_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQuireRepository::try_new(&conn).unwrap();

    let manuscript = repo.create_manuscript("  Book of Hours ").unwrap();
    assert_eq!(manuscript.title, "Book of Hours");

    let mut leaves = labelled(&["1", "2", "3", "4"]);
    leaves.insert(1, NewLeaf::new(None, true));
    let created = repo.create_quire(manuscript.id, &leaves).unwrap();
    assert_eq!(created.position, 1);

    let loaded = repo.get_quire(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.manuscript_id, manuscript.id);
    let stored: Vec<_> = loaded
        .leaves
        .iter()
        .map(|leaf| (leaf.position, leaf.folio_number.as_deref(), leaf.single))
        .collect();
    assert_eq!(
        stored,
        vec![
            (1, Some("1"), false),
            (2, None, true),
            (3, Some("2"), false),
            (4, Some("3"), false),
            (5, Some("4"), false),
        ]
    );
}

#[test]
fn get_missing_records_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQuireRepository::try_new(&conn).unwrap();

    assert!(repo.get_manuscript(Uuid::new_v4()).unwrap().is_none());
    assert!(repo.get_quire(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn create_rejects_blank_title_and_odd_bifolia() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQuireRepository::try_new(&conn).unwrap();

    let err = repo.create_manuscript("   ").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(QuireValidationError::BlankTitle)
    ));

    let manuscript = repo.create_manuscript("Psalter").unwrap();
    let err = repo
        .create_quire(manuscript.id, &labelled(&["1", "2", "3"]))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(QuireValidationError::OddBifoliaCount { found: 3 })
    ));
    assert!(repo.list_quires(manuscript.id).unwrap().is_empty());
}

#[test]
fn create_quire_for_missing_manuscript_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQuireRepository::try_new(&conn).unwrap();

    let missing = Uuid::new_v4();
    let err = repo.create_quire(missing, &[]).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn quires_append_and_navigate_in_position_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQuireRepository::try_new(&conn).unwrap();
    let manuscript = repo.create_manuscript("Psalter").unwrap();
    let other = repo.create_manuscript("Gradual").unwrap();

    let first = repo.create_quire(manuscript.id, &labelled(&["1", "2"])).unwrap();
    let second = repo.create_quire(manuscript.id, &labelled(&["3", "4"])).unwrap();
    let third = repo.create_quire(manuscript.id, &[]).unwrap();
    let foreign = repo.create_quire(other.id, &[]).unwrap();
    assert_eq!(foreign.position, 1);

    let listed = repo.list_quires(manuscript.id).unwrap();
    assert_eq!(
        positions(&listed),
        vec![(first.id, 1), (second.id, 2), (third.id, 3)]
    );

    assert_eq!(repo.last_quire(manuscript.id).unwrap().unwrap().id, third.id);
    assert!(repo.last_quire(Uuid::new_v4()).unwrap().is_none());

    assert!(repo.previous_quire(first.id).unwrap().is_none());
    assert_eq!(repo.next_quire(first.id).unwrap().unwrap().id, second.id);
    assert_eq!(repo.previous_quire(second.id).unwrap().unwrap().id, first.id);
    assert_eq!(repo.next_quire(second.id).unwrap().unwrap().id, third.id);
    assert!(repo.next_quire(third.id).unwrap().is_none());

    let missing = Uuid::new_v4();
    assert!(matches!(
        repo.next_quire(missing).unwrap_err(),
        RepoError::NotFound(id) if id == missing
    ));
}

#[test]
fn replace_leaves_swaps_the_whole_set() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQuireRepository::try_new(&conn).unwrap();
    let manuscript = repo.create_manuscript("Psalter").unwrap();
    let quire = repo
        .create_quire(manuscript.id, &labelled(&["1", "2", "3", "4"]))
        .unwrap();

    let replaced = repo
        .replace_leaves(quire.id, &labelled(&["10", "11"]))
        .unwrap();
    assert_eq!(replaced.leaves.len(), 2);
    assert_eq!(replaced.leaves[0].folio_number.as_deref(), Some("10"));
    assert_eq!(replaced.leaves[1].position, 2);

    let stored: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM leaves WHERE quire_uuid = ?1;",
            [quire.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, 2);
}

#[test]
fn replace_leaves_with_odd_bifolia_keeps_previous_set() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQuireRepository::try_new(&conn).unwrap();
    let manuscript = repo.create_manuscript("Psalter").unwrap();
    let quire = repo
        .create_quire(manuscript.id, &labelled(&["1", "2"]))
        .unwrap();

    let err = repo
        .replace_leaves(quire.id, &labelled(&["1"]))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(QuireValidationError::OddBifoliaCount { found: 1 })
    ));
    assert_eq!(repo.get_quire(quire.id).unwrap().unwrap().leaves.len(), 2);

    let missing = Uuid::new_v4();
    let err = repo.replace_leaves(missing, &[]).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn move_quire_reorders_and_clamps_target() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQuireRepository::try_new(&conn).unwrap();
    let manuscript = repo.create_manuscript("Psalter").unwrap();
    let a = repo.create_quire(manuscript.id, &[]).unwrap();
    let b = repo.create_quire(manuscript.id, &[]).unwrap();
    let c = repo.create_quire(manuscript.id, &[]).unwrap();

    repo.move_quire(c.id, 1).unwrap();
    assert_eq!(
        positions(&repo.list_quires(manuscript.id).unwrap()),
        vec![(c.id, 1), (a.id, 2), (b.id, 3)]
    );

    repo.move_quire(c.id, 99).unwrap();
    assert_eq!(
        positions(&repo.list_quires(manuscript.id).unwrap()),
        vec![(a.id, 1), (b.id, 2), (c.id, 3)]
    );

    repo.move_quire(b.id, 0).unwrap();
    assert_eq!(
        positions(&repo.list_quires(manuscript.id).unwrap()),
        vec![(b.id, 1), (a.id, 2), (c.id, 3)]
    );

    let missing = Uuid::new_v4();
    assert!(matches!(
        repo.move_quire(missing, 1).unwrap_err(),
        RepoError::NotFound(id) if id == missing
    ));
}

#[test]
fn delete_quire_closes_gap_and_removes_leaves() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQuireRepository::try_new(&conn).unwrap();
    let manuscript = repo.create_manuscript("Psalter").unwrap();
    let a = repo.create_quire(manuscript.id, &[]).unwrap();
    let b = repo
        .create_quire(manuscript.id, &labelled(&["1", "2"]))
        .unwrap();
    let c = repo.create_quire(manuscript.id, &[]).unwrap();

    repo.delete_quire(b.id).unwrap();

    assert!(repo.get_quire(b.id).unwrap().is_none());
    assert_eq!(
        positions(&repo.list_quires(manuscript.id).unwrap()),
        vec![(a.id, 1), (c.id, 2)]
    );
    let orphaned: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM leaves WHERE quire_uuid = ?1;",
            [b.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphaned, 0);

    assert!(matches!(
        repo.delete_quire(b.id).unwrap_err(),
        RepoError::NotFound(id) if id == b.id
    ));
}

#[test]
fn read_rejects_persisted_odd_bifolia() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteQuireRepository::try_new(&conn).unwrap();
    let manuscript = repo.create_manuscript("Psalter").unwrap();
    let quire = repo
        .create_quire(manuscript.id, &labelled(&["1", "2"]))
        .unwrap();

    conn.execute(
        "UPDATE leaves SET single = 1 WHERE quire_uuid = ?1 AND position = 1;",
        [quire.id.to_string()],
    )
    .unwrap();

    let err = repo.get_quire(quire.id).unwrap_err();
    assert!(
        matches!(&err, RepoError::InvalidData(message) if message.contains("cannot be odd")),
        "unexpected error: {err}"
    );
    assert!(matches!(
        repo.list_quires(manuscript.id).unwrap_err(),
        RepoError::InvalidData(_)
    ));
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteQuireRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}
