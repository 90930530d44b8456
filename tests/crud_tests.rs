//! End-to-end CRUD against SQLite files

use std::sync::Arc;

use relmap::translation::H2Translation;
use relmap::{Database, Entity, SqliteProvider, no_binding};
use tempfile::TempDir;

#[derive(Debug, Default, Clone, PartialEq, Entity)]
#[entity(table = "FLAT_ENTITY")]
struct FlatEntity {
    #[id]
    id: String,
    #[column]
    name: String,
    #[column]
    age: i32,
}

fn flat(id: &str, name: &str, age: i32) -> FlatEntity {
    FlatEntity {
        id: id.to_string(),
        name: name.to_string(),
        age,
    }
}

fn open(dir: &TempDir) -> Database {
    Database::new(SqliteProvider::new(dir.path().join("crud.db")))
}

fn count(db: &Database) -> usize {
    db.find_all::<FlatEntity>().unwrap().len()
}

#[test]
fn test_flat_entity_ddl() {
    let dir = TempDir::new().unwrap();
    let db = Database::with_translation(
        SqliteProvider::new(dir.path().join("ddl.db")),
        Arc::new(H2Translation),
    );

    let metadata = db.get_or_create_entity::<FlatEntity>().unwrap();
    assert_eq!(
        metadata.ddl(),
        vec!["CREATE TABLE FLAT_ENTITY (id VARCHAR(255), age INTEGER, name VARCHAR(255), PRIMARY KEY (id))"]
    );

    db.create_table::<FlatEntity>().unwrap();
    assert!(db.find_all::<FlatEntity>().unwrap().is_empty());
}

#[test]
fn test_crud_scenario() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    db.create_table::<FlatEntity>().unwrap();

    let mut first = flat("1", "test", 30);
    assert_eq!(db.insert(&mut first).unwrap(), 1);
    assert_eq!(count(&db), 1);

    first.age = 35;
    assert_eq!(db.update(&mut first).unwrap(), 1);
    let loaded = db.find_by_id::<FlatEntity>("1").unwrap().unwrap();
    assert_eq!(loaded.age, 35);
    assert_eq!(count(&db), 1);

    let mut second = flat("2", "test2", 40);
    db.insert(&mut second).unwrap();
    assert_eq!(count(&db), 2);

    assert_eq!(db.delete(&mut first).unwrap(), 1);
    assert_eq!(count(&db), 1);
    assert!(db.find_by_id::<FlatEntity>("1").unwrap().is_none());

    db.delete(&mut second).unwrap();
    assert_eq!(count(&db), 0);
}

#[test]
fn test_round_trip_preserves_every_field() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    db.create_table::<FlatEntity>().unwrap();

    let mut original = flat("abc", "Grace", 85);
    db.insert(&mut original).unwrap();

    let loaded: Option<FlatEntity> = db.find_by_id("abc").unwrap();
    assert_eq!(loaded, Some(original));
}

#[test]
fn test_order_by_query_keeps_result_order() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    db.create_table::<FlatEntity>().unwrap();

    for (id, age) in [("c", 41), ("a", 17), ("d", 99), ("b", 23)] {
        db.insert(&mut flat(id, "n", age)).unwrap();
    }

    let by_age: Vec<i32> = db
        .query::<FlatEntity, _>("SELECT id, name, age FROM FLAT_ENTITY ORDER BY age DESC", no_binding)
        .unwrap()
        .into_iter()
        .map(|e| e.age)
        .collect();
    assert_eq!(by_age, vec![99, 41, 23, 17]);

    let by_id: Vec<String> = db
        .query::<FlatEntity, _>("SELECT * FROM FLAT_ENTITY WHERE age > ? ORDER BY id", |stmt| {
            stmt.bind(1, 20)
        })
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(by_id, vec!["b", "c", "d"]);
}

#[test]
fn test_translation_is_probed_from_connection() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    assert_eq!(db.translation().unwrap().name(), "sqlite");
    let metadata = db.get_or_create_entity::<FlatEntity>().unwrap();
    assert_eq!(
        metadata.ddl()[0],
        "CREATE TABLE FLAT_ENTITY (id TEXT, age INTEGER, name TEXT, PRIMARY KEY (id))"
    );
}

#[test]
fn test_metadata_is_built_once_per_handle() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);

    let first = db.get_or_create_entity::<FlatEntity>().unwrap();
    let second = db.get_or_create_entity::<FlatEntity>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.sql(), second.sql());

    let other = open(&dir);
    let third = other.get_or_create_entity::<FlatEntity>().unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(first.sql(), third.sql());
}

#[test]
fn test_concurrent_first_use_publishes_one_mapping() {
    let dir = TempDir::new().unwrap();
    let db = Arc::new(open(&dir));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let db = Arc::clone(&db);
            std::thread::spawn(move || db.get_or_create_entity::<FlatEntity>().unwrap())
        })
        .collect();
    let mappings: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let canonical = db.get_or_create_entity::<FlatEntity>().unwrap();
    assert!(mappings.iter().all(|m| Arc::ptr_eq(m, &canonical)));
}

#[test]
fn test_execute_runs_ad_hoc_updates() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    db.create_table::<FlatEntity>().unwrap();
    db.insert(&mut flat("1", "a", 1)).unwrap();
    db.insert(&mut flat("2", "b", 2)).unwrap();

    let changed = db
        .execute("UPDATE FLAT_ENTITY SET age = age + ?", |stmt| stmt.bind(1, 10))
        .unwrap();
    assert_eq!(changed, 2);

    let ages: Vec<i32> = db
        .query::<FlatEntity, _>("SELECT age FROM FLAT_ENTITY ORDER BY age", no_binding)
        .unwrap()
        .into_iter()
        .map(|e| e.age)
        .collect();
    assert_eq!(ages, vec![11, 12]);
}

#[test]
fn test_duplicate_insert_is_storage_error() {
    let dir = TempDir::new().unwrap();
    let db = open(&dir);
    db.create_table::<FlatEntity>().unwrap();

    db.insert(&mut flat("1", "a", 1)).unwrap();
    let err = db.insert(&mut flat("1", "b", 2)).unwrap_err();
    assert!(err.is_storage());
    assert_eq!(count(&db), 1);
}
