//! Shared test fixtures: a scene database with the normalized EAV schema.

use std::path::PathBuf;

use rusqlite::{params, Connection};

use propdb_core::Store;

/// A temporary scene database populated through raw SQL.
pub struct TestModel {
    pub store: Store,
    path: PathBuf,
    _dir: tempfile::TempDir,
}

impl TestModel {
    /// Create an empty model database with the four attribute tables.
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.sdb");

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE objects_id (
                 id INTEGER PRIMARY KEY,
                 external_id TEXT,
                 viewable_id TEXT
             );
             CREATE TABLE objects_attr (
                 id INTEGER PRIMARY KEY,
                 category TEXT NOT NULL,
                 display_name TEXT NOT NULL,
                 data_type INTEGER NOT NULL DEFAULT 0
             );
             CREATE TABLE objects_val (
                 id INTEGER PRIMARY KEY,
                 value TEXT
             );
             CREATE TABLE objects_eav (
                 entity_id INTEGER NOT NULL,
                 attribute_id INTEGER NOT NULL,
                 value_id INTEGER NOT NULL
             );",
        )
        .unwrap();
        drop(conn);

        let store = Store::open(&path);
        Self {
            store,
            path,
            _dir: dir,
        }
    }

    /// Register an entity row.
    pub fn add_entity(&self, id: i64, external_id: &str) {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO objects_id (id, external_id, viewable_id) VALUES (?1, ?2, NULL)",
            params![id, external_id],
        )
        .unwrap();
    }

    /// Attach a property edge, creating attribute and value rows as needed.
    /// A `None` value produces a NULL value row.
    pub fn set_prop(&self, entity_id: i64, category: &str, display_name: &str, value: Option<&str>) {
        let conn = self.conn();

        let attr_id: i64 = match conn
            .query_row(
                "SELECT id FROM objects_attr WHERE category = ?1 AND display_name = ?2",
                params![category, display_name],
                |row| row.get(0),
            ) {
            Ok(id) => id,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                conn.execute(
                    "INSERT INTO objects_attr (category, display_name, data_type) VALUES (?1, ?2, 0)",
                    params![category, display_name],
                )
                .unwrap();
                conn.last_insert_rowid()
            }
            Err(err) => panic!("attribute lookup failed: {err}"),
        };

        conn.execute("INSERT INTO objects_val (value) VALUES (?1)", params![value])
            .unwrap();
        let value_id = conn.last_insert_rowid();

        conn.execute(
            "INSERT INTO objects_eav (entity_id, attribute_id, value_id) VALUES (?1, ?2, ?3)",
            params![entity_id, attr_id, value_id],
        )
        .unwrap();
    }

    /// Point an entity at its parent.
    pub fn set_parent(&self, entity_id: i64, parent_id: i64) {
        self.set_prop(entity_id, "__parent__", "", Some(&parent_id.to_string()));
    }

    fn conn(&self) -> Connection {
        Connection::open(&self.path).unwrap()
    }
}

/// The wall scenario: entity 100 is a wall with dimensions and a type
/// parent 300 that carries the material.
pub fn wall_model() -> TestModel {
    let model = TestModel::new();
    model.add_entity(100, "ext-wall-100");
    model.add_entity(300, "ext-type-300");

    model.set_prop(100, "Dimensions", "Width", Some("10.5"));
    model.set_prop(100, "Dimensions", "Height", Some("3.0"));
    model.set_prop(100, "Item", "Name", Some("Basic Wall"));
    model.set_prop(100, "Item", "Category", Some("Walls"));
    model.set_parent(100, 300);

    model.set_prop(300, "Materials", "Material", Some("Default Material"));

    model
}
