//! Disk-resident fragment location side table.

use std::collections::HashMap;

use propdb_pack::FragmentLocation;
use rusqlite::{params, Connection};

use crate::error::Error;
use crate::query::{spawn_row_stream, RowStream};
use crate::store::{Store, StoreHandle};

const CREATE_SQL: &str = "\
    CREATE TABLE IF NOT EXISTS fragment_locations (\
        db_id INTEGER PRIMARY KEY, \
        x REAL NOT NULL, y REAL NOT NULL, z REAL NOT NULL, \
        min_x REAL NOT NULL, min_y REAL NOT NULL, min_z REAL NOT NULL, \
        max_x REAL NOT NULL, max_y REAL NOT NULL, max_z REAL NOT NULL)";

// Upsert keyed by primary key; re-embedding an id replaces its prior row.
const UPSERT_SQL: &str = "\
    INSERT OR REPLACE INTO fragment_locations \
    (db_id, x, y, z, min_x, min_y, min_z, max_x, max_y, max_z) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

const PROBE_SQL: &str =
    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'fragment_locations'";

const GET_SQL: &str = "\
    SELECT x, y, z, min_x, min_y, min_z, max_x, max_y, max_z \
    FROM fragment_locations WHERE db_id = ?1";

const SCAN_SQL: &str = "\
    SELECT db_id, x, y, z, min_x, min_y, min_z, max_x, max_y, max_z \
    FROM fragment_locations";

/// Persists decoded fragment locations next to the attribute tables and
/// serves point and scan lookups straight from disk.
///
/// The side table either does not exist (nothing was ever embedded) or is
/// fully queryable; a failed embed rolls back entirely, so no partial state
/// is ever observable. Embedding always opens its own read-write handle,
/// distinct from the read handle lookups use.
pub struct LocationStore {
    store: Store,
    reader: StoreHandle,
}

impl LocationStore {
    /// Create a location store over the given backing file, opening a
    /// dedicated read handle.
    pub fn new(store: Store) -> Result<Self, Error> {
        let reader = store.reader()?;
        Ok(Self { store, reader })
    }

    /// Persist a batch of decoded locations.
    ///
    /// Creates the side table on first use and upserts every entry inside a
    /// single transaction: either all entries land or none do.
    pub async fn embed(&self, locations: HashMap<u64, FragmentLocation>) -> Result<(), Error> {
        let writer = self.store.writer()?;
        let count = locations.len();
        writer
            .run(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(CREATE_SQL, [])?;
                {
                    let mut stmt = tx.prepare(UPSERT_SQL)?;
                    for (db_id, loc) in &locations {
                        let db_id = i64::try_from(*db_id).map_err(|_| {
                            Error::Validation(format!("entity id {db_id} out of range"))
                        })?;
                        stmt.execute(params![
                            db_id, loc.x, loc.y, loc.z, loc.min_x, loc.min_y, loc.min_z,
                            loc.max_x, loc.max_y, loc.max_z,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await?;
        tracing::info!(count, "embedded fragment locations");
        Ok(())
    }

    /// Whether the side table exists, determined from the store alone.
    pub async fn has_embedded_locations(&self) -> Result<bool, Error> {
        self.reader.run(|conn| table_exists(conn)).await
    }

    /// Number of embedded locations; 0 when the side table is absent.
    pub async fn location_count(&self) -> Result<i64, Error> {
        self.reader
            .run(|conn| {
                if !table_exists(conn)? {
                    return Ok(0);
                }
                Ok(conn.query_row("SELECT COUNT(*) FROM fragment_locations", [], |row| {
                    row.get(0)
                })?)
            })
            .await
    }

    /// Location of one entity; `None` for an unknown id.
    ///
    /// Fails with [`Error::FeatureUnavailable`] when locations were never
    /// embedded, so an absent table is never mistaken for an absent entity.
    pub async fn get_location(&self, db_id: i64) -> Result<Option<FragmentLocation>, Error> {
        self.reader
            .run(move |conn| {
                if !table_exists(conn)? {
                    return Err(Error::FeatureUnavailable);
                }
                let mut stmt = conn.prepare_cached(GET_SQL)?;
                let mut rows = stmt.query(params![db_id])?;
                match rows.next()? {
                    Some(row) => Ok(Some(location_from_row(row, 0)?)),
                    None => Ok(None),
                }
            })
            .await
    }

    /// Every embedded location, one row at a time in scan order.
    ///
    /// The first item is [`Error::FeatureUnavailable`] when locations were
    /// never embedded.
    pub fn stream_locations(&self) -> RowStream<(i64, FragmentLocation)> {
        spawn_row_stream(&self.reader, |conn, emit| {
            if !table_exists(conn)? {
                return Err(Error::FeatureUnavailable);
            }
            let mut stmt = conn.prepare_cached(SCAN_SQL)?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let db_id: i64 = row.get(0)?;
                if !emit((db_id, location_from_row(row, 1)?)) {
                    break;
                }
            }
            Ok(())
        })
    }
}

fn table_exists(conn: &Connection) -> Result<bool, Error> {
    let count: i64 = conn.query_row(PROBE_SQL, [], |row| row.get(0))?;
    Ok(count > 0)
}

/// Read nine location columns starting at `offset`. REAL columns come back
/// as f64; the stored values originate from f32, so the narrowing is exact.
fn location_from_row(row: &rusqlite::Row<'_>, offset: usize) -> Result<FragmentLocation, Error> {
    let f = |idx: usize| -> Result<f32, rusqlite::Error> {
        Ok(row.get::<_, f64>(offset + idx)? as f32)
    };
    Ok(FragmentLocation {
        x: f(0)?,
        y: f(1)?,
        z: f(2)?,
        min_x: f(3)?,
        min_y: f(4)?,
        min_z: f(5)?,
        max_x: f(6)?,
        max_y: f(7)?,
        max_z: f(8)?,
    })
}
