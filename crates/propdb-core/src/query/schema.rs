//! Schema discovery and id mapping.

use std::collections::{BTreeMap, HashMap};

use rusqlite::params;

use crate::error::Error;
use crate::query::scan::AttributeQuery;

/// One attribute definition row.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrDef {
    /// Attribute row id.
    pub id: i64,
    /// Attribute category.
    pub category: String,
    /// Attribute display name.
    pub display_name: String,
    /// Declared data-type code from the extraction process.
    pub data_type: i64,
}

impl AttributeQuery {
    /// Distinct attribute categories, lexicographically ordered.
    pub async fn categories(&self) -> Result<Vec<String>, Error> {
        self.handle()
            .run(|conn| {
                let mut stmt =
                    conn.prepare_cached("SELECT DISTINCT category FROM objects_attr ORDER BY category")?;
                let mut rows = stmt.query([])?;
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    out.push(row.get(0)?);
                }
                Ok(out)
            })
            .await
    }

    /// Distinct display names, lexicographically ordered.
    pub async fn display_names(&self) -> Result<Vec<String>, Error> {
        self.handle()
            .run(|conn| {
                let mut stmt = conn.prepare_cached(
                    "SELECT DISTINCT display_name FROM objects_attr ORDER BY display_name",
                )?;
                let mut rows = stmt.query([])?;
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    out.push(row.get(0)?);
                }
                Ok(out)
            })
            .await
    }

    /// Map of category to its display names, both lexicographically ordered.
    pub async fn category_map(&self) -> Result<BTreeMap<String, Vec<String>>, Error> {
        self.handle()
            .run(|conn| {
                let mut stmt = conn.prepare_cached(
                    "SELECT DISTINCT category, display_name FROM objects_attr \
                     ORDER BY category, display_name",
                )?;
                let mut rows = stmt.query([])?;
                let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
                while let Some(row) = rows.next()? {
                    let category: String = row.get(0)?;
                    out.entry(category).or_default().push(row.get(1)?);
                }
                Ok(out)
            })
            .await
    }

    /// Every attribute definition, ordered by category then display name.
    pub async fn attribute_defs(&self) -> Result<Vec<AttrDef>, Error> {
        self.handle()
            .run(|conn| {
                let mut stmt = conn.prepare_cached(
                    "SELECT id, category, display_name, data_type FROM objects_attr \
                     ORDER BY category, display_name",
                )?;
                let mut rows = stmt.query([])?;
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    out.push(AttrDef {
                        id: row.get(0)?,
                        category: row.get(1)?,
                        display_name: row.get(2)?,
                        data_type: row.get(3)?,
                    });
                }
                Ok(out)
            })
            .await
    }

    /// Number of entities in the store.
    pub async fn entity_count(&self) -> Result<i64, Error> {
        self.handle()
            .run(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM objects_id", [], |row| row.get(0))?))
            .await
    }

    /// External id of one entity, if recorded.
    pub async fn external_id(&self, db_id: i64) -> Result<Option<String>, Error> {
        self.handle()
            .run(move |conn| {
                let mut stmt =
                    conn.prepare_cached("SELECT external_id FROM objects_id WHERE id = ?1")?;
                let mut rows = stmt.query(params![db_id])?;
                match rows.next()? {
                    Some(row) => Ok(row.get(0)?),
                    None => Ok(None),
                }
            })
            .await
    }

    /// Full external id to entity id mapping.
    pub async fn external_id_map(&self) -> Result<HashMap<String, i64>, Error> {
        self.handle()
            .run(|conn| {
                let mut stmt = conn.prepare_cached(
                    "SELECT external_id, id FROM objects_id WHERE external_id IS NOT NULL",
                )?;
                let mut rows = stmt.query([])?;
                let mut out = HashMap::new();
                while let Some(row) = rows.next()? {
                    out.insert(row.get(0)?, row.get(1)?);
                }
                Ok(out)
            })
            .await
    }
}
