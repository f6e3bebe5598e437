//! Whole-store attribute scans.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use rusqlite::{params, Connection};

use crate::error::Error;
use crate::props::{AttrKey, PropMap};
use crate::query::stream::{spawn_row_stream, RowStream};
use crate::store::{AttrValue, StoreHandle};

const ATTR_SCAN_SQL: &str = "\
    SELECT eav.entity_id, val.value \
    FROM objects_eav eav \
    JOIN objects_attr attr ON attr.id = eav.attribute_id \
    JOIN objects_val val ON val.id = eav.value_id \
    WHERE attr.category = ?1 AND attr.display_name = ?2";

const FULL_SCAN_SQL: &str = "\
    SELECT eav.entity_id, attr.category, attr.display_name, val.value \
    FROM objects_eav eav \
    JOIN objects_attr attr ON attr.id = eav.attribute_id \
    JOIN objects_val val ON val.id = eav.value_id";

/// Bulk and streaming queries across every entity of the store.
///
/// Batch variants materialize one map entry per matching EAV row; on large
/// models that is roughly the full property table in memory, so prefer the
/// streaming variants there. An attribute with no matching rows yields an
/// empty collection, never an error.
pub struct AttributeQuery {
    handle: StoreHandle,
}

impl AttributeQuery {
    /// Create a query layer over the given handle.
    pub fn new(handle: StoreHandle) -> Self {
        Self { handle }
    }

    pub(crate) fn handle(&self) -> &StoreHandle {
        &self.handle
    }

    /// Every (entity id, value) pair for one attribute, materialized.
    pub async fn attribute_values(
        &self,
        category: &str,
        display_name: &str,
    ) -> Result<HashMap<i64, AttrValue>, Error> {
        let (category, display_name) = validated(category, display_name)?;
        self.handle
            .run(move |conn| {
                let mut out = HashMap::new();
                scan_attribute(conn, &category, &display_name, |id, value| {
                    out.insert(id, value);
                    true
                })?;
                Ok(out)
            })
            .await
    }

    /// Same pairs as an ordered list, for callers that want random access
    /// or functional transforms.
    pub async fn attribute_values_list(
        &self,
        category: &str,
        display_name: &str,
    ) -> Result<Vec<(i64, AttrValue)>, Error> {
        let (category, display_name) = validated(category, display_name)?;
        self.handle
            .run(move |conn| {
                let mut out = Vec::new();
                scan_attribute(conn, &category, &display_name, |id, value| {
                    out.push((id, value));
                    true
                })?;
                Ok(out)
            })
            .await
    }

    /// Same pairs one at a time, without materializing the result.
    pub fn stream_attribute_values(
        &self,
        category: &str,
        display_name: &str,
    ) -> Result<RowStream<(i64, AttrValue)>, Error> {
        let (category, display_name) = validated(category, display_name)?;
        Ok(spawn_row_stream(&self.handle, move |conn, emit| {
            scan_attribute(conn, &category, &display_name, |id, value| {
                emit((id, value))
            })
        }))
    }

    /// Write the pairs into a caller-supplied concurrent map while other
    /// tasks read it. The scan is the map's only writer; returns the number
    /// of rows written.
    pub async fn attribute_values_into(
        &self,
        category: &str,
        display_name: &str,
        target: Arc<DashMap<i64, AttrValue>>,
    ) -> Result<u64, Error> {
        let (category, display_name) = validated(category, display_name)?;
        self.handle
            .run(move |conn| {
                let mut written = 0u64;
                scan_attribute(conn, &category, &display_name, |id, value| {
                    target.insert(id, value);
                    written += 1;
                    true
                })?;
                Ok(written)
            })
            .await
    }

    /// Every property of every entity, materialized per entity.
    ///
    /// This is the whole property table in memory; on big models use
    /// [`stream_all_properties`](Self::stream_all_properties) instead.
    pub async fn all_properties(&self) -> Result<HashMap<i64, PropMap>, Error> {
        self.handle
            .run(move |conn| {
                let mut out: HashMap<i64, PropMap> = HashMap::new();
                scan_full(conn, |id, key, value| {
                    out.entry(id).or_default().insert(key, value);
                    true
                })?;
                Ok(out)
            })
            .await
    }

    /// Every (entity id, attribute, value) triple as a flat list.
    pub async fn all_properties_list(&self) -> Result<Vec<(i64, AttrKey, AttrValue)>, Error> {
        self.handle
            .run(move |conn| {
                let mut out = Vec::new();
                scan_full(conn, |id, key, value| {
                    out.push((id, key, value));
                    true
                })?;
                Ok(out)
            })
            .await
    }

    /// Every triple one at a time; the recommended shape for big models.
    pub fn stream_all_properties(&self) -> RowStream<(i64, AttrKey, AttrValue)> {
        spawn_row_stream(&self.handle, move |conn, emit| {
            scan_full(conn, |id, key, value| emit((id, key, value)))
        })
    }

    /// Write every entity's properties into a caller-supplied concurrent
    /// map; returns the number of EAV rows written.
    pub async fn all_properties_into(
        &self,
        target: Arc<DashMap<i64, PropMap>>,
    ) -> Result<u64, Error> {
        self.handle
            .run(move |conn| {
                let mut written = 0u64;
                scan_full(conn, |id, key, value| {
                    target.entry(id).or_default().insert(key, value);
                    written += 1;
                    true
                })?;
                Ok(written)
            })
            .await
    }

    /// Entity ids whose value for the given attribute equals `value`.
    ///
    /// Comparison follows the SQLite affinity of the stored value column.
    pub async fn find_by_property(
        &self,
        category: &str,
        display_name: &str,
        value: &AttrValue,
    ) -> Result<Vec<i64>, Error> {
        let (category, display_name) = validated(category, display_name)?;
        let value = value.clone();
        self.handle
            .run(move |conn| {
                let sql = format!("{ATTR_SCAN_SQL} AND val.value = ?3");
                let mut stmt = conn.prepare_cached(&sql)?;
                let mut rows = stmt.query(params![category, display_name, value])?;
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    out.push(row.get(0)?);
                }
                Ok(out)
            })
            .await
    }
}

fn validated(category: &str, display_name: &str) -> Result<(String, String), Error> {
    if category.is_empty() {
        return Err(Error::Validation("category must not be empty".into()));
    }
    // Display names may legitimately be empty (the parent pointer is one).
    Ok((category.to_string(), display_name.to_string()))
}

fn scan_attribute(
    conn: &mut Connection,
    category: &str,
    display_name: &str,
    mut emit: impl FnMut(i64, AttrValue) -> bool,
) -> Result<(), Error> {
    let mut stmt = conn.prepare_cached(ATTR_SCAN_SQL)?;
    let mut rows = stmt.query(params![category, display_name])?;
    while let Some(row) = rows.next()? {
        let id = row.get(0)?;
        let value = AttrValue::infer(row.get_ref(1)?);
        if !emit(id, value) {
            break;
        }
    }
    Ok(())
}

fn scan_full(
    conn: &mut Connection,
    mut emit: impl FnMut(i64, AttrKey, AttrValue) -> bool,
) -> Result<(), Error> {
    let mut stmt = conn.prepare_cached(FULL_SCAN_SQL)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let id = row.get(0)?;
        let key = AttrKey::new(row.get::<_, String>(1)?, row.get::<_, String>(2)?);
        let value = AttrValue::infer(row.get_ref(3)?);
        if !emit(id, key, value) {
            break;
        }
    }
    Ok(())
}
