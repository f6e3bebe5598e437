//! Direct and inherited property resolution.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use rusqlite::{params, Connection};

use crate::error::Error;
use crate::props::key::AttrKey;
use crate::store::{AttrValue, StoreHandle};

/// Resolved properties of one entity, keyed by attribute.
pub type PropMap = BTreeMap<AttrKey, AttrValue>;

const DIRECT_SQL: &str = "\
    SELECT attr.category, attr.display_name, val.value \
    FROM objects_eav eav \
    JOIN objects_attr attr ON attr.id = eav.attribute_id \
    JOIN objects_val val ON val.id = eav.value_id \
    WHERE eav.entity_id = ?1";

/// Resolves direct and inherited properties for single entities.
///
/// Inheritance follows the parent-pointer chain: a key present on a nearer
/// descendant is never overwritten by an ancestor, transitively through
/// arbitrarily deep ancestry. The chain walk carries a visited-id set, so a
/// cyclic parent chain fails with [`Error::ParentCycle`] instead of looping.
pub struct PropertyResolver {
    handle: StoreHandle,
}

impl PropertyResolver {
    /// Create a resolver over the given handle.
    pub fn new(handle: StoreHandle) -> Self {
        Self { handle }
    }

    /// Properties stored directly on `db_id`.
    ///
    /// An unknown id yields an empty map. An attribute edge whose value
    /// column is NULL appears as [`AttrValue::Null`].
    pub async fn direct_properties(&self, db_id: i64) -> Result<PropMap, Error> {
        self.handle.run(move |conn| fetch_direct(conn, db_id)).await
    }

    /// Direct properties merged with every ancestor along the parent chain.
    pub async fn merged_properties(&self, db_id: i64) -> Result<PropMap, Error> {
        let mut memo = HashMap::new();
        let merged = self.merged_with_memo(db_id, &mut memo).await?;
        Ok((*merged).clone())
    }

    /// Merged properties for several entities, resolving each shared
    /// ancestor once.
    pub async fn merged_properties_many(
        &self,
        ids: &[i64],
    ) -> Result<HashMap<i64, PropMap>, Error> {
        let mut memo = HashMap::new();
        let mut out = HashMap::with_capacity(ids.len());
        for &id in ids {
            let merged = self.merged_with_memo(id, &mut memo).await?;
            out.insert(id, (*merged).clone());
        }
        Ok(out)
    }

    /// Resolve `db_id` against a memo of already-merged entities.
    ///
    /// Walks up the parent chain until it reaches a memoized ancestor or a
    /// root, then folds merged maps back down, memoizing every level.
    async fn merged_with_memo(
        &self,
        db_id: i64,
        memo: &mut HashMap<i64, Arc<PropMap>>,
    ) -> Result<Arc<PropMap>, Error> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = db_id;

        let mut inherited: Arc<PropMap> = loop {
            if let Some(cached) = memo.get(&cursor) {
                break Arc::clone(cached);
            }
            if !visited.insert(cursor) {
                return Err(Error::ParentCycle(cursor));
            }
            let direct = self.direct_properties(cursor).await?;
            let parent = parent_of(&direct);
            chain.push((cursor, direct));
            match parent {
                Some(parent_id) => cursor = parent_id,
                None => break Arc::new(PropMap::new()),
            }
        };

        for (id, mut direct) in chain.into_iter().rev() {
            merge_absent(&mut direct, &inherited);
            let merged = Arc::new(direct);
            memo.insert(id, Arc::clone(&merged));
            inherited = merged;
        }

        Ok(inherited)
    }
}

fn fetch_direct(conn: &mut Connection, db_id: i64) -> Result<PropMap, Error> {
    let mut stmt = conn.prepare_cached(DIRECT_SQL)?;
    let mut rows = stmt.query(params![db_id])?;

    let mut props = PropMap::new();
    while let Some(row) = rows.next()? {
        let key = AttrKey::new(
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
        );
        let value = AttrValue::infer(row.get_ref(2)?);
        props.insert(key, value);
    }
    Ok(props)
}

/// Parent entity id recorded in a property map, if any.
fn parent_of(props: &PropMap) -> Option<i64> {
    props.get(&AttrKey::parent()).and_then(AttrValue::as_i64)
}

/// Copy every key of `inherited` absent from `target` into `target`.
fn merge_absent(target: &mut PropMap, inherited: &PropMap) {
    for (key, value) in inherited {
        if !target.contains_key(key) {
            target.insert(key.clone(), value.clone());
        }
    }
}
