//! Ad-hoc parameterized queries.

use std::sync::Arc;

use rusqlite::params_from_iter;

use crate::error::Error;
use crate::store::{AttrValue, StoreHandle};

/// One result row of an ad-hoc query: column names in statement order plus
/// the typed value of each column.
///
/// The column header is shared across all rows of one result set.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<AttrValue>,
}

impl Row {
    /// Column names in statement order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Value of the named column, if present.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        let idx = self.columns.iter().position(|c| c == name)?;
        self.values.get(idx)
    }

    /// Value at a column index.
    pub fn get_at(&self, idx: usize) -> Option<&AttrValue> {
        self.values.get(idx)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate (column name, value) pairs in statement order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl StoreHandle {
    /// Execute an arbitrary parameterized read query.
    ///
    /// Parameters are always bound, never interpolated into the query text.
    /// No semantic validation is applied beyond that; the caller's SQL
    /// determines what the query does. Each row maps column names to typed
    /// values by storage class.
    pub async fn query_adhoc(
        &self,
        sql: &str,
        params: Vec<AttrValue>,
    ) -> Result<Vec<Row>, Error> {
        if sql.trim().is_empty() {
            return Err(Error::Validation("query text must not be empty".into()));
        }
        let sql = sql.to_string();
        self.run(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let columns: Arc<[String]> = stmt
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
                .into();

            let mut rows = stmt.query(params_from_iter(params.iter()))?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(columns.len());
                for idx in 0..columns.len() {
                    values.push(AttrValue::from_column(row.get_ref(idx)?));
                }
                out.push(Row {
                    columns: Arc::clone(&columns),
                    values,
                });
            }
            Ok(out)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    async fn seeded_handle(dir: &tempfile::TempDir) -> StoreHandle {
        let store = Store::open(dir.path().join("adhoc.sdb"));
        let handle = store.writer().unwrap();
        handle
            .run(|conn| {
                conn.execute_batch(
                    "CREATE TABLE items (name TEXT, qty INTEGER, weight REAL, note TEXT);
                     INSERT INTO items VALUES ('bolt', 12, 0.5, NULL);
                     INSERT INTO items VALUES ('nut', 40, 0.1, 'bagged');",
                )?;
                Ok(())
            })
            .await
            .unwrap();
        handle
    }

    #[tokio::test]
    async fn test_rows_are_typed_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let handle = seeded_handle(&dir).await;

        let rows = handle
            .query_adhoc(
                "SELECT name, qty, weight, note FROM items WHERE qty > ?1 ORDER BY name",
                vec![AttrValue::Integer(10)],
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].columns(), ["name", "qty", "weight", "note"]);
        assert_eq!(rows[0].get("name"), Some(&AttrValue::Text("bolt".into())));
        assert_eq!(rows[0].get("qty"), Some(&AttrValue::Integer(12)));
        assert_eq!(rows[0].get("weight"), Some(&AttrValue::Real(0.5)));
        assert_eq!(rows[0].get("note"), Some(&AttrValue::Null));
        assert_eq!(rows[1].get_at(0), Some(&AttrValue::Text("nut".into())));
    }

    #[tokio::test]
    async fn test_empty_sql_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let handle = seeded_handle(&dir).await;
        let result = handle.query_adhoc("   ", vec![]).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_no_matches_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let handle = seeded_handle(&dir).await;
        let rows = handle
            .query_adhoc(
                "SELECT name FROM items WHERE qty > ?1",
                vec![AttrValue::Integer(1000)],
            )
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
