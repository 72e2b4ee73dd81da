//! Persistent history store backed by sled.

use crate::models::OperationRecord;
use crate::store::{self, HistoryPredicate, HistorySort, HistoryStore, StoreError};

use async_trait::async_trait;
use std::path::Path;

/// Name of the sled tree holding history records.
const HISTORY_TREE: &str = "history";

/// History store backed by an embedded sled database.
///
/// Records are JSON encoded and keyed by big-endian ids from [sled::Db::generate_id], so
/// iteration yields them in insertion order.
#[derive(Clone, Debug)]
pub struct SledHistoryStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledHistoryStore {
    /// Open or create a store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a store in a temporary database that is removed on drop.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, StoreError> {
        let tree = db.open_tree(HISTORY_TREE)?;
        Ok(Self { db, tree })
    }
}

#[async_trait]
impl HistoryStore for SledHistoryStore {
    #[tracing::instrument(level = "DEBUG", skip(self))]
    async fn insert(&self, record: OperationRecord) -> Result<(), StoreError> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let id = store.db.generate_id()?;
            let value = serde_json::to_vec(&record)?;
            store.tree.insert(id.to_be_bytes(), value)?;
            store.tree.flush()?;
            Ok::<(), StoreError>(())
        })
        .await?
    }

    #[tracing::instrument(level = "DEBUG", skip(self))]
    async fn query(
        &self,
        predicate: &HistoryPredicate,
        sort: HistorySort,
        limit: usize,
    ) -> Result<Vec<OperationRecord>, StoreError> {
        let tree = self.tree.clone();
        let records = tokio::task::spawn_blocking(move || {
            tree.iter()
                .values()
                .map(|value| -> Result<OperationRecord, StoreError> {
                    Ok(serde_json::from_slice(&value?)?)
                })
                .collect::<Result<Vec<_>, StoreError>>()
        })
        .await??;
        Ok(store::select(records, predicate, sort, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Operation;
    use crate::store::{SortDirection, SortKey};
    use crate::test_utils::record_at;
    use time::macros::datetime;

    #[tokio::test]
    async fn insert_query() {
        let store = SledHistoryStore::temporary().unwrap();
        let first = record_at(Operation::Sum, 5.0, datetime!(2024-01-15 08:00 UTC));
        let second = record_at(Operation::Multiply, 1.0, datetime!(2024-01-15 09:00 UTC));
        let third = record_at(Operation::Sum, 9.0, datetime!(2024-01-16 09:00 UTC));
        for record in [&first, &second, &third] {
            store.insert(record.clone()).await.unwrap();
        }

        let predicate = HistoryPredicate {
            operation: Some("sum".to_string()),
            range: None,
        };
        let sort = HistorySort {
            key: SortKey::Result,
            direction: SortDirection::Ascending,
        };
        let records = store.query(&predicate, sort, 20).await.unwrap();
        assert_eq!(vec![first, third], records);
    }

    #[tokio::test]
    async fn query_limit() {
        let store = SledHistoryStore::temporary().unwrap();
        for i in 0..30 {
            let record = record_at(
                Operation::Sum,
                i as f64,
                datetime!(2024-01-15 00:00 UTC) + time::Duration::minutes(i),
            );
            store.insert(record).await.unwrap();
        }
        let sort = HistorySort {
            key: SortKey::Date,
            direction: SortDirection::Descending,
        };
        let records = store
            .query(&HistoryPredicate::default(), sort, 20)
            .await
            .unwrap();
        assert_eq!(20, records.len());
        assert_eq!(29.0, records[0].result);
    }

    #[tokio::test]
    async fn reopen_keeps_records() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let store = SledHistoryStore::from_db(db.clone()).unwrap();
        let record = record_at(Operation::Divide, 0.5, datetime!(2024-01-15 00:00 UTC));
        store.insert(record.clone()).await.unwrap();
        drop(store);

        let store = SledHistoryStore::from_db(db).unwrap();
        let sort = HistorySort {
            key: SortKey::Date,
            direction: SortDirection::Descending,
        };
        let records = store
            .query(&HistoryPredicate::default(), sort, 20)
            .await
            .unwrap();
        assert_eq!(vec![record], records);
    }
}
