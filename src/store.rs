//! History store.
//!
//! Defines the contract between the calculator and the persistence layer, and an in-memory
//! implementation.

use crate::models::OperationRecord;

use async_trait::async_trait;
use std::cmp::Ordering;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// History store error type
#[derive(Debug, Error)]
pub enum StoreError {
    /// Error from the sled database
    #[error("sled database error")]
    Sled(#[from] sled::Error),

    /// Error (de)serialising a stored record
    #[error("failed to (de)serialise history record")]
    Serialisation(#[from] serde_json::Error),

    /// A blocking store task panicked or was cancelled
    #[error("history store task failed")]
    Join(#[from] tokio::task::JoinError),
}

/// Conditions a record must meet to be returned by a query
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryPredicate {
    /// Stored operation name. Names with no matching operation match nothing.
    pub operation: Option<String>,
    /// Half-open timestamp range `[start, end)`
    pub range: Option<(OffsetDateTime, OffsetDateTime)>,
}

impl HistoryPredicate {
    /// Whether a record satisfies the predicate.
    pub fn matches(&self, record: &OperationRecord) -> bool {
        if let Some(operation) = &self.operation {
            if AsRef::<str>::as_ref(&record.operation) != operation.as_str() {
                return false;
            }
        }
        if let Some((start, end)) = &self.range {
            match record.timestamp {
                Some(timestamp) if timestamp >= *start && timestamp < *end => (),
                _ => return false,
            }
        }
        true
    }
}

/// Field to sort query results by
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SortKey {
    Date,
    Result,
}

/// Direction of sorting
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sort order of query results
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistorySort {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl HistorySort {
    /// Compare two records.
    ///
    /// Records without a timestamp order before timestamped ones.
    pub fn compare(&self, a: &OperationRecord, b: &OperationRecord) -> Ordering {
        let ordering = match self.key {
            SortKey::Date => a.timestamp.cmp(&b.timestamp),
            SortKey::Result => a.result.total_cmp(&b.result),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Filter, sort and truncate records.
///
/// The sort is stable, so ties keep their input order.
pub fn select<I>(
    records: I,
    predicate: &HistoryPredicate,
    sort: HistorySort,
    limit: usize,
) -> Vec<OperationRecord>
where
    I: IntoIterator<Item = OperationRecord>,
{
    let mut selected = records
        .into_iter()
        .filter(|record| predicate.matches(record))
        .collect::<Vec<_>>();
    selected.sort_by(|a, b| sort.compare(a, b));
    selected.truncate(limit);
    selected
}

/// History store trait.
///
/// An append-only record store. Implementations must be safe to share between concurrent
/// requests.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a record.
    async fn insert(&self, record: OperationRecord) -> Result<(), StoreError>;

    /// Return at most `limit` records matching `predicate`, ordered by `sort`.
    async fn query(
        &self,
        predicate: &HistoryPredicate,
        sort: HistorySort,
        limit: usize,
    ) -> Result<Vec<OperationRecord>, StoreError>;
}

/// History store held in memory.
///
/// Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: RwLock<Vec<OperationRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn insert(&self, record: OperationRecord) -> Result<(), StoreError> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn query(
        &self,
        predicate: &HistoryPredicate,
        sort: HistorySort,
        limit: usize,
    ) -> Result<Vec<OperationRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(select(records.iter().cloned(), predicate, sort, limit))
    }
}
