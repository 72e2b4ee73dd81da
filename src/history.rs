//! Operation history.
//!
//! Persists completed single operations and answers history queries against a
//! [HistoryStore](crate::store::HistoryStore).

use crate::error::CalculatorError;
use crate::models::{HistoryEntry, HistoryFilter, OperationRecord};
use crate::store::{HistoryPredicate, HistorySort, HistoryStore, SortDirection, SortKey};

use std::future::Future;
use std::time::Duration;
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Maximum number of records returned by a history query.
pub const HISTORY_LIMIT: usize = 20;

/// Operation filter value meaning "every operation".
const ALL_OPERATIONS: &str = "all";

/// Parse the calendar day of a date filter.
///
/// Accepts `YYYY-MM-DD`, or an ISO 8601 date-time whose date part is used as is.
fn parse_day(date: &str) -> Result<Date, CalculatorError> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(date, format)
        .or_else(|error| {
            OffsetDateTime::parse(date, &Rfc3339)
                .map(|datetime| datetime.date())
                .or_else(|_| PrimitiveDateTime::parse(date, &Iso8601::DEFAULT).map(|d| d.date()))
                .map_err(|_| error)
        })
        .map_err(|source| CalculatorError::MalformedDate {
            date: date.to_string(),
            source,
        })
}

/// Build the store predicate for a filter.
fn predicate(filter: &HistoryFilter) -> Result<HistoryPredicate, CalculatorError> {
    let operation = filter
        .operation
        .as_ref()
        .filter(|operation| !operation.is_empty() && operation.as_str() != ALL_OPERATIONS)
        .cloned();
    let range = match filter.date.as_deref().filter(|date| !date.is_empty()) {
        Some(date) => {
            let start = parse_day(date)?.midnight().assume_utc();
            Some((start, start + time::Duration::days(1)))
        }
        None => None,
    };
    Ok(HistoryPredicate { operation, range })
}

/// Resolve the sort order of a filter.
///
/// Unknown sort fields fall back to the date. Any order other than `desc` is ascending.
fn sort(filter: &HistoryFilter) -> HistorySort {
    let key = match filter.sort_by.as_deref() {
        Some("result") => SortKey::Result,
        _ => SortKey::Date,
    };
    let direction = match filter.sort_order.as_deref() {
        Some("desc") | None => SortDirection::Descending,
        _ => SortDirection::Ascending,
    };
    HistorySort { key, direction }
}

/// Project a stored record into its client representation.
fn project(record: OperationRecord) -> HistoryEntry {
    HistoryEntry {
        numbers: record.operands,
        result: record.result,
        operation: record.operation,
        date: record
            .timestamp
            .and_then(|timestamp| timestamp.format(&Rfc3339).ok()),
    }
}

/// Await a store call, failing if it does not complete within `timeout`.
async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, CalculatorError>
where
    F: Future<Output = Result<T, crate::store::StoreError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(CalculatorError::StoreTimeout {
            seconds: timeout.as_secs(),
        }),
    }
}

/// Query the history.
///
/// Returns at most [HISTORY_LIMIT] projected records.
///
/// # Arguments
///
/// * `store`: History store
/// * `filter`: Client supplied filter and sort parameters
/// * `timeout`: Maximum time to wait for the store
pub async fn query(
    store: &dyn HistoryStore,
    filter: &HistoryFilter,
    timeout: Duration,
) -> Result<Vec<HistoryEntry>, CalculatorError> {
    let predicate = predicate(filter)?;
    let sort = sort(filter);
    tracing::debug!(?predicate, ?sort, "querying history");
    let records = bounded(timeout, store.query(&predicate, sort, HISTORY_LIMIT)).await?;
    Ok(records.into_iter().map(project).collect())
}

/// Append a record to the history.
///
/// # Arguments
///
/// * `store`: History store
/// * `record`: Record of a successful single operation
/// * `timeout`: Maximum time to wait for the store
pub async fn record(
    store: &dyn HistoryStore,
    record: OperationRecord,
    timeout: Duration,
) -> Result<(), CalculatorError> {
    bounded(timeout, store.insert(record)).await
}
