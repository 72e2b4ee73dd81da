use crate::models::*;

use time::OffsetDateTime;

/// Create an OperationRecord with the given result and timestamp.
pub(crate) fn record_at(
    operation: Operation,
    result: f64,
    timestamp: OffsetDateTime,
) -> OperationRecord {
    OperationRecord {
        operation,
        operands: vec![result],
        result,
        timestamp: Some(timestamp),
    }
}
