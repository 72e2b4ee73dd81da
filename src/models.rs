//! Data types and associated functions and methods

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use time::OffsetDateTime;

/// Supported arithmetic operations
///
/// The serialised names are those used by clients and by stored history records.
#[derive(
    AsRefStr, Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, PartialEq, Serialize,
)]
pub enum Operation {
    /// Addition of all operands
    #[serde(rename = "sum")]
    #[strum(serialize = "sum")]
    Sum,
    /// First operand minus the remaining operands
    #[serde(rename = "rest")]
    #[strum(serialize = "rest")]
    Subtract,
    /// Product of all operands
    #[serde(rename = "mult")]
    #[strum(serialize = "mult")]
    Multiply,
    /// First operand divided by the remaining operands
    #[serde(rename = "div")]
    #[strum(serialize = "div")]
    Divide,
}

/// A completed single operation, as persisted in the history store.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct OperationRecord {
    /// Operation performed
    pub operation: Operation,
    /// Operands in the order they were submitted
    #[serde(rename = "numbers")]
    pub operands: Vec<f64>,
    /// Result of the operation
    pub result: f64,
    /// Time of the computation in UTC.
    ///
    /// Always set for records created by this service. Records written by other producers may
    /// lack it.
    #[serde(
        rename = "date",
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<OffsetDateTime>,
}

impl OperationRecord {
    /// Return a record timestamped with the current UTC time.
    pub fn new(operation: Operation, operands: Vec<f64>, result: f64) -> Self {
        OperationRecord {
            operation,
            operands,
            result,
            timestamp: Some(OffsetDateTime::now_utc()),
        }
    }
}

/// Response body of the single operation endpoints
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct OperationResponse {
    pub operation: Operation,
    pub numbers: Vec<f64>,
    pub result: f64,
}

/// One item of a batch request
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct BatchItem {
    /// Operation name. Unknown or missing names are reported per item.
    #[serde(default)]
    pub op: Option<String>,
    /// Operands
    #[serde(default)]
    pub nums: Vec<f64>,
}

impl BatchItem {
    /// Return a BatchItem object
    pub fn new(op: &str, nums: Vec<f64>) -> Self {
        BatchItem {
            op: Some(op.to_string()),
            nums,
        }
    }
}

/// Outcome of one batch item
///
/// Serialised as either `{"op": ..., "result": ...}` or `{"op": ..., "error": ...}`.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchResult {
    Success { op: Option<String>, result: f64 },
    Failure { op: Option<String>, error: String },
}

/// Query parameters of the history endpoint
///
/// All parameters are free-form strings. Resolution into a store query, including fallbacks for
/// unrecognised values, happens in [crate::history].
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct HistoryFilter {
    /// Operation name, or `all`
    pub operation: Option<String>,
    /// Calendar day, `YYYY-MM-DD`
    pub date: Option<String>,
    /// `date` or `result`
    pub sort_by: Option<String>,
    /// `asc` or `desc`
    pub sort_order: Option<String>,
}

/// A history record as returned to clients
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub numbers: Vec<f64>,
    pub result: f64,
    pub operation: Operation,
    /// RFC 3339 timestamp, null when the record has none
    pub date: Option<String>,
}

/// Response body of the history endpoint
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_test::{assert_de_tokens, assert_de_tokens_error, assert_ser_tokens, Token};
    use std::str::FromStr;

    #[test]
    fn test_operation_names() {
        assert_eq!("sum", Operation::Sum.to_string());
        assert_eq!("rest", Operation::Subtract.to_string());
        let name: &str = Operation::Multiply.as_ref();
        assert_eq!("mult", name);
        assert_eq!(Operation::Divide, Operation::from_str("div").unwrap());
        assert!(Operation::from_str("divide").is_err());
    }

    #[test]
    fn test_operation_de() {
        assert_de_tokens(
            &Operation::Subtract,
            &[
                Token::Enum { name: "Operation" },
                Token::Str("rest"),
                Token::Unit,
            ],
        );
    }

    #[test]
    fn test_invalid_operation() {
        assert_de_tokens_error::<Operation>(
            &[
                Token::Enum { name: "Operation" },
                Token::Str("pow"),
                Token::Unit,
            ],
            "unknown variant `pow`, expected one of `sum`, `rest`, `mult`, `div`",
        )
    }

    #[test]
    fn test_batch_item_defaults() {
        assert_de_tokens(
            &BatchItem {
                op: None,
                nums: vec![],
            },
            &[
                Token::Struct {
                    name: "BatchItem",
                    len: 0,
                },
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn test_batch_result_ser() {
        assert_ser_tokens(
            &BatchResult::Failure {
                op: Some("sum".to_string()),
                error: "oops".to_string(),
            },
            &[
                Token::Struct {
                    name: "BatchResult",
                    len: 2,
                },
                Token::Str("op"),
                Token::Some,
                Token::Str("sum"),
                Token::Str("error"),
                Token::Str("oops"),
                Token::StructEnd,
            ],
        );
    }

    // The following tests use JSON data, to check that the fields map as expected.

    #[test]
    fn test_json_batch_items() {
        let json = r#"[{"op": "sum", "nums": [1, 2.5]}, {"op": "pow"}, {"nums": [1]}]"#;
        let items = serde_json::from_str::<Vec<BatchItem>>(json).unwrap();
        assert_eq!(
            items,
            vec![
                BatchItem::new("sum", vec![1.0, 2.5]),
                BatchItem::new("pow", vec![]),
                BatchItem {
                    op: None,
                    nums: vec![1.0]
                },
            ]
        );
    }

    #[test]
    fn test_json_batch_results() {
        let results = vec![
            BatchResult::Success {
                op: Some("mult".to_string()),
                result: 6.0,
            },
            BatchResult::Failure {
                op: None,
                error: "Operación no soportada.".to_string(),
            },
        ];
        assert_eq!(
            serde_json::to_string(&results).unwrap(),
            r#"[{"op":"mult","result":6.0},{"op":null,"error":"Operación no soportada."}]"#
        );
    }

    #[test]
    fn test_json_record() {
        let record = OperationRecord {
            operation: Operation::Divide,
            operands: vec![10.0, 4.0],
            result: 2.5,
            timestamp: Some(time::macros::datetime!(2024-01-15 10:30:00 UTC)),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"operation":"div","numbers":[10.0,4.0],"result":2.5,"date":"2024-01-15T10:30:00Z"}"#
        );
        assert_eq!(record, serde_json::from_str(&json).unwrap());
    }

    #[test]
    fn test_json_record_without_date() {
        let json = r#"{"operation":"sum","numbers":[1.0],"result":1.0}"#;
        let record = serde_json::from_str::<OperationRecord>(json).unwrap();
        assert_eq!(record.timestamp, None);
    }

    #[test]
    fn test_new_record_is_timestamped() {
        let before = OffsetDateTime::now_utc();
        let record = OperationRecord::new(Operation::Sum, vec![1.0, 2.0], 3.0);
        let timestamp = record.timestamp.unwrap();
        assert!(timestamp >= before);
        assert_eq!(timestamp.offset(), time::UtcOffset::UTC);
    }
}
