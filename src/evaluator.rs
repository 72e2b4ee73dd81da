//! Arithmetic evaluator.
//!
//! Validates operand lists and dispatches them to the [Reduction] for the requested operation,
//! either one at a time or as a batch with per-item error isolation.

use std::str::FromStr;

use crate::error::CalculatorError;
use crate::metrics::OPERATIONS_EVALUATED;
use crate::models::{BatchItem, BatchResult, Operation};
use crate::operation::{Mode, Reduction};
use crate::operations;

/// Fail if any operand is strictly negative.
pub fn validate_non_negative(operands: &[f64]) -> Result<(), CalculatorError> {
    if operands.iter().any(|operand| *operand < 0.0) {
        return Err(CalculatorError::NegativeOperand);
    }
    Ok(())
}

/// Fail if a result overflowed to an infinite or NaN value.
fn check_finite(result: f64) -> Result<f64, CalculatorError> {
    if !result.is_finite() {
        return Err(CalculatorError::NonFiniteResult);
    }
    Ok(result)
}

impl Operation {
    /// Execute the reduction for this operation, without the negative operand check.
    fn reduce(self, operands: &[f64], mode: Mode) -> Result<f64, CalculatorError> {
        match self {
            Operation::Sum => operations::Sum::execute(operands, mode),
            Operation::Subtract => operations::Subtract::execute(operands, mode),
            Operation::Multiply => operations::Multiply::execute(operands, mode),
            Operation::Divide => operations::Divide::execute(operands, mode),
        }
    }
}

/// Record the outcome of an evaluation.
fn observe<T>(operation: &str, result: &Result<T, CalculatorError>) {
    let outcome = if result.is_ok() { "ok" } else { "error" };
    OPERATIONS_EVALUATED
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Evaluate a single operation.
///
/// # Arguments
///
/// * `operation`: Operation to perform
/// * `operands`: Operands in submission order
pub fn evaluate(operation: Operation, operands: &[f64]) -> Result<f64, CalculatorError> {
    let result = validate_non_negative(operands)
        .and_then(|_| operation.reduce(operands, Mode::Single))
        .and_then(check_finite);
    observe(operation.as_ref(), &result);
    result
}

/// Sum the operands.
pub fn sum(operands: &[f64]) -> Result<f64, CalculatorError> {
    evaluate(Operation::Sum, operands)
}

/// Subtract the remaining operands from the first.
pub fn subtract(operands: &[f64]) -> Result<f64, CalculatorError> {
    evaluate(Operation::Subtract, operands)
}

/// Multiply the operands.
pub fn multiply(operands: &[f64]) -> Result<f64, CalculatorError> {
    evaluate(Operation::Multiply, operands)
}

/// Divide the first operand by the remaining operands.
pub fn divide(operands: &[f64]) -> Result<f64, CalculatorError> {
    evaluate(Operation::Divide, operands)
}

/// Evaluate one batch item.
fn evaluate_item(item: &BatchItem) -> Result<f64, CalculatorError> {
    validate_non_negative(&item.nums)?;
    let operation = item
        .op
        .as_deref()
        .and_then(|op| Operation::from_str(op).ok())
        .ok_or_else(|| CalculatorError::UnsupportedOperation {
            operation: item.op.clone(),
        })?;
    operation
        .reduce(&item.nums, Mode::Batch)
        .and_then(check_finite)
}

/// Evaluate a batch of operations.
///
/// Returns one result per item, in input order. A failed item is reported in its own result and
/// does not affect the others. Batch results are never persisted.
pub fn batch(items: &[BatchItem]) -> Vec<BatchResult> {
    items
        .iter()
        .map(|item| {
            let result = evaluate_item(item);
            let label = item
                .op
                .as_deref()
                .filter(|op| Operation::from_str(op).is_ok())
                .unwrap_or("unsupported");
            observe(label, &result);
            let op = item.op.clone();
            match result {
                Ok(result) => BatchResult::Success { op, result },
                Err(CalculatorError::DivisionByZero) => BatchResult::Failure {
                    op,
                    error: "No se puede dividir por cero.".to_string(),
                },
                Err(error) => BatchResult::Failure {
                    op,
                    error: error.to_string(),
                },
            }
        })
        .collect()
}
