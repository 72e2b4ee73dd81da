use crate::error::CalculatorError;
use crate::models;

/// Evaluation mode.
///
/// Batch requests apply stricter operand counts than single operation requests, and reduce
/// subtraction and division against the aggregate of the trailing operands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    Single,
    Batch,
}

/// Trait for arithmetic reductions.
///
/// This forms the contract between the evaluator and individual operations. Implementations
/// check operand counts and domain errors and reduce the operands to a single value. Negative
/// operands are rejected by the evaluator before a reduction is invoked.
pub trait Reduction {
    /// Operation implemented by this reduction.
    const OPERATION: models::Operation;

    /// Minimum number of operands accepted in single mode.
    const MIN_OPERANDS: usize;

    /// Minimum number of operands accepted in batch mode.
    const MIN_BATCH_OPERANDS: usize = 2;

    /// Reduce operands left to right.
    ///
    /// Called only with at least `MIN_OPERANDS` operands.
    fn reduce(operands: &[f64]) -> Result<f64, CalculatorError>;

    /// Reduce operands in batch mode.
    ///
    /// Called only with at least `MIN_BATCH_OPERANDS` operands.
    fn reduce_batch(operands: &[f64]) -> Result<f64, CalculatorError> {
        Self::reduce(operands)
    }

    /// Check the operand count, then reduce.
    ///
    /// # Arguments
    ///
    /// * `operands`: Non-negative operands in submission order
    /// * `mode`: Single or batch evaluation
    fn execute(operands: &[f64], mode: Mode) -> Result<f64, CalculatorError> {
        let minimum = match mode {
            Mode::Single => Self::MIN_OPERANDS,
            Mode::Batch => Self::MIN_BATCH_OPERANDS,
        };
        if operands.len() < minimum {
            return Err(CalculatorError::InsufficientOperands {
                operation: Self::OPERATION,
                minimum,
                mode,
            });
        }
        match mode {
            Mode::Single => Self::reduce(operands),
            Mode::Batch => Self::reduce_batch(operands),
        }
    }
}
