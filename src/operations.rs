//! Arithmetic operations.
//!
//! Each operation is implemented as a struct that implements the
//! [Reduction](crate::operation::Reduction) trait.

use crate::error::CalculatorError;
use crate::models::Operation;
use crate::operation::{Mode, Reduction};

/// Fail if any divisor (every operand after the first) is zero.
fn check_divisors(operands: &[f64]) -> Result<(), CalculatorError> {
    if operands.iter().skip(1).any(|divisor| *divisor == 0.0) {
        return Err(CalculatorError::DivisionByZero);
    }
    Ok(())
}

/// Split off the first operand, failing if there is none.
fn split_first<R: Reduction>(
    operands: &[f64],
    mode: Mode,
) -> Result<(f64, &[f64]), CalculatorError> {
    let minimum = match mode {
        Mode::Single => R::MIN_OPERANDS,
        Mode::Batch => R::MIN_BATCH_OPERANDS,
    };
    operands
        .split_first()
        .map(|(first, rest)| (*first, rest))
        .ok_or(CalculatorError::InsufficientOperands {
            operation: R::OPERATION,
            minimum,
            mode,
        })
}

/// Return the sum of the operands.
///
/// An empty operand list sums to zero.
pub struct Sum {}

impl Reduction for Sum {
    const OPERATION: Operation = Operation::Sum;
    const MIN_OPERANDS: usize = 0;

    fn reduce(operands: &[f64]) -> Result<f64, CalculatorError> {
        Ok(operands.iter().fold(0.0, |sum, x| sum + x))
    }
}

/// Return the first operand minus the remaining operands.
pub struct Subtract {}

impl Reduction for Subtract {
    const OPERATION: Operation = Operation::Subtract;
    const MIN_OPERANDS: usize = 1;

    /// `((a0 - a1) - a2) - ...`
    fn reduce(operands: &[f64]) -> Result<f64, CalculatorError> {
        let (first, rest) = split_first::<Self>(operands, Mode::Single)?;
        Ok(rest.iter().fold(first, |difference, x| difference - x))
    }

    /// `a0 - (a1 + a2 + ...)`
    fn reduce_batch(operands: &[f64]) -> Result<f64, CalculatorError> {
        let (first, rest) = split_first::<Self>(operands, Mode::Batch)?;
        Ok(first - Sum::reduce(rest)?)
    }
}

/// Return the product of the operands.
pub struct Multiply {}

impl Reduction for Multiply {
    const OPERATION: Operation = Operation::Multiply;
    const MIN_OPERANDS: usize = 1;

    fn reduce(operands: &[f64]) -> Result<f64, CalculatorError> {
        Ok(operands.iter().fold(1.0, |product, x| product * x))
    }
}

/// Return the first operand divided by the remaining operands.
pub struct Divide {}

impl Reduction for Divide {
    const OPERATION: Operation = Operation::Divide;
    const MIN_OPERANDS: usize = 2;

    /// `((a0 / a1) / a2) / ...`
    fn reduce(operands: &[f64]) -> Result<f64, CalculatorError> {
        let (first, rest) = split_first::<Self>(operands, Mode::Single)?;
        check_divisors(operands)?;
        Ok(rest.iter().fold(first, |quotient, x| quotient / x))
    }

    /// `a0 / (a1 * a2 * ...)`
    fn reduce_batch(operands: &[f64]) -> Result<f64, CalculatorError> {
        let (first, rest) = split_first::<Self>(operands, Mode::Batch)?;
        check_divisors(operands)?;
        Ok(first / Multiply::reduce(rest)?)
    }
}
