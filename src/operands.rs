//! Axum extractor for operand lists

use crate::error::CalculatorError;

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Name of the repeated query parameter holding operands.
const OPERAND_PARAM: &str = "a";

/// An axum extractor that collects every `a` query parameter, in order, as a number.
///
/// Serde's URL-encoded deserialiser does not support repeated keys, so the query string is
/// parsed directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operands(pub Vec<f64>);

/// Parse the operands from a query string.
///
/// # Arguments
///
/// * `query`: Raw query string, without the leading `?`
pub fn parse_operands(query: &str) -> Result<Vec<f64>, CalculatorError> {
    let operands = url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == OPERAND_PARAM)
        .map(|(_, value)| {
            let operand = value
                .trim()
                .parse::<f64>()
                .map_err(|source| CalculatorError::InvalidOperand {
                    value: value.to_string(),
                    source,
                })?;
            // inf, NaN and out of range literals parse successfully.
            if !operand.is_finite() {
                return Err(CalculatorError::NonFiniteOperand {
                    value: value.to_string(),
                });
            }
            Ok(operand)
        })
        .collect::<Result<Vec<_>, _>>()?;
    if operands.is_empty() {
        return Err(CalculatorError::MissingOperands);
    }
    Ok(operands)
}

#[async_trait]
impl<S> FromRequestParts<S> for Operands
where
    S: Send + Sync,
{
    type Rejection = CalculatorError;

    /// Extract `Operands` from the request URI.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        Ok(Operands(parse_operands(query)?))
    }
}
