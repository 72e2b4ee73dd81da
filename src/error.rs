//! Error handling.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::header,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use thiserror::Error;
use tracing::{event, Level};

use crate::models::Operation;
use crate::operation::Mode;

/// Human readable message for an insufficient operand count.
fn insufficient_operands_message(operation: &Operation, minimum: &usize, mode: &Mode) -> String {
    match (mode, operation) {
        (Mode::Single, Operation::Subtract) => {
            "Se requiere al menos un número para la resta.".to_string()
        }
        (Mode::Single, Operation::Multiply) => {
            "Se requiere al menos un número para multiplicar.".to_string()
        }
        (Mode::Single, Operation::Divide) => {
            "Se requieren al menos dos números para la división.".to_string()
        }
        _ => format!("La operación requiere al menos {} operandos.", minimum),
    }
}

/// Calculator error type
///
/// This type encapsulates the various errors that may occur.
/// Each variant may result in a different API error response.
#[derive(Debug, Error)]
pub enum CalculatorError {
    /// An operand was strictly negative
    #[error("No se aceptan números negativos para esta operación.")]
    NegativeOperand,

    /// Too few operands for the operation
    #[error("{}", insufficient_operands_message(.operation, .minimum, .mode))]
    InsufficientOperands {
        operation: Operation,
        minimum: usize,
        mode: Mode,
    },

    /// A divisor was zero
    #[error("No se puede dividir por cero")]
    DivisionByZero,

    /// Unknown operation name in a batch item
    #[error("Operación no soportada.")]
    UnsupportedOperation { operation: Option<String> },

    /// The operand query parameter was not supplied
    #[error("se requiere al menos un parámetro 'a'")]
    MissingOperands,

    /// An operand could not be parsed as a number
    #[error("'{value}' no es un número válido")]
    InvalidOperand {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    /// An operand parsed to an infinite or NaN value
    #[error("'{value}' no es un número válido")]
    NonFiniteOperand { value: String },

    /// The result of an operation overflowed to an infinite or NaN value
    #[error("El resultado no es un número finito.")]
    NonFiniteResult,

    /// The history date filter was not a calendar date
    #[error("Formato de fecha inválido. Usar YYYY-MM-DD.")]
    MalformedDate {
        date: String,
        #[source]
        source: time::error::Parse,
    },

    /// Error deserialising a JSON request body
    #[error("request data is not valid")]
    RequestDataJsonRejection(#[from] JsonRejection),

    /// Error deserialising query parameters
    #[error("query parameters are not valid")]
    QueryRejection(#[from] QueryRejection),

    /// Error reading from or writing to the history store
    #[error("history store error")]
    Store(#[from] crate::store::StoreError),

    /// The history store did not respond in time
    #[error("history store did not respond within {seconds} seconds")]
    StoreTimeout { seconds: u64 },
}

impl IntoResponse for CalculatorError {
    /// Convert from a `CalculatorError` into an [axum::response::Response].
    fn into_response(self) -> Response {
        ErrorResponse::from(self).into_response()
    }
}

/// Body of error response
///
/// Implements serde (de)serialise.
#[derive(Deserialize, Serialize)]
struct ErrorBody {
    /// Main error message
    message: String,

    /// Optional list of causes
    #[serde(skip_serializing_if = "Option::is_none")]
    caused_by: Option<Vec<String>>,
}

impl ErrorBody {
    /// Return a new ErrorBody
    ///
    /// # Arguments
    ///
    /// * `error`: The error that occurred
    fn new<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        let message = error.to_string();
        let mut caused_by = None;
        let mut current = error.source();
        while let Some(source) = current {
            let mut causes: Vec<String> = caused_by.unwrap_or_default();
            causes.push(source.to_string());
            caused_by = Some(causes);
            current = source.source();
        }
        // Remove duplicate entries.
        if let Some(caused_by) = caused_by.as_mut() {
            caused_by.dedup()
        }
        ErrorBody { message, caused_by }
    }
}

/// A response to send in error cases
///
/// Implements serde (de)serialise. The top level `detail` repeats the main error message, which
/// is where browser clients of the calculator read it.
#[derive(Deserialize, Serialize)]
struct ErrorResponse {
    /// HTTP status of the response
    #[serde(skip)]
    status: StatusCode,

    /// Main error message
    detail: String,

    /// Response body
    error: ErrorBody,
}

impl ErrorResponse {
    /// Return a new ErrorResponse
    ///
    /// # Arguments
    ///
    /// * `status`: HTTP status of the response
    /// * `error`: The error that occurred. This will be formatted into a suitable `ErrorBody`
    fn new<E>(status: StatusCode, error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        let error = ErrorBody::new(error);
        ErrorResponse {
            status,
            detail: error.message.clone(),
            error,
        }
    }

    /// Return a 400 bad request ErrorResponse
    fn bad_request<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    /// Return a 500 internal server error ErrorResponse
    fn internal_server_error<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    /// Return a 503 service unavailable ErrorResponse
    fn service_unavailable<E>(error: &E) -> Self
    where
        E: std::error::Error + Send + Sync,
    {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, error)
    }
}

impl From<CalculatorError> for ErrorResponse {
    /// Convert from a `CalculatorError` into an `ErrorResponse`.
    fn from(error: CalculatorError) -> Self {
        let response = match &error {
            // Bad request
            CalculatorError::NegativeOperand
            | CalculatorError::InsufficientOperands { .. }
            | CalculatorError::DivisionByZero
            | CalculatorError::UnsupportedOperation { .. }
            | CalculatorError::MissingOperands
            | CalculatorError::InvalidOperand { .. }
            | CalculatorError::NonFiniteOperand { .. }
            | CalculatorError::NonFiniteResult
            | CalculatorError::MalformedDate { .. }
            | CalculatorError::RequestDataJsonRejection(_)
            | CalculatorError::QueryRejection(_) => Self::bad_request(&error),

            // Internal server error
            CalculatorError::Store(_) => Self::internal_server_error(&error),

            // Service unavailable
            CalculatorError::StoreTimeout { .. } => Self::service_unavailable(&error),
        };

        // Log server errors.
        if response.status.is_server_error() {
            event!(Level::ERROR, "{}", error.to_string());
            let mut current = error.source();
            while let Some(source) = current {
                event!(Level::ERROR, "Caused by: {}", source.to_string());
                current = source.source();
            }
        }

        response
    }
}

impl IntoResponse for ErrorResponse {
    /// Convert from an `ErrorResponse` into an `axum::response::Response`.
    ///
    /// Renders the response as JSON.
    fn into_response(self) -> Response {
        let json_body = serde_json::to_string_pretty(&self);
        match json_body {
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialise error response: {}", err),
            )
                .into_response(),
            Ok(json_body) => (
                self.status,
                [(&header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
                json_body,
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::store::StoreError;
    use hyper::HeaderMap;

    // Jump through the hoops to get the body as a string.
    async fn body_string(response: Response) -> String {
        String::from_utf8(
            hyper::body::to_bytes(response.into_body())
                .await
                .unwrap()
                .to_vec(),
        )
        .unwrap()
    }

    async fn test_calculator_error(
        error: CalculatorError,
        status: StatusCode,
        message: &str,
        caused_by: Option<Vec<&'static str>>,
    ) {
        let response = error.into_response();
        assert_eq!(status, response.status());
        let mut headers = HeaderMap::new();
        headers.insert(&header::CONTENT_TYPE, "application/json".parse().unwrap());
        assert_eq!(headers, *response.headers());
        let error_response: ErrorResponse =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(message.to_string(), error_response.detail);
        assert_eq!(message.to_string(), error_response.error.message);
        // Map Vec items from str to String
        let caused_by = caused_by.map(|cb| cb.iter().map(|s| s.to_string()).collect());
        assert_eq!(caused_by, error_response.error.caused_by);
    }

    #[tokio::test]
    async fn negative_operand() {
        let error = CalculatorError::NegativeOperand;
        let message = "No se aceptan números negativos para esta operación.";
        test_calculator_error(error, StatusCode::BAD_REQUEST, message, None).await;
    }

    #[tokio::test]
    async fn insufficient_operands_subtract() {
        let error = CalculatorError::InsufficientOperands {
            operation: Operation::Subtract,
            minimum: 1,
            mode: Mode::Single,
        };
        let message = "Se requiere al menos un número para la resta.";
        test_calculator_error(error, StatusCode::BAD_REQUEST, message, None).await;
    }

    #[tokio::test]
    async fn insufficient_operands_multiply() {
        let error = CalculatorError::InsufficientOperands {
            operation: Operation::Multiply,
            minimum: 1,
            mode: Mode::Single,
        };
        let message = "Se requiere al menos un número para multiplicar.";
        test_calculator_error(error, StatusCode::BAD_REQUEST, message, None).await;
    }

    #[tokio::test]
    async fn insufficient_operands_divide() {
        let error = CalculatorError::InsufficientOperands {
            operation: Operation::Divide,
            minimum: 2,
            mode: Mode::Single,
        };
        let message = "Se requieren al menos dos números para la división.";
        test_calculator_error(error, StatusCode::BAD_REQUEST, message, None).await;
    }

    #[tokio::test]
    async fn insufficient_operands_batch() {
        let error = CalculatorError::InsufficientOperands {
            operation: Operation::Divide,
            minimum: 2,
            mode: Mode::Batch,
        };
        let message = "La operación requiere al menos 2 operandos.";
        test_calculator_error(error, StatusCode::BAD_REQUEST, message, None).await;
    }

    #[tokio::test]
    async fn division_by_zero() {
        let error = CalculatorError::DivisionByZero;
        let message = "No se puede dividir por cero";
        test_calculator_error(error, StatusCode::BAD_REQUEST, message, None).await;
    }

    #[tokio::test]
    async fn unsupported_operation() {
        let error = CalculatorError::UnsupportedOperation {
            operation: Some("pow".to_string()),
        };
        let message = "Operación no soportada.";
        test_calculator_error(error, StatusCode::BAD_REQUEST, message, None).await;
    }

    #[tokio::test]
    async fn invalid_operand() {
        let source = "abc".parse::<f64>().unwrap_err();
        let error = CalculatorError::InvalidOperand {
            value: "abc".to_string(),
            source,
        };
        let message = "'abc' no es un número válido";
        let caused_by = Some(vec!["invalid float literal"]);
        test_calculator_error(error, StatusCode::BAD_REQUEST, message, caused_by).await;
    }

    #[tokio::test]
    async fn non_finite_operand() {
        let error = CalculatorError::NonFiniteOperand {
            value: "inf".to_string(),
        };
        let message = "'inf' no es un número válido";
        test_calculator_error(error, StatusCode::BAD_REQUEST, message, None).await;
    }

    #[tokio::test]
    async fn non_finite_result() {
        let error = CalculatorError::NonFiniteResult;
        let message = "El resultado no es un número finito.";
        test_calculator_error(error, StatusCode::BAD_REQUEST, message, None).await;
    }

    #[tokio::test]
    async fn malformed_date() {
        let format = time::macros::format_description!("[year]-[month]-[day]");
        let source = time::Date::parse("15/01/2024", format).unwrap_err();
        let error = CalculatorError::MalformedDate {
            date: "15/01/2024".to_string(),
            source,
        };
        let response = error.into_response();
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        let error_response: ErrorResponse =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(
            "Formato de fecha inválido. Usar YYYY-MM-DD.",
            error_response.error.message
        );
        assert!(error_response.error.caused_by.is_some());
    }

    #[tokio::test]
    async fn store_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let error = CalculatorError::Store(StoreError::Sled(sled::Error::Io(io_error)));
        let response = error.into_response();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        let error_response: ErrorResponse =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!("history store error", error_response.error.message);
        let caused_by = error_response.error.caused_by.unwrap();
        assert_eq!("sled database error", caused_by[0]);
    }

    #[tokio::test]
    async fn store_timeout() {
        let error = CalculatorError::StoreTimeout { seconds: 10 };
        let message = "history store did not respond within 10 seconds";
        test_calculator_error(error, StatusCode::SERVICE_UNAVAILABLE, message, None).await;
    }
}
