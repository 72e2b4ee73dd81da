//! Calculator API.

use crate::app_state::SharedAppState;
use crate::error::CalculatorError;
use crate::evaluator;
use crate::history;
use crate::metrics;
use crate::models::{
    BatchItem, BatchResult, HistoryFilter, HistoryResponse, Operation, OperationRecord,
    OperationResponse,
};
use crate::operands::Operands;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use tower::Layer;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

/// Calculator service type.
pub type Service = NormalizePath<Router>;

/// Returns a [Router] for the calculator API.
///
/// # Arguments
///
/// * `state`: Shared application state
pub fn router(state: SharedAppState) -> Router {
    fn calculator() -> Router<SharedAppState> {
        Router::new()
            .route("/sum", get(sum))
            .route("/rest", get(subtract))
            .route("/mult", get(multiply))
            .route("/div", get(divide))
            .route("/history", get(get_history))
            .route("/batch_operations", post(batch_operations))
    }

    Router::new()
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/calculator", calculator())
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .on_request(metrics::request_counter)
                        .on_response(metrics::record_response_metrics),
                )
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Returns a [Service] for the calculator API.
///
/// The router is wrapped in a [NormalizePath] so that trailing slashes are ignored.
///
/// # Arguments
///
/// * `state`: Shared application state
pub fn service(state: SharedAppState) -> Service {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

/// Evaluate a single operation and record it in the history.
///
/// Nothing is recorded if evaluation fails.
///
/// # Arguments
///
/// * `state`: Shared application state
/// * `operation`: Operation to record
/// * `evaluate`: Evaluator function for the operation
/// * `operands`: Operands from the request
async fn single(
    state: SharedAppState,
    operation: Operation,
    evaluate: fn(&[f64]) -> Result<f64, CalculatorError>,
    operands: Vec<f64>,
) -> Result<Json<OperationResponse>, CalculatorError> {
    let result = evaluate(&operands).map_err(|error| {
        tracing::debug!(%operation, ?operands, "rejected operation: {}", error);
        error
    })?;
    let record = OperationRecord::new(operation, operands.clone(), result);
    history::record(state.store.as_ref(), record, state.store_timeout).await?;
    tracing::info!(%operation, ?operands, result, "evaluated operation");
    Ok(Json(OperationResponse {
        operation,
        numbers: operands,
        result,
    }))
}

async fn sum(
    State(state): State<SharedAppState>,
    Operands(operands): Operands,
) -> Result<Json<OperationResponse>, CalculatorError> {
    single(state, Operation::Sum, evaluator::sum, operands).await
}

async fn subtract(
    State(state): State<SharedAppState>,
    Operands(operands): Operands,
) -> Result<Json<OperationResponse>, CalculatorError> {
    single(state, Operation::Subtract, evaluator::subtract, operands).await
}

async fn multiply(
    State(state): State<SharedAppState>,
    Operands(operands): Operands,
) -> Result<Json<OperationResponse>, CalculatorError> {
    single(state, Operation::Multiply, evaluator::multiply, operands).await
}

async fn divide(
    State(state): State<SharedAppState>,
    Operands(operands): Operands,
) -> Result<Json<OperationResponse>, CalculatorError> {
    single(state, Operation::Divide, evaluator::divide, operands).await
}

async fn get_history(
    State(state): State<SharedAppState>,
    query: Result<Query<HistoryFilter>, QueryRejection>,
) -> Result<Json<HistoryResponse>, CalculatorError> {
    let Query(filter) = query?;
    let history = history::query(state.store.as_ref(), &filter, state.store_timeout).await?;
    Ok(Json(HistoryResponse { history }))
}

/// Batch results are never recorded in the history.
async fn batch_operations(
    payload: Result<Json<Vec<BatchItem>>, JsonRejection>,
) -> Result<Json<Vec<BatchResult>>, CalculatorError> {
    let Json(items) = payload?;
    let results = evaluator::batch(&items);
    tracing::info!("evaluated batch of {} operations", results.len());
    Ok(Json(results))
}
