//! This crate provides a calculator service. It evaluates arithmetic operations on lists of
//! non-negative operands submitted over HTTP, records every single operation in a history store,
//! and answers filtered and sorted queries over that history.
//!
//! Batches of mixed operations may also be submitted. Each item of a batch is evaluated
//! independently, so one failing item does not affect the others, and batches are not recorded.
//!
//! The service is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team, on top of the [hyper] HTTP library.
//! * [Serde](serde) performs (de)serialisation of JSON request and response data.
//! * [sled] is an embedded database used to persist the operation history.

pub mod app;
pub mod app_state;
pub mod cli;
pub mod error;
pub mod evaluator;
pub mod history;
pub mod metrics;
pub mod models;
pub mod operands;
pub mod operation;
pub mod operations;
pub mod server;
pub mod sled_store;
pub mod store;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
