//! Frontend service that enqueues work for the processor job

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Metrics export
pub mod metrics;

/// Queue send path
pub mod queue_service;

/// HTTP routes
pub mod routes;

/// HTTP server
pub mod server;

/// Environment, errors and extractors
pub mod types;
