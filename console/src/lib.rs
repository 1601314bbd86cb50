//! SQS console service

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// HTTP routes
pub mod routes;

/// HTTP server bootstrap
pub mod server;

/// Operation service
pub mod service;

/// Configuration and API error types
pub mod types;
