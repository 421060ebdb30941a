//! HTTP API server for the scour purge service.
//!
//! This crate provides the HTTP control plane:
//! - The user storage purge endpoint
//! - Health check
//! - Prometheus metrics

pub mod auth;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;

pub use auth::TraceId;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
