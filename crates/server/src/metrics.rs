//! Prometheus metrics for the scour server.
//!
//! Metrics carry only aggregate counts, never uids or paths.
//!
//! **Deployment requirement**: when enabled, the `/metrics` endpoint must be
//! network-restricted to authorized Prometheus scraper IPs at the
//! infrastructure level.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static USERS_PURGED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "scour_users_purged_total",
        "Total number of user storages purged",
    )
    .expect("metric creation failed")
});

pub static PURGES_NOT_FOUND: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "scour_purges_not_found_total",
        "Total number of purge requests for uids without a storage row",
    )
    .expect("metric creation failed")
});

pub static FILE_NODES_DELETED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "scour_file_nodes_deleted_total",
        "Total number of file tree nodes deleted",
    )
    .expect("metric creation failed")
});

pub static FILE_NODES_SKIPPED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "scour_file_nodes_skipped_total",
        "Total number of file tree nodes skipped (permission or non-empty)",
    )
    .expect("metric creation failed")
});

pub static DB_ROWS_DELETED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "scour_db_rows_deleted_total",
            "Total database rows deleted by table",
        ),
        &["table"],
    )
    .expect("metric creation failed")
});

static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry. Safe to call repeatedly.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(USERS_PURGED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(PURGES_NOT_FOUND.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(FILE_NODES_DELETED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(FILE_NODES_SKIPPED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(DB_ROWS_DELETED.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus exposition endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}
