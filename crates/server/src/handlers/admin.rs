//! Administrative endpoints.

use crate::auth::require_admin;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use futures::future::BoxFuture;
use scour_core::{home_storage_id, validate_uid};
use scour_files::{FileNode, FileStore, FilesError};
use serde::Serialize;
use serde_json::{Value, json};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /v1/health - Health check.
///
/// This endpoint is intentionally unauthenticated to support:
/// - Kubernetes liveness/readiness probes
/// - Load balancer health checks
///
/// Returns only non-sensitive information (status and version).
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state.metadata.health_check().await?;
    state.files.health_check().await?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

/// Outcome counters for one purge run.
#[derive(Debug, Default)]
pub struct PurgeStats {
    /// File tree nodes deleted.
    pub nodes_deleted: u64,
    /// File tree nodes left behind (no permission, or folders kept
    /// non-empty by a skipped descendant).
    pub nodes_skipped: u64,
}

/// POST /v1/admin/users/{uid}/purge - Permanently purge a user's storage.
///
/// Removes, in order: every node under the user's home folder, every node
/// under the surrounding root container, the user's preference rows, the
/// filecache rows for the user's storage, and the storage-accounting row
/// itself. Returns 404 with an empty JSON body when no storage row matches,
/// 200 with an empty JSON body otherwise. Individual nodes skipped during
/// the tree purge do not surface to the caller; they are visible in logs and
/// metrics only.
pub async fn purge_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    req: Request,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_admin(&req)?;
    validate_uid(&uid)?;

    let storage = state
        .metadata
        .get_storage_by_id(&home_storage_id(&uid))
        .await?;
    let Some(storage) = storage else {
        crate::metrics::PURGES_NOT_FOUND.inc();
        tracing::debug!(uid = %uid, "No storage row for uid, nothing to purge");
        return Ok((StatusCode::NOT_FOUND, Json(json!({}))));
    };

    let mut stats = PurgeStats::default();

    // First clean the user's own files
    let home = state.files.user_folder(&uid).await?;
    purge_folder(state.files.as_ref(), &home, &mut stats).await?;

    // Then the user root, which may hold sibling metadata nodes (cache,
    // versions, trash) beside the home folder
    let user_root = state.files.parent(&home).await?;
    purge_folder(state.files.as_ref(), &user_root, &mut stats).await?;

    // Now the records: preferences, then the remaining filecache entries on
    // the user storage and the storage row itself
    let preference_rows = state.metadata.delete_preferences_for_user(&uid).await?;
    let filecache_rows = state
        .metadata
        .delete_filecache_for_storage(storage.numeric_id)
        .await?;
    let storage_rows = state.metadata.delete_storage(storage.numeric_id).await?;

    crate::metrics::USERS_PURGED.inc();
    crate::metrics::FILE_NODES_DELETED.inc_by(stats.nodes_deleted);
    crate::metrics::FILE_NODES_SKIPPED.inc_by(stats.nodes_skipped);
    crate::metrics::DB_ROWS_DELETED
        .with_label_values(&["preferences"])
        .inc_by(preference_rows);
    crate::metrics::DB_ROWS_DELETED
        .with_label_values(&["filecache"])
        .inc_by(filecache_rows);
    crate::metrics::DB_ROWS_DELETED
        .with_label_values(&["storages"])
        .inc_by(storage_rows);

    tracing::info!(
        uid = %uid,
        numeric_id = storage.numeric_id,
        nodes_deleted = stats.nodes_deleted,
        nodes_skipped = stats.nodes_skipped,
        preference_rows = preference_rows,
        filecache_rows = filecache_rows,
        "User storage purged"
    );

    Ok((StatusCode::OK, Json(json!({}))))
}

/// Depth-first purge of a folder's contents, children before parents.
///
/// Goes through the per-node delete of the files abstraction rather than a
/// bulk remove so any bookkeeping tied to that abstraction stays consistent.
/// Nodes the caller may not delete are skipped and iteration continues; a
/// folder failing with `NotEmpty` is skipped the same way since that only
/// happens above a skipped descendant. A node that is already gone counts
/// as deleted work done by someone else. Anything else aborts the purge.
///
/// The folder itself is not deleted, only its contents.
pub fn purge_folder<'a>(
    files: &'a dyn FileStore,
    folder: &'a FileNode,
    stats: &'a mut PurgeStats,
) -> BoxFuture<'a, ApiResult<()>> {
    Box::pin(async move {
        for node in files.list(folder).await? {
            if node.is_folder() {
                purge_folder(files, &node, stats).await?;
            }
            match files.delete(&node).await {
                Ok(()) => stats.nodes_deleted += 1,
                Err(FilesError::PermissionDenied(key)) => {
                    tracing::warn!(key = %key, "Skipping node without delete permission");
                    stats.nodes_skipped += 1;
                }
                Err(FilesError::NotEmpty(key)) => {
                    tracing::warn!(key = %key, "Skipping folder kept non-empty by skipped children");
                    stats.nodes_skipped += 1;
                }
                Err(FilesError::NotFound(key)) => {
                    tracing::debug!(key = %key, "Node already gone");
                }
                Err(e) => return Err(ApiError::from(e)),
            }
        }
        Ok(())
    })
}
