//! Authentication middleware for the admin token.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use tracing::Instrument;
use uuid::Uuid;

/// Maximum length for trace IDs.
/// Longer trace IDs are truncated to prevent log bloat and log injection.
const MAX_TRACE_ID_LEN: usize = 128;

/// Trace ID for request correlation.
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    /// Generate a new random trace ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a trace ID from a client-provided value.
    /// The value is truncated to MAX_TRACE_ID_LEN characters and filtered to
    /// printable ASCII.
    pub fn from_client(value: &str) -> Self {
        let sanitized: String = value
            .chars()
            .take(MAX_TRACE_ID_LEN)
            .filter(|c| c.is_ascii_graphic() || *c == ' ')
            .collect();

        if sanitized.is_empty() {
            Self::new()
        } else {
            Self(sanitized)
        }
    }

    /// Get the trace ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Marker extension set on requests that presented the admin token.
#[derive(Clone, Debug)]
pub struct AdminIdentity;

/// Extract bearer token from Authorization header.
/// Per RFC 6750, the "Bearer" scheme is case-insensitive.
fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            if v.len() >= 7 && v[..7].eq_ignore_ascii_case("bearer ") {
                Some(&v[7..])
            } else {
                None
            }
        })
}

/// Extract trace ID from X-Trace-Id header or generate a new one.
fn extract_or_generate_trace_id(req: &Request) -> TraceId {
    req.headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(TraceId::from_client)
        .unwrap_or_else(TraceId::new)
}

/// Hash a token for comparison against the configured hash.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Normalize a configured token hash to lowercase hex without the optional
/// `sha256:` prefix. `hash_token` produces lowercase hex, so uppercase
/// config values would otherwise never match.
pub fn normalize_token_hash(token_hash: &str) -> Result<String, String> {
    let hash = token_hash
        .strip_prefix("sha256:")
        .unwrap_or(token_hash)
        .to_lowercase();
    if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("invalid admin token_hash: expected 64 hex chars".to_string());
    }
    Ok(hash)
}

/// Authentication middleware that validates the admin token and sets up
/// trace context.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let trace_id = extract_or_generate_trace_id(&req);
    let trace_id_str = trace_id.0.clone();
    req.extensions_mut().insert(trace_id);

    let authorized = match extract_bearer_token(&req) {
        Some(token) => hash_token(token) == *state.admin_token_hash,
        None => false,
    };
    if authorized {
        req.extensions_mut().insert(AdminIdentity);
    }

    // Run the request within a tracing span that includes the trace ID
    let response = next
        .run(req)
        .instrument(tracing::info_span!("request", trace_id = %trace_id_str))
        .await;

    Ok(response)
}

/// Require the admin identity (token must have been presented and matched).
pub fn require_admin(req: &Request) -> ApiResult<&AdminIdentity> {
    req.extensions()
        .get::<AdminIdentity>()
        .ok_or_else(|| ApiError::Unauthorized("admin token required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_token_matches_testing_config() {
        // SHA256 of "test-admin-token", as used by AdminConfig::for_testing
        assert_eq!(
            hash_token("test-admin-token"),
            "9f735e0df9a1ddc702bf0a1a7b83033f9f7153a00c29de82cedadc9957289b05"
        );
    }

    #[test]
    fn normalize_token_hash_strips_prefix_and_lowercases() {
        let upper = "9F735E0DF9A1DDC702BF0A1A7B83033F9F7153A00C29DE82CEDADC9957289B05";
        let expected = upper.to_lowercase();
        assert_eq!(normalize_token_hash(upper).unwrap(), expected);
        assert_eq!(
            normalize_token_hash(&format!("sha256:{upper}")).unwrap(),
            expected
        );
    }

    #[test]
    fn normalize_token_hash_rejects_malformed() {
        assert!(normalize_token_hash("short").is_err());
        assert!(normalize_token_hash(&"z".repeat(64)).is_err());
    }

    #[test]
    fn trace_id_sanitizes_client_values() {
        let id = TraceId::from_client("abc\ndef");
        assert_eq!(id.as_str(), "abcdef");

        let long = "x".repeat(300);
        assert_eq!(TraceId::from_client(&long).as_str().len(), MAX_TRACE_ID_LEN);

        // Entirely unprintable input falls back to a generated ID
        let id = TraceId::from_client("\u{7}\u{8}");
        assert!(!id.as_str().is_empty());
    }
}
