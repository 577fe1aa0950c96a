//! HTTP surface: `/vision`, `/sequence` and `/health`.
//!
//! Bodies are taken as raw bytes and parsed here, so a body that is not JSON
//! gets the service's own `{ok: false, error}` shape instead of the
//! framework's rejection.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, DefaultBodyLimit, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::debug;

use shot_types::normalize::{batch_entries, items_from_values, photos_from_values};

use crate::analyzer::ImageAnalyzer;
use crate::config::{MAX_ANALYSIS_RESULTS, MAX_PHOTOS};
use crate::error::ApiError;
use crate::planner::SequencePlanner;
use crate::rate_limit::{QuotaCheck, QuotaDecision};

/// Largest accepted request body; photo batches arrive base64-encoded
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<SequencePlanner>,
    pub analyzer: Arc<ImageAnalyzer>,
    pub limiter: Arc<dyn QuotaCheck>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/vision", post(vision))
        .route("/sequence", post(sequence))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"ok": true}))
}

async fn vision(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let quota = admit(state.limiter.as_ref(), &headers, peer)?;
    Ok(with_quota_headers(analyze_photos(&state, &body).await, &quota))
}

async fn sequence(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let quota = admit(state.limiter.as_ref(), &headers, peer)?;
    Ok(with_quota_headers(plan_sequence(&state, &body).await, &quota))
}

/// Everything after admission. Errors are rendered here so the caller can
/// stamp quota headers on every outcome.
async fn analyze_photos(state: &AppState, body: &[u8]) -> Response {
    let result = async {
        let body: Value = serde_json::from_slice(body)?;
        let entries = batch_entries(&body, "photos", MAX_PHOTOS)?;
        let photos = photos_from_values(entries)?;
        debug!("Vision request with {} photos", photos.len());

        let results = state.analyzer.analyze_batch(&photos).await?;
        let count = results.len();
        Ok::<_, ApiError>(Json(json!({"ok": true, "results": results, "count": count})))
    }
    .await;
    result.into_response()
}

async fn plan_sequence(state: &AppState, body: &[u8]) -> Response {
    let result = async {
        let body: Value = serde_json::from_slice(body)?;
        let entries = batch_entries(&body, "analysisResults", MAX_ANALYSIS_RESULTS)?;
        let items = items_from_values(entries);
        let direction = body
            .get("promptText")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty());
        debug!(
            "Sequence request with {} items (direction: {})",
            items.len(),
            direction.is_some()
        );

        let plan = state.planner.plan(&items, direction).await;
        Ok::<_, ApiError>(Json(json!({"ok": true, "plan": plan})))
    }
    .await;
    result.into_response()
}

/// Caller identity: first `x-forwarded-for` hop, else the peer address.
pub fn caller_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "anonymous".to_string())
}

fn admit(
    limiter: &dyn QuotaCheck,
    headers: &HeaderMap,
    peer: Option<ConnectInfo<SocketAddr>>,
) -> Result<QuotaDecision, ApiError> {
    let key = caller_key(headers, peer.map(|ConnectInfo(addr)| addr));
    let decision = limiter.check(&key);
    if !decision.allowed {
        return Err(ApiError::RateLimited {
            limit: decision.limit,
            retry_after_secs: decision.retry_after.as_secs().max(1),
        });
    }
    Ok(decision)
}

fn with_quota_headers(mut response: Response, quota: &QuotaDecision) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("x-ratelimit-limit"),
        HeaderValue::from(quota.limit),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from(quota.remaining),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_key_prefers_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        let peer: SocketAddr = "127.0.0.1:9000".parse().unwrap();

        assert_eq!(caller_key(&headers, Some(peer)), "203.0.113.7");
        assert_eq!(caller_key(&HeaderMap::new(), Some(peer)), "127.0.0.1");
        assert_eq!(caller_key(&HeaderMap::new(), None), "anonymous");
    }
}
