//! Header-derived authentication.
//!
//! Identity is resolved here, once, into typed values injected as request
//! extensions; handlers and the core never see raw headers.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::state::AppState;
use super::types::{ApiResponse, error_codes};
use crate::access::CallerIdentity;

/// Header carrying the caller's profile id.
pub const PROFILE_ID_HEADER: &str = "profile_id";

/// Header carrying the admin flag; must be exactly "1".
pub const ADMIN_HEADER: &str = "admin";

type AuthRejection = (StatusCode, Json<ApiResponse<()>>);

fn unauthorized(code: i32, msg: &str) -> AuthRejection {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(code, msg)),
    )
}

/// Resolve the `profile_id` header against the store and inject a
/// [`CallerIdentity`]. Missing, non-numeric or unknown ids are all 401.
pub async fn profile_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthRejection> {
    let raw = request
        .headers()
        .get(PROFILE_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| unauthorized(error_codes::MISSING_AUTH, "Missing profile_id header"))?;

    let profile_id: i64 = raw
        .trim()
        .parse()
        .map_err(|_| unauthorized(error_codes::AUTH_FAILED, "Unresolvable profile identity"))?;

    let profile = state
        .store
        .profile_by_id(profile_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "store failure while resolving caller identity");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(
                    error_codes::INTERNAL_ERROR,
                    "internal error",
                )),
            )
        })?
        .ok_or_else(|| unauthorized(error_codes::AUTH_FAILED, "Unresolvable profile identity"))?;

    request.extensions_mut().insert(CallerIdentity {
        profile_id: profile.profile_id,
        profile_type: profile.profile_type,
    });
    Ok(next.run(request).await)
}

/// Gate admin routes on the `admin: 1` header. Independent of profile
/// identity; no store lookup involved.
pub async fn admin_auth_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthRejection> {
    let is_admin = request
        .headers()
        .get(ADMIN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|v| v.trim() == "1")
        .unwrap_or(false);

    if !is_admin {
        return Err(unauthorized(
            error_codes::AUTH_FAILED,
            "Admin privileges required",
        ));
    }
    Ok(next.run(request).await)
}
