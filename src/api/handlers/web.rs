//! Browser-facing handlers: cookie sessions
//!
//! Login sets an `HttpOnly` session cookie; the cookie (never a response
//! body) is the credential, so scripts on the page cannot read it.

use axum::extract::{Extension, State};
use axum::http::{header, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use std::sync::Arc;

use super::{LoginRequest, RegisterRequest};
use crate::api::middleware::{Principal, SessionId, SESSION_COOKIE};
use crate::api::response::{ApiError, AppJson, JSend};
use crate::storage::models::{ProfileUpdate, PublicUser};
use crate::AppState;

pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .auth
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok((StatusCode::CREATED, JSend::success(user)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let login = state
        .auth
        .login_with_session(&req.username, &req.password)
        .await?;

    tracing::info!(user_id = login.user.id, "Web login");

    let cookie = session_cookie(
        &login.session_id,
        state.config.session_ttl_seconds as i64,
        state.config.is_production(),
    );

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        JSend::success(login.user),
    ))
}

/// Destroy the caller's session and clear the cookie. Anonymous calls and
/// stale cookies get the same 200 — logout is idempotent.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: Option<Extension<SessionId>>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(Extension(SessionId(id))) = session {
        state.auth.logout(&id)?;
    }

    let cleared = session_cookie("", 0, state.config.is_production());
    Ok((
        AppendHeaders([(header::SET_COOKIE, cleared)]),
        JSend::success(serde_json::json!({ "message": "Logged out" })),
    ))
}

pub async fn me(
    Extension(principal): Extension<Principal>,
) -> Json<JSend<PublicUser>> {
    JSend::success(principal.user)
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    AppJson(updates): AppJson<ProfileUpdate>,
) -> Result<Json<JSend<PublicUser>>, ApiError> {
    let user = state
        .auth
        .update_profile(principal.user.id, &updates)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(JSend::success(user))
}

/// Build the session cookie. `Max-Age=0` (with an empty value) clears it.
fn session_cookie(session_id: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={session_id}; HttpOnly; SameSite=Strict; Path=/; Max-Age={max_age_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc123", 86400, false);
        assert!(cookie.starts_with("session_id=abc123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_session_cookie_secure_in_production() {
        let cookie = session_cookie("abc123", 86400, true);
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn test_clearing_cookie() {
        let cookie = session_cookie("", 0, false);
        assert!(cookie.starts_with("session_id=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
