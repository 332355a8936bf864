//! Request authentication middleware
//!
//! Two flavors cover the two client surfaces:
//!
//! - [`auth_middleware`] (web): resolves the session cookie first, then a
//!   bearer token, and lets anonymous requests pass through. Handlers that
//!   need a user sit behind [`require_auth`].
//! - [`api_auth_middleware`] (mobile): bearer token is mandatory; requests
//!   without a valid one are rejected with 401 before reaching a handler.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, Response},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::storage::models::PublicUser;
use crate::AppState;

/// Name of the session cookie set by the web login handler
pub const SESSION_COOKIE: &str = "session_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    Jwt,
    Session,
}

/// The authenticated caller, inserted as a request extension once a
/// credential resolves to a user.
#[derive(Debug, Clone)]
pub struct Principal {
    pub auth_type: AuthType,
    pub user: PublicUser,
}

/// Raw session id, inserted alongside [`Principal`] so the logout handler
/// can destroy the exact session that authenticated the request.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

/// Raw bearer token, inserted so the mobile logout handler can revoke it.
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

/// Web authentication: cookie first, bearer fallback, anonymous allowed.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response<Body> {
    if let Some(session_id) = get_cookie(request.headers(), SESSION_COOKIE) {
        match state.auth.validate_session(&session_id) {
            Ok(Some(user)) => {
                request.extensions_mut().insert(Principal {
                    auth_type: AuthType::Session,
                    user,
                });
                request.extensions_mut().insert(SessionId(session_id));
                return next.run(request).await;
            }
            Ok(None) => {} // stale cookie, fall through to bearer
            Err(e) => {
                tracing::error!(error = %e, "Session validation failed");
                return ApiError::internal("Internal server error").into_response();
            }
        }
    }

    if let Some(token) = bearer_token(request.headers()) {
        match state.auth.validate_access_token(&token) {
            Ok(Some(user)) => {
                request.extensions_mut().insert(Principal {
                    auth_type: AuthType::Jwt,
                    user,
                });
                request.extensions_mut().insert(AccessToken(token));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "Token validation failed");
                return ApiError::internal("Internal server error").into_response();
            }
        }
    }

    // No principal inserted: the request proceeds anonymously
    next.run(request).await
}

/// Mobile authentication: a valid bearer token or a 401, nothing in between.
/// Session cookies are ignored on this surface.
pub async fn api_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let token = match bearer_token(request.headers()) {
        Some(token) => token,
        None => return ApiError::unauthorized("Authentication required").into_response(),
    };

    match state.auth.validate_access_token(&token) {
        Ok(Some(user)) => {
            request.extensions_mut().insert(Principal {
                auth_type: AuthType::Jwt,
                user,
            });
            request.extensions_mut().insert(AccessToken(token));
            next.run(request).await
        }
        Ok(None) => ApiError::unauthorized("Invalid token").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Token validation failed");
            ApiError::internal("Internal server error").into_response()
        }
    }
}

/// Gate for web routes that need a user. Runs after [`auth_middleware`] and
/// rejects requests that carry no [`Principal`].
pub async fn require_auth(request: Request<Body>, next: Next) -> Response<Body> {
    if request.extensions().get::<Principal>().is_none() {
        return ApiError::unauthorized("Authentication required").into_response();
    }
    next.run(request).await
}

/// Extract a cookie value from the `Cookie` header. Cookie values here are
/// hex strings, so no unquoting is needed.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}

/// Extract a bearer token from the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    raw.strip_prefix("Bearer ").map(|t| t.to_string())
}
