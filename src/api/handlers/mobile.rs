//! Mobile-facing handlers: JWT bearer tokens
//!
//! No cookies on this surface. Login returns an access/refresh pair in the
//! body and the client is responsible for storing and sending them.

use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{LoginRequest, RegisterRequest};
use crate::api::middleware::{AccessToken, Principal};
use crate::api::response::{ApiError, AppJson, JSend};
use crate::auth::TokenPair;
use crate::storage::models::PublicUser;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct JwtLoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn mobile_register(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .auth
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok((StatusCode::CREATED, JSend::success(user)))
}

pub async fn mobile_login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<JSend<JwtLoginResponse>>, ApiError> {
    let login = state
        .auth
        .login_with_jwt(&req.username, &req.password)
        .await?;

    tracing::info!(user_id = login.user.id, "Mobile login");

    Ok(JSend::success(JwtLoginResponse {
        access_token: login.tokens.access_token,
        refresh_token: login.tokens.refresh_token,
        user: login.user,
    }))
}

/// Exchange a refresh token for a fresh pair. Any verification failure is a
/// uniform 401 — the client's recourse is to log in again.
pub async fn mobile_refresh(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<RefreshRequest>,
) -> Result<Json<JSend<TokenPair>>, ApiError> {
    let pair = state
        .auth
        .refresh_tokens(&req.refresh_token)?
        .ok_or_else(|| ApiError::unauthorized("Invalid refresh token"))?;

    Ok(JSend::success(pair))
}

/// Revoke the access token that authenticated this request. The refresh
/// token stays usable until it is rotated out or expires.
pub async fn mobile_logout(
    State(state): State<Arc<AppState>>,
    Extension(AccessToken(token)): Extension<AccessToken>,
) -> Result<Json<JSend<serde_json::Value>>, ApiError> {
    state.auth.logout_jwt(&token)?;
    Ok(JSend::success(serde_json::json!({ "message": "Logged out" })))
}

pub async fn mobile_me(
    Extension(principal): Extension<Principal>,
) -> Json<JSend<PublicUser>> {
    JSend::success(principal.user)
}
