use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::{api_auth_middleware, auth_middleware, require_auth};
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Web routes -- cookie sessions. auth_middleware resolves credentials for
    // every request; only the gated subset requires them.
    let web_gated = Router::new()
        .route("/me", get(handlers::me))
        .route("/profile", put(handlers::update_profile))
        .route_layer(middleware::from_fn(require_auth));

    let web_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .merge(web_gated)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware,
        ));

    // Mobile routes -- bearer tokens only. The open subset (register, login,
    // refresh) authenticates by body contents; the rest demands a token.
    let mobile_gated = Router::new()
        .route("/logout", post(handlers::mobile_logout))
        .route("/me", get(handlers::mobile_me))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            api_auth_middleware,
        ));

    let mobile_routes = Router::new()
        .route("/register", post(handlers::mobile_register))
        .route("/login", post(handlers::mobile_login))
        .route("/refresh", post(handlers::mobile_refresh))
        .merge(mobile_gated);

    Router::new()
        .nest("/api/mobile", mobile_routes)
        .nest("/api", web_routes)
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
