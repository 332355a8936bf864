//! auth-hub - A dual-mode authentication service
//!
//! This crate provides user registration and authentication over two client
//! surfaces sharing one credential store:
//! - Cookie-backed server-side sessions for browsers (`/api`)
//! - Stateless JWT access/refresh pairs for mobile clients (`/api/mobile`)
//!
//! with:
//! - Argon2id password hashing
//! - `jti`-keyed token revocation and refresh rotation
//! - Active expiration via background tasks
//! - redb embedded database (ACID, MVCC, crash-safe)
//! - REST API

pub mod api;
pub mod auth;
pub mod config;
pub mod expiration;
pub mod password;
pub mod storage;
#[cfg(test)]
pub mod testutil;
pub mod tokens;

use auth::AuthService;
use config::Config;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub auth: AuthService,
    pub config: Config,
    pub db: Database,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        let jwt = tokens::jwt::JwtService::new(
            config.access_secret(),
            config.refresh_secret(),
            config.access_token_ttl_seconds,
            config.refresh_token_ttl_seconds,
        );
        let auth = AuthService::new(db.clone(), jwt, config.session_ttl_seconds);
        Self { auth, config, db }
    }
}

pub use api::routes::create_router;
