//! Shared test helpers — available to all `#[cfg(test)]` modules in the crate.

use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use crate::auth::AuthService;
use crate::config::Config;
use crate::storage::models::{Role, Session, User};
use crate::storage::Database;
use crate::tokens::jwt::JwtService;
use crate::AppState;

/// Open a fresh database in a temporary directory.
///
/// Returns both the `Database` and the `TempDir` guard — the caller must
/// keep the `TempDir` alive for the duration of the test.
pub fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (db, temp_dir)
}

/// A minimal `Config` suitable for unit tests.
pub fn test_config() -> Config {
    Config {
        access_token_ttl_seconds: 900,
        app_env: "test".to_string(),
        bind_address: "127.0.0.1:8080".to_string(),
        cleanup_interval_seconds: 3600,
        data_dir: "/tmp/test".to_string(),
        jwt_refresh_secret: "test-refresh-secret".to_string(),
        jwt_secret: "test-access-secret".to_string(),
        refresh_token_ttl_seconds: 604_800,
        session_ttl_seconds: 86_400,
    }
}

/// A `JwtService` with fixed test secrets and the default TTLs.
pub fn test_jwt_service() -> JwtService {
    JwtService::new("test-access-secret", "test-refresh-secret", 900, 604_800)
}

/// An `AuthService` wired to the given database with test secrets.
pub fn test_auth_service(db: Database) -> AuthService {
    AuthService::new(db, test_jwt_service(), 86_400)
}

/// Build a full `Arc<AppState>` around the given database.
pub fn test_state(db: Database) -> Arc<AppState> {
    Arc::new(AppState::new(test_config(), db))
}

/// Create a `User` with the given id, not persisted anywhere.
pub fn make_user(id: u64) -> User {
    User {
        avatar_url: None,
        bio: None,
        created_at: Utc::now(),
        display_name: None,
        email: format!("user{id}@example.com"),
        id,
        password_hash: format!("hash_{id}"),
        role: Role::User,
        username: format!("user{id}"),
    }
}

/// Create a `Session` with the given id and owner, expiring in 24 hours.
pub fn make_session(id: &str, user_id: u64) -> Session {
    let now = Utc::now();
    Session {
        created_at: now,
        expires_at: now + chrono::Duration::hours(24),
        id: id.to_string(),
        user_id,
    }
}
