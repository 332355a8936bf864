//! Session lifecycle: `Created → Valid → {Destroyed | Expired}`.
//!
//! Sessions are opaque high-entropy identifiers backed by the store; the
//! store is the sole source of truth and expiry is re-checked on every read.

use chrono::{Duration, Utc};
use thiserror::Error;

use crate::storage::models::{Session, User};
use crate::storage::Database;
use crate::tokens::generator::generate_hex;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Database error: {0}")]
    Database(#[from] crate::storage::DatabaseError),
}

/// Create a new session for a user. The session is durably persisted before
/// it is returned, so an immediately-following validation always succeeds.
pub fn create(db: &Database, user_id: u64, ttl_seconds: u64) -> Result<Session, SessionError> {
    let now = Utc::now();
    let session = Session {
        created_at: now,
        expires_at: now + Duration::seconds(ttl_seconds as i64),
        id: generate_hex(32),
        user_id,
    };

    db.put_session(&session)?;
    tracing::debug!(user_id, "Created session");

    Ok(session)
}

/// Resolve a session id to its owning user. Returns `None` (not an error)
/// when the session is absent, expired, or orphaned.
pub fn validate(db: &Database, session_id: &str) -> Result<Option<User>, SessionError> {
    let session = match db.get_session(session_id)? {
        Some(s) => s,
        None => return Ok(None),
    };

    Ok(db.get_user_by_id(session.user_id)?)
}

/// Destroy a session. Idempotent — destroying a nonexistent session is
/// not an error.
pub fn destroy(db: &Database, session_id: &str) -> Result<(), SessionError> {
    if db.delete_session(session_id)? {
        tracing::debug!("Destroyed session");
    }
    Ok(())
}

/// Sweep expired sessions (called by the background cleaner).
pub fn delete_expired(db: &Database) -> Result<usize, SessionError> {
    let cleaned = db.delete_expired_sessions()?;
    if cleaned > 0 {
        tracing::info!(count = cleaned, "Cleaned up expired sessions");
    }
    Ok(cleaned)
}
