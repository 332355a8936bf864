use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role assigned to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Guest,
    #[default]
    User,
}

/// A user account.
///
/// `password_hash` never crosses the service boundary — see [`PublicUser`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    pub display_name: Option<String>,
    pub email: String,
    pub id: u64,
    /// Opaque digest (Argon2id), never exposed externally
    pub password_hash: String,
    pub role: Role,
    pub username: String,
}

/// The externally-visible projection of a [`User`] — everything but the hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub display_name: Option<String>,
    pub email: String,
    pub id: u64,
    pub role: Role,
    pub username: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            avatar_url: user.avatar_url.clone(),
            bio: user.bio.clone(),
            created_at: user.created_at,
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            id: user.id,
            role: user.role,
            username: user.username.clone(),
        }
    }
}

/// A server-side session record, keyed by an opaque bearer identifier.
///
/// A session is valid iff `now < expires_at` — validity is the sole gate,
/// no other session state exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session expires
    pub expires_at: DateTime<Utc>,
    /// Opaque secret identifier (32-byte hex)
    pub id: String,
    /// Owning user (many sessions per user)
    pub user_id: u64,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A JWT whose holder logged out before natural expiry, keyed by `jti`.
///
/// Entries past their own `expires_at` are prune candidates — never
/// resurrected as valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedToken {
    /// The token's own expiry (after which the entry is prunable)
    pub expires_at: DateTime<Utc>,
    pub jti: String,
    pub revoked_at: DateTime<Utc>,
}

/// Owner-mutable profile fields. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub display_name: Option<String>,
}
