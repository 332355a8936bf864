use serde::Serialize;
use thiserror::Error;

use crate::password;
use crate::storage::models::{ProfileUpdate, PublicUser, User};
use crate::storage::{Database, DatabaseError};
use crate::tokens::jwt::{JwtError, JwtService};
use crate::tokens::session;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("password hashing failed")]
    Hashing(#[from] password::HashError),
    /// Wrong username or wrong password — deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    /// Malformed input or a uniqueness conflict at registration.
    #[error("{0}")]
    Validation(String),
}

impl From<session::SessionError> for AuthError {
    fn from(e: session::SessionError) -> Self {
        match e {
            session::SessionError::Database(e) => AuthError::Database(e),
        }
    }
}

/// A freshly-issued access/refresh pair
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of a web (cookie) login
#[derive(Debug)]
pub struct SessionLogin {
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub session_id: String,
    pub user: PublicUser,
}

/// Result of a mobile (bearer) login
#[derive(Debug)]
pub struct JwtLogin {
    pub tokens: TokenPair,
    pub user: PublicUser,
}

/// Orchestrates registration, both login flows, logout, and token refresh
/// over the session manager, JWT service, and credential store. Holds no
/// authoritative state of its own.
pub struct AuthService {
    db: Database,
    /// Digest verified against when the username does not exist, so a
    /// failed lookup costs the same as a failed password check.
    dummy_digest: String,
    jwt: JwtService,
    session_ttl_seconds: u64,
}

impl AuthService {
    pub fn new(db: Database, jwt: JwtService, session_ttl_seconds: u64) -> Self {
        Self {
            db,
            dummy_digest: password::dummy_digest(),
            jwt,
            session_ttl_seconds,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Register a new user. Uniqueness conflicts surface as a single
    /// generic [`AuthError::Validation`] so the caller cannot probe which
    /// of username/email is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, AuthError> {
        validate_registration(username, email, password)?;

        let plaintext = password.to_string();
        let digest = tokio::task::spawn_blocking(move || password::hash(&plaintext)).await??;

        let user = match self.db.create_user(username, email, &digest) {
            Ok(user) => user,
            Err(DatabaseError::Conflict) => {
                return Err(AuthError::Validation(
                    "username or email already exists".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = user.id, "Registered user");
        Ok(PublicUser::from(&user))
    }

    /// Web login: verify credentials and mint a session.
    pub async fn login_with_session(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SessionLogin, AuthError> {
        let user = self.verify_credentials(username, password).await?;
        let session = session::create(&self.db, user.id, self.session_ttl_seconds)?;

        Ok(SessionLogin {
            expires_at: session.expires_at,
            session_id: session.id,
            user: PublicUser::from(&user),
        })
    }

    /// Mobile login: verify credentials and issue an access/refresh pair.
    pub async fn login_with_jwt(
        &self,
        username: &str,
        password: &str,
    ) -> Result<JwtLogin, AuthError> {
        let user = self.verify_credentials(username, password).await?;

        let tokens = TokenPair {
            access_token: self.jwt.issue_access_token(&user).map_err(jwt_internal)?,
            refresh_token: self.jwt.issue_refresh_token(&user).map_err(jwt_internal)?,
        };

        Ok(JwtLogin {
            tokens,
            user: PublicUser::from(&user),
        })
    }

    /// Destroy a session. No-op if already gone.
    pub fn logout(&self, session_id: &str) -> Result<(), AuthError> {
        session::destroy(&self.db, session_id)?;
        Ok(())
    }

    /// Revoke an access token's `jti`.
    ///
    /// Does NOT revoke the paired refresh token — refresh tokens are
    /// rotated (and the old one revoked) by [`Self::refresh_tokens`], so a
    /// caller wanting a full logout invalidates its refresh token there.
    pub fn logout_jwt(&self, access_token: &str) -> Result<(), AuthError> {
        match self.jwt.revoke(&self.db, access_token) {
            Ok(()) => Ok(()),
            Err(JwtError::InvalidToken) => Err(AuthError::InvalidToken),
            Err(JwtError::Database(e)) => Err(e.into()),
            Err(JwtError::Signing(_)) => Err(AuthError::InvalidToken),
        }
    }

    /// Rotate a refresh token. Returns `None` (not an error) on any
    /// verification failure so the route layer can produce a uniform 401.
    ///
    /// Order is issue-then-revoke: a crash between the two leaves the old
    /// refresh token valid (fail open) rather than locking the user out.
    pub fn refresh_tokens(&self, refresh_token: &str) -> Result<Option<TokenPair>, AuthError> {
        let claims = match self.jwt.verify_refresh_token(&self.db, refresh_token) {
            Ok(claims) => claims,
            Err(JwtError::InvalidToken) => return Ok(None),
            Err(JwtError::Database(e)) => return Err(e.into()),
            Err(JwtError::Signing(_)) => return Ok(None),
        };

        let user = match self.db.get_user_by_id(claims.sub)? {
            Some(user) => user,
            None => return Ok(None),
        };

        let pair = TokenPair {
            access_token: self.jwt.issue_access_token(&user).map_err(jwt_internal)?,
            refresh_token: self.jwt.issue_refresh_token(&user).map_err(jwt_internal)?,
        };

        // Revoke the old refresh token so it cannot be replayed
        self.db.revoke_token(&claims.jti, claims.expires_at())?;

        Ok(Some(pair))
    }

    /// Resolve a session cookie to its owning user (middleware entry point).
    pub fn validate_session(&self, session_id: &str) -> Result<Option<PublicUser>, AuthError> {
        Ok(session::validate(&self.db, session_id)?
            .as_ref()
            .map(PublicUser::from))
    }

    /// Resolve a bearer access token to its owning user (middleware entry
    /// point). Returns `None` on any verification failure.
    pub fn validate_access_token(&self, token: &str) -> Result<Option<PublicUser>, AuthError> {
        let claims = match self.jwt.verify_access_token(&self.db, token) {
            Ok(claims) => claims,
            Err(JwtError::InvalidToken) => return Ok(None),
            Err(JwtError::Database(e)) => return Err(e.into()),
            Err(JwtError::Signing(_)) => return Ok(None),
        };

        Ok(self
            .db
            .get_user_by_id(claims.sub)?
            .as_ref()
            .map(PublicUser::from))
    }

    /// Update the calling user's own profile fields.
    pub fn update_profile(
        &self,
        user_id: u64,
        updates: &ProfileUpdate,
    ) -> Result<Option<PublicUser>, AuthError> {
        Ok(self
            .db
            .update_profile(user_id, updates)?
            .as_ref()
            .map(PublicUser::from))
    }

    /// Look up by username, then verify the password — against the stored
    /// digest when the user exists, against the dummy digest when not, so
    /// both failure paths do the same work and return the same error.
    async fn verify_credentials(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self.db.get_user_by_username(username)?;

        let digest = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_digest.clone(),
        };
        let plaintext = password.to_string();
        let matched =
            tokio::task::spawn_blocking(move || password::verify(&plaintext, &digest)).await?;

        match user {
            Some(user) if matched => Ok(user),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

/// A signing failure is a process misconfiguration, not a caller problem.
fn jwt_internal(e: JwtError) -> AuthError {
    match e {
        JwtError::Database(e) => AuthError::Database(e),
        other => {
            tracing::error!(error = %other, "Token signing failed");
            AuthError::InvalidToken
        }
    }
}

fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), AuthError> {
    if username.len() < 3 || username.len() > 50 {
        return Err(AuthError::Validation(
            "username must be 3-50 characters".to_string(),
        ));
    }
    if password.len() < 6 || password.len() > 100 {
        return Err(AuthError::Validation(
            "password must be 6-100 characters".to_string(),
        ));
    }
    let looks_like_email = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false);
    if !looks_like_email {
        return Err(AuthError::Validation("invalid email address".to_string()));
    }
    Ok(())
}
