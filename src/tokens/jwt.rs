//! JWT issuance and verification.
//!
//! Access and refresh tokens are signed with two independent secrets, so a
//! leaked access secret cannot forge refresh tokens and vice versa. Logout
//! support comes from `jti`-keyed revocation records in the store — the one
//! place bearer tokens pay a storage cost.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::storage::models::{Role, User};
use crate::storage::{Database, DatabaseError};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    /// Bad signature, expired, or revoked — deliberately undifferentiated.
    #[error("invalid token")]
    InvalidToken,
    #[error("Token signing error: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Claims carried by both access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Expiration timestamp (seconds)
    pub exp: i64,
    /// Issued-at timestamp (seconds)
    pub iat: i64,
    /// Unique token id, the revocation key
    pub jti: String,
    pub role: Role,
    /// Subject: the user id
    pub sub: u64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

struct KeyPair {
    decoding: DecodingKey,
    encoding: EncodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Signs and verifies access/refresh tokens. Secrets are fixed at
/// construction and immutable for the life of the process.
pub struct JwtService {
    access: KeyPair,
    access_ttl_seconds: u64,
    refresh: KeyPair,
    refresh_ttl_seconds: u64,
}

impl JwtService {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl_seconds: u64,
        refresh_ttl_seconds: u64,
    ) -> Self {
        Self {
            access: KeyPair::from_secret(access_secret),
            access_ttl_seconds,
            refresh: KeyPair::from_secret(refresh_secret),
            refresh_ttl_seconds,
        }
    }

    /// Issue a short-lived access token for a user
    pub fn issue_access_token(&self, user: &User) -> Result<String, JwtError> {
        self.issue(user, &self.access.encoding, self.access_ttl_seconds)
    }

    /// Issue a long-lived refresh token for a user
    pub fn issue_refresh_token(&self, user: &User) -> Result<String, JwtError> {
        self.issue(user, &self.refresh.encoding, self.refresh_ttl_seconds)
    }

    fn issue(&self, user: &User, key: &EncodingKey, ttl_seconds: u64) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            exp: (now + chrono::Duration::seconds(ttl_seconds as i64)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            role: user.role,
            sub: user.id,
        };

        encode(&Header::default(), &claims, key).map_err(JwtError::Signing)
    }

    /// Verify an access token: signature, expiry, and revocation. All three
    /// failures collapse to [`JwtError::InvalidToken`] so callers cannot
    /// tell which check tripped.
    pub fn verify_access_token(&self, db: &Database, token: &str) -> Result<Claims, JwtError> {
        self.verify(db, token, &self.access.decoding)
    }

    /// Verify a refresh token against the refresh secret
    pub fn verify_refresh_token(&self, db: &Database, token: &str) -> Result<Claims, JwtError> {
        self.verify(db, token, &self.refresh.decoding)
    }

    fn verify(&self, db: &Database, token: &str, key: &DecodingKey) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| JwtError::InvalidToken)?;

        if db.is_token_revoked(&claims.jti)? {
            return Err(JwtError::InvalidToken);
        }

        Ok(claims)
    }

    /// Revoke a token by recording its `jti` until the token's own expiry.
    /// Only the signature is checked here — a token that has already
    /// expired may still be revoked, which keeps the operation idempotent
    /// for clients retrying a logout.
    pub fn revoke(&self, db: &Database, token: &str) -> Result<(), JwtError> {
        let claims = self
            .decode_any(token)
            .ok_or(JwtError::InvalidToken)?;

        db.revoke_token(&claims.jti, claims.expires_at())?;
        tracing::debug!(jti = %claims.jti, "Revoked token");
        Ok(())
    }

    /// Decode against either secret without enforcing expiry.
    fn decode_any(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::default();
        validation.validate_exp = false;

        for key in [&self.access.decoding, &self.refresh.decoding] {
            if let Ok(data) = decode::<Claims>(token, key, &validation) {
                return Some(data.claims);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{make_user, setup_db, test_jwt_service};

    #[test]
    fn test_issue_and_verify_access_token() {
        let (db, _temp) = setup_db();
        let jwt = test_jwt_service();
        let user = make_user(42);

        let token = jwt.issue_access_token(&user).unwrap();
        let claims = jwt.verify_access_token(&db, &token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::User);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_secrets_are_not_interchangeable() {
        let (db, _temp) = setup_db();
        let jwt = test_jwt_service();
        let user = make_user(42);

        let access = jwt.issue_access_token(&user).unwrap();
        let refresh = jwt.issue_refresh_token(&user).unwrap();

        assert!(matches!(
            jwt.verify_refresh_token(&db, &access),
            Err(JwtError::InvalidToken)
        ));
        assert!(matches!(
            jwt.verify_access_token(&db, &refresh),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_revoked_token_fails_verification() {
        let (db, _temp) = setup_db();
        let jwt = test_jwt_service();
        let user = make_user(42);

        let token = jwt.issue_access_token(&user).unwrap();
        jwt.verify_access_token(&db, &token).unwrap();

        jwt.revoke(&db, &token).unwrap();
        assert!(matches!(
            jwt.verify_access_token(&db, &token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let (db, _temp) = setup_db();
        let jwt = test_jwt_service();

        assert!(matches!(
            jwt.verify_access_token(&db, "not.a.jwt"),
            Err(JwtError::InvalidToken)
        ));
        assert!(matches!(
            jwt.revoke(&db, "not.a.jwt"),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_each_token_gets_a_fresh_jti() {
        let (db, _temp) = setup_db();
        let jwt = test_jwt_service();
        let user = make_user(42);

        let t1 = jwt.issue_access_token(&user).unwrap();
        let t2 = jwt.issue_access_token(&user).unwrap();
        let c1 = jwt.verify_access_token(&db, &t1).unwrap();
        let c2 = jwt.verify_access_token(&db, &t2).unwrap();
        assert_ne!(c1.jti, c2.jti);
    }
}
