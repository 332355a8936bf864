use chrono::{DateTime, Utc};
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::RevokedToken;
use super::tables::*;

impl Database {
    /// Record a JWT's `jti` as revoked until the token's own expiry.
    /// Insert-or-replace keyed by `jti`, so revoking twice is harmless.
    pub fn revoke_token(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DatabaseError> {
        debug_assert!(!jti.is_empty(), "jti must not be empty");

        let entry = RevokedToken {
            expires_at,
            jti: jti.to_string(),
            revoked_at: Utc::now(),
        };

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(REVOKED_TOKENS)?;
            let data = rmp_serde::to_vec_named(&entry)?;
            table.insert(jti, data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Whether a `jti` is actively revoked. An entry past its own
    /// `expires_at` no longer counts — the token it shadowed is dead by
    /// expiry anyway, and the row is merely awaiting pruning. The check
    /// never depends on the prune job having run.
    pub fn is_token_revoked(&self, jti: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(REVOKED_TOKENS)?;

        match table.get(jti)? {
            Some(data) => {
                let entry: RevokedToken = rmp_serde::from_slice(data.value())?;
                Ok(entry.expires_at > Utc::now())
            }
            None => Ok(false),
        }
    }

    /// Prune revocation entries whose token has expired on its own.
    /// Storage reclamation only — verification stays correct without it.
    pub fn cleanup_expired_tokens(&self) -> Result<usize, DatabaseError> {
        let now = Utc::now();

        let expired: Vec<String> = {
            let read_txn = self.begin_read()?;
            let table = read_txn.open_table(REVOKED_TOKENS)?;
            let mut result = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let revoked: RevokedToken = rmp_serde::from_slice(value.value())?;
                if revoked.expires_at <= now {
                    result.push(key.value().to_string());
                }
            }
            result
        };

        if expired.is_empty() {
            return Ok(0);
        }

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(REVOKED_TOKENS)?;
            for jti in &expired {
                table.remove(jti.as_str())?;
            }
        }
        write_txn.commit()?;
        Ok(expired.len())
    }
}
