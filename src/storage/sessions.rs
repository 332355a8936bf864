use chrono::Utc;
use redb::ReadableTable;

use super::db::{expiry_key, expiry_key_ms, Database, DatabaseError};
use super::models::Session;
use super::tables::*;

impl Database {
    /// Store a session
    pub fn put_session(&self, session: &Session) -> Result<(), DatabaseError> {
        debug_assert!(!session.id.is_empty(), "session id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            let data = rmp_serde::to_vec_named(session)?;
            table.insert(session.id.as_str(), data.as_slice())?;

            // Update expiration index
            let mut expiry_table = write_txn.open_table(SESSION_EXPIRY)?;
            let ek = expiry_key(&session.expires_at, &session.id);
            expiry_table.insert(ek.as_str(), session.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a session by its opaque identifier. Expiry is filtered at read
    /// time — a stale-but-unswept row never comes back.
    pub fn get_session(&self, session_id: &str) -> Result<Option<Session>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;

        match table.get(session_id)? {
            Some(data) => {
                let session: Session = rmp_serde::from_slice(data.value())?;
                if session.is_expired_at(Utc::now()) {
                    Ok(None)
                } else {
                    Ok(Some(session))
                }
            }
            None => Ok(None),
        }
    }

    /// Delete a session. Returns whether a row was removed; deleting an
    /// unknown session is not an error.
    pub fn delete_session(&self, session_id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        // First, get the session for expiry-index cleanup
        let session: Option<Session> = {
            let table = write_txn.open_table(SESSIONS)?;
            let result = table.get(session_id)?;
            match result {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            }
        };

        let deleted = match session {
            Some(session) => {
                {
                    let mut table = write_txn.open_table(SESSIONS)?;
                    table.remove(session_id)?;
                }
                {
                    let mut expiry_table = write_txn.open_table(SESSION_EXPIRY)?;
                    let ek = expiry_key(&session.expires_at, session_id);
                    expiry_table.remove(ek.as_str())?;
                }
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(deleted)
    }

    /// Delete expired sessions using the expiration index (no full table
    /// scan). Returns the number of sessions removed.
    pub fn delete_expired_sessions(&self) -> Result<usize, DatabaseError> {
        let now_ms = Utc::now().timestamp_millis();

        // Phase 1: read the expiration index to collect expired entries
        let expired: Vec<(String, String)> = {
            let read_txn = self.begin_read()?;
            let table = read_txn.open_table(SESSION_EXPIRY)?;
            let mut result = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let key_str = key.value().to_string();
                match expiry_key_ms(&key_str) {
                    Some(ms) if ms <= now_ms => {
                        result.push((key_str, value.value().to_string()));
                    }
                    _ => break,
                }
            }
            result
        };

        if expired.is_empty() {
            return Ok(0);
        }

        // Phase 2: delete expired sessions and their index entries
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            let mut expiry_table = write_txn.open_table(SESSION_EXPIRY)?;
            for (expiry_key_val, session_id) in &expired {
                table.remove(session_id.as_str())?;
                expiry_table.remove(expiry_key_val.as_str())?;
            }
        }
        write_txn.commit()?;
        Ok(expired.len())
    }
}
