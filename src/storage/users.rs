use chrono::Utc;
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{ProfileUpdate, Role, User};
use super::tables::*;

impl Database {
    /// Create a user, enforcing username and email uniqueness in one
    /// transaction. Fails with [`DatabaseError::Conflict`] on either
    /// collision — callers cannot tell which field collided.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, DatabaseError> {
        debug_assert!(!username.is_empty(), "username must not be empty");
        debug_assert!(!password_hash.is_empty(), "password_hash must not be empty");

        let write_txn = self.begin_write()?;
        let user = {
            {
                let usernames = write_txn.open_table(USERNAMES)?;
                if usernames.get(username)?.is_some() {
                    return Err(DatabaseError::Conflict);
                }
                let emails = write_txn.open_table(EMAILS)?;
                if emails.get(email)?.is_some() {
                    return Err(DatabaseError::Conflict);
                }
            }

            let id = {
                let mut meta = write_txn.open_table(META)?;
                let next = meta.get("next_user_id")?.map(|v| v.value()).unwrap_or(1);
                meta.insert("next_user_id", next + 1)?;
                next
            };

            let user = User {
                avatar_url: None,
                bio: None,
                created_at: Utc::now(),
                display_name: None,
                email: email.to_string(),
                id,
                password_hash: password_hash.to_string(),
                role: Role::User,
                username: username.to_string(),
            };

            let mut users = write_txn.open_table(USERS)?;
            let data = rmp_serde::to_vec_named(&user)?;
            users.insert(user.id, data.as_slice())?;

            let mut usernames = write_txn.open_table(USERNAMES)?;
            usernames.insert(username, user.id)?;
            let mut emails = write_txn.open_table(EMAILS)?;
            emails.insert(email, user.id)?;

            user
        };
        write_txn.commit()?;

        tracing::debug!(user_id = user.id, "Created user");
        Ok(user)
    }

    /// Look up a user by username via the unique index
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let usernames = read_txn.open_table(USERNAMES)?;

        let id = match usernames.get(username)? {
            Some(v) => v.value(),
            None => return Ok(None),
        };

        let users = read_txn.open_table(USERS)?;
        match users.get(id)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a user by id
    pub fn get_user_by_id(&self, id: u64) -> Result<Option<User>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let users = read_txn.open_table(USERS)?;

        match users.get(id)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    /// Apply owner-mutable profile fields. Returns the updated user, or
    /// `None` if the user does not exist.
    pub fn update_profile(
        &self,
        id: u64,
        updates: &ProfileUpdate,
    ) -> Result<Option<User>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing: Option<User> = {
            let users = write_txn.open_table(USERS)?;
            let existing = match users.get(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            existing
        };

        let updated = match existing {
            Some(mut user) => {
                if let Some(ref avatar_url) = updates.avatar_url {
                    user.avatar_url = Some(avatar_url.clone());
                }
                if let Some(ref bio) = updates.bio {
                    user.bio = Some(bio.clone());
                }
                if let Some(ref display_name) = updates.display_name {
                    user.display_name = Some(display_name.clone());
                }

                let data = rmp_serde::to_vec_named(&user)?;
                let mut users = write_txn.open_table(USERS)?;
                users.insert(id, data.as_slice())?;
                Some(user)
            }
            None => None,
        };

        write_txn.commit()?;
        Ok(updated)
    }
}
