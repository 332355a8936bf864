use redb::TableDefinition;

/// Users: user_id -> User (msgpack)
pub const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Unique index: username -> user_id
pub const USERNAMES: TableDefinition<&str, u64> = TableDefinition::new("usernames");

/// Unique index: email -> user_id
pub const EMAILS: TableDefinition<&str, u64> = TableDefinition::new("emails");

/// Sessions: session_id -> Session (msgpack)
pub const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// Expiration index: "{expires_ms:020}:{session_id}" -> session_id
pub const SESSION_EXPIRY: TableDefinition<&str, &str> = TableDefinition::new("session_expiry");

/// Revoked JWTs: jti -> RevokedToken (msgpack)
pub const REVOKED_TOKENS: TableDefinition<&str, &[u8]> = TableDefinition::new("revoked_tokens");

/// Counters: "next_user_id" -> u64
pub const META: TableDefinition<&str, u64> = TableDefinition::new("meta");
