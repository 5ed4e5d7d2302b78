use chrono::{Duration, Utc};
use rand::Rng;
use rusqlite::params;

use crate::db::models::AccountId;
use crate::db::StoreError;
use crate::state::DbPool;

/// Upper bound on session lifetime (100 years)
const MAX_SESSION_HOURS: i64 = 24 * 365 * 100;

/// Create a new session for an account. Returns the session token.
pub fn create_session(pool: &DbPool, account_id: AccountId, hours: u64) -> Result<String, StoreError> {
    let conn = pool.get()?;

    let token = generate_token();
    let id = uuid::Uuid::now_v7().to_string();
    let now = Utc::now();
    let hours = i64::try_from(hours).unwrap_or(MAX_SESSION_HOURS).min(MAX_SESSION_HOURS);
    let expires_at = now + Duration::hours(hours);

    conn.execute(
        "INSERT INTO sessions (id, account_id, token, expires_at, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, account_id.0, token, expires_at, now],
    )?;

    Ok(token)
}

/// Delete a session by token.
pub fn delete_session(pool: &DbPool, token: &str) -> Result<(), StoreError> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}
