use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use thiserror::Error;

use crate::accounts::repository::account_from_row;
use crate::auth::session;
use crate::db::models::{Account, AccountId};
use crate::db::StoreError;
use crate::state::DbPool;

#[derive(Debug, Error)]
pub enum AuthorizationError {
    #[error("Authentication credentials were not provided.")]
    MissingCredentials,

    #[error("Invalid or expired session.")]
    InvalidSession,

    #[error("User account is disabled")]
    Disabled,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Proof that the caller presented a live session for an active account.
/// Only [`AuthGate::authorize`] constructs one, so holding it is the
/// authorization check.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    account: Account,
}

impl AuthenticatedAccount {
    pub fn id(&self) -> AccountId {
        self.account.id
    }

    pub fn account(&self) -> &Account {
        &self.account
    }
}

/// Issues, resolves and revokes session tokens.
#[derive(Clone)]
pub struct AuthGate {
    pool: DbPool,
    session_hours: u64,
}

impl AuthGate {
    pub fn new(pool: DbPool, session_hours: u64) -> Self {
        Self {
            pool,
            session_hours,
        }
    }

    pub fn issue(&self, account: &Account) -> Result<String, StoreError> {
        let token = session::create_session(&self.pool, account.id, self.session_hours)?;
        tracing::debug!(account_id = %account.id, "Issued session");
        Ok(token)
    }

    pub fn authorize(&self, token: Option<&str>) -> Result<AuthenticatedAccount, AuthorizationError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthorizationError::MissingCredentials)?;

        let conn = self.pool.get().map_err(StoreError::from)?;
        let account = conn
            .query_row(
                "SELECT a.id, a.handle, a.email, a.name, a.bio, a.password_hash, a.is_active,
                        a.created_at, a.updated_at
                 FROM sessions s
                 JOIN accounts a ON a.id = s.account_id
                 WHERE s.token = ?1 AND s.expires_at > ?2",
                params![token, Utc::now()],
                account_from_row,
            )
            .optional()
            .map_err(StoreError::from)?
            .ok_or(AuthorizationError::InvalidSession)?;

        if !account.is_active {
            return Err(AuthorizationError::Disabled);
        }

        Ok(AuthenticatedAccount { account })
    }

    pub fn revoke(&self, token: &str) -> Result<(), StoreError> {
        session::delete_session(&self.pool, token)
    }
}
