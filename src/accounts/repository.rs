// Account Store - isolates all account persistence side effects
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::accounts::domain::{Handle, NewAccount, ProfileUpdate};
use crate::db::models::{Account, AccountId};
use crate::db::StoreError;
use crate::state::DbPool;

const ACCOUNT_COLUMNS: &str =
    "id, handle, email, name, bio, password_hash, is_active, created_at, updated_at";

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert an account. Uniqueness violations surface as `StoreError::Conflict`.
    async fn create(&self, account: &NewAccount) -> Result<Account, StoreError>;

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    async fn find_by_handle(&self, handle: &Handle) -> Result<Option<Account>, StoreError>;

    /// Case-insensitive email lookup
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn exists_handle(&self, handle: &Handle) -> Result<bool, StoreError>;

    /// Apply a partial profile update and return the refreshed account
    async fn update_profile(
        &self,
        id: AccountId,
        update: &ProfileUpdate,
    ) -> Result<Account, StoreError>;

    async fn set_active(&self, id: AccountId, active: bool) -> Result<(), StoreError>;
}

/// SQLite implementation
#[derive(Clone)]
pub struct SqliteAccountStore {
    pool: DbPool,
}

impl SqliteAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn find_one(
        &self,
        clause: &str,
        param: &dyn rusqlite::ToSql,
    ) -> Result<Option<Account>, StoreError> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM accounts WHERE {}", ACCOUNT_COLUMNS, clause);
        let account = conn
            .query_row(&sql, &[param], account_from_row)
            .optional()?;
        Ok(account)
    }
}

pub(crate) fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: AccountId(row.get(0)?),
        handle: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        bio: row.get(4)?,
        password_hash: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn create(&self, account: &NewAccount) -> Result<Account, StoreError> {
        let conn = self.pool.get()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO accounts (handle, email, name, bio, password_hash, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
            params![
                account.handle.as_str(),
                account.email.as_str(),
                account.name,
                account.bio,
                account.password_hash.as_str(),
                now
            ],
        )
        .map_err(StoreError::from_sql)?;

        Ok(Account {
            id: AccountId(conn.last_insert_rowid()),
            handle: account.handle.as_str().to_string(),
            email: account.email.as_str().to_string(),
            name: account.name.clone(),
            bio: account.bio.clone(),
            password_hash: account.password_hash.as_str().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        self.find_one("id = ?1", &id.0)
    }

    async fn find_by_handle(&self, handle: &Handle) -> Result<Option<Account>, StoreError> {
        self.find_one("handle = ?1", &handle.as_str())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.find_one("email = ?1", &email.trim())
    }

    async fn exists_handle(&self, handle: &Handle) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE handle = ?1)",
            params![handle.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    async fn update_profile(
        &self,
        id: AccountId,
        update: &ProfileUpdate,
    ) -> Result<Account, StoreError> {
        {
            let conn = self.pool.get()?;
            let rows = conn.execute(
                "UPDATE accounts SET
                   name = COALESCE(?2, name),
                   bio = CASE WHEN ?3 IS NULL THEN bio ELSE NULLIF(?3, '') END,
                   updated_at = ?4
                 WHERE id = ?1",
                params![id.0, update.name, update.bio, Utc::now()],
            )?;
            if rows == 0 {
                return Err(StoreError::NotFound(format!("account {}", id)));
            }
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("account {}", id)))
    }

    async fn set_active(&self, id: AccountId, active: bool) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            "UPDATE accounts SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
            params![id.0, active, Utc::now()],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("account {}", id)));
        }
        Ok(())
    }
}
