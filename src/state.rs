use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::accounts::{CredentialValidator, IdentityRegistrar, SqliteAccountStore};
use crate::auth::AuthGate;
use crate::config::Config;
use crate::posts::{PostOwnershipBinder, SqlitePostStore};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self { db, config }
    }

    pub fn accounts(&self) -> SqliteAccountStore {
        SqliteAccountStore::new(self.db.clone())
    }

    pub fn registrar(&self) -> IdentityRegistrar<SqliteAccountStore> {
        IdentityRegistrar::new(self.accounts(), &self.config.auth)
    }

    pub fn credentials(&self) -> CredentialValidator<SqliteAccountStore> {
        CredentialValidator::new(self.accounts(), &self.config.auth)
    }

    pub fn binder(&self) -> PostOwnershipBinder<SqlitePostStore> {
        PostOwnershipBinder::new(SqlitePostStore::new(self.db.clone()))
    }

    pub fn gate(&self) -> AuthGate {
        AuthGate::new(self.db.clone(), self.config.auth.session_hours)
    }
}
