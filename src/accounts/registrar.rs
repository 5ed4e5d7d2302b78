use thiserror::Error;

use crate::accounts::domain::{
    Handle, NewAccount, PasswordHash, RegistrationRequest, ValidationError,
};
use crate::accounts::repository::AccountStore;
use crate::config::AuthConfig;
use crate::db::models::Account;
use crate::db::{StoreError, UniqueField};

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Validates registration input, derives a unique handle and creates the account.
pub struct IdentityRegistrar<S> {
    store: S,
    bcrypt_cost: u32,
    handle_retries: u32,
}

impl<S: AccountStore> IdentityRegistrar<S> {
    pub fn new(store: S, auth: &AuthConfig) -> Self {
        Self {
            store,
            bcrypt_cost: auth.bcrypt_cost,
            handle_retries: auth.handle_retries,
        }
    }

    pub async fn register(&self, request: RegistrationRequest) -> Result<Account, RegistrationError> {
        let registration = request.validate()?;
        let password_hash = PasswordHash::hash(&registration.credential, self.bcrypt_cost)?;

        let mut lost_races = 0;
        loop {
            let handle = self.resolve_handle(registration.email.local_part()).await?;
            let new_account = NewAccount {
                handle: handle.clone(),
                email: registration.email.clone(),
                name: registration.name.clone(),
                bio: registration.bio.clone(),
                password_hash: password_hash.clone(),
            };

            match self.store.create(&new_account).await {
                Ok(account) => {
                    tracing::info!(account_id = %account.id, handle = %account.handle, "Registered account");
                    return Ok(account);
                }
                Err(StoreError::Conflict(UniqueField::Email)) => {
                    return Err(RegistrationError::Conflict(
                        "An account with this email already exists".into(),
                    ));
                }
                Err(StoreError::Conflict(UniqueField::Handle)) if lost_races < self.handle_retries => {
                    lost_races += 1;
                    tracing::warn!(%handle, attempt = lost_races, "Handle taken during insert, re-probing");
                }
                Err(StoreError::Conflict(UniqueField::Handle)) => {
                    tracing::warn!(%handle, "Giving up on handle allocation");
                    return Err(RegistrationError::Conflict(
                        "Could not allocate a unique handle, please retry".into(),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// First free candidate in the probe sequence `base`, `base1`, `base2`, ...
    pub async fn resolve_handle(&self, base: &str) -> Result<Handle, StoreError> {
        let mut attempt = 0;
        loop {
            let candidate = Handle::candidate(base, attempt);
            if !self.store.exists_handle(&candidate).await? {
                return Ok(candidate);
            }
            attempt += 1;
        }
    }
}
