use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;

use crate::accounts::domain::{PasswordHash, ValidationError};
use crate::accounts::repository::AccountStore;
use crate::config::AuthConfig;
use crate::db::models::Account;
use crate::db::StoreError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    #[serde(rename = "password")]
    pub credential: Option<String>,
}

/// Login payload after its credentials resolved to an active account.
#[derive(Debug, Clone)]
pub struct ValidatedLogin {
    pub account: Account,
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub struct CredentialValidator<S> {
    store: S,
    bcrypt_cost: u32,
}

/// Hash checked when no account matches, so a miss costs one bcrypt verify
/// like a wrong credential does.
fn decoy_hash(cost: u32) -> Option<&'static PasswordHash> {
    static DECOY: OnceLock<Option<PasswordHash>> = OnceLock::new();
    DECOY
        .get_or_init(|| PasswordHash::hash("agora-decoy-credential", cost).ok())
        .as_ref()
}

impl<S: AccountStore> CredentialValidator<S> {
    pub fn new(store: S, auth: &AuthConfig) -> Self {
        Self {
            store,
            bcrypt_cost: auth.bcrypt_cost,
        }
    }

    pub async fn validate(&self, request: LoginRequest) -> Result<ValidatedLogin, LoginError> {
        let email = request.email.as_deref().map(str::trim).unwrap_or_default();
        let credential = request.credential.as_deref().unwrap_or_default();
        if email.is_empty() || credential.is_empty() {
            return Err(ValidationError::new("Must include email and password").into());
        }

        let verified = match self.store.find_by_email(email).await? {
            Some(account) => PasswordHash::from_stored(account.password_hash.as_str())
                .verify(credential)
                .then_some(account),
            None => {
                if let Some(decoy) = decoy_hash(self.bcrypt_cost) {
                    decoy.verify(credential);
                }
                None
            }
        };
        let Some(account) = verified else {
            tracing::info!("Rejected login with invalid credentials");
            return Err(ValidationError::new("Invalid credentials").into());
        };

        if !account.is_active {
            tracing::info!(account_id = %account.id, "Rejected login for disabled account");
            return Err(ValidationError::new("User account is disabled").into());
        }

        Ok(ValidatedLogin { account })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::domain::RegistrationRequest;
    use crate::accounts::registrar::IdentityRegistrar;
    use crate::accounts::repository::SqliteAccountStore;
    use crate::config::AuthConfig;
    use crate::db;

    fn login(email: Option<&str>, password: Option<&str>) -> LoginRequest {
        LoginRequest {
            email: email.map(Into::into),
            credential: password.map(Into::into),
        }
    }

    fn auth_config() -> AuthConfig {
        AuthConfig {
            bcrypt_cost: 4,
            ..AuthConfig::default()
        }
    }

    async fn registered_store() -> (SqliteAccountStore, Account, tempfile::TempDir) {
        let (pool, temp) = db::test_pool();
        let store = SqliteAccountStore::new(pool);
        let account = IdentityRegistrar::new(store.clone(), &auth_config())
            .register(RegistrationRequest {
                email: Some("bob@example.com".into()),
                name: Some("Bob".into()),
                bio: None,
                credential: Some("secret1".into()),
                credential_confirm: Some("secret1".into()),
            })
            .await
            .unwrap();
        (store, account, temp)
    }

    fn message(err: LoginError) -> String {
        match err {
            LoginError::Validation(e) => e.0,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_correct_credentials_resolve_account() {
        let (store, account, _temp) = registered_store().await;
        let validated = CredentialValidator::new(store, &auth_config())
            .validate(login(Some("bob@example.com"), Some("secret1")))
            .await
            .unwrap();
        assert_eq!(validated.account.id, account.id);
    }

    #[tokio::test]
    async fn test_wrong_credential_is_invalid() {
        let (store, _account, _temp) = registered_store().await;
        let err = CredentialValidator::new(store, &auth_config())
            .validate(login(Some("bob@example.com"), Some("wrong-one")))
            .await
            .unwrap_err();
        assert_eq!(message(err), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_unknown_email_is_invalid() {
        let (store, _account, _temp) = registered_store().await;
        let err = CredentialValidator::new(store, &auth_config())
            .validate(login(Some("eve@example.com"), Some("secret1")))
            .await
            .unwrap_err();
        assert_eq!(message(err), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let (store, _account, _temp) = registered_store().await;
        let validator = CredentialValidator::new(store, &auth_config());
        for req in [
            login(None, Some("secret1")),
            login(Some("bob@example.com"), None),
            login(Some(""), Some("secret1")),
            login(None, None),
        ] {
            let err = validator.validate(req).await.unwrap_err();
            assert_eq!(message(err), "Must include email and password");
        }
    }

    #[tokio::test]
    async fn test_disabled_account() {
        let (store, account, _temp) = registered_store().await;
        store.set_active(account.id, false).await.unwrap();

        let err = CredentialValidator::new(store, &auth_config())
            .validate(login(Some("bob@example.com"), Some("secret1")))
            .await
            .unwrap_err();
        assert_eq!(message(err), "User account is disabled");
    }

    #[test]
    fn test_decoy_hash_matches_no_credential() {
        let decoy = decoy_hash(4).unwrap();
        assert!(!decoy.verify("secret1"));
        assert!(!decoy.verify(""));
    }
}
