pub mod domain;
pub mod login;
pub mod registrar;
pub mod repository;

pub use domain::{
    Email, Handle, NewAccount, PasswordHash, ProfileUpdate, RegistrationRequest, ValidationError,
};
pub use login::{CredentialValidator, LoginError, LoginRequest, ValidatedLogin};
pub use registrar::{IdentityRegistrar, RegistrationError};
pub use repository::{AccountStore, SqliteAccountStore};
