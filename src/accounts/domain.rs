// Account domain types - validation and handle derivation, no I/O
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

pub const MIN_CREDENTIAL_LEN: usize = 6;

/// User-correctable input defect. The message is surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle(String);

impl Handle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// The `attempt`-th probe for `base`: `base`, then `base1`, `base2`, ...
    pub fn candidate(base: &str, attempt: u64) -> Self {
        if attempt == 0 {
            Self(base.to_string())
        } else {
            Self(format!("{}{}", base, attempt))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let email = raw.trim();
        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !email.chars().any(char::is_whitespace) =>
            {
                Ok(Self(email.to_string()))
            }
            _ => Err(ValidationError::new("Enter a valid email address.")),
        }
    }

    /// Substring before the `@`; the base for handle derivation.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// bcrypt hash of a credential. Plaintext is never kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn hash(plaintext: &str, cost: u32) -> Result<Self, bcrypt::BcryptError> {
        Ok(Self(bcrypt::hash(plaintext, cost)?))
    }

    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Verify plaintext against the stored hash - constant-time via bcrypt
    pub fn verify(&self, plaintext: &str) -> bool {
        bcrypt::verify(plaintext, &self.0).unwrap_or(false)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Registration payload as submitted. Missing or null fields are rejected by
/// [`RegistrationRequest::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    #[serde(rename = "password")]
    pub credential: Option<String>,
    #[serde(rename = "password_confirm")]
    pub credential_confirm: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedRegistration {
    pub email: Email,
    pub name: String,
    pub bio: Option<String>,
    pub credential: String,
}

impl RegistrationRequest {
    pub fn validate(self) -> Result<ValidatedRegistration, ValidationError> {
        let credential = self.credential.unwrap_or_default();
        if credential.chars().count() < MIN_CREDENTIAL_LEN {
            return Err(ValidationError::new(format!(
                "Ensure this field has at least {} characters.",
                MIN_CREDENTIAL_LEN
            )));
        }
        if self.credential_confirm.as_deref() != Some(credential.as_str()) {
            return Err(ValidationError::new("Passwords don't match"));
        }

        let email = Email::parse(self.email.as_deref().unwrap_or_default())?;
        let name = required_name(self.name.as_deref().unwrap_or_default())?;

        Ok(ValidatedRegistration {
            email,
            name,
            bio: normalize_bio(self.bio),
            credential,
        })
    }
}

/// Fields a caller may change on their own profile. Anything else in the
/// payload (`id`, `email`, `handle`, timestamps) is dropped by serde.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(self) -> Result<Self, ValidationError> {
        let name = self.name.as_deref().map(required_name).transpose()?;
        Ok(Self {
            name,
            bio: self.bio.map(|bio| bio.trim().to_string()),
        })
    }
}

/// Everything the store needs to insert an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub handle: Handle,
    pub email: Email,
    pub name: String,
    pub bio: Option<String>,
    pub password_hash: PasswordHash,
}

fn required_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::new("Name is required"));
    }
    Ok(name.to_string())
}

fn normalize_bio(bio: Option<String>) -> Option<String> {
    bio.map(|b| b.trim().to_string()).filter(|b| !b.is_empty())
}
