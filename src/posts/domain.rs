use serde::Deserialize;

use crate::accounts::ValidationError;

/// Post body that is non-empty once trimmed. Stored as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent(String);

impl PostContent {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let content = raw.into();
        if content.trim().is_empty() {
            return Err(ValidationError::new("Content cannot be empty"));
        }
        Ok(Self(content))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Create-post payload. Only `content` is read; owner fields a client
/// sends (`user`, `owner`, `account_id`) have nowhere to land.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatePostRequest {
    pub content: String,
}
