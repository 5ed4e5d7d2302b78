use thiserror::Error;

use crate::accounts::ValidationError;
use crate::auth::AuthenticatedAccount;
use crate::db::models::{AccountId, Post};
use crate::db::StoreError;
use crate::posts::domain::{CreatePostRequest, PostContent};
use crate::posts::repository::PostStore;

#[derive(Debug, Error)]
pub enum PostError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Binds new posts to the authenticated caller and serves the read paths.
pub struct PostOwnershipBinder<S> {
    store: S,
}

impl<S: PostStore> PostOwnershipBinder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The owner is always `caller`; the payload has no way to name one.
    pub async fn create_post(
        &self,
        caller: &AuthenticatedAccount,
        request: CreatePostRequest,
    ) -> Result<Post, PostError> {
        let content = PostContent::parse(request.content)?;
        let post = self.store.create(&content, caller.id()).await?;
        tracing::info!(post_id = post.id, account_id = %caller.id(), "Created post");
        Ok(post)
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, PostError> {
        Ok(self.store.list_all().await?)
    }

    pub async fn list_posts_by_account(&self, id: AccountId) -> Result<Vec<Post>, PostError> {
        Ok(self.store.list_by_owner(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthGate;
    use crate::db;
    use crate::posts::repository::SqlitePostStore;
    use crate::state::DbPool;
    use rusqlite::params;

    /// Insert an account and authorize it through a real session.
    fn caller(pool: &DbPool, handle: &str) -> AuthenticatedAccount {
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO accounts (handle, email, name, password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?1, 'hash', ?3, ?3)",
            params![handle, format!("{handle}@example.com"), chrono::Utc::now()],
        )
        .unwrap();
        let account_id = AccountId(conn.last_insert_rowid());
        drop(conn);

        let token = crate::auth::session::create_session(pool, account_id, 1).unwrap();
        AuthGate::new(pool.clone(), 1)
            .authorize(Some(&token))
            .unwrap()
    }

    fn post_request(content: &str) -> CreatePostRequest {
        CreatePostRequest {
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn test_post_is_owned_by_caller() {
        let (pool, _temp) = db::test_pool();
        let bob = caller(&pool, "bob");
        let _alice = caller(&pool, "alice");
        let binder = PostOwnershipBinder::new(SqlitePostStore::new(pool));

        // An owner field in the raw payload is discarded during deserialization
        let request: CreatePostRequest =
            serde_json::from_str(r#"{"content":"hello","user":2,"owner":2}"#).unwrap();
        let post = binder.create_post(&bob, request).await.unwrap();

        assert_eq!(post.owner.id, bob.id());
        assert_eq!(post.owner.email, "bob@example.com");
    }

    #[tokio::test]
    async fn test_empty_content_is_rejected() {
        let (pool, _temp) = db::test_pool();
        let bob = caller(&pool, "bob");
        let binder = PostOwnershipBinder::new(SqlitePostStore::new(pool));

        for content in ["", "   \n"] {
            let err = binder
                .create_post(&bob, post_request(content))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Content cannot be empty");
        }
        assert!(binder.list_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_created_post_visible_in_both_lists() {
        let (pool, _temp) = db::test_pool();
        let bob = caller(&pool, "bob");
        let alice = caller(&pool, "alice");
        let binder = PostOwnershipBinder::new(SqlitePostStore::new(pool));

        let post = binder
            .create_post(&bob, post_request("hello"))
            .await
            .unwrap();

        let all = binder.list_posts().await.unwrap();
        assert_eq!(all, vec![post.clone()]);

        let by_bob = binder.list_posts_by_account(bob.id()).await.unwrap();
        assert_eq!(by_bob, vec![post]);

        assert!(binder
            .list_posts_by_account(alice.id())
            .await
            .unwrap()
            .is_empty());
    }
}
