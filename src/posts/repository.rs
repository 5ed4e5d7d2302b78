// Post Store - posts are always read joined with their owner's projection
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::models::{AccountId, OwnerProfile, Post};
use crate::db::StoreError;
use crate::posts::domain::PostContent;
use crate::state::DbPool;

const POST_SELECT: &str = "SELECT p.id, p.content, p.created_at, p.updated_at,
        a.id, a.email, a.name, a.bio, a.created_at
     FROM posts p
     JOIN accounts a ON a.id = p.account_id";

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create(&self, content: &PostContent, owner: AccountId) -> Result<Post, StoreError>;

    /// Every post, newest first
    async fn list_all(&self) -> Result<Vec<Post>, StoreError>;

    /// Posts owned by `owner`, newest first
    async fn list_by_owner(&self, owner: AccountId) -> Result<Vec<Post>, StoreError>;
}

#[derive(Clone)]
pub struct SqlitePostStore {
    pool: DbPool,
}

impl SqlitePostStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn query(
        &self,
        clause: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Post>, StoreError> {
        let conn = self.pool.get()?;
        let sql = format!("{} {}", POST_SELECT, clause);
        let mut stmt = conn.prepare(&sql)?;
        let posts = stmt
            .query_map(params, post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        content: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
        owner: OwnerProfile {
            id: AccountId(row.get(4)?),
            email: row.get(5)?,
            name: row.get(6)?,
            bio: row.get(7)?,
            created_at: row.get(8)?,
        },
    })
}

#[async_trait]
impl PostStore for SqlitePostStore {
    async fn create(&self, content: &PostContent, owner: AccountId) -> Result<Post, StoreError> {
        let post_id = {
            let conn = self.pool.get()?;
            let now = Utc::now();
            conn.execute(
                "INSERT INTO posts (account_id, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)",
                params![owner.0, content.as_str(), now],
            )?;
            conn.last_insert_rowid()
        };

        self.query("WHERE p.id = ?1", &[&post_id])?
            .pop()
            .ok_or_else(|| StoreError::NotFound(format!("post {}", post_id)))
    }

    async fn list_all(&self) -> Result<Vec<Post>, StoreError> {
        self.query("ORDER BY p.created_at DESC, p.id DESC", &[])
    }

    async fn list_by_owner(&self, owner: AccountId) -> Result<Vec<Post>, StoreError> {
        self.query(
            "WHERE p.account_id = ?1 ORDER BY p.created_at DESC, p.id DESC",
            &[&owner.0],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert_account(pool: &DbPool, handle: &str) -> AccountId {
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO accounts (handle, email, name, bio, password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, NULL, 'secret-hash', ?4, ?4)",
            params![handle, format!("{handle}@example.com"), handle, Utc::now()],
        )
        .unwrap();
        AccountId(conn.last_insert_rowid())
    }

    #[tokio::test]
    async fn test_create_returns_owner_projection() {
        let (pool, _temp) = crate::db::test_pool();
        let bob = insert_account(&pool, "bob");
        let store = SqlitePostStore::new(pool);

        let post = store
            .create(&PostContent::parse("hello").unwrap(), bob)
            .await
            .unwrap();
        assert_eq!(post.content, "hello");
        assert_eq!(post.owner.id, bob);
        assert_eq!(post.owner.email, "bob@example.com");
    }

    #[tokio::test]
    async fn test_list_all_is_newest_first() {
        let (pool, _temp) = crate::db::test_pool();
        let bob = insert_account(&pool, "bob");
        let store = SqlitePostStore::new(pool);

        for body in ["first", "second", "third"] {
            store
                .create(&PostContent::parse(body).unwrap(), bob)
                .await
                .unwrap();
        }

        let contents: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.content)
            .collect();
        assert_eq!(contents, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_list_by_owner_filters() {
        let (pool, _temp) = crate::db::test_pool();
        let bob = insert_account(&pool, "bob");
        let alice = insert_account(&pool, "alice");
        let store = SqlitePostStore::new(pool);

        store
            .create(&PostContent::parse("from bob").unwrap(), bob)
            .await
            .unwrap();
        store
            .create(&PostContent::parse("from alice").unwrap(), alice)
            .await
            .unwrap();

        let bobs = store.list_by_owner(bob).await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].content, "from bob");
        assert!(store.list_by_owner(AccountId(999)).await.unwrap().is_empty());
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_owner_is_rejected() {
        let (pool, _temp) = crate::db::test_pool();
        let store = SqlitePostStore::new(pool);
        let result = store
            .create(&PostContent::parse("orphan").unwrap(), AccountId(999))
            .await;
        assert!(result.is_err());
    }
}
