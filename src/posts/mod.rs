pub mod binder;
pub mod domain;
pub mod repository;

pub use binder::{PostError, PostOwnershipBinder};
pub use domain::{CreatePostRequest, PostContent};
pub use repository::{PostStore, SqlitePostStore};
