//! Store trait for the entity graph
//!
//! The store owns every record for the lifetime of the process. Readers get
//! cloned snapshots in insertion order; the only write path is [`EntityStore::add_user`].

use crate::core::entity::{Comment, Post, User};
use crate::core::error::EngineResult;
use async_trait::async_trait;

/// Storage backend for users, posts and comments
///
/// The relationship lookups have default implementations that scan the full
/// collections. Backends holding secondary indices should override them; the
/// results must stay in insertion order.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// All users, in insertion order
    async fn users(&self) -> EngineResult<Vec<User>>;

    /// All posts, in insertion order
    async fn posts(&self) -> EngineResult<Vec<Post>>;

    /// All comments, in insertion order
    async fn comments(&self) -> EngineResult<Vec<Comment>>;

    /// Append a user
    ///
    /// The uniqueness checks on `id` and `email` and the insert itself must
    /// happen atomically. Fails with `DuplicateEmail` or `DuplicateId` and
    /// leaves the store untouched in that case.
    async fn add_user(&self, user: User) -> EngineResult<User>;

    /// Find a user by identifier
    async fn find_user(&self, id: &str) -> EngineResult<Option<User>> {
        Ok(self.users().await?.into_iter().find(|u| u.id == id))
    }

    /// Find a post by identifier
    async fn find_post(&self, id: &str) -> EngineResult<Option<Post>> {
        Ok(self.posts().await?.into_iter().find(|p| p.id == id))
    }

    /// Posts whose `author` is `user_id`
    async fn posts_by_author(&self, user_id: &str) -> EngineResult<Vec<Post>> {
        Ok(self
            .posts()
            .await?
            .into_iter()
            .filter(|p| p.author == user_id)
            .collect())
    }

    /// Comments whose `post` is `post_id`
    async fn comments_by_post(&self, post_id: &str) -> EngineResult<Vec<Comment>> {
        Ok(self
            .comments()
            .await?
            .into_iter()
            .filter(|c| c.post == post_id)
            .collect())
    }

    /// Comments whose `author` is `user_id`
    async fn comments_by_author(&self, user_id: &str) -> EngineResult<Vec<Comment>> {
        Ok(self
            .comments()
            .await?
            .into_iter()
            .filter(|c| c.author == user_id)
            .collect())
    }

    /// Number of stored users
    async fn user_count(&self) -> EngineResult<usize> {
        Ok(self.users().await?.len())
    }
}
