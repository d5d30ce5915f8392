//! In-memory implementation of EntityStore

use crate::core::{Comment, EngineError, EngineResult, EntityStore, Post, User};
use crate::storage::seed::SeedData;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Record collections plus the secondary indices kept next to them
///
/// Every index stores positions into the collections, pushed in insertion
/// order, so indexed lookups return records in the same order as a scan.
#[derive(Default)]
struct Collections {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,

    user_by_id: HashMap<String, usize>,
    post_by_id: HashMap<String, usize>,
    emails: HashSet<String>,

    posts_by_author: HashMap<String, Vec<usize>>,
    comments_by_post: HashMap<String, Vec<usize>>,
    comments_by_author: HashMap<String, Vec<usize>>,
}

impl Collections {
    fn from_seed(seed: SeedData) -> Self {
        let mut collections = Self::default();

        for user in seed.users {
            collections.push_user(user);
        }

        for (index, post) in seed.posts.iter().enumerate() {
            collections
                .post_by_id
                .entry(post.id.clone())
                .or_insert(index);
            collections
                .posts_by_author
                .entry(post.author.clone())
                .or_default()
                .push(index);
        }
        collections.posts = seed.posts;

        for (index, comment) in seed.comments.iter().enumerate() {
            collections
                .comments_by_post
                .entry(comment.post.clone())
                .or_default()
                .push(index);
            collections
                .comments_by_author
                .entry(comment.author.clone())
                .or_default()
                .push(index);
        }
        collections.comments = seed.comments;

        collections
    }

    fn push_user(&mut self, user: User) {
        let index = self.users.len();
        // First record wins on a duplicated seed id, as a linear scan would
        self.user_by_id.entry(user.id.clone()).or_insert(index);
        self.emails.insert(user.email.clone());
        self.users.push(user);
    }

    fn select<T: Clone>(items: &[T], positions: Option<&Vec<usize>>) -> Vec<T> {
        positions
            .map(|p| p.iter().map(|&i| items[i].clone()).collect())
            .unwrap_or_default()
    }
}

/// In-memory entity store
///
/// Cheap to clone; clones share the same collections. Uses RwLock for
/// thread-safe access: reads share the lock, `add_user` holds it exclusively
/// across the uniqueness check and the insert.
#[derive(Clone)]
pub struct InMemoryEntityStore {
    inner: Arc<RwLock<Collections>>,
}

impl InMemoryEntityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::from_seed(SeedData::default())
    }

    /// Create a store populated with the given records
    pub fn from_seed(seed: SeedData) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Collections::from_seed(seed))),
        }
    }

    /// Create a store populated with the demo dataset
    pub fn with_demo_data() -> Self {
        Self::from_seed(SeedData::demo())
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, Collections>> {
        self.inner
            .read()
            .map_err(|e| EngineError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, Collections>> {
        self.inner
            .write()
            .map_err(|e| EngineError::storage(format!("Failed to acquire write lock: {}", e)))
    }
}

impl Default for InMemoryEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn users(&self) -> EngineResult<Vec<User>> {
        Ok(self.read()?.users.clone())
    }

    async fn posts(&self) -> EngineResult<Vec<Post>> {
        Ok(self.read()?.posts.clone())
    }

    async fn comments(&self) -> EngineResult<Vec<Comment>> {
        Ok(self.read()?.comments.clone())
    }

    async fn add_user(&self, user: User) -> EngineResult<User> {
        let mut collections = self.write()?;

        if collections.emails.contains(&user.email) {
            return Err(EngineError::DuplicateEmail { email: user.email });
        }
        if collections.user_by_id.contains_key(&user.id) {
            return Err(EngineError::DuplicateId { id: user.id });
        }

        collections.push_user(user.clone());

        Ok(user)
    }

    async fn find_user(&self, id: &str) -> EngineResult<Option<User>> {
        let collections = self.read()?;
        Ok(collections
            .user_by_id
            .get(id)
            .map(|&i| collections.users[i].clone()))
    }

    async fn find_post(&self, id: &str) -> EngineResult<Option<Post>> {
        let collections = self.read()?;
        Ok(collections
            .post_by_id
            .get(id)
            .map(|&i| collections.posts[i].clone()))
    }

    async fn posts_by_author(&self, user_id: &str) -> EngineResult<Vec<Post>> {
        let collections = self.read()?;
        Ok(Collections::select(
            &collections.posts,
            collections.posts_by_author.get(user_id),
        ))
    }

    async fn comments_by_post(&self, post_id: &str) -> EngineResult<Vec<Comment>> {
        let collections = self.read()?;
        Ok(Collections::select(
            &collections.comments,
            collections.comments_by_post.get(post_id),
        ))
    }

    async fn comments_by_author(&self, user_id: &str) -> EngineResult<Vec<Comment>> {
        let collections = self.read()?;
        Ok(Collections::select(
            &collections.comments,
            collections.comments_by_author.get(user_id),
        ))
    }

    async fn user_count(&self) -> EngineResult<usize> {
        Ok(self.read()?.users.len())
    }
}
