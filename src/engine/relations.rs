//! One-hop relationship resolution between records
//!
//! Every relationship is derived from a foreign key. A key that points at
//! nothing resolves to `None` (or is simply absent from a list): seed data is
//! trusted and not re-validated on each lookup.

use crate::core::{Comment, EngineResult, EntityStore, Post, User};

/// Resolves relationship fields for a parent record
#[derive(Clone, Copy)]
pub struct RelationshipResolver<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> RelationshipResolver<'a> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    /// `Post.author`
    pub async fn author_of_post(&self, post: &Post) -> EngineResult<Option<User>> {
        self.store.find_user(&post.author).await
    }

    /// `Post.comments`, in insertion order
    pub async fn comments_of_post(&self, post: &Post) -> EngineResult<Vec<Comment>> {
        self.store.comments_by_post(&post.id).await
    }

    /// `User.posts`, in insertion order
    pub async fn posts_of_user(&self, user: &User) -> EngineResult<Vec<Post>> {
        self.store.posts_by_author(&user.id).await
    }

    /// `User.comments`, in insertion order
    pub async fn comments_by_author(&self, user: &User) -> EngineResult<Vec<Comment>> {
        self.store.comments_by_author(&user.id).await
    }

    /// `Comment.author`
    pub async fn author_of_comment(&self, comment: &Comment) -> EngineResult<Option<User>> {
        self.store.find_user(&comment.author).await
    }

    /// `Comment.post`
    pub async fn post_of_comment(&self, comment: &Comment) -> EngineResult<Option<Post>> {
        self.store.find_post(&comment.post).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Entity;
    use crate::storage::{InMemoryEntityStore, SeedData};

    fn ids<T: Entity>(items: &[T]) -> Vec<&str> {
        items.iter().map(|i| i.id()).collect()
    }

    #[tokio::test]
    async fn test_post_relations() {
        let store = InMemoryEntityStore::with_demo_data();
        let relations = RelationshipResolver::new(&store);
        let post = store.find_post("2").await.unwrap().unwrap();

        let author = relations.author_of_post(&post).await.unwrap().unwrap();
        assert_eq!(author.name, "Andrew");

        let comments = relations.comments_of_post(&post).await.unwrap();
        assert_eq!(ids(&comments), vec!["1", "2", "4"]);
    }

    #[tokio::test]
    async fn test_user_relations() {
        let store = InMemoryEntityStore::with_demo_data();
        let relations = RelationshipResolver::new(&store);
        let sarah = store.find_user("2").await.unwrap().unwrap();

        assert_eq!(ids(&relations.posts_of_user(&sarah).await.unwrap()), vec!["3"]);
        assert_eq!(
            ids(&relations.comments_by_author(&sarah).await.unwrap()),
            vec!["2", "3"]
        );
    }

    #[tokio::test]
    async fn test_comment_relations() {
        let store = InMemoryEntityStore::with_demo_data();
        let relations = RelationshipResolver::new(&store);
        let comment = Comment::new("3", "Commento 3", "2", "1");

        let author = relations.author_of_comment(&comment).await.unwrap().unwrap();
        assert_eq!(author.id, "2");

        let post = relations.post_of_comment(&comment).await.unwrap().unwrap();
        assert_eq!(post.title, "Post title 1");
    }

    #[tokio::test]
    async fn test_dangling_keys_resolve_to_nothing() {
        let store = InMemoryEntityStore::from_seed(SeedData {
            users: vec![],
            posts: vec![Post::new("p", "t", "b", true, "ghost")],
            comments: vec![Comment::new("c", "x", "ghost", "missing")],
        });
        let relations = RelationshipResolver::new(&store);

        let post = store.find_post("p").await.unwrap().unwrap();
        assert!(relations.author_of_post(&post).await.unwrap().is_none());

        let comment = Comment::new("c", "x", "ghost", "missing");
        assert!(relations.author_of_comment(&comment).await.unwrap().is_none());
        assert!(relations.post_of_comment(&comment).await.unwrap().is_none());

        let nobody = User::new("nobody", "N", "n@example.com", None);
        assert!(relations.posts_of_user(&nobody).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_creating_a_user_does_not_change_existing_relations() {
        let store = InMemoryEntityStore::with_demo_data();
        let relations = RelationshipResolver::new(&store);
        let posts = store.posts().await.unwrap();

        let before: Vec<_> = futures::future::try_join_all(
            posts.iter().map(|p| relations.author_of_post(p)),
        )
        .await
        .unwrap();

        store
            .add_user(User::new("new", "Ann", "ann@example.com", Some(30)))
            .await
            .unwrap();

        let after: Vec<_> = futures::future::try_join_all(
            posts.iter().map(|p| relations.author_of_post(p)),
        )
        .await
        .unwrap();

        assert_eq!(before, after);
    }
}
