//! Entity records exposed by the graph
//!
//! Records are plain data. Relationships between them are never stored as
//! nested values: a `Post` only carries the id of its author, and the
//! relationship resolver follows that foreign key on demand.

use serde::{Deserialize, Serialize};

/// Base trait for the three record types of the graph.
pub trait Entity: Clone + Send + Sync + 'static {
    /// GraphQL object type name (e.g., "User")
    const TYPE_NAME: &'static str;

    /// Unique identifier of this record
    fn id(&self) -> &str;
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub age: Option<i32>,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        age: Option<i32>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            age,
        }
    }
}

impl Entity for User {
    const TYPE_NAME: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A blog post written by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub body: String,
    pub published: bool,
    /// Foreign key to `User::id`
    pub author: String,
}

impl Post {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        published: bool,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            published,
            author: author.into(),
        }
    }
}

impl Entity for Post {
    const TYPE_NAME: &'static str = "Post";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A comment left by a user on a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    /// Foreign key to `User::id`
    pub author: String,
    /// Foreign key to `Post::id`
    pub post: String,
}

impl Comment {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        author: impl Into<String>,
        post: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            author: author.into(),
            post: post.into(),
        }
    }
}

impl Entity for Comment {
    const TYPE_NAME: &'static str = "Comment";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Any record of the graph, used as the parent of a nested selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    User(User),
    Post(Post),
    Comment(Comment),
}

impl Node {
    /// GraphQL object type name of the wrapped record
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::User(_) => User::TYPE_NAME,
            Node::Post(_) => Post::TYPE_NAME,
            Node::Comment(_) => Comment::TYPE_NAME,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Node::User(user) => user.id(),
            Node::Post(post) => post.id(),
            Node::Comment(comment) => comment.id(),
        }
    }
}

impl From<User> for Node {
    fn from(user: User) -> Self {
        Node::User(user)
    }
}

impl From<Post> for Node {
    fn from(post: Post) -> Self {
        Node::Post(post)
    }
}

impl From<Comment> for Node {
    fn from(comment: Comment) -> Self {
        Node::Comment(comment)
    }
}
