//! Seed datasets loaded into a store at startup

use crate::core::{Comment, Post, User};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Records a store is populated with before serving requests
///
/// Seed data is trusted: foreign keys and email uniqueness are not checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<User>,

    #[serde(default)]
    pub posts: Vec<Post>,

    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl SeedData {
    /// Load a seed dataset from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load a seed dataset from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let seed: Self = serde_yaml::from_str(yaml)?;
        Ok(seed)
    }

    /// The demo dataset: three users, three posts and four comments
    pub fn demo() -> Self {
        Self {
            users: vec![
                User::new("1", "Andrew", "andrew@example.com", Some(27)),
                User::new("2", "Sarah", "sarahw@example.com", None),
                User::new("3", "Mike", "mike@example.com", None),
            ],
            posts: vec![
                Post::new("1", "Post title 1", "Body of the post 1 lel", true, "1"),
                Post::new("2", "Post title 2", "Body of the post 2", false, "1"),
                Post::new("3", "Post title 3 ", "Body of the post 3", true, "2"),
            ],
            comments: vec![
                Comment::new("1", "Commento 1", "1", "2"),
                Comment::new("2", "Commento 2", "2", "2"),
                Comment::new("3", "Commento 3", "2", "1"),
                Comment::new("4", "Commento 4", "3", "2"),
            ],
        }
    }
}
