//! Configuration and seed loading from files

use graphql_basics::prelude::*;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_from_file() {
    let file = write_temp(
        r#"
bind: 0.0.0.0:9000
graphql_path: /gql
playground: false
cors:
  allowed_origins:
    - https://blog.example.com
"#,
    );

    let config = ServerConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(config.bind, "0.0.0.0:9000");
    assert_eq!(config.graphql_path, "/gql");
    assert!(!config.playground);
    assert_eq!(config.cors.allowed_origins, vec!["https://blog.example.com"]);
    assert!(config.seed_file.is_none());
}

#[test]
fn test_explicit_path_takes_precedence() {
    let file = write_temp("bind: 10.0.0.1:4001\n");

    let config = ServerConfig::load(Some(file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.bind, "10.0.0.1:4001");
}

#[test]
fn test_missing_config_file_is_an_error() {
    assert!(ServerConfig::from_yaml_file("/nonexistent/graphql-basics.yaml").is_err());
}

#[tokio::test]
async fn test_seed_file_populates_the_store() {
    let seed = write_temp(
        r#"
users:
  - id: u1
    name: Grace
    email: grace@example.com
    age: 36
posts:
  - id: p1
    title: Compilers
    body: A talk about compilers
    published: true
    author: u1
comments:
  - id: c1
    text: Great talk
    author: u1
    post: p1
"#,
    );

    let config = ServerConfig {
        seed_file: Some(seed.path().to_str().unwrap().to_string()),
        ..Default::default()
    };
    let host = ServerBuilder::new().with_config(config).build_host().unwrap();

    let data = host
        .executor
        .execute(
            "{ users { name posts { title comments { text author { name } } } } }",
            None,
        )
        .await
        .unwrap();

    assert_eq!(
        data,
        json!({
            "users": [{
                "name": "Grace",
                "posts": [{
                    "title": "Compilers",
                    "comments": [{ "text": "Great talk", "author": { "name": "Grace" } }]
                }]
            }]
        })
    );
}

#[test]
fn test_malformed_seed_file_fails_build() {
    let seed = write_temp("users: not-a-list\n");

    let config = ServerConfig {
        seed_file: Some(seed.path().to_str().unwrap().to_string()),
        ..Default::default()
    };

    assert!(ServerBuilder::new().with_config(config).build_host().is_err());
}
