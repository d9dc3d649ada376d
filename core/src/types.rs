//! Domain DTOs for the posts API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! The wire name of the author field is `userId`; in Rust it is `author_id`.
//! Integration tests catch any schema drift between the two crates.

use serde::{Deserialize, Serialize};

/// A single post as stored remotely and held in the local collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub author_id: u64,
}

/// A post without an id: the payload of a create request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub author_id: u64,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>, author_id: u64) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            author_id,
        }
    }

    pub fn with_id(self, id: u64) -> Post {
        Post {
            id,
            title: self.title,
            body: self.body,
            author_id: self.author_id,
        }
    }
}

impl From<Post> for PostDraft {
    fn from(post: Post) -> Self {
        Self {
            title: post.title,
            body: post.body,
            author_id: post.author_id,
        }
    }
}
