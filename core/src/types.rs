//! Domain DTOs for the blog API.
//!
//! # Design
//! Response entities (`Post`, `Comment`, `User`) wrap the JSON object the
//! server sent and nothing else. The client never checks their shape: a
//! `null`, a missing `content` or an unknown key all survive a
//! decode/encode cycle unchanged. Accessors expose the fields the UI reads
//! and return `None` when the server left them out or typed them
//! differently.
//!
//! Request payloads (`NewPost`, `CommentInput`, `NewUser`, `Credentials`)
//! are built by callers, so they name their fields and carry anything else
//! in a flattened `extra` map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn u64_field(fields: &Map<String, Value>, key: &str) -> Option<u64> {
    fields.get(key).and_then(Value::as_u64)
}

fn str_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

/// A blog post returned by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Post {
    fields: Map<String, Value>,
}

impl Post {
    pub fn id(&self) -> Option<u64> {
        u64_field(&self.fields, "id")
    }

    pub fn title(&self) -> Option<&str> {
        str_field(&self.fields, "title")
    }

    pub fn content(&self) -> Option<&str> {
        str_field(&self.fields, "content")
    }

    pub fn user_id(&self) -> Option<u64> {
        u64_field(&self.fields, "user_id")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for Post {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Request payload for creating a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            extra: Map::new(),
        }
    }
}

/// A comment attached to a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Comment {
    fields: Map<String, Value>,
}

impl Comment {
    pub fn id(&self) -> Option<u64> {
        u64_field(&self.fields, "id")
    }

    pub fn post_id(&self) -> Option<u64> {
        u64_field(&self.fields, "post_id")
    }

    /// Comment text. Backends name it `content` or `body`.
    pub fn content(&self) -> Option<&str> {
        str_field(&self.fields, "content").or_else(|| str_field(&self.fields, "body"))
    }

    pub fn user_id(&self) -> Option<u64> {
        u64_field(&self.fields, "user_id")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for Comment {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Request payload for adding or editing a comment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentInput {
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CommentInput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            extra: Map::new(),
        }
    }
}

/// A registered user as listed by the admin endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct User {
    fields: Map<String, Value>,
}

impl User {
    pub fn id(&self) -> Option<u64> {
        u64_field(&self.fields, "id")
    }

    pub fn name(&self) -> Option<&str> {
        str_field(&self.fields, "name")
    }

    pub fn email(&self) -> Option<&str> {
        str_field(&self.fields, "email")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for User {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Request payload for registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_confirmation: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            password_confirmation: None,
            extra: Map::new(),
        }
    }
}

/// Login payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}
