//! Storage trait definitions and the row types that cross the boundary.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the destinations table.
pub const POSTS_TABLE: &str = "posts";

/// Name of the stories table.
pub const STORIES_TABLE: &str = "stories";

/// Operation against a backend, used for error reporting and call logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOp {
    /// Select all rows of a table.
    List,
    /// Insert a row.
    Insert,
    /// Update a row by id.
    Update,
    /// Delete a row by id.
    Delete,
    /// Upload an object.
    Upload,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::List => "List",
            Self::Insert => "Insert",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Upload => "Upload",
        };
        f.write_str(name)
    }
}

/// Relational store holding the `posts` (destinations) and `stories` tables.
///
/// Every `list_*` method returns rows ordered by `created_at` descending.
pub trait ContentStore: Send + Sync {
    /// Select every destination row, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn list_posts(&self) -> Result<Vec<PostRow>>;

    /// Insert a destination row and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn insert_post(&self, fields: &PostFields) -> Result<PostRow>;

    /// Update a destination row by id and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row does not exist or the write fails.
    fn update_post(&self, id: i64, fields: &PostFields) -> Result<PostRow>;

    /// Delete a destination row by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    fn delete_post(&self, id: i64) -> Result<()>;

    /// Select every story row, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn list_stories(&self) -> Result<Vec<StoryRow>>;

    /// Insert a story row and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn insert_story(&self, fields: &StoryFields) -> Result<StoryRow>;

    /// Update a story row by id and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row does not exist or the write fails.
    fn update_story(&self, id: &str, fields: &StoryFields) -> Result<StoryRow>;

    /// Delete a story row by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the delete.
    fn delete_story(&self, id: &str) -> Result<()>;
}

/// Object storage for uploaded images.
pub trait ObjectStore: Send + Sync {
    /// Upload bytes under `key`. Upserts are disabled: an existing key is an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Upload`] if the object cannot be stored.
    fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;

    /// Resolve a key to a fetchable URL. Never fails, even for unknown keys.
    fn public_url(&self, key: &str) -> String;
}

/// A stored destination row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRow {
    /// Store-assigned identifier.
    pub id: i64,

    /// Destination title.
    #[serde(default)]
    pub title: String,

    /// Destination description.
    #[serde(default)]
    pub content: String,

    /// Storage key of the image.
    #[serde(default)]
    pub image_path: String,

    /// Free-text location; may be missing on older rows.
    #[serde(default)]
    pub location: Option<String>,

    /// Free-text date label; may be missing on older rows.
    #[serde(default)]
    pub date: Option<String>,

    /// Author of the row.
    #[serde(default)]
    pub user_id: Option<String>,

    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

/// Writable destination columns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PostFields {
    /// Destination title.
    pub title: String,
    /// Destination description.
    pub content: String,
    /// Storage key of the image.
    pub image_path: String,
    /// Free-text location.
    pub location: String,
    /// Free-text date label.
    pub date: String,
    /// Author, sent on insert only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// A stored story row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRow {
    /// Store-assigned identifier.
    pub id: String,

    /// Story title.
    #[serde(default)]
    pub title: String,

    /// Short teaser shown in the grid.
    #[serde(default)]
    pub excerpt: String,

    /// Storage key of the image.
    #[serde(default)]
    pub image_path: String,

    /// Author display name.
    #[serde(default)]
    pub author: String,

    /// Read time label (e.g. "5 min read").
    #[serde(default)]
    pub read_time: String,

    /// Category label.
    #[serde(default)]
    pub category: String,

    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

/// Writable story columns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryFields {
    /// Story title.
    pub title: String,
    /// Short teaser.
    pub excerpt: String,
    /// Storage key of the image.
    pub image_path: String,
    /// Author display name.
    pub author: String,
    /// Read time label.
    pub read_time: String,
    /// Category label.
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_row_tolerates_missing_optional_columns() {
        let json = r#"{"id": 7, "title": "Santorini", "created_at": "2024-03-01T10:00:00Z"}"#;
        let row: PostRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.id, 7);
        assert!(row.location.is_none());
        assert!(row.date.is_none());
        assert_eq!(row.image_path, "");
    }

    #[test]
    fn post_fields_skip_missing_user() {
        let fields = PostFields {
            title: "Kyoto".to_string(),
            content: String::new(),
            image_path: "a.png".to_string(),
            location: "Japan".to_string(),
            date: "April 2024".to_string(),
            user_id: None,
        };
        let json = serde_json::to_string(&fields).unwrap();
        assert!(!json.contains("user_id"));
    }

    #[test]
    fn store_op_display() {
        assert_eq!(StoreOp::Insert.to_string(), "Insert");
        assert_eq!(
            serde_json::to_string(&StoreOp::Upload).unwrap(),
            r#""upload""#
        );
    }
}
