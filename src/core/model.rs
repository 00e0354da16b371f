//! Content entities mirrored from the store.
//!
//! Rows are mapped into entities here, at the adapter boundary: public image
//! URLs are resolved and missing optional columns are defaulted, so the rest
//! of the crate only ever sees complete entities.

use crate::core::image::PreviewStyle;
use crate::error::Result;
use crate::storage::{ContentStore, ObjectStore, PostFields, PostRow, StoryFields, StoryRow};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Location shown when a destination row has none.
pub const DEFAULT_LOCATION: &str = "Unknown";

/// Date label shown when a destination row has none.
pub const DEFAULT_DATE: &str = "Recent";

/// Id of a destination draft that has not been saved yet.
pub const NEW_DESTINATION_ID: i64 = 0;

/// Which kind of entity a board manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Carousel destinations (`posts` table).
    Destination,
    /// Grid stories (`stories` table).
    Story,
}

impl EntityKind {
    /// Capitalised singular label for notices.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Destination => "Destination",
            Self::Story => "Story",
        }
    }

    /// Lowercase plural label.
    #[must_use]
    pub fn plural(self) -> &'static str {
        match self {
            Self::Destination => "destinations",
            Self::Story => "stories",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Behaviour shared by destinations and stories so one board can manage either.
pub trait Entity: Clone + fmt::Debug + PartialEq + Send + 'static {
    /// Identifier type.
    type Id: Clone + PartialEq + fmt::Debug + fmt::Display + Send;

    /// Entity kind.
    const KIND: EntityKind;

    /// How a newly chosen local image is previewed.
    const PREVIEW: PreviewStyle;

    /// Whether inserted entities are prepended (otherwise appended).
    const INSERT_AT_FRONT: bool;

    /// Blank draft carrying the sentinel id.
    fn blank() -> Self;

    /// Identifier.
    fn id(&self) -> &Self::Id;

    /// True for drafts that have never been saved.
    fn is_new(&self) -> bool;

    /// Title, for notices and listings.
    fn title(&self) -> &str;

    /// Resolved public image URL (empty if there is no image).
    fn image_url(&self) -> &str;

    /// Storage key of the image.
    fn image_path(&self) -> &str;

    /// Point the entity at a newly uploaded image.
    fn set_image(&mut self, key: String, url: String);

    /// Fetch every entity, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list(store: &dyn ContentStore, objects: &dyn ObjectStore) -> Result<Vec<Self>>;

    /// Insert this draft and return the stored entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    fn insert(
        &self,
        store: &dyn ContentStore,
        objects: &dyn ObjectStore,
        user_id: Option<&str>,
    ) -> Result<Self>;

    /// Update the stored row with this draft's fields and return it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    fn update(&self, store: &dyn ContentStore, objects: &dyn ObjectStore) -> Result<Self>;

    /// Delete the row with `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the delete.
    fn delete(id: &Self::Id, store: &dyn ContentStore) -> Result<()>;
}

/// A featured destination shown in the carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Store-assigned id; [`NEW_DESTINATION_ID`] for unsaved drafts.
    pub id: i64,

    /// Title.
    pub title: String,

    /// Description (the `content` column).
    pub description: String,

    /// Resolved public image URL.
    pub image: String,

    /// Storage key behind `image`.
    pub image_path: String,

    /// Location label.
    pub location: String,

    /// Date label.
    pub date: String,
}

impl Destination {
    /// Map a stored row, resolving the image and defaulting blank labels.
    #[must_use]
    pub fn from_row(row: PostRow, objects: &dyn ObjectStore) -> Self {
        Self {
            id: row.id,
            image: resolve_image(objects, &row.image_path),
            title: row.title,
            description: row.content,
            image_path: row.image_path,
            location: non_blank(row.location, DEFAULT_LOCATION),
            date: non_blank(row.date, DEFAULT_DATE),
        }
    }

    /// Writable columns for this destination.
    #[must_use]
    pub fn fields(&self, user_id: Option<&str>) -> PostFields {
        PostFields {
            title: self.title.clone(),
            content: self.description.clone(),
            image_path: self.image_path.clone(),
            location: self.location.clone(),
            date: self.date.clone(),
            user_id: user_id.map(String::from),
        }
    }
}

/// Public URL for `key`; empty when there is no image, so the placeholder shows.
fn resolve_image(objects: &dyn ObjectStore, key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else {
        objects.public_url(key)
    }
}

fn non_blank(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Entity for Destination {
    type Id = i64;

    const KIND: EntityKind = EntityKind::Destination;
    const PREVIEW: PreviewStyle = PreviewStyle::DataUri;
    const INSERT_AT_FRONT: bool = false;

    fn blank() -> Self {
        Self {
            id: NEW_DESTINATION_ID,
            title: String::new(),
            description: String::new(),
            image: String::new(),
            image_path: String::new(),
            location: String::new(),
            date: String::new(),
        }
    }

    fn id(&self) -> &i64 {
        &self.id
    }

    fn is_new(&self) -> bool {
        self.id == NEW_DESTINATION_ID
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn image_url(&self) -> &str {
        &self.image
    }

    fn image_path(&self) -> &str {
        &self.image_path
    }

    fn set_image(&mut self, key: String, url: String) {
        self.image_path = key;
        self.image = url;
    }

    fn list(store: &dyn ContentStore, objects: &dyn ObjectStore) -> Result<Vec<Self>> {
        Ok(store
            .list_posts()?
            .into_iter()
            .map(|row| Self::from_row(row, objects))
            .collect())
    }

    fn insert(
        &self,
        store: &dyn ContentStore,
        objects: &dyn ObjectStore,
        user_id: Option<&str>,
    ) -> Result<Self> {
        let row = store.insert_post(&self.fields(user_id))?;
        Ok(Self::from_row(row, objects))
    }

    fn update(&self, store: &dyn ContentStore, objects: &dyn ObjectStore) -> Result<Self> {
        let row = store.update_post(self.id, &self.fields(None))?;
        Ok(Self::from_row(row, objects))
    }

    fn delete(id: &i64, store: &dyn ContentStore) -> Result<()> {
        store.delete_post(*id)
    }
}

/// A travel story shown in the stories grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Store-assigned id; empty for unsaved drafts.
    pub id: String,

    /// Title.
    pub title: String,

    /// Teaser text.
    pub excerpt: String,

    /// Storage key of the image.
    pub image_path: String,

    /// Author display name.
    pub author: String,

    /// Read time label.
    pub read_time: String,

    /// Category label.
    pub category: String,

    /// Resolved public image URL.
    pub image: String,
}

impl Story {
    /// Map a stored row, resolving the image URL.
    #[must_use]
    pub fn from_row(row: StoryRow, objects: &dyn ObjectStore) -> Self {
        Self {
            image: resolve_image(objects, &row.image_path),
            id: row.id,
            title: row.title,
            excerpt: row.excerpt,
            image_path: row.image_path,
            author: row.author,
            read_time: row.read_time,
            category: row.category,
        }
    }

    /// Writable columns for this story.
    #[must_use]
    pub fn fields(&self) -> StoryFields {
        StoryFields {
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            image_path: self.image_path.clone(),
            author: self.author.clone(),
            read_time: self.read_time.clone(),
            category: self.category.clone(),
        }
    }
}

impl Entity for Story {
    type Id = String;

    const KIND: EntityKind = EntityKind::Story;
    const PREVIEW: PreviewStyle = PreviewStyle::ObjectUrl;
    const INSERT_AT_FRONT: bool = true;

    fn blank() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            excerpt: String::new(),
            image_path: String::new(),
            author: String::new(),
            read_time: String::new(),
            category: String::new(),
            image: String::new(),
        }
    }

    fn id(&self) -> &String {
        &self.id
    }

    fn is_new(&self) -> bool {
        self.id.trim().is_empty()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn image_url(&self) -> &str {
        &self.image
    }

    fn image_path(&self) -> &str {
        &self.image_path
    }

    fn set_image(&mut self, key: String, url: String) {
        self.image_path = key;
        self.image = url;
    }

    fn list(store: &dyn ContentStore, objects: &dyn ObjectStore) -> Result<Vec<Self>> {
        Ok(store
            .list_stories()?
            .into_iter()
            .map(|row| Self::from_row(row, objects))
            .collect())
    }

    fn insert(
        &self,
        store: &dyn ContentStore,
        objects: &dyn ObjectStore,
        _user_id: Option<&str>,
    ) -> Result<Self> {
        let row = store.insert_story(&self.fields())?;
        Ok(Self::from_row(row, objects))
    }

    fn update(&self, store: &dyn ContentStore, objects: &dyn ObjectStore) -> Result<Self> {
        let row = store.update_story(&self.id, &self.fields())?;
        Ok(Self::from_row(row, objects))
    }

    fn delete(id: &String, store: &dyn ContentStore) -> Result<()> {
        store.delete_story(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use chrono::Utc;

    fn post_row(location: Option<&str>, date: Option<&str>) -> PostRow {
        PostRow {
            id: 3,
            title: "Santorini".to_string(),
            content: "Whitewashed houses".to_string(),
            image_path: "santorini.jpg".to_string(),
            location: location.map(String::from),
            date: date.map(String::from),
            user_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn destination_from_row_resolves_image() {
        let objects = MemoryBackend::new();
        let dest = Destination::from_row(post_row(Some("Greece"), Some("March 2024")), &objects);
        assert_eq!(dest.image, "memory://images/santorini.jpg");
        assert_eq!(dest.image_path, "santorini.jpg");
        assert_eq!(dest.description, "Whitewashed houses");
        assert_eq!(dest.location, "Greece");
    }

    #[test]
    fn destination_from_row_defaults_missing_labels() {
        let objects = MemoryBackend::new();
        let dest = Destination::from_row(post_row(None, Some("")), &objects);
        assert_eq!(dest.location, DEFAULT_LOCATION);
        assert_eq!(dest.date, DEFAULT_DATE);
    }

    #[test]
    fn missing_image_resolves_to_nothing() {
        let objects = MemoryBackend::new();
        let mut row = post_row(None, None);
        row.image_path = String::new();
        assert!(Destination::from_row(row, &objects).image.is_empty());
    }

    #[test]
    fn destination_fields_carry_user_only_when_given() {
        let dest = Destination::blank();
        assert!(dest.fields(None).user_id.is_none());
        assert_eq!(dest.fields(Some("u1")).user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn sentinel_ids() {
        assert!(Destination::blank().is_new());
        assert!(Story::blank().is_new());

        let mut story = Story::blank();
        story.id = "42".to_string();
        assert!(!story.is_new());
    }

    #[test]
    fn story_fields_include_every_column() {
        let story = Story {
            id: "42".to_string(),
            title: "Lost in Lisbon".to_string(),
            excerpt: "Trams".to_string(),
            image_path: "lisbon.jpg".to_string(),
            author: "Ana".to_string(),
            read_time: "4 min read".to_string(),
            category: "City".to_string(),
            image: "memory://images/lisbon.jpg".to_string(),
        };
        let fields = story.fields();
        assert_eq!(fields.title, "Lost in Lisbon");
        assert_eq!(fields.image_path, "lisbon.jpg");
        assert_eq!(fields.category, "City");
    }

    #[test]
    fn kind_labels() {
        assert_eq!(EntityKind::Destination.to_string(), "Destination");
        assert_eq!(EntityKind::Story.plural(), "stories");
    }
}
