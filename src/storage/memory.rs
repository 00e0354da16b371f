//! In-memory backend for testing.
//!
//! Records every call it receives so tests can assert on the exact sequence
//! of adapter interactions, and supports one-shot failure injection per
//! operation.

use crate::error::{Error, Result};
use crate::storage::traits::{
    ContentStore, ObjectStore, POSTS_TABLE, PostFields, PostRow, STORIES_TABLE, StoreOp,
    StoryFields, StoryRow,
};
use chrono::Utc;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Base of the URLs returned by [`MemoryBackend::public_url`].
pub const MEMORY_URL_BASE: &str = "memory://images";

/// One recorded adapter call.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCall {
    /// Operation performed.
    pub op: StoreOp,

    /// Table name, or the bucket for uploads.
    pub target: &'static str,

    /// Row id or object key the call addressed, if any.
    pub key: Option<String>,

    /// Written payload, if any.
    pub payload: Option<Value>,
}

#[derive(Debug, Default)]
struct Tables {
    posts: Vec<PostRow>,
    stories: Vec<StoryRow>,
    next_post_id: i64,
    objects: HashMap<String, StoredObject>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-memory content and object store for testing.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
    calls: Mutex<Vec<StoreCall>>,
    failures: Mutex<HashSet<StoreOp>>,
}

impl MemoryBackend {
    /// Create a new, empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `op` fail. Applies once.
    pub fn fail_next(&self, op: StoreOp) {
        self.failures.lock().unwrap().insert(op);
    }

    /// All calls received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls of one operation kind.
    #[must_use]
    pub fn calls_of(&self, op: StoreOp) -> Vec<StoreCall> {
        self.calls().into_iter().filter(|c| c.op == op).collect()
    }

    /// Forget recorded calls (seeding helpers are not recorded anyway).
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Put a destination row directly, bypassing the call log.
    pub fn seed_post(&self, row: PostRow) {
        let mut tables = self.tables.write().unwrap();
        tables.next_post_id = tables.next_post_id.max(row.id);
        tables.posts.insert(0, row);
    }

    /// Put a story row directly, bypassing the call log.
    pub fn seed_story(&self, row: StoryRow) {
        self.tables.write().unwrap().stories.insert(0, row);
    }

    /// Bytes and content type of an uploaded object.
    #[must_use]
    pub fn object(&self, key: &str) -> Option<(Vec<u8>, String)> {
        let tables = self.tables.read().unwrap();
        tables
            .objects
            .get(key)
            .map(|o| (o.bytes.clone(), o.content_type.clone()))
    }

    /// Number of stored objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.tables.read().unwrap().objects.len()
    }

    fn record(&self, op: StoreOp, target: &'static str, key: Option<String>, payload: Option<Value>) {
        self.calls.lock().unwrap().push(StoreCall {
            op,
            target,
            key,
            payload,
        });
    }

    fn injected_failure(&self, op: StoreOp) -> bool {
        self.failures.lock().unwrap().remove(&op)
    }
}

impl ContentStore for MemoryBackend {
    fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.record(StoreOp::List, POSTS_TABLE, None, None);
        if self.injected_failure(StoreOp::List) {
            return Err(Error::store(StoreOp::List, "injected failure"));
        }
        let mut rows = self.tables.read().unwrap().posts.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn insert_post(&self, fields: &PostFields) -> Result<PostRow> {
        self.record(
            StoreOp::Insert,
            POSTS_TABLE,
            None,
            serde_json::to_value(fields).ok(),
        );
        if self.injected_failure(StoreOp::Insert) {
            return Err(Error::store(StoreOp::Insert, "injected failure"));
        }

        let mut tables = self.tables.write().unwrap();
        tables.next_post_id += 1;
        let row = PostRow {
            id: tables.next_post_id,
            title: fields.title.clone(),
            content: fields.content.clone(),
            image_path: fields.image_path.clone(),
            location: Some(fields.location.clone()),
            date: Some(fields.date.clone()),
            user_id: fields.user_id.clone(),
            created_at: Utc::now(),
        };
        tables.posts.insert(0, row.clone());
        Ok(row)
    }

    fn update_post(&self, id: i64, fields: &PostFields) -> Result<PostRow> {
        self.record(
            StoreOp::Update,
            POSTS_TABLE,
            Some(id.to_string()),
            serde_json::to_value(fields).ok(),
        );
        if self.injected_failure(StoreOp::Update) {
            return Err(Error::store(StoreOp::Update, "injected failure"));
        }

        let mut tables = self.tables.write().unwrap();
        let row = tables
            .posts
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::store(StoreOp::Update, format!("no post with id {id}")))?;
        row.title.clone_from(&fields.title);
        row.content.clone_from(&fields.content);
        row.image_path.clone_from(&fields.image_path);
        row.location = Some(fields.location.clone());
        row.date = Some(fields.date.clone());
        Ok(row.clone())
    }

    fn delete_post(&self, id: i64) -> Result<()> {
        self.record(StoreOp::Delete, POSTS_TABLE, Some(id.to_string()), None);
        if self.injected_failure(StoreOp::Delete) {
            return Err(Error::store(StoreOp::Delete, "injected failure"));
        }
        self.tables.write().unwrap().posts.retain(|r| r.id != id);
        Ok(())
    }

    fn list_stories(&self) -> Result<Vec<StoryRow>> {
        self.record(StoreOp::List, STORIES_TABLE, None, None);
        if self.injected_failure(StoreOp::List) {
            return Err(Error::store(StoreOp::List, "injected failure"));
        }
        let mut rows = self.tables.read().unwrap().stories.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn insert_story(&self, fields: &StoryFields) -> Result<StoryRow> {
        self.record(
            StoreOp::Insert,
            STORIES_TABLE,
            None,
            serde_json::to_value(fields).ok(),
        );
        if self.injected_failure(StoreOp::Insert) {
            return Err(Error::store(StoreOp::Insert, "injected failure"));
        }

        let row = StoryRow {
            id: Uuid::new_v4().to_string(),
            title: fields.title.clone(),
            excerpt: fields.excerpt.clone(),
            image_path: fields.image_path.clone(),
            author: fields.author.clone(),
            read_time: fields.read_time.clone(),
            category: fields.category.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().unwrap().stories.insert(0, row.clone());
        Ok(row)
    }

    fn update_story(&self, id: &str, fields: &StoryFields) -> Result<StoryRow> {
        self.record(
            StoreOp::Update,
            STORIES_TABLE,
            Some(id.to_string()),
            serde_json::to_value(fields).ok(),
        );
        if self.injected_failure(StoreOp::Update) {
            return Err(Error::store(StoreOp::Update, "injected failure"));
        }

        let mut tables = self.tables.write().unwrap();
        let row = tables
            .stories
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::store(StoreOp::Update, format!("no story with id {id}")))?;
        row.title.clone_from(&fields.title);
        row.excerpt.clone_from(&fields.excerpt);
        row.image_path.clone_from(&fields.image_path);
        row.author.clone_from(&fields.author);
        row.read_time.clone_from(&fields.read_time);
        row.category.clone_from(&fields.category);
        Ok(row.clone())
    }

    fn delete_story(&self, id: &str) -> Result<()> {
        self.record(StoreOp::Delete, STORIES_TABLE, Some(id.to_string()), None);
        if self.injected_failure(StoreOp::Delete) {
            return Err(Error::store(StoreOp::Delete, "injected failure"));
        }
        self.tables.write().unwrap().stories.retain(|r| r.id != id);
        Ok(())
    }
}

impl ObjectStore for MemoryBackend {
    fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        self.record(
            StoreOp::Upload,
            "images",
            Some(key.to_string()),
            Some(Value::String(content_type.to_string())),
        );
        if self.injected_failure(StoreOp::Upload) {
            return Err(Error::Upload("injected failure".to_string()));
        }

        let mut tables = self.tables.write().unwrap();
        if tables.objects.contains_key(key) {
            return Err(Error::Upload(format!("The resource already exists: {key}")));
        }
        tables.objects.insert(
            key.to_string(),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{MEMORY_URL_BASE}/{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_fields(title: &str) -> PostFields {
        PostFields {
            title: title.to_string(),
            content: "Sunsets".to_string(),
            image_path: "k.png".to_string(),
            location: "Greece".to_string(),
            date: "March 2024".to_string(),
            user_id: Some("user-1".to_string()),
        }
    }

    fn story_fields(title: &str) -> StoryFields {
        StoryFields {
            title: title.to_string(),
            excerpt: "A walk".to_string(),
            image_path: "s.jpg".to_string(),
            author: "Ana".to_string(),
            read_time: "5 min read".to_string(),
            category: "Hiking".to_string(),
        }
    }

    #[test]
    fn list_posts_empty() {
        let store = MemoryBackend::new();
        assert!(store.list_posts().unwrap().is_empty());
    }

    #[test]
    fn insert_post_assigns_increasing_ids() {
        let store = MemoryBackend::new();
        let a = store.insert_post(&post_fields("A")).unwrap();
        let b = store.insert_post(&post_fields("B")).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn list_posts_newest_first() {
        let store = MemoryBackend::new();
        store.insert_post(&post_fields("old")).unwrap();
        store.insert_post(&post_fields("new")).unwrap();
        let rows = store.list_posts().unwrap();
        assert_eq!(rows[0].title, "new");
        assert_eq!(rows[1].title, "old");
    }

    #[test]
    fn update_missing_post_fails() {
        let store = MemoryBackend::new();
        let err = store.update_post(99, &post_fields("x")).unwrap_err();
        assert!(matches!(err, Error::Store { op: StoreOp::Update, .. }));
    }

    #[test]
    fn update_story_replaces_fields() {
        let store = MemoryBackend::new();
        let row = store.insert_story(&story_fields("first")).unwrap();
        let updated = store.update_story(&row.id, &story_fields("second")).unwrap();
        assert_eq!(updated.id, row.id);
        assert_eq!(updated.title, "second");
        assert_eq!(store.list_stories().unwrap().len(), 1);
    }

    #[test]
    fn delete_story_removes_row() {
        let store = MemoryBackend::new();
        let row = store.insert_story(&story_fields("gone")).unwrap();
        store.delete_story(&row.id).unwrap();
        assert!(store.list_stories().unwrap().is_empty());
    }

    #[test]
    fn upload_rejects_existing_key() {
        let store = MemoryBackend::new();
        store.upload("a.png", b"one", "image/png").unwrap();
        let err = store.upload("a.png", b"two", "image/png").unwrap_err();
        assert!(matches!(err, Error::Upload(_)));
        assert_eq!(store.object("a.png").unwrap().0, b"one");
    }

    #[test]
    fn injected_failure_applies_once() {
        let store = MemoryBackend::new();
        store.fail_next(StoreOp::Insert);
        assert!(store.insert_post(&post_fields("x")).is_err());
        assert!(store.insert_post(&post_fields("x")).is_ok());
    }

    #[test]
    fn records_calls_in_order() {
        let store = MemoryBackend::new();
        store.upload("k.png", b"img", "image/png").unwrap();
        store.insert_post(&post_fields("Kyoto")).unwrap();

        let calls = store.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].op, StoreOp::Upload);
        assert_eq!(calls[0].key.as_deref(), Some("k.png"));
        assert_eq!(calls[1].op, StoreOp::Insert);
        assert_eq!(calls[1].target, POSTS_TABLE);
    }

    #[test]
    fn public_url_is_best_effort() {
        let store = MemoryBackend::new();
        assert_eq!(store.public_url("missing.png"), "memory://images/missing.png");
    }

    #[test]
    fn concurrent_inserts() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryBackend::new());
        let mut handles = vec![];
        for i in 0..8 {
            let store_clone = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for j in 0..10 {
                    store_clone
                        .insert_post(&post_fields(&format!("post-{i}-{j}")))
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        let rows = store.list_posts().unwrap();
        assert_eq!(rows.len(), 80);
        let ids: HashSet<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 80);
    }
}
