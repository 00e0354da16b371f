//! File-based backend.
//!
//! Tables live as JSON arrays under `<base>/content/`, uploaded images under
//! `<base>/objects/`. Writes go through a temp file and an atomic rename.

use crate::error::{Error, Result};
use crate::storage::traits::{
    ContentStore, ObjectStore, POSTS_TABLE, PostFields, PostRow, STORIES_TABLE, StoreOp,
    StoryFields, StoryRow,
};
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

/// File-based content and object store with atomic writes.
#[derive(Debug)]
pub struct FileBackend {
    base_dir: PathBuf,
    public_base: Option<String>,
    write_lock: Mutex<()>,
}

impl FileBackend {
    /// Create a new file backend.
    ///
    /// Creates the `content` and `objects` directories if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(base_dir.join("content"))?;
        fs::create_dir_all(base_dir.join("objects"))?;
        Ok(Self {
            base_dir,
            public_base: None,
            write_lock: Mutex::new(()),
        })
    }

    /// Serve public URLs from `base` instead of `file://` paths.
    #[must_use]
    pub fn with_public_base(mut self, base: Option<String>) -> Self {
        self.public_base = base
            .map(|b| b.trim_end_matches('/').to_string())
            .filter(|b| !b.is_empty());
        self
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.base_dir.join("content").join(format!("{table}.json"))
    }

    fn objects_dir(&self) -> PathBuf {
        self.base_dir.join("objects")
    }

    fn read_table<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_table<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<()> {
        let path = self.table_path(table);
        write_atomic(&path, serde_json::to_string_pretty(rows)?.as_bytes())
    }

    /// Read, modify and write back one table under the write lock.
    ///
    /// Any failure surfaces as a store error for `op`.
    fn modify_table<T, R>(
        &self,
        op: StoreOp,
        table: &str,
        f: impl FnOnce(&mut Vec<T>) -> Result<R>,
    ) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
    {
        let _guard = self.write_lock.lock().unwrap();
        let result = self.read_table(table).and_then(|mut rows| {
            let out = f(&mut rows)?;
            self.write_table(table, &rows)?;
            Ok(out)
        });
        result.map_err(|e| match e {
            Error::Store { .. } => e,
            other => Error::store(op, other.to_string()),
        })
    }
}

/// Write to a temp file next to `path`, then rename over it.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp = path.with_extension("tmp");
    fs::write(&temp, bytes)?;
    fs::rename(&temp, path)?;
    Ok(())
}

/// Object keys are flat file names inside the bucket directory.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
        return Err(Error::Upload(format!("invalid object key: {key:?}")));
    }
    Ok(())
}

impl ContentStore for FileBackend {
    fn list_posts(&self) -> Result<Vec<PostRow>> {
        let mut rows: Vec<PostRow> = self
            .read_table(POSTS_TABLE)
            .map_err(|e| Error::store(StoreOp::List, e.to_string()))?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn insert_post(&self, fields: &PostFields) -> Result<PostRow> {
        self.modify_table(StoreOp::Insert, POSTS_TABLE, |rows: &mut Vec<PostRow>| {
            let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
            let row = PostRow {
                id,
                title: fields.title.clone(),
                content: fields.content.clone(),
                image_path: fields.image_path.clone(),
                location: Some(fields.location.clone()),
                date: Some(fields.date.clone()),
                user_id: fields.user_id.clone(),
                created_at: Utc::now(),
            };
            rows.push(row.clone());
            Ok(row)
        })
    }

    fn update_post(&self, id: i64, fields: &PostFields) -> Result<PostRow> {
        self.modify_table(StoreOp::Update, POSTS_TABLE, |rows: &mut Vec<PostRow>| {
            let row = rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| Error::store(StoreOp::Update, format!("no post with id {id}")))?;
            row.title.clone_from(&fields.title);
            row.content.clone_from(&fields.content);
            row.image_path.clone_from(&fields.image_path);
            row.location = Some(fields.location.clone());
            row.date = Some(fields.date.clone());
            Ok(row.clone())
        })
    }

    fn delete_post(&self, id: i64) -> Result<()> {
        self.modify_table(StoreOp::Delete, POSTS_TABLE, |rows: &mut Vec<PostRow>| {
            rows.retain(|r| r.id != id);
            Ok(())
        })
    }

    fn list_stories(&self) -> Result<Vec<StoryRow>> {
        let mut rows: Vec<StoryRow> = self
            .read_table(STORIES_TABLE)
            .map_err(|e| Error::store(StoreOp::List, e.to_string()))?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn insert_story(&self, fields: &StoryFields) -> Result<StoryRow> {
        self.modify_table(StoreOp::Insert, STORIES_TABLE, |rows: &mut Vec<StoryRow>| {
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
            rows.push(row.clone());
            Ok(row)
        })
    }

    fn update_story(&self, id: &str, fields: &StoryFields) -> Result<StoryRow> {
        self.modify_table(StoreOp::Update, STORIES_TABLE, |rows: &mut Vec<StoryRow>| {
            let row = rows
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
        })
    }

    fn delete_story(&self, id: &str) -> Result<()> {
        self.modify_table(StoreOp::Delete, STORIES_TABLE, |rows: &mut Vec<StoryRow>| {
            rows.retain(|r| r.id != id);
            Ok(())
        })
    }
}

impl ObjectStore for FileBackend {
    fn upload(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.objects_dir().join(key);

        let _guard = self.write_lock.lock().unwrap();
        if path.exists() {
            return Err(Error::Upload(format!("The resource already exists: {key}")));
        }
        write_atomic(&path, bytes).map_err(|e| Error::Upload(e.to_string()))
    }

    fn public_url(&self, key: &str) -> String {
        match &self.public_base {
            Some(base) => format!("{base}/{key}"),
            None => format!("file://{}/{key}", self.objects_dir().display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_backend() -> (FileBackend, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path().to_path_buf()).unwrap();
        (backend, temp_dir)
    }

    fn post_fields(title: &str) -> PostFields {
        PostFields {
            title: title.to_string(),
            content: "Blue domes".to_string(),
            image_path: "santorini.jpg".to_string(),
            location: "Greece".to_string(),
            date: "March 2024".to_string(),
            user_id: Some("user-1".to_string()),
        }
    }

    #[test]
    fn creates_directories() {
        let (_backend, temp) = create_test_backend();
        assert!(temp.path().join("content").exists());
        assert!(temp.path().join("objects").exists());
    }

    #[test]
    fn list_posts_empty_without_table() {
        let (store, _temp) = create_test_backend();
        assert!(store.list_posts().unwrap().is_empty());
    }

    #[test]
    fn insert_and_list_posts() {
        let (store, _temp) = create_test_backend();
        let row = store.insert_post(&post_fields("Santorini")).unwrap();
        assert_eq!(row.id, 1);

        let rows = store.list_posts().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Santorini");
        assert_eq!(rows[0].user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn rows_survive_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let store = FileBackend::new(temp.path().to_path_buf()).unwrap();
            store.insert_post(&post_fields("Kyoto")).unwrap();
        }
        let store = FileBackend::new(temp.path().to_path_buf()).unwrap();
        assert_eq!(store.list_posts().unwrap()[0].title, "Kyoto");
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let (store, temp) = create_test_backend();
        store.insert_post(&post_fields("Kyoto")).unwrap();
        assert!(temp.path().join("content").join("posts.json").exists());
        assert!(!temp.path().join("content").join("posts.tmp").exists());
    }

    #[test]
    fn update_and_delete_post() {
        let (store, _temp) = create_test_backend();
        let row = store.insert_post(&post_fields("Draft")).unwrap();

        let updated = store.update_post(row.id, &post_fields("Final")).unwrap();
        assert_eq!(updated.title, "Final");

        store.delete_post(row.id).unwrap();
        assert!(store.list_posts().unwrap().is_empty());
    }

    #[test]
    fn ids_continue_after_delete_of_older_rows() {
        let (store, _temp) = create_test_backend();
        let first = store.insert_post(&post_fields("a")).unwrap();
        let second = store.insert_post(&post_fields("b")).unwrap();
        store.delete_post(first.id).unwrap();
        let third = store.insert_post(&post_fields("c")).unwrap();
        assert!(third.id > second.id);
    }

    #[test]
    fn corrupted_table_is_a_list_error() {
        let (store, temp) = create_test_backend();
        fs::write(temp.path().join("content").join("stories.json"), "{ nope").unwrap();
        let err = store.list_stories().unwrap_err();
        assert!(matches!(err, Error::Store { op: StoreOp::List, .. }));
    }

    #[test]
    fn upload_writes_object_and_rejects_duplicate() {
        let (store, temp) = create_test_backend();
        store.upload("a.png", b"png", "image/png").unwrap();
        assert_eq!(fs::read(temp.path().join("objects").join("a.png")).unwrap(), b"png");

        let err = store.upload("a.png", b"other", "image/png").unwrap_err();
        assert!(matches!(err, Error::Upload(_)));
    }

    #[test]
    fn upload_rejects_path_like_keys() {
        let (store, _temp) = create_test_backend();
        assert!(store.upload("../escape.png", b"x", "image/png").is_err());
        assert!(store.upload("", b"x", "image/png").is_err());
    }

    #[test]
    fn public_url_uses_configured_base() {
        let (store, _temp) = create_test_backend();
        let store = store.with_public_base(Some("https://cdn.example.com/images/".to_string()));
        assert_eq!(
            store.public_url("a.png"),
            "https://cdn.example.com/images/a.png"
        );
    }

    #[test]
    fn public_url_defaults_to_file_path() {
        let (store, _temp) = create_test_backend();
        let url = store.public_url("nothing-here.png");
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("/objects/nothing-here.png"));
    }
}
