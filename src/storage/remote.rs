//! Hosted backend over HTTP.
//!
//! Rows go through the REST table API (`/rest/v1/<table>`), images through
//! the storage object API (`/storage/v1/object/<bucket>/<key>`).

use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::storage::traits::{
    ContentStore, ObjectStore, POSTS_TABLE, PostFields, PostRow, STORIES_TABLE, StoreOp,
    StoryFields, StoryRow,
};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::RwLock;
use std::time::Duration;

/// Content and object store backed by the hosted service.
#[derive(Debug)]
pub struct RemoteBackend {
    client: Client,
    config: RemoteConfig,
    access_token: RwLock<Option<String>>,
}

impl RemoteBackend {
    /// Create a new remote backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete or the HTTP
    /// client cannot be built.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            access_token: RwLock::new(None),
        })
    }

    /// Use `token` (a signed-in user's access token) for subsequent requests.
    /// `None` falls back to the anon key.
    pub fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().unwrap() = token;
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.config.base_url())
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{key}",
            self.config.base_url(),
            self.config.bucket
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self
            .access_token
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(|| self.config.anon_key.clone());
        builder
            .header("apikey", &self.config.anon_key)
            .header("authorization", format!("Bearer {token}"))
    }

    fn list<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>> {
        tracing::debug!(table, "listing rows");
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let response = send(self.authorized(request), StoreOp::List)?;
        response
            .json()
            .map_err(|e| Error::store(StoreOp::List, e.to_string()))
    }

    fn insert<F: Serialize, T: DeserializeOwned>(&self, table: &str, fields: &F) -> Result<T> {
        tracing::debug!(table, "inserting row");
        let request = self
            .client
            .post(self.table_url(table))
            .header("prefer", "return=representation")
            .json(fields);
        let response = send(self.authorized(request), StoreOp::Insert)?;
        single_row(response, StoreOp::Insert)
    }

    fn update<F: Serialize, T: DeserializeOwned>(&self, table: &str, id: &str, fields: &F) -> Result<T> {
        tracing::debug!(table, id, "updating row");
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("prefer", "return=representation")
            .json(fields);
        let response = send(self.authorized(request), StoreOp::Update)?;
        single_row(response, StoreOp::Update)
    }

    fn delete(&self, table: &str, id: &str) -> Result<()> {
        tracing::debug!(table, id, "deleting row");
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))]);
        send(self.authorized(request), StoreOp::Delete)?;
        Ok(())
    }
}

/// Send a request, turning transport failures and non-2xx statuses into
/// store errors for `op`.
fn send(request: RequestBuilder, op: StoreOp) -> Result<Response> {
    let response = request.send().map_err(|e| failure(op, e.to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(failure(op, error_message(&body).unwrap_or_else(|| status.to_string())))
}

fn failure(op: StoreOp, message: String) -> Error {
    match op {
        StoreOp::Upload => Error::Upload(message),
        _ => Error::store(op, message),
    }
}

/// Pull the human-readable message out of an error body, if there is one.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error_description", "error", "msg"]
        .iter()
        .find_map(|k| value.get(k).and_then(|v| v.as_str()).map(String::from))
}

/// Representation responses are arrays; exactly one row is expected.
fn single_row<T: DeserializeOwned>(response: Response, op: StoreOp) -> Result<T> {
    let mut rows: Vec<T> = response
        .json()
        .map_err(|e| Error::store(op, e.to_string()))?;
    if rows.is_empty() {
        return Err(Error::store(op, "no row returned"));
    }
    Ok(rows.swap_remove(0))
}

impl ContentStore for RemoteBackend {
    fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.list(POSTS_TABLE)
    }

    fn insert_post(&self, fields: &PostFields) -> Result<PostRow> {
        self.insert(POSTS_TABLE, fields)
    }

    fn update_post(&self, id: i64, fields: &PostFields) -> Result<PostRow> {
        self.update(POSTS_TABLE, &id.to_string(), fields)
    }

    fn delete_post(&self, id: i64) -> Result<()> {
        self.delete(POSTS_TABLE, &id.to_string())
    }

    fn list_stories(&self) -> Result<Vec<StoryRow>> {
        self.list(STORIES_TABLE)
    }

    fn insert_story(&self, fields: &StoryFields) -> Result<StoryRow> {
        self.insert(STORIES_TABLE, fields)
    }

    fn update_story(&self, id: &str, fields: &StoryFields) -> Result<StoryRow> {
        self.update(STORIES_TABLE, id, fields)
    }

    fn delete_story(&self, id: &str) -> Result<()> {
        self.delete(STORIES_TABLE, id)
    }
}

impl ObjectStore for RemoteBackend {
    fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        tracing::debug!(key, content_type, size = bytes.len(), "uploading object");
        let request = self
            .client
            .post(self.object_url(key))
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .body(bytes.to_vec());
        send(self.authorized(request), StoreOp::Upload)?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{key}",
            self.config.base_url(),
            self.config.bucket
        )
    }
}
