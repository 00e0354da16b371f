//! Content board: the committed list of one entity kind plus the dialog,
//! pending delete and notices that act on it.
//!
//! Only the save and delete success paths mutate the committed list. Every
//! mutation is gated on the session: without admin the store is never called.
//!
//! Saving is split so the network part can run elsewhere:
//!
//! ```text
//! begin_save(gate) -> SaveJob --run(store, objects)--> SaveResult -> finish_save
//! ```

use crate::core::dialog::{Dialog, Draft};
use crate::core::image::LocalImage;
use crate::core::model::Entity;
use crate::core::notice::{Notice, Notices};
use crate::core::session::SessionGate;
use crate::error::{Error, Result};
use crate::storage::{ContentStore, ObjectStore, StoreOp};
use std::collections::HashSet;

/// Single-flight key used for drafts without an id.
const NEW_ENTITY_KEY: &str = "new";

/// Which controls to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Affordances {
    /// "Add" button.
    pub add: bool,
    /// Per-entity "Edit" button.
    pub edit: bool,
    /// Per-entity "Delete" button.
    pub delete: bool,
}

/// The network part of a save, detached from the board.
#[derive(Debug, Clone)]
pub struct SaveJob<E: Entity> {
    key: String,
    generation: u64,
    draft: E,
    upload: Option<LocalImage>,
    user_id: Option<String>,
}

impl<E: Entity> SaveJob<E> {
    /// Single-flight key of the entity being saved.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Upload a pending image, then insert or update the row.
    ///
    /// A failed upload aborts before any row call.
    #[must_use]
    pub fn run(self, store: &dyn ContentStore, objects: &dyn ObjectStore) -> SaveResult<E> {
        let inserted = self.draft.is_new();
        let outcome = self.persist(store, objects, inserted);
        SaveResult {
            key: self.key,
            generation: self.generation,
            inserted,
            outcome,
        }
    }

    fn persist(&self, store: &dyn ContentStore, objects: &dyn ObjectStore, inserted: bool) -> Result<E> {
        let mut draft = self.draft.clone();
        if let Some(image) = &self.upload {
            let key = image.storage_key();
            objects
                .upload(&key, &image.bytes, &image.content_type)
                .map_err(|e| match e {
                    Error::Upload(_) => e,
                    other => Error::Upload(other.to_string()),
                })?;
            tracing::debug!(key = %key, "uploaded image");
            let url = objects.public_url(&key);
            draft.set_image(key, url);
        }

        if inserted {
            draft.insert(store, objects, self.user_id.as_deref())
        } else {
            draft.update(store, objects)
        }
    }
}

/// Outcome of [`SaveJob::run`], to be handed back to [`ContentBoard::finish_save`].
#[derive(Debug)]
pub struct SaveResult<E: Entity> {
    key: String,
    generation: u64,
    inserted: bool,
    outcome: Result<E>,
}

impl<E: Entity> SaveResult<E> {
    /// Whether the row was inserted rather than updated.
    #[must_use]
    pub fn inserted(&self) -> bool {
        self.inserted
    }
}

/// Committed list plus dialog state for one entity kind.
#[derive(Debug)]
pub struct ContentBoard<E: Entity> {
    items: Vec<E>,
    dialog: Dialog<E>,
    generation: u64,
    notices: Notices,
    pending_delete: Option<E::Id>,
    in_flight: HashSet<String>,
    mounted: bool,
}

impl<E: Entity> Default for ContentBoard<E> {
    fn default() -> Self {
        Self::new(Notices::default())
    }
}

impl<E: Entity> ContentBoard<E> {
    /// Create an empty board.
    #[must_use]
    pub fn new(notices: Notices) -> Self {
        Self {
            items: Vec::new(),
            dialog: Dialog::default(),
            generation: 0,
            notices,
            pending_delete: None,
            in_flight: HashSet::new(),
            mounted: true,
        }
    }

    /// Committed entities, in display order.
    #[must_use]
    pub fn items(&self) -> &[E] {
        &self.items
    }

    /// Look up a committed entity.
    #[must_use]
    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.items.iter().find(|e| e.id() == id)
    }

    /// Dialog state.
    #[must_use]
    pub fn dialog(&self) -> &Dialog<E> {
        &self.dialog
    }

    /// Queued notices.
    #[must_use]
    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    /// Take the queued notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Id awaiting delete confirmation.
    #[must_use]
    pub fn pending_delete(&self) -> Option<&E::Id> {
        self.pending_delete.as_ref()
    }

    /// Whether a save for the draft keyed `key` is running.
    #[must_use]
    pub fn is_saving(&self, key: &str) -> bool {
        self.in_flight.contains(key)
    }

    /// Controls to show for the current session.
    #[must_use]
    pub fn affordances(&self, gate: &SessionGate) -> Affordances {
        let admin = gate.is_admin();
        Affordances {
            add: admin,
            edit: admin,
            delete: admin,
        }
    }

    /// Replace the committed list with the store's contents.
    ///
    /// On failure the list is left as it was and a notice is raised.
    ///
    /// # Errors
    ///
    /// Returns the store error.
    pub fn load(&mut self, store: &dyn ContentStore, objects: &dyn ObjectStore) -> Result<()> {
        match E::list(store, objects) {
            Ok(items) => {
                tracing::debug!(kind = %E::KIND, count = items.len(), "loaded");
                self.items = items;
                Ok(())
            }
            Err(e) => {
                self.notices.push(Notice::failure(
                    &format!("Failed to load {}", E::KIND.plural()),
                    e.to_string(),
                ));
                Err(e)
            }
        }
    }

    /// Show `entity` read-only. Needs no session.
    pub fn open_view(&mut self, entity: &E) {
        self.dialog.open_view(entity);
    }

    /// Start a blank draft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAdmin`] without a session.
    pub fn open_add(&mut self, gate: &SessionGate) -> Result<()> {
        require_admin(gate)?;
        self.generation += 1;
        self.dialog.open_add();
        Ok(())
    }

    /// Start editing a committed entity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAdmin`] without a session, or
    /// [`Error::NotFound`] if `id` is not in the list.
    pub fn open_edit(&mut self, gate: &SessionGate, id: &E::Id) -> Result<()> {
        require_admin(gate)?;
        let entity = self
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("{} {id}", E::KIND)))?;
        self.generation += 1;
        self.dialog.open_edit(&entity);
        Ok(())
    }

    /// Attach a local image to the draft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAdmin`] without a session, or an invalid-state
    /// error when not editing.
    pub fn choose_image(&mut self, gate: &SessionGate, image: LocalImage) -> Result<()> {
        require_admin(gate)?;
        self.dialog.choose_image(image)
    }

    /// Change draft fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAdmin`] without a session, or an invalid-state
    /// error when not editing.
    pub fn edit_draft(&mut self, gate: &SessionGate, f: impl FnOnce(&mut E)) -> Result<()> {
        require_admin(gate)?;
        self.dialog.edit_draft(f)
    }

    /// Close the dialog, discarding the draft.
    pub fn cancel(&mut self) {
        self.dialog.cancel();
    }

    /// Snapshot the draft for saving and mark it in flight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAdmin`] without a session, an invalid-state error
    /// when not editing, or [`Error::SaveInFlight`] while a save for the
    /// same entity is running.
    pub fn begin_save(&mut self, gate: &SessionGate) -> Result<SaveJob<E>> {
        if !gate.is_admin() {
            self.notices.push(Notice::failure(
                "Authentication Error",
                format!("Please log in to save {}", E::KIND.plural()),
            ));
            return Err(Error::NotAdmin);
        }
        if !self.mounted {
            return Err(Error::InvalidState("board has been torn down".to_string()));
        }
        let Draft { entity, preview } = self
            .dialog
            .editing()
            .ok_or_else(|| Error::InvalidState("no draft is being edited".to_string()))?;

        let key = draft_key(entity);
        if !self.in_flight.insert(key.clone()) {
            return Err(Error::SaveInFlight(format!("{} {key}", E::KIND)));
        }

        Ok(SaveJob {
            key,
            generation: self.generation,
            draft: entity.clone(),
            upload: preview.pending_upload().cloned(),
            user_id: gate.user_id(),
        })
    }

    /// Apply a finished save.
    ///
    /// On success the list is patched and the dialog closed, unless it has
    /// been reopened since the save began; on failure the dialog stays open
    /// and a notice names what failed. Results arriving
    /// after [`teardown`](Self::teardown) change nothing.
    ///
    /// # Errors
    ///
    /// Returns the save's error.
    pub fn finish_save(&mut self, result: SaveResult<E>) -> Result<E> {
        let SaveResult {
            key,
            generation,
            inserted,
            outcome,
        } = result;
        self.in_flight.remove(&key);

        if !self.mounted {
            tracing::debug!(kind = %E::KIND, key = %key, "discarding save result after teardown");
            return outcome;
        }

        let saved = match outcome {
            Ok(saved) => saved,
            Err(e) => {
                self.notices.push(save_failure_notice(&e));
                return Err(e);
            }
        };

        if inserted {
            if E::INSERT_AT_FRONT {
                self.items.insert(0, saved.clone());
            } else {
                self.items.push(saved.clone());
            }
        } else {
            for item in self.items.iter_mut().filter(|i| i.id() == saved.id()) {
                item.clone_from(&saved);
            }
        }

        if generation == self.generation && self.dialog.editing().is_some() {
            self.dialog.cancel();
        }

        tracing::info!(kind = %E::KIND, id = %saved.id(), inserted, "saved");
        self.notices.push(Notice::info(
            "Success!",
            format!("{} saved successfully", E::KIND),
        ));
        Ok(saved)
    }

    /// Run a whole save in place.
    ///
    /// # Errors
    ///
    /// Returns any error from [`begin_save`](Self::begin_save) or the save
    /// itself.
    pub fn save(
        &mut self,
        gate: &SessionGate,
        store: &dyn ContentStore,
        objects: &dyn ObjectStore,
    ) -> Result<E> {
        let job = self.begin_save(gate)?;
        let result = job.run(store, objects);
        self.finish_save(result)
    }

    /// Ask for confirmation before deleting `id`. Nothing is deleted yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAdmin`] without a session, or
    /// [`Error::NotFound`] if `id` is not in the list.
    pub fn request_delete(&mut self, gate: &SessionGate, id: &E::Id) -> Result<()> {
        require_admin(gate)?;
        if self.get(id).is_none() {
            return Err(Error::NotFound(format!("{} {id}", E::KIND)));
        }
        self.pending_delete = Some(id.clone());
        Ok(())
    }

    /// Drop the pending delete without touching the store.
    pub fn decline_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the pending id and remove it from the list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAdmin`] without a session, an invalid-state error
    /// if nothing is pending, or the store error (the list is unchanged).
    pub fn confirm_delete(&mut self, gate: &SessionGate, store: &dyn ContentStore) -> Result<()> {
        require_admin(gate)?;
        let id = self
            .pending_delete
            .take()
            .ok_or_else(|| Error::InvalidState("no delete is pending".to_string()))?;

        if let Err(e) = E::delete(&id, store) {
            let title = match e {
                Error::Store { op: StoreOp::Delete, .. } => "Delete Failed",
                _ => "Error",
            };
            self.notices.push(Notice::failure(title, e.to_string()));
            return Err(e);
        }

        self.items.retain(|item| item.id() != &id);
        tracing::info!(kind = %E::KIND, id = %id, "deleted");
        self.notices.push(Notice::info(
            "Deleted",
            format!("{} deleted successfully", E::KIND),
        ));
        Ok(())
    }

    /// Stop applying results; close the dialog.
    pub fn teardown(&mut self) {
        self.mounted = false;
        self.pending_delete = None;
        self.dialog.cancel();
    }

    /// Whether the board still applies results.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

fn require_admin(gate: &SessionGate) -> Result<()> {
    if gate.is_admin() {
        Ok(())
    } else {
        Err(Error::NotAdmin)
    }
}

fn draft_key<E: Entity>(entity: &E) -> String {
    if entity.is_new() {
        NEW_ENTITY_KEY.to_string()
    } else {
        entity.id().to_string()
    }
}

fn save_failure_notice(error: &Error) -> Notice {
    let title = match error {
        Error::Upload(_) => "Upload Failed",
        Error::Store { op: StoreOp::Insert, .. } => "Insert Failed",
        Error::Store { op: StoreOp::Update, .. } => "Update Failed",
        _ => "Error",
    };
    Notice::failure(title, error.to_string())
}
