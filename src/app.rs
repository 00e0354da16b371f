//! Wiring from [`Config`] to concrete backends and a mounted session gate.

use crate::auth::{IdentityProvider, LocalIdentity, RemoteIdentity, Session, SessionFile};
use crate::config::{BackendKind, Config};
use crate::core::{Carousel, ContentBoard, Entity, Notices, SessionGate};
use crate::error::Result;
use crate::storage::{ContentStore, FileBackend, ObjectStore, RemoteBackend};
use std::sync::Arc;

/// Backends plus the session gate, ready for boards to use.
pub struct App {
    config: Config,
    content: Arc<dyn ContentStore>,
    objects: Arc<dyn ObjectStore>,
    gate: SessionGate,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("backend", &self.config.backend.kind)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Open the configured backend and restore any saved session.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be created or the
    /// remote settings are incomplete.
    pub fn open(config: Config) -> Result<Self> {
        let session_file = SessionFile::in_dir(&config.storage.path);
        match config.backend.kind {
            BackendKind::File => {
                let backend = Arc::new(
                    FileBackend::new(config.storage.path.clone())?
                        .with_public_base(config.backend.public_base_url.clone()),
                );
                let identity = Arc::new(LocalIdentity::new(config.admin.clone(), session_file));
                Ok(Self::from_parts(config, backend.clone(), backend, identity))
            }
            BackendKind::Remote => {
                let backend = Arc::new(RemoteBackend::new(config.remote.clone())?);
                let identity = Arc::new(RemoteIdentity::new(config.remote.clone(), session_file)?);

                let mut gate = SessionGate::new(identity);
                let tokens = Arc::clone(&backend);
                gate.subscribe(Arc::new(move |session: Option<&Session>| {
                    tokens.set_access_token(session.map(|s| s.access_token.clone()));
                }));
                gate.mount();

                Ok(Self {
                    config,
                    content: backend.clone(),
                    objects: backend,
                    gate,
                })
            }
        }
    }

    /// Assemble from explicit parts and mount the gate.
    #[must_use]
    pub fn from_parts(
        config: Config,
        content: Arc<dyn ContentStore>,
        objects: Arc<dyn ObjectStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let mut gate = SessionGate::new(identity);
        gate.mount();
        Self {
            config,
            content,
            objects,
            gate,
        }
    }

    /// Loaded configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Row store.
    #[must_use]
    pub fn content(&self) -> &dyn ContentStore {
        self.content.as_ref()
    }

    /// Image store.
    #[must_use]
    pub fn objects(&self) -> &dyn ObjectStore {
        self.objects.as_ref()
    }

    /// Session gate.
    #[must_use]
    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    /// Empty board for `E` using the configured notice retention.
    #[must_use]
    pub fn board<E: Entity>(&self) -> ContentBoard<E> {
        ContentBoard::new(Notices::with_capacity(self.config.notices.max_retained))
    }

    /// Board for `E`, loaded from the store.
    ///
    /// # Errors
    ///
    /// Returns the store error if the list cannot be fetched.
    pub fn load_board<E: Entity>(&self) -> Result<ContentBoard<E>> {
        let mut board = self.board();
        board.load(self.content(), self.objects())?;
        Ok(board)
    }

    /// Carousel with the configured period.
    #[must_use]
    pub fn carousel(&self) -> Carousel {
        Carousel::from_config(&self.config.carousel)
    }
}
