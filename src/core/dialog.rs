//! View/edit dialog state machine.
//!
//! `Closed` is both the initial and the terminal state. The draft held by an
//! open dialog is a copy: nothing here touches the committed list.

use crate::core::image::{ImagePreview, LocalImage};
use crate::core::model::Entity;
use crate::error::{Error, Result};

/// Working copy of an entity plus its image preview.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft<E> {
    /// The entity being viewed or edited.
    pub entity: E,

    /// What the image slot shows.
    pub preview: ImagePreview,
}

impl<E: Entity> Draft<E> {
    fn of(entity: &E) -> Self {
        Self {
            preview: ImagePreview::for_url(entity.image_url()),
            entity: entity.clone(),
        }
    }
}

/// Coarse dialog mode, for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    /// Nothing open.
    Closed,
    /// Read-only view.
    Viewing,
    /// Editing a new draft.
    Adding,
    /// Editing an existing entity.
    Editing,
}

/// Dialog state.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog<E> {
    /// No dialog.
    Closed,
    /// Read-only view of an entity.
    Viewing(Draft<E>),
    /// Editing a draft; a sentinel id means "add".
    Editing(Draft<E>),
}

impl<E> Default for Dialog<E> {
    fn default() -> Self {
        Self::Closed
    }
}

impl<E: Entity> Dialog<E> {
    /// Show `entity` read-only.
    pub fn open_view(&mut self, entity: &E) {
        *self = Self::Viewing(Draft::of(entity));
    }

    /// Start a new blank draft.
    pub fn open_add(&mut self) {
        *self = Self::Editing(Draft {
            entity: E::blank(),
            preview: ImagePreview::Placeholder,
        });
    }

    /// Start editing a copy of `entity`.
    pub fn open_edit(&mut self, entity: &E) {
        *self = Self::Editing(Draft::of(entity));
    }

    /// Close and discard any draft.
    pub fn cancel(&mut self) {
        *self = Self::Closed;
    }

    /// Attach a locally chosen image to the draft. Uploading waits for save.
    ///
    /// # Errors
    ///
    /// Returns an error if the dialog is not editing.
    pub fn choose_image(&mut self, image: LocalImage) -> Result<()> {
        let draft = self.editing_mut()?;
        draft.preview = ImagePreview::local(image, E::PREVIEW);
        Ok(())
    }

    /// Change draft fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the dialog is not editing.
    pub fn edit_draft(&mut self, f: impl FnOnce(&mut E)) -> Result<()> {
        f(&mut self.editing_mut()?.entity);
        Ok(())
    }

    /// The open draft, viewing or editing.
    #[must_use]
    pub fn draft(&self) -> Option<&Draft<E>> {
        match self {
            Self::Closed => None,
            Self::Viewing(d) | Self::Editing(d) => Some(d),
        }
    }

    /// The draft being edited, if editing.
    #[must_use]
    pub fn editing(&self) -> Option<&Draft<E>> {
        match self {
            Self::Editing(d) => Some(d),
            _ => None,
        }
    }

    fn editing_mut(&mut self) -> Result<&mut Draft<E>> {
        match self {
            Self::Editing(d) => Ok(d),
            Self::Viewing(_) => Err(Error::InvalidState(
                "dialog is read-only".to_string(),
            )),
            Self::Closed => Err(Error::InvalidState("no dialog is open".to_string())),
        }
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> DialogMode {
        match self {
            Self::Closed => DialogMode::Closed,
            Self::Viewing(_) => DialogMode::Viewing,
            Self::Editing(d) if d.entity.is_new() => DialogMode::Adding,
            Self::Editing(_) => DialogMode::Editing,
        }
    }

    /// Whether any dialog is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Dialog title: "Add Story", "Edit Destination", or the viewed title.
    #[must_use]
    pub fn heading(&self) -> String {
        match self.mode() {
            DialogMode::Closed => String::new(),
            DialogMode::Adding => format!("Add {}", E::KIND),
            DialogMode::Editing => format!("Edit {}", E::KIND),
            DialogMode::Viewing => self
                .draft()
                .map(|d| d.entity.title().to_string())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::image::PLACEHOLDER_IMAGE;
    use crate::core::model::{Destination, Story};

    fn story() -> Story {
        Story {
            id: "42".to_string(),
            title: "Lost in Lisbon".to_string(),
            image: "memory://images/lisbon.jpg".to_string(),
            image_path: "lisbon.jpg".to_string(),
            ..Story::blank()
        }
    }

    #[test]
    fn starts_closed() {
        let dialog: Dialog<Story> = Dialog::default();
        assert_eq!(dialog.mode(), DialogMode::Closed);
        assert!(dialog.draft().is_none());
    }

    #[test]
    fn open_add_uses_sentinel_and_placeholder() {
        let mut dialog: Dialog<Story> = Dialog::default();
        dialog.open_add();
        assert_eq!(dialog.mode(), DialogMode::Adding);
        let draft = dialog.editing().unwrap();
        assert!(draft.entity.is_new());
        assert_eq!(draft.preview.src(), PLACEHOLDER_IMAGE);
        assert_eq!(dialog.heading(), "Add Story");
    }

    #[test]
    fn open_edit_copies_entity_and_preview() {
        let mut dialog = Dialog::default();
        dialog.open_edit(&story());
        assert_eq!(dialog.mode(), DialogMode::Editing);
        assert_eq!(dialog.heading(), "Edit Story");
        assert_eq!(
            dialog.editing().unwrap().preview,
            ImagePreview::Remote("memory://images/lisbon.jpg".to_string())
        );
    }

    #[test]
    fn edits_do_not_touch_source_entity() {
        let original = story();
        let mut dialog = Dialog::default();
        dialog.open_edit(&original);
        dialog.edit_draft(|s: &mut Story| s.title = "Changed".to_string()).unwrap();

        assert_eq!(original.title, "Lost in Lisbon");
        assert_eq!(dialog.editing().unwrap().entity.title, "Changed");
    }

    #[test]
    fn viewing_is_read_only() {
        let mut dialog = Dialog::default();
        dialog.open_view(&story());
        assert_eq!(dialog.heading(), "Lost in Lisbon");
        assert!(dialog.edit_draft(|s: &mut Story| s.title.clear()).is_err());
        assert!(dialog.choose_image(LocalImage::new("a.png", vec![])).is_err());
    }

    #[test]
    fn choose_image_uses_entity_preview_style() {
        let mut destinations: Dialog<Destination> = Dialog::default();
        destinations.open_add();
        destinations
            .choose_image(LocalImage::new("kyoto.png", vec![1, 2]))
            .unwrap();
        assert!(destinations.editing().unwrap().preview.src().starts_with("data:image/png"));

        let mut stories: Dialog<Story> = Dialog::default();
        stories.open_add();
        stories.choose_image(LocalImage::new("a.jpg", vec![1])).unwrap();
        assert!(stories.editing().unwrap().preview.src().starts_with("blob:"));
    }

    #[test]
    fn cancel_discards_draft() {
        let mut dialog: Dialog<Story> = Dialog::default();
        dialog.open_add();
        dialog.cancel();
        assert!(!dialog.is_open());
        assert!(dialog.choose_image(LocalImage::new("a.png", vec![])).is_err());
    }
}
