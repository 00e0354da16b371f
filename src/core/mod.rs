//! Content-management core: entities, dialog, boards, carousel and session.

pub mod board;
pub mod carousel;
pub mod dialog;
pub mod image;
pub mod model;
pub mod notice;
pub mod session;

pub use board::{Affordances, ContentBoard, SaveJob, SaveResult};
pub use carousel::Carousel;
pub use dialog::{Dialog, DialogMode, Draft};
pub use image::{ImagePreview, LocalImage, PLACEHOLDER_IMAGE, PreviewStyle};
pub use model::{Destination, Entity, EntityKind, NEW_DESTINATION_ID, Story};
pub use notice::{Notice, NoticeVariant, Notices};
pub use session::{LOGIN_FAILED_MESSAGE, SessionGate};
