//! Storage backends for content rows and uploaded images.

pub mod file;
pub mod memory;
pub mod remote;
pub mod traits;

pub use file::FileBackend;
pub use memory::{MemoryBackend, StoreCall};
pub use remote::RemoteBackend;
pub use traits::{
    ContentStore, ObjectStore, POSTS_TABLE, PostFields, PostRow, STORIES_TABLE, StoreOp,
    StoryFields, StoryRow,
};
