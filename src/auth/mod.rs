//! Identity providers.

pub mod local;
pub mod memory;
pub mod persist;
pub mod remote;
pub mod traits;

pub use local::{LocalIdentity, hash_password};
pub use memory::MemoryIdentity;
pub use persist::SessionFile;
pub use remote::RemoteIdentity;
pub use traits::{IdentityProvider, Listeners, Session, SessionListener, SubscriptionId};
