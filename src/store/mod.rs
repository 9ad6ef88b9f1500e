//! Persistence backends: the on-device key-value store, the per-user remote
//! store, and the authentication session every remote call depends on.

pub mod auth;
pub mod local;
pub mod memory;
pub mod remote;

pub use auth::{AuthEvent, AuthSession};
pub use local::{LocalStore, SqliteLocalStore};
pub use memory::{MemoryLocalStore, MemoryRemoteStore};
pub use remote::{RemoteStore, SqliteRemoteStore};
