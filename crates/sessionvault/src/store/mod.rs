//! Backing store adapters for captured sessions.

pub mod error;
pub mod file;
mod memory;
mod session;

pub use error::{StorageError, StorageResult};
pub use memory::MemorySessionStore;
pub use session::SessionStore;
