//! File-based storage implementations.
//!
//! The whole session universe is kept in a single JSON document. Readers
//! only ever see a fully written file: writers are expected to replace it
//! atomically (temp file + rename).

mod session;

pub use session::FileSessionStore;
