//! Chat state management for counselor
//!
//! This crate provides the session list, the per-session reply queue, the
//! root coordinator that front ends drive, the message exchange with the
//! remote collaborator, and the profile and theme stores.

pub mod coordinator;
pub mod exchange;
pub mod pending;
pub mod sessions;
pub mod store;

pub use coordinator::{Coordinator, Submitted};
pub use exchange::{ChatBackend, MessageExchange};
pub use pending::{Dispatch, PendingReplies};
pub use sessions::SessionList;
pub use store::{KeyValueStore, MemoryStore, ProfileStore, StoreError, ThemeStore};
