//! Session identity and durable client storage.
//!
//! A session identifier correlates this client with the conversation memory
//! the chat service keeps server-side. It is generated once per storage
//! location and reused on every later start.
//!
//! # Architecture
//!
//! - [`KeyValueStorage`]: durable string storage keyed by name
//! - [`FileStorage`]: JSON file backed storage
//! - [`MemoryStorage`]: process-local storage
//! - [`SessionManager`]: loads or creates the identifier
//!
//! # Example
//!
//! ```rust
//! use lmchat::session::{MemoryStorage, SessionManager};
//!
//! let storage = MemoryStorage::new();
//! let first = SessionManager::initialize(&storage);
//! let second = SessionManager::initialize(&storage);
//!
//! assert_eq!(first.session_id(), second.session_id());
//! ```

mod manager;
mod storage;

pub use manager::{SESSION_KEY, SessionId, SessionManager};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
