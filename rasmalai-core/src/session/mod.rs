//! Conversation data model and history persistence
//!
//! History is kept as a single JSON document in one storage slot and is
//! rewritten in full after every change.

pub mod storage;
pub mod store;

pub use storage::{FileHistoryStore, HistoryStore, MemoryHistoryStore};
pub use store::{History, Message, Sender, Session};
