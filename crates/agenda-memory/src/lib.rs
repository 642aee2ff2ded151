//! # agenda-memory
//!
//! SQLite-backed persistence: the task store and the durable per-user
//! conversation state store.

mod store;

pub use store::Store;
