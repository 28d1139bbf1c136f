//! Persistent configuration
//!
//! Board-agnostic records stored as postcard binary data.

pub mod storage;

pub use storage::{RecordError, StorageRecord, MAX_RECORD_SIZE};
