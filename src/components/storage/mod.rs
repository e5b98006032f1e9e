//! Key/value storage behind the session and the event cache.
//!
//! Durable storage holds the credential, the user record and the event
//! collection. Transient storage holds the current selection and lives only
//! as long as the process.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::ClientResult;
use async_trait::async_trait;

/// Storage key constants
pub mod keys {
    /// Bearer token (durable)
    pub const TOKEN: &str = "token";
    /// Serialized user record (durable)
    pub const USER: &str = "user";
    /// Serialized event collection (durable)
    pub const EVENTS: &str = "skasc_events";
    /// Serialized current event (transient)
    pub const SELECTED_EVENT: &str = "selectedEvent";
    /// Current event id (transient)
    pub const SELECTED_EVENT_ID: &str = "selectedEventId";
    /// Event type used as the default for new events (transient)
    pub const EVENT_TYPE: &str = "eventType";
}

/// String key/value store with whole-value replace semantics
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; a missing key is `Ok(None)`
    async fn get(&self, key: &str) -> ClientResult<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> ClientResult<()>;

    /// Remove a key; removing a missing key succeeds
    async fn remove(&self, key: &str) -> ClientResult<()>;
}
