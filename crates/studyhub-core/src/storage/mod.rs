//! Durable key-value storage for session state.
//!
//! The session manager persists three string values (`access_token`,
//! `refresh_token` and the serialized `user` record) through the
//! `KeyValueStore` trait. Backends:
//!
//! - `FileStore`: a JSON map in the cache directory
//! - `KeyringStore`: the OS keychain
//! - `MemoryStore`: process-local, used in tests and for `--ephemeral` runs

pub mod file;
pub mod keychain;
pub mod memory;

pub use self::file::FileStore;
pub use self::keychain::KeyringStore;
pub use self::memory::MemoryStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(String),
}

/// A simple key -> string mapping that survives process restarts.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
