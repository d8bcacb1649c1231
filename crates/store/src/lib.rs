//! Store access for redmap.
//!
//! This crate defines the [`Store`] trait, the fixed command set the typed
//! mapping consumes, together with two implementations:
//!
//! - [`Client`]: a blocking RESP client for a Redis-compatible server
//! - [`MemoryStore`]: an in-process store with the same command semantics
//!
//! # Example
//!
//! ```rust
//! use redmap_store::{KeyType, MemoryStore, Store};
//!
//! let mut store = MemoryStore::new();
//! store.rpush("tags", "a").unwrap();
//! store.rpush("tags", "b").unwrap();
//!
//! assert_eq!(store.key_type("tags").unwrap(), KeyType::List);
//! assert_eq!(store.lrange("tags", 0, -1).unwrap(), vec!["a", "b"]);
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod store;

pub use client::Client;
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::{KeyType, Store};
