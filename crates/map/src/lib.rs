//! Typed mapping over a Redis-compatible key-value store.
//!
//! [`TypedMap`] exposes a store as a dictionary whose values are text,
//! integers, lists, sets or string-keyed records of those. Every key and
//! value is validated before the store is touched; each mapping operation
//! then becomes one or more store commands.
//!
//! # Example
//!
//! ```rust,no_run
//! use redmap::{Data, Mapping, StoreConfig, TypedMap, Value};
//!
//! let mut map = TypedMap::open(StoreConfig::default().with_db(1))?;
//! map.set("flags", Data::set([1, 2, 3]))?;
//!
//! if let Value::Collection(flags) = map.get("flags")? {
//!     assert_eq!(flags.len(), 3);
//! }
//! map.delete("flags")?;
//! # Ok::<(), redmap::Error>(())
//! ```

pub mod data;
pub mod error;
pub mod map;
pub mod value;

pub use data::Data;
pub use error::{Error, Result};
pub use map::{Mapping, TypedMap};
pub use value::{Scalar, Value};

pub use redmap_store::{Client, KeyType, MemoryStore, Store, StoreConfig, StoreError};
