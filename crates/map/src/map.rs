//! Mapping operations translated onto store commands.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use redmap_store::{Client, KeyType, Store, StoreConfig};

use crate::data::Data;
use crate::error::{Error, Result};
use crate::value::{Scalar, Value};

const KEY_TYPE: &str = "key needs to be of type str";

/// Dictionary-style access to a key-value store.
///
/// Keys and values are accepted as [`Data`] and validated on every call, so
/// any argument convertible into `Data` can be passed directly.
pub trait Mapping {
    /// Store `value` under `key`, replacing whatever was there.
    fn set(&mut self, key: impl Into<Data>, value: impl Into<Data>) -> Result<()>;

    /// Read the value under `key`.
    fn get(&mut self, key: impl Into<Data>) -> Result<Value>;

    /// Remove `key`. Fails with [`Error::KeyError`] if it is absent.
    fn delete(&mut self, key: impl Into<Data>) -> Result<()>;

    /// Whether `key` is present. A non-text key is an
    /// [`Error::InvalidDataType`], not `false`.
    fn contains(&mut self, key: impl Into<Data>) -> Result<bool>;

    /// All keys, in the order the store reports them.
    fn keys(&mut self) -> Result<Vec<String>>;

    /// Remove every key in the selected database.
    fn clear(&mut self) -> Result<()>;
}

/// A [`Mapping`] backed by a [`Store`].
///
/// Holds no cache: every read queries the store and every write goes
/// straight through. Overwriting a list, set or record deletes the old key
/// first and then repopulates it with one command per element, without
/// atomicity.
///
/// # Examples
///
/// ```
/// use redmap::{Mapping, MemoryStore, Scalar, StoreConfig, TypedMap, Value};
///
/// let mut map = TypedMap::with_store(StoreConfig::default(), MemoryStore::new());
/// map.set("tags", ["a", "b", "c"]).unwrap();
/// map.set("count", 5).unwrap();
///
/// assert_eq!(
///     map.get("tags").unwrap(),
///     Value::Sequence(vec!["a".into(), "b".into(), "c".into()])
/// );
/// assert_eq!(map.get("count").unwrap(), Value::Scalar(Scalar::Text("5".into())));
/// assert_eq!(map.to_string(), "<TypedMap host:'localhost' port:'6379' db:'0'>");
/// ```
#[derive(Debug)]
pub struct TypedMap<S = Client> {
    config: StoreConfig,
    store: S,
}

impl TypedMap<Client> {
    /// Build a mapping over a Redis-compatible server.
    ///
    /// The connection is opened on the first operation, not here.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if `config` does not validate.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let store = Client::new(config.clone())?;
        Ok(Self { config, store })
    }
}

impl<S: Store> TypedMap<S> {
    /// Wrap an existing store handle. `config` is only used for display.
    pub fn with_store(config: StoreConfig, store: S) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Delete `key` if present, so a container write starts from nothing.
    fn clear_key(&mut self, key: &str) -> Result<()> {
        if self.store.exists(key)? {
            log::debug!("overwriting existing key '{key}'");
            self.store.delete(key)?;
        }
        Ok(())
    }

    fn write(&mut self, key: &str, value: Value) -> Result<()> {
        log::trace!("set '{key}' as {}", value.type_name());
        match value {
            Value::Scalar(scalar) => self.store.set(key, &scalar.to_string())?,
            Value::Sequence(items) => {
                self.clear_key(key)?;
                for item in items {
                    self.store.rpush(key, &item.to_string())?;
                }
            }
            Value::Collection(members) => {
                self.clear_key(key)?;
                for member in members {
                    self.store.sadd(key, &member.to_string())?;
                }
            }
            Value::Record(fields) => {
                self.clear_key(key)?;
                if !fields.is_empty() {
                    let fields: Vec<(String, String)> = fields
                        .into_iter()
                        .map(|(field, value)| (field, value.to_string()))
                        .collect();
                    self.store.hmset(key, &fields)?;
                }
            }
        }
        Ok(())
    }

    fn read(&mut self, key: &str) -> Result<Value> {
        if !self.store.exists(key)? {
            return Err(Error::KeyError(key.to_string()));
        }

        match self.store.key_type(key)? {
            KeyType::String => match self.store.get(key)? {
                Some(text) => Ok(Value::Scalar(Scalar::Text(text))),
                None => Err(Error::KeyError(key.to_string())),
            },
            KeyType::List => {
                let items = self.store.lrange(key, 0, -1)?;
                Ok(Value::Sequence(items.into_iter().map(Scalar::Text).collect()))
            }
            KeyType::Set => {
                let members = self.store.smembers(key)?;
                Ok(Value::Collection(
                    members.into_iter().map(Scalar::Text).collect::<BTreeSet<_>>(),
                ))
            }
            KeyType::Hash => {
                let fields = self.store.hgetall(key)?;
                Ok(Value::Record(
                    fields
                        .into_iter()
                        .map(|(field, value)| (field, Scalar::Text(value)))
                        .collect::<BTreeMap<_, _>>(),
                ))
            }
            // Removed between EXISTS and TYPE.
            KeyType::None => Err(Error::KeyError(key.to_string())),
            other => Err(Error::UnsupportedType {
                key: key.to_string(),
                tag: other.to_string(),
            }),
        }
    }
}

impl<S: Store> Mapping for TypedMap<S> {
    fn set(&mut self, key: impl Into<Data>, value: impl Into<Data>) -> Result<()> {
        let key = text_key(key.into())?;
        let value = Value::try_from(value.into())?;
        self.write(&key, value)
    }

    fn get(&mut self, key: impl Into<Data>) -> Result<Value> {
        let key = text_key(key.into())?;
        self.read(&key)
    }

    fn delete(&mut self, key: impl Into<Data>) -> Result<()> {
        let key = text_key(key.into())?;
        self.read(&key)?;
        self.store.delete(&key)?;
        Ok(())
    }

    fn contains(&mut self, key: impl Into<Data>) -> Result<bool> {
        let key = text_key(key.into())?;
        Ok(self.store.exists(&key)?)
    }

    fn keys(&mut self) -> Result<Vec<String>> {
        Ok(self.store.keys()?)
    }

    fn clear(&mut self) -> Result<()> {
        log::debug!("flushing database {}", self.config.db);
        Ok(self.store.flush_db()?)
    }
}

impl<S> fmt::Display for TypedMap<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<TypedMap host:'{}' port:'{}' db:'{}'>",
            self.config.host, self.config.port, self.config.db
        )
    }
}

fn text_key(key: Data) -> Result<String> {
    match key {
        Data::Text(key) => Ok(key),
        other => {
            log::trace!("rejected {} key", other.kind());
            Err(Error::invalid(KEY_TYPE))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redmap_store::{MemoryStore, StoreError};

    fn map() -> TypedMap<MemoryStore> {
        TypedMap::with_store(StoreConfig::default(), MemoryStore::new())
    }

    fn texts(items: &[&str]) -> Vec<Scalar> {
        items.iter().map(|s| Scalar::from(*s)).collect()
    }

    #[test]
    fn test_scalar_integer_reads_back_as_text() {
        let mut map = map();
        map.set("count", 5).unwrap();

        let value = map.get("count").unwrap();
        assert_eq!(value, Value::from("5"));
        let Value::Scalar(scalar) = value else {
            panic!("expected scalar");
        };
        assert_eq!(scalar.as_int(), Some(5));
    }

    #[test]
    fn test_list_overwrites_previous_list() {
        let mut map = map();
        map.set("tags", ["a", "b", "c"]).unwrap();
        map.set("tags", ["z"]).unwrap();

        assert_eq!(map.get("tags").unwrap(), Value::Sequence(texts(&["z"])));
    }

    #[test]
    fn test_set_replaces_other_shape() {
        let mut map = map();
        map.set("k", Data::map([("f", "v")])).unwrap();
        map.set("k", Data::set([1, 2, 3])).unwrap();

        let expected: BTreeSet<Scalar> = texts(&["1", "2", "3"]).into_iter().collect();
        assert_eq!(map.get("k").unwrap(), Value::Collection(expected));
    }

    #[test]
    fn test_record_round_trip() {
        let mut map = map();
        let user = Data::map([("name", Data::from("ada")), ("age", Data::Int(36))]);
        map.set("user", user).unwrap();

        let Value::Record(fields) = map.get("user").unwrap() else {
            panic!("expected record");
        };
        assert_eq!(fields.get("name"), Some(&Scalar::from("ada")));
        assert_eq!(fields.get("age").and_then(Scalar::as_int), Some(36));
    }

    #[test]
    fn test_empty_container_removes_key() {
        let mut map = map();
        map.set("tags", ["a"]).unwrap();
        map.set("tags", Vec::<String>::new()).unwrap();

        assert!(!map.contains("tags").unwrap());
        assert!(matches!(map.get("tags"), Err(Error::KeyError(_))));
    }

    #[test]
    fn test_get_missing_is_key_error() {
        let mut map = map();
        let err = map.get("nope").unwrap_err();
        assert_eq!(err.to_string(), "Key 'nope' does not exist");
    }

    #[test]
    fn test_delete_missing_is_key_error() {
        let mut map = map();
        assert!(matches!(map.delete("nope"), Err(Error::KeyError(_))));
    }

    #[test]
    fn test_delete_removes_key() {
        let mut map = map();
        map.set("k", "v").unwrap();
        assert!(map.contains("k").unwrap());

        map.delete("k").unwrap();
        assert!(!map.contains("k").unwrap());
    }

    #[test]
    fn test_delete_falsy_scalar() {
        let mut map = map();
        map.set("zero", 0).unwrap();
        map.set("empty", "").unwrap();

        map.delete("zero").unwrap();
        map.delete("empty").unwrap();
        assert!(map.keys().unwrap().is_empty());
    }

    #[test]
    fn test_non_text_keys_are_rejected_everywhere() {
        let mut map = map();
        let msg = "key needs to be of type str";

        assert_eq!(map.set(1, "v").unwrap_err().to_string(), msg);
        assert_eq!(map.get(1).unwrap_err().to_string(), msg);
        assert_eq!(map.delete(Data::Null).unwrap_err().to_string(), msg);
        assert_eq!(map.contains(1.5).unwrap_err().to_string(), msg);
    }

    #[test]
    fn test_invalid_value_leaves_existing_key() {
        let mut map = map();
        map.set("k", ["keep"]).unwrap();

        let err = map
            .set("k", Data::List(vec![Data::from(vec![1])]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDataType(_)));
        assert_eq!(map.get("k").unwrap(), Value::Sequence(texts(&["keep"])));
    }

    #[test]
    fn test_clear_empties_keys() {
        let mut map = map();
        map.set("a", 1).unwrap();
        map.set("b", ["x"]).unwrap();

        map.clear().unwrap();
        assert!(map.keys().unwrap().is_empty());
    }

    #[test]
    fn test_display() {
        let map = TypedMap::with_store(StoreConfig::new("cache", 7000, 2), MemoryStore::new());
        assert_eq!(map.to_string(), "<TypedMap host:'cache' port:'7000' db:'2'>");
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let err = TypedMap::open(StoreConfig::default().with_host("")).unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::Config(_))));
    }

    #[test]
    fn test_open_does_not_connect() {
        let map = TypedMap::open(StoreConfig::new("127.0.0.1", 1, 0)).unwrap();
        assert!(!map.store().is_connected());
    }
}
