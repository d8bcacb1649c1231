//! In-process store with Redis command semantics
//!
//! `MemoryStore` keeps one logical database in a `HashMap` and implements
//! [`Store`] directly. With the `server` feature it can also answer decoded
//! wire commands through `MemoryStore::apply`, the reply a Redis server would
//! send.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use bytes::Bytes;
#[cfg(feature = "server")]
use redmap_protocol::{Command, RespValue};

use crate::error::{StoreError, StoreResult};
use crate::store::{KeyType, Store};

/// Error text Redis uses when a command meets a key of another type.
pub const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    String(Bytes),
    List(Vec<Bytes>),
    Set(BTreeSet<Bytes>),
    Hash(BTreeMap<Bytes, Bytes>),
}

impl Entry {
    fn type_name(&self) -> &'static str {
        match self {
            Entry::String(_) => "string",
            Entry::List(_) => "list",
            Entry::Set(_) => "set",
            Entry::Hash(_) => "hash",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WrongType;

impl From<WrongType> for StoreError {
    fn from(_: WrongType) -> Self {
        StoreError::Server(WRONGTYPE.to_string())
    }
}

/// A single in-memory database.
///
/// # Examples
///
/// ```
/// use redmap_store::{KeyType, MemoryStore, Store};
///
/// let mut store = MemoryStore::new();
/// store.hmset("user", &[("name".into(), "ada".into())]).unwrap();
///
/// assert_eq!(store.key_type("user").unwrap(), KeyType::Hash);
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<Bytes, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn type_name(&self, key: &[u8]) -> &'static str {
        self.entries.get(key).map_or("none", Entry::type_name)
    }

    fn set_string(&mut self, key: Bytes, value: Bytes) {
        self.entries.insert(key, Entry::String(value));
    }

    fn get_string(&self, key: &[u8]) -> Result<Option<Bytes>, WrongType> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Entry::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(WrongType),
        }
    }

    fn push(&mut self, key: Bytes, element: Bytes) -> Result<usize, WrongType> {
        match self.entries.entry(key).or_insert_with(|| Entry::List(Vec::new())) {
            Entry::List(items) => {
                items.push(element);
                Ok(items.len())
            }
            _ => Err(WrongType),
        }
    }

    fn add_member(&mut self, key: Bytes, member: Bytes) -> Result<bool, WrongType> {
        match self
            .entries
            .entry(key)
            .or_insert_with(|| Entry::Set(BTreeSet::new()))
        {
            Entry::Set(members) => Ok(members.insert(member)),
            _ => Err(WrongType),
        }
    }

    fn set_fields(&mut self, key: Bytes, fields: Vec<(Bytes, Bytes)>) -> Result<(), WrongType> {
        match self
            .entries
            .entry(key)
            .or_insert_with(|| Entry::Hash(BTreeMap::new()))
        {
            Entry::Hash(hash) => {
                hash.extend(fields);
                Ok(())
            }
            _ => Err(WrongType),
        }
    }

    fn range(&self, key: &[u8], start: i64, stop: i64) -> Result<Vec<Bytes>, WrongType> {
        match self.entries.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::List(items)) => Ok(match list_bounds(items.len(), start, stop) {
                Some((from, to)) => items[from..=to].to_vec(),
                None => Vec::new(),
            }),
            Some(_) => Err(WrongType),
        }
    }

    fn members(&self, key: &[u8]) -> Result<Vec<Bytes>, WrongType> {
        match self.entries.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Set(members)) => Ok(members.iter().cloned().collect()),
            Some(_) => Err(WrongType),
        }
    }

    fn fields(&self, key: &[u8]) -> Result<Vec<(Bytes, Bytes)>, WrongType> {
        match self.entries.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Hash(hash)) => Ok(hash
                .iter()
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect()),
            Some(_) => Err(WrongType),
        }
    }
}

#[cfg(feature = "server")]
impl MemoryStore {
    /// Execute `command` and return the RESP reply.
    ///
    /// Failures are reported as error replies, never as a Rust error, so the
    /// result can be written straight back to a client. `SELECT` is answered
    /// with an error: choosing a database is up to whoever owns several
    /// `MemoryStore`s.
    ///
    /// ```
    /// use bytes::Bytes;
    /// use redmap_protocol::{Command, RespValue};
    /// use redmap_store::MemoryStore;
    ///
    /// let mut store = MemoryStore::new();
    /// let reply = store.apply(Command::Set {
    ///     key: Bytes::from("foo"),
    ///     value: Bytes::from("bar"),
    /// });
    /// assert_eq!(reply, RespValue::status("OK"));
    /// ```
    pub fn apply(&mut self, command: Command) -> RespValue {
        match command {
            Command::Ping => RespValue::status("PONG"),
            Command::Select { .. } => {
                RespValue::error("ERR SELECT is not supported by a single database")
            }
            Command::Set { key, value } => {
                self.set_string(key, value);
                RespValue::status("OK")
            }
            Command::Get { key } => match self.get_string(&key) {
                Ok(value) => RespValue::BulkString(value),
                Err(WrongType) => RespValue::error(WRONGTYPE),
            },
            Command::Type { key } => RespValue::status(self.type_name(&key)),
            Command::Exists { key } => RespValue::Integer(self.entries.contains_key(&key) as i64),
            Command::Del { key } => RespValue::Integer(self.entries.remove(&key).is_some() as i64),
            Command::Keys { pattern } => RespValue::Array(Some(
                self.entries
                    .keys()
                    .filter(|key| glob_match(&pattern, key))
                    .cloned()
                    .map(RespValue::bulk)
                    .collect(),
            )),
            Command::FlushDb => {
                self.entries.clear();
                RespValue::status("OK")
            }
            Command::RPush { key, element } => match self.push(key, element) {
                Ok(len) => RespValue::Integer(len as i64),
                Err(WrongType) => RespValue::error(WRONGTYPE),
            },
            Command::SAdd { key, member } => match self.add_member(key, member) {
                Ok(added) => RespValue::Integer(added as i64),
                Err(WrongType) => RespValue::error(WRONGTYPE),
            },
            Command::HMSet { key, fields } => match self.set_fields(key, fields) {
                Ok(()) => RespValue::status("OK"),
                Err(WrongType) => RespValue::error(WRONGTYPE),
            },
            Command::LRange { key, start, stop } => match self.range(&key, start, stop) {
                Ok(items) => bulk_array(items),
                Err(WrongType) => RespValue::error(WRONGTYPE),
            },
            Command::SMembers { key } => match self.members(&key) {
                Ok(items) => bulk_array(items),
                Err(WrongType) => RespValue::error(WRONGTYPE),
            },
            Command::HGetAll { key } => match self.fields(&key) {
                Ok(pairs) => bulk_array(
                    pairs
                        .into_iter()
                        .flat_map(|(field, value)| [field, value]),
                ),
                Err(WrongType) => RespValue::error(WRONGTYPE),
            },
        }
    }
}

impl Store for MemoryStore {
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.set_string(arg(key), arg(value));
        Ok(())
    }

    fn get(&mut self, key: &str) -> StoreResult<Option<String>> {
        self.get_string(key.as_bytes())?
            .map(|value| text(&value))
            .transpose()
    }

    fn key_type(&mut self, key: &str) -> StoreResult<KeyType> {
        Ok(KeyType::parse(self.type_name(key.as_bytes())))
    }

    fn exists(&mut self, key: &str) -> StoreResult<bool> {
        Ok(self.entries.contains_key(key.as_bytes()))
    }

    fn delete(&mut self, key: &str) -> StoreResult<bool> {
        Ok(self.entries.remove(key.as_bytes()).is_some())
    }

    fn keys(&mut self) -> StoreResult<Vec<String>> {
        self.entries.keys().map(|key| text(key)).collect()
    }

    fn flush_db(&mut self) -> StoreResult<()> {
        self.entries.clear();
        Ok(())
    }

    fn rpush(&mut self, key: &str, element: &str) -> StoreResult<usize> {
        Ok(self.push(arg(key), arg(element))?)
    }

    fn sadd(&mut self, key: &str, member: &str) -> StoreResult<bool> {
        Ok(self.add_member(arg(key), arg(member))?)
    }

    fn hmset(&mut self, key: &str, fields: &[(String, String)]) -> StoreResult<()> {
        if fields.is_empty() {
            return Err(StoreError::Server(
                "ERR wrong number of arguments for 'hmset' command".to_string(),
            ));
        }
        let fields = fields
            .iter()
            .map(|(field, value)| (arg(field), arg(value)))
            .collect();
        Ok(self.set_fields(arg(key), fields)?)
    }

    fn lrange(&mut self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>> {
        self.range(key.as_bytes(), start, stop)?
            .iter()
            .map(|item| text(item))
            .collect()
    }

    fn smembers(&mut self, key: &str) -> StoreResult<Vec<String>> {
        self.members(key.as_bytes())?
            .iter()
            .map(|item| text(item))
            .collect()
    }

    fn hgetall(&mut self, key: &str) -> StoreResult<Vec<(String, String)>> {
        self.fields(key.as_bytes())?
            .iter()
            .map(|(field, value)| Ok((text(field)?, text(value)?)))
            .collect()
    }
}

fn arg(text: &str) -> Bytes {
    Bytes::copy_from_slice(text.as_bytes())
}

fn text(bytes: &[u8]) -> StoreResult<String> {
    Ok(std::str::from_utf8(bytes)?.to_owned())
}

#[cfg(feature = "server")]
fn bulk_array(items: impl IntoIterator<Item = Bytes>) -> RespValue {
    RespValue::Array(Some(items.into_iter().map(RespValue::bulk).collect()))
}

/// Resolve Redis `LRANGE` indices against a list of `len` items.
///
/// Negative indices count from the end, out-of-range indices are clamped and
/// `stop` is inclusive. Returns `None` when the range selects nothing.
fn list_bounds(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = i64::try_from(len).ok()?;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };

    if start > stop || start >= len {
        return None;
    }
    Some((usize::try_from(start).ok()?, usize::try_from(stop).ok()?))
}

#[cfg(feature = "server")]
/// Glob matching for `KEYS`: `*` matches any run, `?` one byte, `\` escapes.
fn glob_match(pattern: &[u8], input: &[u8]) -> bool {
    match pattern.split_first() {
        None => input.is_empty(),
        Some((b'*', rest)) => (0..=input.len()).any(|skip| glob_match(rest, &input[skip..])),
        Some((b'?', rest)) => !input.is_empty() && glob_match(rest, &input[1..]),
        Some((b'\\', [literal, rest @ ..])) => {
            input.first() == Some(literal) && glob_match(rest, &input[1..])
        }
        Some((literal, rest)) => input.first() == Some(literal) && glob_match(rest, &input[1..]),
    }
}
