//! The store command set.

use std::fmt;

use crate::error::StoreResult;

/// Value type stored at a key, as reported by `TYPE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyType {
    String,
    List,
    Set,
    Hash,
    ZSet,
    Stream,
    /// The key does not exist.
    None,
    /// Any tag this crate does not know about (module types, future types).
    Other(String),
}

impl KeyType {
    /// Parse a `TYPE` reply.
    ///
    /// # Examples
    ///
    /// ```
    /// use redmap_store::KeyType;
    ///
    /// assert_eq!(KeyType::parse("hash"), KeyType::Hash);
    /// assert_eq!(KeyType::parse("ReJSON-RL"), KeyType::Other("ReJSON-RL".to_string()));
    /// ```
    pub fn parse(tag: &str) -> Self {
        match tag {
            "string" => KeyType::String,
            "list" => KeyType::List,
            "set" => KeyType::Set,
            "hash" => KeyType::Hash,
            "zset" => KeyType::ZSet,
            "stream" => KeyType::Stream,
            "none" => KeyType::None,
            other => KeyType::Other(other.to_string()),
        }
    }

    /// The tag as the server spells it.
    pub fn as_str(&self) -> &str {
        match self {
            KeyType::String => "string",
            KeyType::List => "list",
            KeyType::Set => "set",
            KeyType::Hash => "hash",
            KeyType::ZSet => "zset",
            KeyType::Stream => "stream",
            KeyType::None => "none",
            KeyType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The commands a typed mapping needs from a key-value store.
///
/// Each method is one round trip with Redis semantics. Receivers are
/// `&mut self`: a store handle serves one caller at a time, and callers that
/// share one across threads must wrap it in their own lock.
pub trait Store {
    /// `SET key value`
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// `GET key`; `None` when the key is absent.
    fn get(&mut self, key: &str) -> StoreResult<Option<String>>;

    /// `TYPE key`
    fn key_type(&mut self, key: &str) -> StoreResult<KeyType>;

    /// `EXISTS key`
    fn exists(&mut self, key: &str) -> StoreResult<bool>;

    /// `DEL key`; true if a key was removed.
    fn delete(&mut self, key: &str) -> StoreResult<bool>;

    /// `KEYS *`, in whatever order the store returns.
    fn keys(&mut self) -> StoreResult<Vec<String>>;

    /// `FLUSHDB`
    fn flush_db(&mut self) -> StoreResult<()>;

    /// `RPUSH key element`; returns the list length after the push.
    fn rpush(&mut self, key: &str, element: &str) -> StoreResult<usize>;

    /// `SADD key member`; true if the member was not already present.
    fn sadd(&mut self, key: &str, member: &str) -> StoreResult<bool>;

    /// `HMSET key field value [field value ...]`
    ///
    /// `fields` must not be empty.
    fn hmset(&mut self, key: &str, fields: &[(String, String)]) -> StoreResult<()>;

    /// `LRANGE key start stop` with Redis index rules (negative counts from
    /// the end, `stop` inclusive).
    fn lrange(&mut self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>>;

    /// `SMEMBERS key`
    fn smembers(&mut self, key: &str) -> StoreResult<Vec<String>>;

    /// `HGETALL key` as field/value pairs.
    fn hgetall(&mut self, key: &str) -> StoreResult<Vec<(String, String)>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        for (tag, expected) in [
            ("string", KeyType::String),
            ("list", KeyType::List),
            ("set", KeyType::Set),
            ("hash", KeyType::Hash),
            ("zset", KeyType::ZSet),
            ("stream", KeyType::Stream),
            ("none", KeyType::None),
        ] {
            assert_eq!(KeyType::parse(tag), expected);
            assert_eq!(expected.as_str(), tag);
        }
    }

    #[test]
    fn test_parse_unknown_tag_keeps_text() {
        let parsed = KeyType::parse("vectorset");
        assert_eq!(parsed, KeyType::Other("vectorset".to_string()));
        assert_eq!(parsed.to_string(), "vectorset");
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(KeyType::parse("LIST"), KeyType::Other("LIST".to_string()));
    }
}
