//! Common test utilities for mapping tests.
//!
//! `RecordingStore` wraps a `MemoryStore` and logs every command it receives
//! in wire form (`RPUSH tags a`), so tests can assert the exact command
//! sequence a mapping operation produces. It can also be told to misreport a
//! key's type or existence, or to fail a given command.

#![allow(dead_code)]

use redmap::{KeyType, MemoryStore, Store, StoreError};
use redmap_store::StoreResult;

#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    calls: Vec<String>,
    type_override: Option<KeyType>,
    exists_override: Option<bool>,
    fail_on: Option<&'static str>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `key_type` as `tag` for every key.
    pub fn with_type(mut self, tag: KeyType) -> Self {
        self.type_override = Some(tag);
        self
    }

    /// Report `exists` as `answer` for every key.
    pub fn with_exists(mut self, answer: bool) -> Self {
        self.exists_override = Some(answer);
        self
    }

    /// Fail every `command` with `StoreError::ConnectionClosed`.
    pub fn failing_on(mut self, command: &'static str) -> Self {
        self.fail_on = Some(command);
        self
    }

    pub fn inner(&mut self) -> &mut MemoryStore {
        &mut self.inner
    }

    /// Commands recorded since the last call.
    pub fn take_calls(&mut self) -> Vec<String> {
        std::mem::take(&mut self.calls)
    }

    fn record(&mut self, command: &'static str, args: &[&str]) -> StoreResult<()> {
        let mut line = command.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.push(line);

        if self.fail_on == Some(command) {
            return Err(StoreError::ConnectionClosed);
        }
        Ok(())
    }
}

impl Store for RecordingStore {
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.record("SET", &[key, value])?;
        self.inner.set(key, value)
    }

    fn get(&mut self, key: &str) -> StoreResult<Option<String>> {
        self.record("GET", &[key])?;
        self.inner.get(key)
    }

    fn key_type(&mut self, key: &str) -> StoreResult<KeyType> {
        self.record("TYPE", &[key])?;
        match &self.type_override {
            Some(tag) => Ok(tag.clone()),
            None => self.inner.key_type(key),
        }
    }

    fn exists(&mut self, key: &str) -> StoreResult<bool> {
        self.record("EXISTS", &[key])?;
        match self.exists_override {
            Some(answer) => Ok(answer),
            None => self.inner.exists(key),
        }
    }

    fn delete(&mut self, key: &str) -> StoreResult<bool> {
        self.record("DEL", &[key])?;
        self.inner.delete(key)
    }

    fn keys(&mut self) -> StoreResult<Vec<String>> {
        self.record("KEYS", &["*"])?;
        self.inner.keys()
    }

    fn flush_db(&mut self) -> StoreResult<()> {
        self.record("FLUSHDB", &[])?;
        self.inner.flush_db()
    }

    fn rpush(&mut self, key: &str, element: &str) -> StoreResult<usize> {
        self.record("RPUSH", &[key, element])?;
        self.inner.rpush(key, element)
    }

    fn sadd(&mut self, key: &str, member: &str) -> StoreResult<bool> {
        self.record("SADD", &[key, member])?;
        self.inner.sadd(key, member)
    }

    fn hmset(&mut self, key: &str, fields: &[(String, String)]) -> StoreResult<()> {
        let mut args = vec![key];
        for (field, value) in fields {
            args.push(field);
            args.push(value);
        }
        self.record("HMSET", &args)?;
        self.inner.hmset(key, fields)
    }

    fn lrange(&mut self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>> {
        let (from, to) = (start.to_string(), stop.to_string());
        self.record("LRANGE", &[key, &from, &to])?;
        self.inner.lrange(key, start, stop)
    }

    fn smembers(&mut self, key: &str) -> StoreResult<Vec<String>> {
        self.record("SMEMBERS", &[key])?;
        self.inner.smembers(key)
    }

    fn hgetall(&mut self, key: &str) -> StoreResult<Vec<(String, String)>> {
        self.record("HGETALL", &[key])?;
        self.inner.hgetall(key)
    }
}
