//! Typed store commands
//!
//! This module provides the strongly-typed command set the store client
//! issues. Commands convert to RESP arrays of bulk strings for the wire
//! (`into_value`) and can be decoded back from a received array
//! (`from_value`, behind the `server` feature), which lets an in-process
//! server answer them.

#[cfg(feature = "server")]
use std::str::FromStr;

use bytes::Bytes;

#[cfg(feature = "server")]
use crate::error::{ProtocolError, Result};
use crate::types::RespValue;

/// Redis commands used by redmap
///
/// One variant per Redis command invocation. `RPUSH` and `SADD` carry a
/// single element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// PING
    Ping,

    /// SELECT index
    Select { db: u32 },

    /// SET key value
    ///
    /// ```text
    /// *3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n
    /// ```
    Set { key: Bytes, value: Bytes },

    /// GET key
    Get { key: Bytes },

    /// TYPE key
    Type { key: Bytes },

    /// EXISTS key
    Exists { key: Bytes },

    /// DEL key
    Del { key: Bytes },

    /// KEYS pattern
    Keys { pattern: Bytes },

    /// FLUSHDB
    FlushDb,

    /// RPUSH key element
    RPush { key: Bytes, element: Bytes },

    /// SADD key member
    SAdd { key: Bytes, member: Bytes },

    /// HMSET key field value [field value ...]
    HMSet {
        key: Bytes,
        fields: Vec<(Bytes, Bytes)>,
    },

    /// LRANGE key start stop
    LRange { key: Bytes, start: i64, stop: i64 },

    /// SMEMBERS key
    SMembers { key: Bytes },

    /// HGETALL key
    HGetAll { key: Bytes },
}

impl Command {
    /// Upper-case command name as sent on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping => "PING",
            Command::Select { .. } => "SELECT",
            Command::Set { .. } => "SET",
            Command::Get { .. } => "GET",
            Command::Type { .. } => "TYPE",
            Command::Exists { .. } => "EXISTS",
            Command::Del { .. } => "DEL",
            Command::Keys { .. } => "KEYS",
            Command::FlushDb => "FLUSHDB",
            Command::RPush { .. } => "RPUSH",
            Command::SAdd { .. } => "SADD",
            Command::HMSet { .. } => "HMSET",
            Command::LRange { .. } => "LRANGE",
            Command::SMembers { .. } => "SMEMBERS",
            Command::HGetAll { .. } => "HGETALL",
        }
    }

    /// Convert the command into the RESP array sent to the server.
    ///
    /// # Examples
    ///
    /// ```
    /// use redmap_protocol::{Command, RespValue};
    /// use bytes::Bytes;
    ///
    /// let cmd = Command::Get { key: Bytes::from("mykey") };
    /// assert_eq!(
    ///     cmd.into_value(),
    ///     RespValue::Array(Some(vec![RespValue::bulk("GET"), RespValue::bulk("mykey")]))
    /// );
    /// ```
    pub fn into_value(self) -> RespValue {
        let name = Bytes::from_static(self.name().as_bytes());
        let mut args = vec![name];

        match self {
            Command::Ping | Command::FlushDb => {}
            Command::Select { db } => args.push(Bytes::from(db.to_string())),
            Command::Set { key, value } => {
                args.push(key);
                args.push(value);
            }
            Command::Get { key }
            | Command::Type { key }
            | Command::Exists { key }
            | Command::Del { key }
            | Command::SMembers { key }
            | Command::HGetAll { key } => args.push(key),
            Command::Keys { pattern } => args.push(pattern),
            Command::RPush { key, element } => {
                args.push(key);
                args.push(element);
            }
            Command::SAdd { key, member } => {
                args.push(key);
                args.push(member);
            }
            Command::HMSet { key, fields } => {
                args.reserve(fields.len() * 2 + 1);
                args.push(key);
                for (field, value) in fields {
                    args.push(field);
                    args.push(value);
                }
            }
            Command::LRange { key, start, stop } => {
                args.push(key);
                args.push(Bytes::from(start.to_string()));
                args.push(Bytes::from(stop.to_string()));
            }
        }

        RespValue::Array(Some(
            args.into_iter()
                .map(|arg| RespValue::BulkString(Some(arg)))
                .collect(),
        ))
    }
}

#[cfg(feature = "server")]
impl Command {
    /// Parse a command from a received RESP array
    ///
    /// The command name is matched case-insensitively.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::ExpectedArray` - Input is not an array
    /// - `ProtocolError::EmptyCommand` - Array is empty
    /// - `ProtocolError::InvalidCommandName` - First element is not a string
    /// - `ProtocolError::UnknownCommand` - Command name is not recognized
    /// - `ProtocolError::WrongArity` - Wrong number of arguments
    /// - `ProtocolError::InvalidKey` - Key argument is not a string
    /// - `ProtocolError::InvalidValue` - Value or numeric argument is malformed
    ///
    /// # Examples
    ///
    /// ```
    /// use redmap_protocol::{Command, RespValue};
    ///
    /// let value = RespValue::Array(Some(vec![
    ///     RespValue::bulk("rpush"),
    ///     RespValue::bulk("tags"),
    ///     RespValue::bulk("a"),
    /// ]));
    ///
    /// let command = Command::from_value(value).unwrap();
    /// assert!(matches!(command, Command::RPush { .. }));
    /// ```
    pub fn from_value(value: RespValue) -> Result<Self> {
        let elements = value.into_array().ok_or(ProtocolError::ExpectedArray)?;

        if elements.is_empty() {
            return Err(ProtocolError::EmptyCommand);
        }

        let cmd_name = elements[0]
            .as_bytes()
            .ok_or(ProtocolError::InvalidCommandName)?;
        let cmd_str = std::str::from_utf8(cmd_name)
            .map_err(|_| ProtocolError::InvalidCommandName)?
            .to_uppercase();

        match cmd_str.as_str() {
            "PING" => {
                arity("PING", &elements, 1)?;
                Ok(Command::Ping)
            }
            "SELECT" => {
                arity("SELECT", &elements, 2)?;
                Ok(Command::Select {
                    db: number(&elements[1])?,
                })
            }
            "SET" => {
                arity("SET", &elements, 3)?;
                Ok(Command::Set {
                    key: key(&elements[1])?,
                    value: value_arg(&elements[2])?,
                })
            }
            "GET" => Self::parse_key_only("GET", &elements, |key| Command::Get { key }),
            "TYPE" => Self::parse_key_only("TYPE", &elements, |key| Command::Type { key }),
            "EXISTS" => Self::parse_key_only("EXISTS", &elements, |key| Command::Exists { key }),
            "DEL" => Self::parse_key_only("DEL", &elements, |key| Command::Del { key }),
            "SMEMBERS" => {
                Self::parse_key_only("SMEMBERS", &elements, |key| Command::SMembers { key })
            }
            "HGETALL" => {
                Self::parse_key_only("HGETALL", &elements, |key| Command::HGetAll { key })
            }
            "KEYS" => {
                arity("KEYS", &elements, 2)?;
                Ok(Command::Keys {
                    pattern: value_arg(&elements[1])?,
                })
            }
            "FLUSHDB" => {
                arity("FLUSHDB", &elements, 1)?;
                Ok(Command::FlushDb)
            }
            "RPUSH" => {
                arity("RPUSH", &elements, 3)?;
                Ok(Command::RPush {
                    key: key(&elements[1])?,
                    element: value_arg(&elements[2])?,
                })
            }
            "SADD" => {
                arity("SADD", &elements, 3)?;
                Ok(Command::SAdd {
                    key: key(&elements[1])?,
                    member: value_arg(&elements[2])?,
                })
            }
            "HMSET" => Self::parse_hmset(&elements),
            "LRANGE" => {
                arity("LRANGE", &elements, 4)?;
                Ok(Command::LRange {
                    key: key(&elements[1])?,
                    start: number(&elements[2])?,
                    stop: number(&elements[3])?,
                })
            }
            _ => Err(ProtocolError::UnknownCommand {
                command: cmd_str.to_string(),
            }),
        }
    }

    fn parse_key_only(
        command: &'static str,
        elements: &[RespValue],
        build: impl FnOnce(Bytes) -> Command,
    ) -> Result<Self> {
        arity(command, elements, 2)?;
        Ok(build(key(&elements[1])?))
    }

    /// HMSET needs at least one field/value pair and an even pair count.
    fn parse_hmset(elements: &[RespValue]) -> Result<Self> {
        if elements.len() < 4 || elements.len() % 2 != 0 {
            return Err(ProtocolError::WrongArity {
                command: "HMSET",
                expected: 4,
                got: elements.len(),
            });
        }

        let key = key(&elements[1])?;
        let fields = elements[2..]
            .chunks_exact(2)
            .map(|pair| -> Result<(Bytes, Bytes)> {
                Ok((value_arg(&pair[0])?, value_arg(&pair[1])?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Command::HMSet { key, fields })
    }
}

#[cfg(feature = "server")]
fn arity(command: &'static str, elements: &[RespValue], expected: usize) -> Result<()> {
    if elements.len() != expected {
        return Err(ProtocolError::WrongArity {
            command,
            expected,
            got: elements.len(),
        });
    }
    Ok(())
}

#[cfg(feature = "server")]
fn key(element: &RespValue) -> Result<Bytes> {
    element.as_bytes().cloned().ok_or(ProtocolError::InvalidKey)
}

#[cfg(feature = "server")]
fn value_arg(element: &RespValue) -> Result<Bytes> {
    element.as_bytes().cloned().ok_or(ProtocolError::InvalidValue)
}

#[cfg(feature = "server")]
fn number<T: FromStr>(element: &RespValue) -> Result<T> {
    let raw = element.as_bytes().ok_or(ProtocolError::InvalidValue)?;
    std::str::from_utf8(raw)?
        .parse()
        .map_err(|_| ProtocolError::InvalidValue)
}
