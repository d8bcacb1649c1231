//! Blocking RESP client for a Redis-compatible server.
//!
//! One TCP connection, opened on the first command and reused afterwards.
//! Every command is a single request/response round trip; there is no
//! pipelining, pooling or retry. A transport or framing failure drops the
//! connection and is returned to the caller as is; the next command opens a
//! fresh connection.

use std::io::{Read, Write};
use std::net::TcpStream;

use bytes::{Bytes, BytesMut};
use redmap_protocol::{Command, RespEncoder, RespParser, RespValue};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::{KeyType, Store};

const READ_CHUNK: usize = 4096;

/// Store handle backed by a Redis-compatible server.
///
/// # Examples
///
/// ```no_run
/// use redmap_store::{Client, Store, StoreConfig};
///
/// let mut client = Client::new(StoreConfig::default()).unwrap();
/// client.set("greeting", "hello").unwrap();
/// assert_eq!(client.get("greeting").unwrap().as_deref(), Some("hello"));
/// ```
#[derive(Debug)]
pub struct Client {
    config: StoreConfig,
    conn: Option<Connection>,
}

#[derive(Debug)]
struct Connection {
    stream: TcpStream,
    parser: RespParser,
    read_buf: BytesMut,
}

impl Connection {
    fn open(config: &StoreConfig) -> StoreResult<Self> {
        let stream = TcpStream::connect((config.host.as_str(), config.port))?;
        stream.set_nodelay(true)?;
        log::debug!("connected to {config}");

        let mut conn = Self {
            stream,
            parser: RespParser::new(),
            read_buf: BytesMut::with_capacity(READ_CHUNK),
        };

        if config.db != 0 {
            let reply = conn.round_trip(Command::Select { db: config.db })?;
            expect_ok("SELECT", reply)?;
            log::debug!("selected database {}", config.db);
        }

        Ok(conn)
    }

    fn round_trip(&mut self, command: Command) -> StoreResult<RespValue> {
        let frame = RespEncoder::to_bytes(&command.into_value())?;
        self.stream.write_all(&frame)?;

        match self.read_reply()? {
            RespValue::Error(msg) => Err(StoreError::Server(
                String::from_utf8_lossy(&msg).into_owned(),
            )),
            reply => Ok(reply),
        }
    }

    fn read_reply(&mut self) -> StoreResult<RespValue> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(value) = self.parser.parse(&mut self.read_buf)? {
                return Ok(value);
            }

            let n = self.stream.read(&mut chunk)?;
            if n == 0 {
                return Err(StoreError::ConnectionClosed);
            }
            self.read_buf.extend_from_slice(&chunk[..n]);
        }
    }
}

impl Client {
    /// Create a client for `config`. No connection is made until the first
    /// command is issued.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the configuration does not validate.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        config.validate().map_err(StoreError::Config)?;
        Ok(Self { config, conn: None })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Send one command and wait for its reply.
    ///
    /// Error replies are returned as `StoreError::Server` and leave the
    /// connection usable.
    pub fn request(&mut self, command: Command) -> StoreResult<RespValue> {
        let mut conn = match self.conn.take() {
            Some(conn) => conn,
            None => Connection::open(&self.config)?,
        };

        log::trace!("{} -> {}", self.config, command.name());
        let result = conn.round_trip(command);

        match &result {
            Err(err) if breaks_connection(err) => {
                log::warn!("dropping connection to {}: {err}", self.config);
            }
            _ => self.conn = Some(conn),
        }

        result
    }
}

impl Store for Client {
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let reply = self.request(Command::Set {
            key: arg(key),
            value: arg(value),
        })?;
        expect_ok("SET", reply)
    }

    fn get(&mut self, key: &str) -> StoreResult<Option<String>> {
        let reply = self.request(Command::Get { key: arg(key) })?;
        expect_optional_text("GET", reply)
    }

    fn key_type(&mut self, key: &str) -> StoreResult<KeyType> {
        let reply = self.request(Command::Type { key: arg(key) })?;
        match reply {
            RespValue::SimpleString(tag) => Ok(KeyType::parse(std::str::from_utf8(&tag)?)),
            other => Err(unexpected("TYPE", &other)),
        }
    }

    fn exists(&mut self, key: &str) -> StoreResult<bool> {
        let reply = self.request(Command::Exists { key: arg(key) })?;
        Ok(expect_integer("EXISTS", reply)? > 0)
    }

    fn delete(&mut self, key: &str) -> StoreResult<bool> {
        let reply = self.request(Command::Del { key: arg(key) })?;
        Ok(expect_integer("DEL", reply)? > 0)
    }

    fn keys(&mut self) -> StoreResult<Vec<String>> {
        let reply = self.request(Command::Keys {
            pattern: Bytes::from_static(b"*"),
        })?;
        expect_text_array("KEYS", reply)
    }

    fn flush_db(&mut self) -> StoreResult<()> {
        let reply = self.request(Command::FlushDb)?;
        expect_ok("FLUSHDB", reply)
    }

    fn rpush(&mut self, key: &str, element: &str) -> StoreResult<usize> {
        let reply = self.request(Command::RPush {
            key: arg(key),
            element: arg(element),
        })?;
        let len = expect_integer("RPUSH", reply)?;
        usize::try_from(len).map_err(|_| unexpected("RPUSH", &RespValue::Integer(len)))
    }

    fn sadd(&mut self, key: &str, member: &str) -> StoreResult<bool> {
        let reply = self.request(Command::SAdd {
            key: arg(key),
            member: arg(member),
        })?;
        Ok(expect_integer("SADD", reply)? == 1)
    }

    fn hmset(&mut self, key: &str, fields: &[(String, String)]) -> StoreResult<()> {
        let fields = fields
            .iter()
            .map(|(field, value)| (arg(field), arg(value)))
            .collect();
        let reply = self.request(Command::HMSet {
            key: arg(key),
            fields,
        })?;
        expect_ok("HMSET", reply)
    }

    fn lrange(&mut self, key: &str, start: i64, stop: i64) -> StoreResult<Vec<String>> {
        let reply = self.request(Command::LRange {
            key: arg(key),
            start,
            stop,
        })?;
        expect_text_array("LRANGE", reply)
    }

    fn smembers(&mut self, key: &str) -> StoreResult<Vec<String>> {
        let reply = self.request(Command::SMembers { key: arg(key) })?;
        expect_text_array("SMEMBERS", reply)
    }

    fn hgetall(&mut self, key: &str) -> StoreResult<Vec<(String, String)>> {
        let reply = self.request(Command::HGetAll { key: arg(key) })?;
        let flat = expect_text_array("HGETALL", reply)?;
        if flat.len() % 2 != 0 {
            return Err(StoreError::UnexpectedReply {
                command: "HGETALL",
                reply: format!("odd number of elements ({})", flat.len()),
            });
        }

        let mut pairs = Vec::with_capacity(flat.len() / 2);
        let mut items = flat.into_iter();
        while let (Some(field), Some(value)) = (items.next(), items.next()) {
            pairs.push((field, value));
        }
        Ok(pairs)
    }
}

fn breaks_connection(err: &StoreError) -> bool {
    match err {
        StoreError::Io(_) | StoreError::ConnectionClosed => true,
        StoreError::Protocol(err) => err.is_framing(),
        _ => false,
    }
}

fn arg(text: &str) -> Bytes {
    Bytes::copy_from_slice(text.as_bytes())
}

fn text(bytes: &[u8]) -> StoreResult<String> {
    Ok(std::str::from_utf8(bytes)?.to_owned())
}

fn unexpected(command: &'static str, reply: &RespValue) -> StoreError {
    StoreError::UnexpectedReply {
        command,
        reply: format!("{reply:?}"),
    }
}

fn expect_ok(command: &'static str, reply: RespValue) -> StoreResult<()> {
    match reply {
        RespValue::SimpleString(status) if status.as_ref() == b"OK" => Ok(()),
        other => Err(unexpected(command, &other)),
    }
}

fn expect_integer(command: &'static str, reply: RespValue) -> StoreResult<i64> {
    reply
        .as_integer()
        .ok_or_else(|| unexpected(command, &reply))
}

fn expect_optional_text(command: &'static str, reply: RespValue) -> StoreResult<Option<String>> {
    match reply {
        RespValue::BulkString(None) => Ok(None),
        RespValue::BulkString(Some(data)) => text(&data).map(Some),
        other => Err(unexpected(command, &other)),
    }
}

fn expect_text_array(command: &'static str, reply: RespValue) -> StoreResult<Vec<String>> {
    let items = match reply {
        RespValue::Array(Some(items)) => items,
        other => return Err(unexpected(command, &other)),
    };

    items
        .into_iter()
        .map(|item| match item {
            RespValue::BulkString(Some(data)) => text(&data),
            other => Err(unexpected(command, &other)),
        })
        .collect()
}
