//! Incremental RESP2 parsing
//!
//! Frames read off a socket arrive in arbitrary pieces. The parser accepts a
//! frame split at any byte, including in the middle of a nested array.

use bytes::{Buf, Bytes, BytesMut};

use crate::{ProtocolError, RespValue, Result};

/// Default cap on a single bulk string: 512 MiB, the Redis limit.
pub const DEFAULT_MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

pub const DEFAULT_MAX_ARRAY_LEN: usize = 1_000_000;

pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default cap on a status, error, integer or length line: 64 KiB, the
/// Redis inline limit.
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;

/// Incremental RESP2 reader.
///
/// Feed it whatever bytes have arrived; it consumes complete elements,
/// remembers where it stopped (including arrays still waiting for
/// elements) and returns a value once a whole frame is in.
///
/// ```
/// use bytes::BytesMut;
/// use redmap_protocol::{RespParser, RespValue};
///
/// let mut parser = RespParser::new();
/// let mut buf = BytesMut::from("*1\r\n:4");
/// assert_eq!(parser.parse(&mut buf).unwrap(), None);
///
/// buf.extend_from_slice(b"2\r\n");
/// assert_eq!(
///     parser.parse(&mut buf).unwrap(),
///     Some(RespValue::Array(Some(vec![RespValue::Integer(42)])))
/// );
/// ```
#[derive(Debug)]
pub struct RespParser {
    state: ParseState,
    /// Open arrays, innermost last.
    pending: Vec<PendingArray>,
    /// Bytes of the current line already searched for CRLF.
    scanned: usize,
    max_line_len: usize,
    max_bulk_size: usize,
    max_array_len: usize,
    max_depth: usize,
}

/// What the next bytes of the buffer are expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// A type byte starting a new element.
    Marker,
    SimpleString,
    Error,
    Integer,
    BulkStringLen,
    /// `len` payload bytes followed by CRLF.
    BulkStringData { len: usize },
    ArrayLen,
}

#[derive(Debug)]
struct PendingArray {
    remaining: usize,
    items: Vec<RespValue>,
}

impl RespParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::Marker,
            pending: Vec::new(),
            scanned: 0,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_bulk_size: DEFAULT_MAX_BULK_SIZE,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Reject lines longer than `len` bytes, CRLF excluded.
    pub fn with_max_line_len(self, len: usize) -> Self {
        Self {
            max_line_len: len,
            ..self
        }
    }

    /// Reject bulk strings longer than `size` bytes.
    pub fn with_max_bulk_size(self, size: usize) -> Self {
        Self {
            max_bulk_size: size,
            ..self
        }
    }

    /// Reject arrays with more than `len` elements.
    pub fn with_max_array_len(self, len: usize) -> Self {
        Self {
            max_array_len: len,
            ..self
        }
    }

    /// Reject arrays nested more than `depth` levels deep.
    pub fn with_max_depth(self, depth: usize) -> Self {
        Self {
            max_depth: depth,
            ..self
        }
    }

    /// Discard any partially parsed frame.
    pub fn reset(&mut self) {
        self.state = ParseState::Marker;
        self.pending.clear();
        self.scanned = 0;
    }

    /// Consume bytes from `buf` and return the next complete frame, or
    /// `Ok(None)` if more input is needed.
    ///
    /// On error the parser is reset and the rest of `buf` should be treated
    /// as garbage.
    pub fn parse(&mut self, buf: &mut BytesMut) -> Result<Option<RespValue>> {
        let result = self.parse_frame(buf);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn parse_frame(&mut self, buf: &mut BytesMut) -> Result<Option<RespValue>> {
        loop {
            let value = match self.state {
                ParseState::Marker => {
                    // Need at least one byte for type marker
                    if buf.is_empty() {
                        return Ok(None);
                    }

                    let type_byte = buf[0];
                    buf.advance(1);

                    self.state = match type_byte {
                        b'+' => ParseState::SimpleString,
                        b'-' => ParseState::Error,
                        b':' => ParseState::Integer,
                        b'$' => ParseState::BulkStringLen,
                        b'*' => ParseState::ArrayLen,
                        _ => return Err(ProtocolError::InvalidTypeMarker(type_byte)),
                    };
                    continue;
                }

                ParseState::SimpleString => match self.take_line(buf)? {
                    Some(line) => RespValue::SimpleString(line),
                    None => return Ok(None),
                },

                ParseState::Error => match self.take_line(buf)? {
                    Some(line) => RespValue::Error(line),
                    None => return Ok(None),
                },

                ParseState::Integer => match self.take_line(buf)? {
                    Some(line) => RespValue::Integer(parse_int(&line)?),
                    None => return Ok(None),
                },

                ParseState::BulkStringLen => {
                    let Some(line) = self.take_line(buf)? else {
                        return Ok(None);
                    };

                    match parse_int(&line)? {
                        -1 => RespValue::BulkString(None),
                        len if len < 0 => return Err(ProtocolError::InvalidLength),
                        len => {
                            let len = len as usize;
                            if len > self.max_bulk_size {
                                return Err(ProtocolError::BulkStringTooLarge {
                                    size: len,
                                    max: self.max_bulk_size,
                                });
                            }
                            self.state = ParseState::BulkStringData { len };
                            continue;
                        }
                    }
                }

                ParseState::BulkStringData { len } => {
                    // +2 for the trailing \r\n
                    if buf.len() < len + 2 {
                        return Ok(None);
                    }
                    if &buf[len..len + 2] != b"\r\n" {
                        return Err(ProtocolError::InvalidLength);
                    }

                    let data = buf.split_to(len).freeze();
                    buf.advance(2);
                    RespValue::BulkString(Some(data))
                }

                ParseState::ArrayLen => {
                    let Some(line) = self.take_line(buf)? else {
                        return Ok(None);
                    };

                    match parse_int(&line)? {
                        -1 => RespValue::Array(None),
                        0 => RespValue::Array(Some(Vec::new())),
                        len if len < 0 => return Err(ProtocolError::InvalidLength),
                        len => {
                            let len = len as usize;
                            if len > self.max_array_len {
                                return Err(ProtocolError::ArrayTooLarge {
                                    size: len,
                                    max: self.max_array_len,
                                });
                            }
                            if self.pending.len() >= self.max_depth {
                                return Err(ProtocolError::NestingTooDeep {
                                    max: self.max_depth,
                                });
                            }

                            self.pending.push(PendingArray {
                                remaining: len,
                                items: Vec::with_capacity(len.min(1024)),
                            });
                            self.state = ParseState::Marker;
                            continue;
                        }
                    }
                }
            };

            self.state = ParseState::Marker;
            if let Some(frame) = self.complete(value) {
                return Ok(Some(frame));
            }
        }
    }

    /// Split off one CRLF-terminated line, leaving `buf` untouched when the
    /// terminator has not arrived yet. The search resumes where the last
    /// call stopped.
    fn take_line(&mut self, buf: &mut BytesMut) -> Result<Option<Bytes>> {
        // Back up one byte: a trailing \r may be completed by the next chunk.
        let start = self.scanned.saturating_sub(1).min(buf.len());
        let Some(pos) = find_crlf(&buf[start..]).map(|pos| start + pos) else {
            if buf.len() > self.max_line_len + 1 {
                return Err(ProtocolError::LineTooLong {
                    max: self.max_line_len,
                });
            }
            self.scanned = buf.len();
            return Ok(None);
        };

        self.scanned = 0;
        if pos > self.max_line_len {
            return Err(ProtocolError::LineTooLong {
                max: self.max_line_len,
            });
        }
        let line = buf.split_to(pos).freeze();
        buf.advance(2);
        Ok(Some(line))
    }

    /// Attach a finished element to the innermost open array, closing every
    /// array that becomes full. Returns the top-level frame once it is done.
    fn complete(&mut self, mut value: RespValue) -> Option<RespValue> {
        loop {
            let Some(top) = self.pending.last_mut() else {
                return Some(value);
            };

            top.items.push(value);
            top.remaining -= 1;
            if top.remaining > 0 {
                return None;
            }

            let done = self.pending.pop()?;
            value = RespValue::Array(Some(done.items));
        }
    }
}

impl Default for RespParser {
    fn default() -> Self {
        Self::new()
    }
}


/// Find CRLF (\r\n) in buffer
///
/// Returns the position of \r if found, None otherwise.
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

fn parse_int(line: &[u8]) -> Result<i64> {
    std::str::from_utf8(line)
        .map_err(|_| ProtocolError::InvalidLength)?
        .parse()
        .map_err(|_| ProtocolError::InvalidLength)
}
