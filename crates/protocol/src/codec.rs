//! `tokio_util::codec` adapter for RESP2
//!
//! Lets a `TcpStream` be wrapped in `Framed<_, RespCodec>` and driven as a
//! `Stream`/`Sink` of [`RespValue`]s.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::{ProtocolError, RespEncoder, RespParser, RespValue};

/// Frames a byte stream into RESP values and back.
///
/// Decoding keeps partial-frame state between calls, so one codec must be
/// used per connection.
///
/// ```
/// use bytes::BytesMut;
/// use redmap_protocol::{RespCodec, RespValue};
/// use tokio_util::codec::Decoder;
///
/// let mut codec = RespCodec::new().with_max_depth(4);
/// let mut buf = BytesMut::from(":1\r\n:2");
///
/// assert_eq!(codec.decode(&mut buf).unwrap(), Some(RespValue::Integer(1)));
/// assert_eq!(codec.decode(&mut buf).unwrap(), None);
/// ```
#[derive(Debug, Default)]
pub struct RespCodec {
    parser: RespParser,
}

impl RespCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`RespParser::with_max_line_len`].
    pub fn with_max_line_len(self, len: usize) -> Self {
        self.map_parser(|p| p.with_max_line_len(len))
    }

    /// See [`RespParser::with_max_bulk_size`].
    pub fn with_max_bulk_size(self, size: usize) -> Self {
        self.map_parser(|p| p.with_max_bulk_size(size))
    }

    /// See [`RespParser::with_max_array_len`].
    pub fn with_max_array_len(self, len: usize) -> Self {
        self.map_parser(|p| p.with_max_array_len(len))
    }

    /// See [`RespParser::with_max_depth`].
    pub fn with_max_depth(self, depth: usize) -> Self {
        self.map_parser(|p| p.with_max_depth(depth))
    }

    fn map_parser(self, f: impl FnOnce(RespParser) -> RespParser) -> Self {
        Self {
            parser: f(self.parser),
        }
    }
}

impl Decoder for RespCodec {
    type Item = RespValue;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<RespValue>, ProtocolError> {
        self.parser.parse(src)
    }
}

impl Encoder<RespValue> for RespCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: RespValue, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        RespEncoder::encode(&item, dst)
    }
}

impl Encoder<&RespValue> for RespCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: &RespValue, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        RespEncoder::encode(item, dst)
    }
}
