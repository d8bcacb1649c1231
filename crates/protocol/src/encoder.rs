//! RESP2 serialization
//!
//! Writes [`RespValue`]s in wire form. Lengths are byte counts, so bulk
//! strings may hold any bytes, CRLF included.

use bytes::{BufMut, BytesMut};

use crate::error::Result;
use crate::types::RespValue;

const CRLF: &[u8] = b"\r\n";

/// Stateless RESP2 writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RespEncoder;

impl RespEncoder {
    /// Append `value` to `buf`.
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use redmap_protocol::{RespEncoder, RespValue};
    ///
    /// let mut buf = BytesMut::new();
    /// RespEncoder::encode(&RespValue::Integer(2), &mut buf).unwrap();
    /// assert_eq!(&buf[..], b":2\r\n");
    /// ```
    pub fn encode(value: &RespValue, buf: &mut BytesMut) -> Result<()> {
        buf.reserve(value.encoded_len());
        write_value(value, buf);
        Ok(())
    }

    /// Encode into a new buffer of exactly the right size.
    pub fn to_bytes(value: &RespValue) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(value.encoded_len());
        write_value(value, &mut buf);
        Ok(buf)
    }
}

fn write_value(value: &RespValue, buf: &mut BytesMut) {
    match value {
        RespValue::SimpleString(text) => write_line(buf, b'+', text),
        RespValue::Error(msg) => write_line(buf, b'-', msg),
        RespValue::Integer(n) => write_line(buf, b':', n.to_string().as_bytes()),
        RespValue::BulkString(None) => write_line(buf, b'$', b"-1"),
        RespValue::BulkString(Some(data)) => {
            write_line(buf, b'$', data.len().to_string().as_bytes());
            buf.put_slice(data);
            buf.put_slice(CRLF);
        }
        RespValue::Array(None) => write_line(buf, b'*', b"-1"),
        RespValue::Array(Some(items)) => {
            write_line(buf, b'*', items.len().to_string().as_bytes());
            for item in items {
                write_value(item, buf);
            }
        }
    }
}

/// `marker`, `body`, CRLF.
fn write_line(buf: &mut BytesMut, marker: u8, body: &[u8]) {
    buf.put_u8(marker);
    buf.put_slice(body);
    buf.put_slice(CRLF);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn encoded(value: &RespValue) -> BytesMut {
        let mut buf = BytesMut::new();
        RespEncoder::encode(value, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_encode_status() {
        assert_eq!(&encoded(&RespValue::status("OK"))[..], b"+OK\r\n");
        assert_eq!(&encoded(&RespValue::SimpleString(Bytes::new()))[..], b"+\r\n");
    }

    #[test]
    fn test_encode_error() {
        let value = RespValue::Error(Bytes::from("WRONGTYPE Operation against a key"));
        assert_eq!(&encoded(&value)[..], b"-WRONGTYPE Operation against a key\r\n");
    }

    #[test]
    fn test_encode_integers() {
        assert_eq!(&encoded(&RespValue::Integer(0))[..], b":0\r\n");
        assert_eq!(&encoded(&RespValue::Integer(-456))[..], b":-456\r\n");
        assert_eq!(
            &encoded(&RespValue::Integer(i64::MIN))[..],
            b":-9223372036854775808\r\n"
        );
    }

    #[test]
    fn test_encode_bulk_string() {
        assert_eq!(&encoded(&RespValue::bulk("hello"))[..], b"$5\r\nhello\r\n");
    }

    #[test]
    fn test_encode_bulk_string_empty() {
        assert_eq!(&encoded(&RespValue::bulk(""))[..], b"$0\r\n\r\n");
    }

    #[test]
    fn test_encode_bulk_string_null() {
        assert_eq!(&encoded(&RespValue::BulkString(None))[..], b"$-1\r\n");
    }

    #[test]
    fn test_encode_bulk_string_with_crlf() {
        let value = RespValue::bulk("hello\r\nworld");
        assert_eq!(&encoded(&value)[..], b"$12\r\nhello\r\nworld\r\n");
    }

    #[test]
    fn test_encode_bulk_string_utf8_length_is_bytes() {
        // "héllo" is 6 bytes in UTF-8
        let value = RespValue::bulk("héllo");
        assert_eq!(&encoded(&value)[..], "$6\r\nhéllo\r\n".as_bytes());
    }

    #[test]
    fn test_encode_command_array() {
        let value = RespValue::Array(Some(vec![
            RespValue::bulk("RPUSH"),
            RespValue::bulk("tags"),
            RespValue::bulk("a"),
        ]));
        assert_eq!(
            &encoded(&value)[..],
            b"*3\r\n$5\r\nRPUSH\r\n$4\r\ntags\r\n$1\r\na\r\n"
        );
    }

    #[test]
    fn test_encode_array_empty_and_null() {
        assert_eq!(&encoded(&RespValue::Array(Some(vec![])))[..], b"*0\r\n");
        assert_eq!(&encoded(&RespValue::Array(None))[..], b"*-1\r\n");
    }

    #[test]
    fn test_encode_nested_array() {
        let value = RespValue::Array(Some(vec![
            RespValue::Integer(1),
            RespValue::Array(Some(vec![RespValue::bulk("x"), RespValue::BulkString(None)])),
        ]));
        assert_eq!(
            &encoded(&value)[..],
            b"*2\r\n:1\r\n*2\r\n$1\r\nx\r\n$-1\r\n"
        );
    }

    #[test]
    fn test_encode_appends_to_existing_buffer() {
        let mut buf = BytesMut::from("+OK\r\n");
        RespEncoder::encode(&RespValue::Integer(7), &mut buf).unwrap();
        assert_eq!(&buf[..], b"+OK\r\n:7\r\n");
    }

    #[test]
    fn test_to_bytes_matches_encode() {
        let value = RespValue::Array(Some(vec![RespValue::bulk("KEYS"), RespValue::bulk("*")]));
        let buf = RespEncoder::to_bytes(&value).unwrap();
        assert_eq!(buf, encoded(&value));
    }
}
