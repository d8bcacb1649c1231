//! The RESP2 value model
//!
//! Payloads are `bytes::Bytes`, so values parsed out of a read buffer share
//! its allocation instead of copying.

use bytes::Bytes;

/// One RESP2 frame.
///
/// | variant        | wire form                     | null form |
/// |----------------|-------------------------------|-----------|
/// | `SimpleString` | `+OK\r\n`                     |           |
/// | `Error`        | `-WRONGTYPE ...\r\n`          |           |
/// | `Integer`      | `:3\r\n`                      |           |
/// | `BulkString`   | `$3\r\nfoo\r\n`               | `$-1\r\n` |
/// | `Array`        | `*1\r\n$4\r\nPING\r\n`        | `*-1\r\n` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespValue {
    /// Short status text with no CR or LF.
    SimpleString(Bytes),
    /// Error reply; by convention the first word is an error code.
    Error(Bytes),
    Integer(i64),
    /// Binary-safe string. `None` is the null bulk string.
    BulkString(Option<Bytes>),
    /// `None` is the null array.
    Array(Option<Vec<RespValue>>),
}

impl RespValue {
    /// Non-null bulk string.
    ///
    /// ```
    /// use redmap_protocol::RespValue;
    ///
    /// assert_eq!(RespValue::bulk("k"), RespValue::BulkString(Some("k".into())));
    /// ```
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        RespValue::BulkString(Some(data.into()))
    }

    /// Status reply such as `+OK` or `+PONG`.
    pub fn status(text: &'static str) -> Self {
        RespValue::SimpleString(Bytes::from_static(text.as_bytes()))
    }

    pub fn error(msg: impl Into<String>) -> Self {
        RespValue::Error(Bytes::from(msg.into()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RespValue::BulkString(None) | RespValue::Array(None))
    }

    /// Payload of a simple string, error or non-null bulk string.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            RespValue::SimpleString(data)
            | RespValue::Error(data)
            | RespValue::BulkString(Some(data)) => Some(data),
            RespValue::Integer(_) | RespValue::BulkString(None) | RespValue::Array(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let RespValue::Integer(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    /// Elements of a non-null array.
    pub fn into_array(self) -> Option<Vec<RespValue>> {
        if let RespValue::Array(Some(items)) = self {
            Some(items)
        } else {
            None
        }
    }

    /// Exact number of bytes [`RespEncoder`](crate::RespEncoder) writes for
    /// this value.
    ///
    /// ```
    /// use redmap_protocol::RespValue;
    ///
    /// assert_eq!(RespValue::status("OK").encoded_len(), 5);
    /// assert_eq!(RespValue::bulk("foo").encoded_len(), 9);
    /// ```
    pub fn encoded_len(&self) -> usize {
        match self {
            RespValue::SimpleString(data) | RespValue::Error(data) => data.len() + 3,
            RespValue::Integer(n) => decimal_len(*n) + 3,
            RespValue::BulkString(None) | RespValue::Array(None) => 5,
            RespValue::BulkString(Some(data)) => {
                header_len(data.len()) + data.len() + 2
            }
            RespValue::Array(Some(items)) => {
                header_len(items.len()) + items.iter().map(RespValue::encoded_len).sum::<usize>()
            }
        }
    }
}

/// Length of a `$n\r\n` or `*n\r\n` header.
fn header_len(n: usize) -> usize {
    decimal_len(n as i64) + 3
}

fn decimal_len(n: i64) -> usize {
    let sign = usize::from(n < 0);
    let mut magnitude = n.unsigned_abs();
    let mut digits = 1;
    while magnitude >= 10 {
        magnitude /= 10;
        digits += 1;
    }
    sign + digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RespEncoder;

    #[test]
    fn test_constructors() {
        assert_eq!(
            RespValue::bulk(String::from("owned")),
            RespValue::BulkString(Some(Bytes::from_static(b"owned")))
        );
        assert_eq!(
            RespValue::status("PONG"),
            RespValue::SimpleString(Bytes::from_static(b"PONG"))
        );
        assert_eq!(
            RespValue::error("ERR no such key"),
            RespValue::Error(Bytes::from_static(b"ERR no such key"))
        );
    }

    #[test]
    fn test_null_forms() {
        assert!(RespValue::BulkString(None).is_null());
        assert!(RespValue::Array(None).is_null());
        assert!(!RespValue::bulk("").is_null());
        assert!(!RespValue::Array(Some(Vec::new())).is_null());
    }

    #[test]
    fn test_accessors_reject_other_variants() {
        assert_eq!(RespValue::Integer(7).as_bytes(), None);
        assert_eq!(RespValue::BulkString(None).as_bytes(), None);
        assert_eq!(RespValue::bulk("7").as_integer(), None);
        assert_eq!(RespValue::Array(None).into_array(), None);
        assert_eq!(RespValue::error("ERR").as_bytes().map(|b| b.len()), Some(3));
    }

    #[test]
    fn test_decimal_len() {
        assert_eq!(decimal_len(0), 1);
        assert_eq!(decimal_len(9), 1);
        assert_eq!(decimal_len(10), 2);
        assert_eq!(decimal_len(-1), 2);
        assert_eq!(decimal_len(i64::MIN), 20);
        assert_eq!(decimal_len(i64::MAX), 19);
    }

    #[test]
    fn test_encoded_len_matches_encoder() {
        let value = RespValue::Array(Some(vec![
            RespValue::bulk("HMSET"),
            RespValue::bulk("user:1"),
            RespValue::Integer(-12345),
            RespValue::BulkString(None),
            RespValue::Array(Some(vec![RespValue::status("OK"); 12])),
            RespValue::bulk(vec![0u8; 100]),
        ]));

        let encoded = RespEncoder::to_bytes(&value).unwrap();
        assert_eq!(value.encoded_len(), encoded.len());
    }
}
