//! Errors raised while reading, writing or decoding RESP frames.

use thiserror::Error;

/// Failure in the RESP layer.
///
/// Framing variants (`InvalidTypeMarker` through `NestingTooDeep`) mean the
/// byte stream is corrupt and the connection cannot be trusted afterwards.
/// Command variants (`ExpectedArray` through `UnknownCommand`) only concern
/// one well-formed frame that does not describe a known command.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// First byte of a frame is not one of `+ - : $ *`.
    #[error("unexpected RESP type byte {0:#04x}")]
    InvalidTypeMarker(u8),

    /// A length or integer line did not parse, or a bulk payload was not
    /// followed by CRLF.
    #[error("malformed length or integer line")]
    InvalidLength,

    #[error("line exceeds limit of {max} bytes")]
    LineTooLong { max: usize },

    #[error("bulk string of {size} bytes exceeds limit of {max}")]
    BulkStringTooLarge { size: usize, max: usize },

    #[error("array of {size} elements exceeds limit of {max}")]
    ArrayTooLarge { size: usize, max: usize },

    #[error("arrays nested deeper than {max} levels")]
    NestingTooDeep { max: usize },

    #[error("command frame is not an array")]
    ExpectedArray,

    #[error("command frame is an empty array")]
    EmptyCommand,

    #[error("command name is not a bulk string")]
    InvalidCommandName,

    #[error("key argument is not a bulk string")]
    InvalidKey,

    /// Non-string value argument, or a numeric argument that does not parse.
    #[error("invalid argument value")]
    InvalidValue,

    /// Argument count (command name included) does not fit the command.
    #[error("wrong number of arguments for '{command}' ({got}, expected {expected})")]
    WrongArity {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("unknown command '{command}'")]
    UnknownCommand { command: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

impl ProtocolError {
    /// Whether the error leaves the byte stream in an unknown state.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            ProtocolError::InvalidTypeMarker(_)
                | ProtocolError::InvalidLength
                | ProtocolError::LineTooLong { .. }
                | ProtocolError::BulkStringTooLarge { .. }
                | ProtocolError::ArrayTooLarge { .. }
                | ProtocolError::NestingTooDeep { .. }
                | ProtocolError::Io(_)
        )
    }
}
