//! RESP (REdis Serialization Protocol) implementation
//!
//! This crate provides the RESP2 value model, encoding, streaming parsing and
//! the typed command set spoken between the redmap store client and a
//! Redis-compatible server.
//!
//! The `server` feature adds the pieces only a server needs: `RespCodec`
//! for `tokio_util` framing and `Command::from_value`.

#[cfg(feature = "server")]
pub mod codec;
pub mod command;
pub mod encoder;
pub mod error;
pub mod parser;
pub mod types;

#[cfg(feature = "server")]
pub use codec::RespCodec;
pub use command::Command;
pub use encoder::RespEncoder;
pub use error::{ProtocolError, Result};
pub use parser::RespParser;
pub use types::RespValue;
