use std::io;

use thiserror::Error;

use crate::xmlrpc::protocol::Fault;

/// Errors raised while writing an XML-RPC document.
///
/// Bytes already written to the sink are not rolled back; a sink that saw
/// an error must be discarded.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("value has no XML-RPC representation: {0}")]
    Unsupported(String),

    #[error("integer {0} does not fit in a signed 64-bit wire integer")]
    IntegerOutOfRange(u64),
}

/// Errors raised while reading an XML-RPC document.
///
/// All of them are terminal: the decoder never resynchronizes after one.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed XML: {0}")]
    Xml(#[from] xml::reader::Error),

    #[error("unexpected end of document, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("got end element </{found}>, expected </{expected}>")]
    TagMismatch { found: String, expected: String },

    #[error("got end element </{found}> before {expected}")]
    UnexpectedEnd { found: String, expected: String },

    #[error("got start element <{found}>, expected {expected}")]
    UnexpectedElement { found: String, expected: String },

    #[error("unexpected character data {text:?}, expected {expected}")]
    UnexpectedText { text: String, expected: String },

    #[error("unknown value type <{0}>")]
    UnknownValueType(String),

    #[error("struct member has a value but no preceding name")]
    MissingMemberName,

    #[error("struct member {0:?} has no value")]
    MissingMemberValue(String),

    #[error("invalid integer {0:?}")]
    InvalidInteger(String),

    #[error("invalid double {0:?}")]
    InvalidDouble(String),

    #[error("invalid base64 payload {0:?}")]
    InvalidBase64(String),

    #[error("invalid dateTime.iso8601 {0:?}")]
    InvalidDateTime(String),

    #[error("invalid fault: {0}")]
    InvalidFault(String),

    #[error("methodResponse holds neither params nor fault")]
    EmptyResponse,

    #[error("unexpected <{0}> after the document element")]
    TrailingContent(String),
}

/// Errors raised by [`Client`](crate::xmlrpc::client::Client) calls.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not encode request: {0}")]
    Encode(#[from] EncodeError),

    #[error("could not decode response: {0}")]
    Decode(#[from] DecodeError),

    #[error("invalid endpoint URL: {0}")]
    Uri(#[from] hyper::http::uri::InvalidUri),

    #[error("could not build HTTP request: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("error calling rpc endpoint: {0}")]
    Hyper(#[from] hyper::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("rpc endpoint answered with HTTP status {0}")]
    Status(u16),

    #[error("rpc call timed out")]
    Timeout,

    #[error("rpc call failed with fault {}: {}", .0.code(), .0.message())]
    Fault(Fault),
}
