//! XML-RPC codec: encodes method calls, decodes method responses (faults
//! included), and posts calls over HTTP.

pub mod config;
pub mod error;
pub mod xmlrpc;

pub use crate::config::ClientConfig;
pub use crate::error::{ClientError, DecodeError, EncodeError};
