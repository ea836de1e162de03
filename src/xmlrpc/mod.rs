// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

#![forbid(non_camel_case_types)]

//! XML-RPC codec, including both serialization and remote procedure calling
//!
//! # What is XML-RPC?
//!
//! A remote procedure call protocol that carries a method name and a list
//! of typed parameters in an XML document posted over HTTP. The server
//! answers with a `methodResponse` holding either the result parameters or
//! a fault struct.
//!
//! Ten wire types exist: `nil`, `boolean`, `int`/`i4`, `double`, `string`,
//! `dateTime.iso8601`, `base64`, `array` and `struct`. They map onto the
//! variants of [`Value`].
//!
//! Full specification of the XML-RPC protocol is found here:
//! http://xmlrpc.scripting.com/spec.html
//!
//! Additional errata and hints can be found here:
//! http://effbot.org/zone/xmlrpc-errata.htm
//!
//! # Example
//!
//! ```
//! use xmlrpc_codec::xmlrpc::{decode_response, MethodResponse, Request, Value};
//!
//! let request = Request::new("examples.getStateName").argument(&41).unwrap();
//! let body = request.to_xml().unwrap();
//! assert!(body.contains("<methodName>examples.getStateName</methodName>"));
//!
//! let answer = "<methodResponse><params><param><value><string>South Dakota</string>\
//!               </value></param></params></methodResponse>";
//! match decode_response(answer.as_bytes()).unwrap() {
//!     MethodResponse::Params(params) => {
//!         assert_eq!(params, vec![Value::String("South Dakota".into())])
//!     }
//!     MethodResponse::Fault(fault) => panic!("unexpected fault {:?}", fault),
//! }
//! ```

pub mod client;
pub mod decoding;
pub mod encoding;
pub mod protocol;
pub mod ser;
pub mod to_value;
pub mod value;

pub use self::client::{Client, HttpTransport, Transport};
pub use self::decoding::{decode_call, decode_response, decode_value, Token, TokenSource, XmlTokens};
pub use self::encoding::{encode_call, encode_response, encode_value, Encoder};
pub use self::protocol::{Fault, MethodCall, MethodResponse, Request};
pub use self::ser::to_value;
pub use self::to_value::{Bytes, ToValue};
pub use self::value::{Array, Object, Value};

/// Element names of the XML-RPC grammar. Case-sensitive.
pub(crate) mod tag {
    pub const METHOD_CALL: &str = "methodCall";
    pub const METHOD_RESPONSE: &str = "methodResponse";
    pub const METHOD_NAME: &str = "methodName";
    pub const PARAMS: &str = "params";
    pub const PARAM: &str = "param";
    pub const FAULT: &str = "fault";
    pub const VALUE: &str = "value";
    pub const NAME: &str = "name";
    pub const ARRAY: &str = "array";
    pub const DATA: &str = "data";
    pub const STRUCT: &str = "struct";
    pub const MEMBER: &str = "member";
    pub const BASE64: &str = "base64";
    pub const BOOLEAN: &str = "boolean";
    pub const DATE_TIME: &str = "dateTime.iso8601";
    pub const DOUBLE: &str = "double";
    pub const INT: &str = "int";
    pub const I4: &str = "i4";
    pub const STRING: &str = "string";
    pub const NIL: &str = "nil";
}

/// `dateTime.iso8601` payload layout: no timezone, no fractional seconds.
pub const DATE_TIME_FORMAT: &str = "%Y%m%dT%H:%M:%S";
