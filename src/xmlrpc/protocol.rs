// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

use std::io::Write;

use crate::error::{DecodeError, EncodeError};
use super::encoding::{EncodeResult, Encoder};
use super::to_value::ToValue;
use super::value::{Object, Value};

const FAULT_CODE: &str = "faultCode";
const FAULT_STRING: &str = "faultString";

/// Builder for a [`MethodCall`].
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    args: Vec<Value>,
}

/// A method name and its ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub params: Vec<Value>,
}

/// Decoded `methodResponse`: exactly one of `params` or `fault`.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Params(Vec<Value>),
    Fault(Fault),
}

/// A fault struct, guaranteed to carry an integer `faultCode` and a string
/// `faultString`. Any other members are kept as received.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    code: i64,
    message: String,
    members: Object,
}

impl Request {
    pub fn new(method: &str) -> Request {
        Request {
            method: method.to_string(),
            args: Vec::new(),
        }
    }

    /// Appends an argument, classifying it through [`ToValue`].
    pub fn argument<T: ToValue + ?Sized>(mut self, object: &T) -> Result<Request, EncodeError> {
        self.args.push(object.to_value()?);
        Ok(self)
    }

    /// Appends an already built value.
    pub fn push(&mut self, value: Value) {
        self.args.push(value);
    }

    pub fn finalize(self) -> MethodCall {
        MethodCall {
            method: self.method,
            params: self.args,
        }
    }

    pub fn to_xml(&self) -> Result<String, EncodeError> {
        let mut buf = Vec::new();
        Encoder::new(&mut buf).write_call(&self.method, &self.args)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl MethodCall {
    pub fn new(method: &str, params: Vec<Value>) -> MethodCall {
        MethodCall {
            method: method.to_string(),
            params,
        }
    }

    pub fn write_to<W: Write>(&self, writer: W) -> EncodeResult {
        Encoder::new(writer).write_call(&self.method, &self.params)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }
}

impl MethodResponse {
    pub fn is_fault(&self) -> bool {
        matches!(*self, MethodResponse::Fault(_))
    }

    /// `Ok(params)` or `Err(fault)`.
    pub fn into_result(self) -> Result<Vec<Value>, Fault> {
        match self {
            MethodResponse::Params(params) => Ok(params),
            MethodResponse::Fault(fault) => Err(fault),
        }
    }

    /// The top-level mapping view: a struct with a single `params` (array)
    /// or `fault` (struct) member.
    pub fn into_value(self) -> Value {
        let mut top = Object::new();
        match self {
            MethodResponse::Params(params) => {
                top.insert("params".to_string(), Value::Array(params));
            }
            MethodResponse::Fault(fault) => {
                top.insert("fault".to_string(), fault.into_value());
            }
        }
        Value::Struct(top)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> EncodeResult {
        Encoder::new(writer).write_response(self)
    }
}

impl Fault {
    pub fn new(code: i64, message: &str) -> Fault {
        let mut members = Object::new();
        members.insert(FAULT_CODE.to_string(), Value::Integer(code));
        members.insert(FAULT_STRING.to_string(), Value::String(message.to_string()));
        Fault {
            code,
            message: message.to_string(),
            members,
        }
    }

    /// Validates a decoded fault value.
    pub fn from_value(value: Value) -> Result<Fault, DecodeError> {
        let members = match value {
            Value::Struct(members) => members,
            other => {
                return Err(DecodeError::InvalidFault(format!(
                    "expected <struct>, got <{}>",
                    other.wire_tag()
                )))
            }
        };
        let code = match members.get(FAULT_CODE) {
            Some(&Value::Integer(code)) => code,
            Some(other) => {
                return Err(DecodeError::InvalidFault(format!(
                    "{} is <{}>, expected <int>",
                    FAULT_CODE,
                    other.wire_tag()
                )))
            }
            None => return Err(DecodeError::InvalidFault(format!("missing {}", FAULT_CODE))),
        };
        let message = match members.get(FAULT_STRING) {
            Some(&Value::String(ref message)) => message.clone(),
            Some(other) => {
                return Err(DecodeError::InvalidFault(format!(
                    "{} is <{}>, expected <string>",
                    FAULT_STRING,
                    other.wire_tag()
                )))
            }
            None => return Err(DecodeError::InvalidFault(format!("missing {}", FAULT_STRING))),
        };
        Ok(Fault {
            code,
            message,
            members,
        })
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// All members, `faultCode` and `faultString` included.
    pub fn members(&self) -> &Object {
        &self.members
    }

    pub fn into_value(self) -> Value {
        Value::Struct(self.members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_classifies_arguments() {
        let call = Request::new("domain.zone.record.list")
            .argument("apikey")
            .and_then(|r| r.argument(&1404u32))
            .and_then(|r| r.argument(&0u16))
            .unwrap()
            .finalize();
        assert_eq!(call.method, "domain.zone.record.list");
        assert_eq!(
            call.params,
            vec![Value::from("apikey"), Value::Integer(1404), Value::Integer(0)]
        );
    }

    #[test]
    fn request_builder_surfaces_unsupported_arguments() {
        assert!(matches!(
            Request::new("m").argument(&u64::MAX),
            Err(EncodeError::IntegerOutOfRange(_))
        ));
    }

    #[test]
    fn request_to_xml_matches_method_call_bytes() {
        let mut request = Request::new("test.method");
        request.push(Value::Integer(1));
        let xml = request.to_xml().unwrap();
        let bytes = request.finalize().to_bytes().unwrap();
        assert_eq!(xml.as_bytes(), &bytes[..]);
    }

    #[test]
    fn fault_validation() {
        let fault = Fault::from_value(Fault::new(4, "Too many parameters.").into_value()).unwrap();
        assert_eq!(fault.code(), 4);
        assert_eq!(fault.message(), "Too many parameters.");

        assert!(Fault::from_value(Value::Integer(4)).is_err());

        let mut members = Object::new();
        members.insert("faultCode".to_string(), Value::from("4"));
        members.insert("faultString".to_string(), Value::from("x"));
        assert!(Fault::from_value(Value::Struct(members)).is_err());

        let mut members = Object::new();
        members.insert("faultCode".to_string(), Value::Integer(4));
        assert!(matches!(
            Fault::from_value(Value::Struct(members)),
            Err(DecodeError::InvalidFault(_))
        ));
    }

    #[test]
    fn response_top_level_mapping() {
        assert!(!MethodResponse::Params(vec![]).is_fault());
        assert!(MethodResponse::Fault(Fault::new(4, "boom")).is_fault());

        let params = MethodResponse::Params(vec![Value::Integer(7)]).into_value();
        assert_eq!(params["params"][0], Value::Integer(7));
        assert!(params.find("fault").is_none());

        let fault = MethodResponse::Fault(Fault::new(4, "boom")).into_value();
        assert_eq!(fault["fault"]["faultCode"], Value::Integer(4));
        assert!(fault.find("params").is_none());
    }
}
