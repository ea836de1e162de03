// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

use std::io::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use xml::escape::escape_str_pcdata;

use crate::error::EncodeError;
use super::protocol::MethodResponse;
use super::value::{Object, Value};
use super::{tag, DATE_TIME_FORMAT};

pub type EncodeResult = Result<(), EncodeError>;

const XML_DECLARATION: &str = "<?xml version=\"1.0\"?>";

/// Write a complete `methodCall` document for `method` and `args`.
pub fn encode_call<W: Write>(writer: W, method: &str, args: &[Value]) -> EncodeResult {
    Encoder::new(writer).write_call(method, args)
}

/// Write a complete `methodResponse` document.
pub fn encode_response<W: Write>(writer: W, response: &MethodResponse) -> EncodeResult {
    Encoder::new(writer).write_response(response)
}

/// Write a lone `<value>` element.
pub fn encode_value<W: Write>(writer: W, value: &Value) -> EncodeResult {
    Encoder::new(writer).write_value(value)
}

/// A structure for implementing serialization to XML-RPC.
///
/// Output is compact: no whitespace is emitted between elements.
pub struct Encoder<W> {
    writer: W,
}

impl<W: Write> Encoder<W> {
    /// Creates a new XML-RPC encoder whose output will be written to the writer
    /// specified.
    pub fn new(writer: W) -> Encoder<W> {
        Encoder { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn write_call(&mut self, method: &str, args: &[Value]) -> EncodeResult {
        self.writer.write_all(XML_DECLARATION.as_bytes())?;
        self.open(tag::METHOD_CALL)?;
        self.open(tag::METHOD_NAME)?;
        self.text(method)?;
        self.close(tag::METHOD_NAME)?;
        self.write_params(args)?;
        self.close(tag::METHOD_CALL)?;
        Ok(())
    }

    pub fn write_response(&mut self, response: &MethodResponse) -> EncodeResult {
        self.writer.write_all(XML_DECLARATION.as_bytes())?;
        self.open(tag::METHOD_RESPONSE)?;
        match *response {
            MethodResponse::Params(ref params) => self.write_params(params)?,
            MethodResponse::Fault(ref fault) => {
                self.open(tag::FAULT)?;
                self.open(tag::VALUE)?;
                self.write_struct(fault.members())?;
                self.close(tag::VALUE)?;
                self.close(tag::FAULT)?;
            }
        }
        self.close(tag::METHOD_RESPONSE)?;
        Ok(())
    }

    fn write_params(&mut self, params: &[Value]) -> EncodeResult {
        self.open(tag::PARAMS)?;
        for param in params {
            self.open(tag::PARAM)?;
            self.write_value(param)?;
            self.close(tag::PARAM)?;
        }
        self.close(tag::PARAMS)?;
        Ok(())
    }

    pub fn write_value(&mut self, value: &Value) -> EncodeResult {
        self.open(tag::VALUE)?;
        match *value {
            Value::Nil => write!(self.writer, "<{}/>", tag::NIL)?,
            Value::Boolean(b) => {
                self.open(tag::BOOLEAN)?;
                self.writer.write_all(if b { b"1" } else { b"0" })?;
                self.close(tag::BOOLEAN)?;
            }
            Value::Integer(n) => {
                self.open(tag::INT)?;
                write!(self.writer, "{}", n)?;
                self.close(tag::INT)?;
            }
            Value::Double(n) => {
                if !n.is_finite() {
                    return Err(EncodeError::Unsupported(format!("non-finite double {}", n)));
                }
                self.open(tag::DOUBLE)?;
                write!(self.writer, "{:.10}", n)?;
                self.close(tag::DOUBLE)?;
            }
            Value::String(ref s) => {
                self.open(tag::STRING)?;
                self.text(s)?;
                self.close(tag::STRING)?;
            }
            Value::DateTime(ref dt) => {
                self.open(tag::DATE_TIME)?;
                write!(self.writer, "{}", dt.format(DATE_TIME_FORMAT))?;
                self.close(tag::DATE_TIME)?;
            }
            Value::Binary(ref bytes) => {
                self.open(tag::BASE64)?;
                self.writer.write_all(STANDARD.encode(bytes).as_bytes())?;
                self.close(tag::BASE64)?;
            }
            Value::Array(ref items) => {
                self.open(tag::ARRAY)?;
                self.open(tag::DATA)?;
                for item in items {
                    self.write_value(item)?;
                }
                self.close(tag::DATA)?;
                self.close(tag::ARRAY)?;
            }
            Value::Struct(ref members) => self.write_struct(members)?,
        }
        self.close(tag::VALUE)?;
        Ok(())
    }

    fn write_struct(&mut self, members: &Object) -> EncodeResult {
        self.open(tag::STRUCT)?;
        for (name, value) in members {
            self.open(tag::MEMBER)?;
            self.open(tag::NAME)?;
            self.text(name)?;
            self.close(tag::NAME)?;
            self.write_value(value)?;
            self.close(tag::MEMBER)?;
        }
        self.close(tag::STRUCT)?;
        Ok(())
    }

    fn open(&mut self, tag: &str) -> io::Result<()> {
        write!(self.writer, "<{}>", tag)
    }

    fn close(&mut self, tag: &str) -> io::Result<()> {
        write!(self.writer, "</{}>", tag)
    }

    fn text(&mut self, s: &str) -> io::Result<()> {
        self.writer.write_all(escape_str_pcdata(s).as_bytes())
    }
}
