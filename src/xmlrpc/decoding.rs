// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

//! Token-driven recursive-descent decoder.
//!
//! Each grammar production has its own `read_*` method. A method is entered
//! right after the start element of its scope was consumed and returns once
//! the matching end element was seen; any other end element is an error.

use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDateTime;
use log::trace;
use xml::reader::{EventReader, ParserConfig, XmlEvent};

use crate::error::DecodeError;
use super::protocol::{Fault, MethodCall, MethodResponse};
use super::value::{Object, Value};
use super::{tag, DATE_TIME_FORMAT};

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Also accepted on input, never written.
const DATE_TIME_FORMAT_DASHED: &str = "%Y-%m-%dT%H:%M:%S";

/// A streaming XML event, reduced to what the grammar needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Start(String),
    End(String),
    Text(String),
}

/// A source of [`Token`]s in document order.
pub trait TokenSource {
    /// The next token, or `None` once the document is exhausted.
    fn next_token(&mut self) -> DecodeResult<Option<Token>>;
}

impl TokenSource for std::vec::IntoIter<Token> {
    fn next_token(&mut self) -> DecodeResult<Option<Token>> {
        Ok(self.next())
    }
}

/// [`TokenSource`] over an xml-rs reader.
///
/// Namespaces are ignored, CDATA is character data, comments and
/// processing instructions are dropped.
pub struct XmlTokens<R: Read> {
    parser: EventReader<R>,
    finished: bool,
}

impl<R: Read> XmlTokens<R> {
    pub fn new(source: R) -> XmlTokens<R> {
        let config = ParserConfig::new()
            .trim_whitespace(false)
            .whitespace_to_characters(true)
            .cdata_to_characters(true)
            .coalesce_characters(true)
            .ignore_comments(true);
        XmlTokens {
            parser: EventReader::new_with_config(source, config),
            finished: false,
        }
    }
}

impl<R: Read> TokenSource for XmlTokens<R> {
    fn next_token(&mut self) -> DecodeResult<Option<Token>> {
        while !self.finished {
            match self.parser.next()? {
                XmlEvent::StartElement { name, .. } => return Ok(Some(Token::Start(name.local_name))),
                XmlEvent::EndElement { name } => return Ok(Some(Token::End(name.local_name))),
                XmlEvent::Characters(s) | XmlEvent::CData(s) | XmlEvent::Whitespace(s) => {
                    return Ok(Some(Token::Text(s)))
                }
                XmlEvent::EndDocument => self.finished = true,
                _ => {}
            }
        }
        Ok(None)
    }
}

/// Decode a `methodResponse` document.
pub fn decode_response<R: Read>(source: R) -> DecodeResult<MethodResponse> {
    Decoder::new(XmlTokens::new(source)).response()
}

/// Decode a `methodCall` document.
pub fn decode_call<R: Read>(source: R) -> DecodeResult<MethodCall> {
    Decoder::new(XmlTokens::new(source)).call()
}

/// Decode a document whose root is a single `<value>` element.
pub fn decode_value<R: Read>(source: R) -> DecodeResult<Value> {
    Decoder::new(XmlTokens::new(source)).value()
}

/// A structure to decode XML-RPC documents from a [`TokenSource`].
pub struct Decoder<S> {
    source: S,
}

fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// Error for `token` showing up where `expected` was due, inside `scope`.
fn unexpected(token: Token, scope: &str, expected: &str) -> DecodeError {
    match token {
        Token::Start(found) => DecodeError::UnexpectedElement {
            found,
            expected: expected.to_string(),
        },
        Token::End(found) => {
            if found == scope {
                DecodeError::UnexpectedEnd {
                    found,
                    expected: expected.to_string(),
                }
            } else {
                DecodeError::TagMismatch {
                    found,
                    expected: scope.to_string(),
                }
            }
        }
        Token::Text(text) => DecodeError::UnexpectedText {
            text,
            expected: expected.to_string(),
        },
    }
}

impl<S: TokenSource> Decoder<S> {
    pub fn new(source: S) -> Decoder<S> {
        Decoder { source }
    }

    /// Reads a whole `methodResponse` document.
    pub fn response(mut self) -> DecodeResult<MethodResponse> {
        self.expect_start(tag::METHOD_RESPONSE, "", "<methodResponse>")?;
        let response = self.read_response()?;
        self.expect_end_of_document()?;
        match response {
            MethodResponse::Params(ref params) => trace!("decoded methodResponse with {} params", params.len()),
            MethodResponse::Fault(ref fault) => trace!("decoded methodResponse fault {}", fault.code()),
        }
        Ok(response)
    }

    /// Reads a whole `methodCall` document. A missing `<params>` means no
    /// arguments.
    pub fn call(mut self) -> DecodeResult<MethodCall> {
        self.expect_start(tag::METHOD_CALL, "", "<methodCall>")?;
        self.expect_start(tag::METHOD_NAME, tag::METHOD_CALL, "<methodName>")?;
        let method = self.read_text(tag::METHOD_NAME)?;
        let params = match self.next_structural("<params> or </methodCall>")? {
            Token::Start(ref name) if name == tag::PARAMS => {
                let params = self.read_params()?;
                self.expect_end(tag::METHOD_CALL)?;
                params
            }
            Token::End(ref name) if name == tag::METHOD_CALL => Vec::new(),
            other => return Err(unexpected(other, tag::METHOD_CALL, "<params> or </methodCall>")),
        };
        self.expect_end_of_document()?;
        trace!("decoded methodCall {} with {} params", method, params.len());
        Ok(MethodCall { method, params })
    }

    /// Reads a document made of one `<value>` element.
    pub fn value(mut self) -> DecodeResult<Value> {
        self.expect_start(tag::VALUE, "", "<value>")?;
        let value = self.read_value()?;
        self.expect_end_of_document()?;
        Ok(value)
    }

    fn next(&mut self, expected: &str) -> DecodeResult<Token> {
        self.source
            .next_token()?
            .ok_or_else(|| DecodeError::UnexpectedEof {
                expected: expected.to_string(),
            })
    }

    /// Next token that is not blank character data. Non-blank character
    /// data is an error here.
    fn next_structural(&mut self, expected: &str) -> DecodeResult<Token> {
        loop {
            match self.next(expected)? {
                Token::Text(ref text) if is_blank(text) => continue,
                Token::Text(text) => {
                    return Err(DecodeError::UnexpectedText {
                        text,
                        expected: expected.to_string(),
                    })
                }
                token => return Ok(token),
            }
        }
    }

    fn expect_start(&mut self, name: &str, scope: &str, expected: &str) -> DecodeResult<()> {
        match self.next_structural(expected)? {
            Token::Start(ref found) if found == name => Ok(()),
            other => Err(unexpected(other, scope, expected)),
        }
    }

    fn expect_end(&mut self, name: &str) -> DecodeResult<()> {
        match self.next_structural(&format!("</{}>", name))? {
            Token::End(ref found) if found == name => Ok(()),
            Token::End(found) => Err(DecodeError::TagMismatch {
                found,
                expected: name.to_string(),
            }),
            other => Err(unexpected(other, name, &format!("</{}>", name))),
        }
    }

    fn expect_end_of_document(&mut self) -> DecodeResult<()> {
        while let Some(token) = self.source.next_token()? {
            match token {
                Token::Text(ref text) if is_blank(text) => {}
                Token::Start(name) | Token::End(name) => return Err(DecodeError::TrailingContent(name)),
                Token::Text(text) => {
                    return Err(DecodeError::UnexpectedText {
                        text,
                        expected: "end of document".to_string(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Character data up to the end element `name`. Child elements are an
    /// error.
    fn read_text(&mut self, name: &str) -> DecodeResult<String> {
        let mut text = String::new();
        loop {
            match self.next(&format!("</{}>", name))? {
                Token::Text(t) => text.push_str(&t),
                Token::End(ref found) if found == name => return Ok(text),
                Token::End(found) => {
                    return Err(DecodeError::TagMismatch {
                        found,
                        expected: name.to_string(),
                    })
                }
                Token::Start(found) => {
                    return Err(DecodeError::UnexpectedElement {
                        found,
                        expected: format!("character data or </{}>", name),
                    })
                }
            }
        }
    }

    fn read_response(&mut self) -> DecodeResult<MethodResponse> {
        let expected = "<params> or <fault>";
        let response = match self.next_structural(expected)? {
            Token::Start(ref name) if name == tag::PARAMS => MethodResponse::Params(self.read_params()?),
            Token::Start(ref name) if name == tag::FAULT => MethodResponse::Fault(self.read_fault()?),
            Token::End(ref name) if name == tag::METHOD_RESPONSE => return Err(DecodeError::EmptyResponse),
            other => return Err(unexpected(other, tag::METHOD_RESPONSE, expected)),
        };
        self.expect_end(tag::METHOD_RESPONSE)?;
        Ok(response)
    }

    fn read_params(&mut self) -> DecodeResult<Vec<Value>> {
        let expected = "<param> or </params>";
        let mut params = Vec::new();
        loop {
            match self.next_structural(expected)? {
                Token::Start(ref name) if name == tag::PARAM => params.push(self.read_param()?),
                Token::End(ref name) if name == tag::PARAMS => return Ok(params),
                other => return Err(unexpected(other, tag::PARAMS, expected)),
            }
        }
    }

    fn read_param(&mut self) -> DecodeResult<Value> {
        self.expect_start(tag::VALUE, tag::PARAM, "<value>")?;
        let value = self.read_value()?;
        self.expect_end(tag::PARAM)?;
        Ok(value)
    }

    fn read_fault(&mut self) -> DecodeResult<Fault> {
        self.expect_start(tag::VALUE, tag::FAULT, "<value>")?;
        let value = self.read_value()?;
        self.expect_end(tag::FAULT)?;
        Fault::from_value(value)
    }

    /// Untyped character data directly inside `<value>` is a string.
    fn read_value(&mut self) -> DecodeResult<Value> {
        let mut text = String::new();
        loop {
            match self.next("a value type or </value>")? {
                Token::Text(t) => text.push_str(&t),
                Token::Start(name) => {
                    if !is_blank(&text) {
                        return Err(DecodeError::UnexpectedText {
                            text,
                            expected: format!("<{}> alone inside <value>", name),
                        });
                    }
                    let value = self.read_typed(&name)?;
                    self.expect_end(tag::VALUE)?;
                    return Ok(value);
                }
                Token::End(ref name) if name == tag::VALUE => return Ok(Value::String(text)),
                Token::End(found) => {
                    return Err(DecodeError::TagMismatch {
                        found,
                        expected: tag::VALUE.to_string(),
                    })
                }
            }
        }
    }

    fn read_typed(&mut self, name: &str) -> DecodeResult<Value> {
        match name {
            tag::STRUCT => self.read_struct(),
            tag::ARRAY => self.read_array(),
            tag::INT | tag::I4 => self.read_integer(name),
            tag::STRING => self.read_text(tag::STRING).map(Value::String),
            tag::DOUBLE => self.read_double(),
            tag::BOOLEAN => self.read_boolean(),
            tag::DATE_TIME => self.read_datetime(),
            tag::BASE64 => self.read_base64(),
            tag::NIL => self.read_nil(),
            other => Err(DecodeError::UnknownValueType(other.to_string())),
        }
    }

    fn read_integer(&mut self, name: &str) -> DecodeResult<Value> {
        let text = self.read_text(name)?;
        text.trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| DecodeError::InvalidInteger(text))
    }

    fn read_double(&mut self) -> DecodeResult<Value> {
        let text = self.read_text(tag::DOUBLE)?;
        // NaN and infinities have no wire literal.
        match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Value::Double(n)),
            _ => Err(DecodeError::InvalidDouble(text)),
        }
    }

    /// `1` is true, anything else is false.
    fn read_boolean(&mut self) -> DecodeResult<Value> {
        let text = self.read_text(tag::BOOLEAN)?;
        Ok(Value::Boolean(text.trim() == "1"))
    }

    fn read_datetime(&mut self) -> DecodeResult<Value> {
        let text = self.read_text(tag::DATE_TIME)?;
        let trimmed = text.trim();
        NaiveDateTime::parse_from_str(trimmed, DATE_TIME_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(trimmed, DATE_TIME_FORMAT_DASHED))
            .map(Value::DateTime)
            .map_err(|_| DecodeError::InvalidDateTime(text))
    }

    fn read_base64(&mut self) -> DecodeResult<Value> {
        let text = self.read_text(tag::BASE64)?;
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(compact.as_bytes())
            .map(Value::Binary)
            .map_err(|_| DecodeError::InvalidBase64(text))
    }

    fn read_nil(&mut self) -> DecodeResult<Value> {
        let text = self.read_text(tag::NIL)?;
        if is_blank(&text) {
            Ok(Value::Nil)
        } else {
            Err(DecodeError::UnexpectedText {
                text,
                expected: "</nil>".to_string(),
            })
        }
    }

    fn read_struct(&mut self) -> DecodeResult<Value> {
        let expected = "<member> or </struct>";
        let mut members = Object::new();
        loop {
            match self.next_structural(expected)? {
                Token::Start(ref name) if name == tag::MEMBER => {
                    let (name, value) = self.read_member()?;
                    members.insert(name, value);
                }
                Token::End(ref name) if name == tag::STRUCT => return Ok(Value::Struct(members)),
                other => return Err(unexpected(other, tag::STRUCT, expected)),
            }
        }
    }

    /// `<name>` must come strictly before `<value>`; each appears once.
    fn read_member(&mut self) -> DecodeResult<(String, Value)> {
        let mut name: Option<String> = None;
        let mut value: Option<Value> = None;
        loop {
            let expected = if name.is_none() {
                "<name>"
            } else if value.is_none() {
                "<value>"
            } else {
                "</member>"
            };
            match self.next_structural(expected)? {
                Token::Start(ref found) if found == tag::NAME && name.is_none() => {
                    name = Some(self.read_text(tag::NAME)?);
                }
                Token::Start(ref found) if found == tag::VALUE && name.is_none() => {
                    return Err(DecodeError::MissingMemberName);
                }
                Token::Start(ref found) if found == tag::VALUE && value.is_none() => {
                    value = Some(self.read_value()?);
                }
                Token::End(ref found) if found == tag::MEMBER => {
                    let name = name.ok_or(DecodeError::MissingMemberName)?;
                    return match value {
                        Some(value) => Ok((name, value)),
                        None => Err(DecodeError::MissingMemberValue(name)),
                    };
                }
                other => return Err(unexpected(other, tag::MEMBER, expected)),
            }
        }
    }

    fn read_array(&mut self) -> DecodeResult<Value> {
        self.expect_start(tag::DATA, tag::ARRAY, "<data>")?;
        let items = self.read_data()?;
        self.expect_end(tag::ARRAY)?;
        Ok(Value::Array(items))
    }

    fn read_data(&mut self) -> DecodeResult<Vec<Value>> {
        let expected = "<value> or </data>";
        let mut items = Vec::new();
        loop {
            match self.next_structural(expected)? {
                Token::Start(ref name) if name == tag::VALUE => items.push(self.read_value()?),
                Token::End(ref name) if name == tag::DATA => return Ok(items),
                other => return Err(unexpected(other, tag::DATA, expected)),
            }
        }
    }
}
