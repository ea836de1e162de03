// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

use std::collections::BTreeMap;
use std::ops::Index;
use std::{fmt, io, str};

use chrono::NaiveDateTime;

use super::encoding::Encoder;
use super::tag;

/// Represents an XML-RPC data value
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    DateTime(NaiveDateTime),
    Binary(Vec<u8>),
    Array(Array),
    Struct(Object),
}

pub type Array = Vec<Value>;
pub type Object = BTreeMap<String, Value>;

static NIL: Value = Value::Nil;

impl Value {
    /// The wire tag this value is written with.
    pub fn wire_tag(&self) -> &'static str {
        match *self {
            Value::Nil => tag::NIL,
            Value::Boolean(_) => tag::BOOLEAN,
            Value::Integer(_) => tag::INT,
            Value::Double(_) => tag::DOUBLE,
            Value::String(_) => tag::STRING,
            Value::DateTime(_) => tag::DATE_TIME,
            Value::Binary(_) => tag::BASE64,
            Value::Array(_) => tag::ARRAY,
            Value::Struct(_) => tag::STRUCT,
        }
    }

    /// If the value is a Struct, returns the value associated with the provided key.
    /// Otherwise, returns None.
    pub fn find<'a>(&'a self, key: &str) -> Option<&'a Value> {
        match *self {
            Value::Struct(ref map) => map.get(key),
            _ => None,
        }
    }

    /// Attempts to get a nested Struct for each key in `keys`.
    /// If any key is found not to exist, find_path will return None.
    /// Otherwise, it will return the value associated with the final key.
    pub fn find_path<'a>(&'a self, keys: &[&str]) -> Option<&'a Value> {
        let mut target = self;
        for key in keys {
            target = target.find(key)?;
        }
        Some(target)
    }

    /// If the value is a Struct, performs a depth-first search until
    /// a value associated with the provided key is found. If no value is found
    /// or the value is not a Struct, returns None.
    pub fn search<'a>(&'a self, key: &str) -> Option<&'a Value> {
        match *self {
            Value::Struct(ref map) => map
                .get(key)
                .or_else(|| map.values().filter_map(|v| v.search(key)).next()),
            _ => None,
        }
    }

    pub fn is_struct(&self) -> bool {
        self.as_struct().is_some()
    }

    pub fn as_struct(&self) -> Option<&Object> {
        match *self {
            Value::Struct(ref map) => Some(map),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        self.as_array().is_some()
    }

    pub fn as_array(&self) -> Option<&Array> {
        match *self {
            Value::Array(ref array) => Some(array),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::String(ref s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    /// Doubles as-is, integers widened to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Integer(n) => Some(n as f64),
            Value::Double(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match *self {
            Value::Binary(ref bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&NaiveDateTime> {
        match *self {
            Value::DateTime(ref dt) => Some(dt),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(*self, Value::Nil)
    }
}

impl<'a> Index<&'a str> for Value {
    type Output = Value;

    /// Missing members and non-struct values index to `Nil`.
    fn index(&self, key: &str) -> &Value {
        self.find(key).unwrap_or(&NIL)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    /// Out-of-range positions and non-array values index to `Nil`.
    fn index(&self, idx: usize) -> &Value {
        self.as_array().and_then(|v| v.get(idx)).unwrap_or(&NIL)
    }
}

macro_rules! from_impl {
    ($($t:ty => $variant:ident),+ $(,)?) => (
        $(impl From<$t> for Value {
            fn from(v: $t) -> Value { Value::$variant(v.into()) }
        })+
    )
}

from_impl! {
    bool => Boolean,
    i8 => Integer,
    i16 => Integer,
    i32 => Integer,
    i64 => Integer,
    u8 => Integer,
    u16 => Integer,
    u32 => Integer,
    f32 => Double,
    f64 => Double,
    String => String,
    &str => String,
    NaiveDateTime => DateTime,
    Array => Array,
    Object => Struct,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Value {
        v.map_or(Value::Nil, Into::into)
    }
}

struct FormatShim<'a, 'b: 'a> {
    inner: &'a mut fmt::Formatter<'b>,
}

impl<'a, 'b> io::Write for FormatShim<'a, 'b> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.inner
            .write_str(s)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Display for Value {
    /// Renders the value as its `<value>` XML element
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut shim = FormatShim { inner: f };
        Encoder::new(&mut shim)
            .write_value(self)
            .map_err(|_| fmt::Error)
    }
}
