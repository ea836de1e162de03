// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

//! Serde bridge: turns any `Serialize` record into a [`Value`].
//!
//! Records become structs keyed by their serde field names, skipped fields
//! are left out, byte buffers become `base64`, and `None` or `()` become
//! `nil`. Maps must have string keys. Enum variants that carry data become
//! a one-member struct keyed by the variant name.

use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::ser::{self, Serialize};

use crate::error::EncodeError;
use super::value::{Object, Value};
use super::DATE_TIME_FORMAT;

/// Newtype name that marks a timestamp travelling through serde.
pub(crate) const DATE_TIME_TOKEN: &str = "$xmlrpc::private::DateTime";

impl ser::Error for EncodeError {
    fn custom<T: Display>(msg: T) -> Self {
        EncodeError::Unsupported(msg.to_string())
    }
}

/// Convert a `T` into a [`Value`].
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, EncodeError> {
    value.serialize(ValueSerializer)
}

/// `serialize_with` helper so `NaiveDateTime` fields go out as
/// `dateTime.iso8601` instead of a string.
pub fn datetime<S: ser::Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let text = dt.format(DATE_TIME_FORMAT).to_string();
    serializer.serialize_newtype_struct(DATE_TIME_TOKEN, &text)
}

impl Serialize for Value {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};

        match *self {
            Value::Nil => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(b),
            Value::Integer(n) => serializer.serialize_i64(n),
            Value::Double(n) => serializer.serialize_f64(n),
            Value::String(ref s) => serializer.serialize_str(s),
            Value::DateTime(ref dt) => datetime(dt, serializer),
            Value::Binary(ref bytes) => serializer.serialize_bytes(bytes),
            Value::Array(ref items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Struct(ref members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (name, value) in members {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = EncodeError;

    type SerializeSeq = SeqSerializer;
    type SerializeTuple = SeqSerializer;
    type SerializeTupleStruct = SeqSerializer;
    type SerializeTupleVariant = TupleVariantSerializer;
    type SerializeMap = MapSerializer;
    type SerializeStruct = StructSerializer;
    type SerializeStructVariant = StructVariantSerializer;

    fn serialize_bool(self, v: bool) -> Result<Value, EncodeError> {
        Ok(Value::Boolean(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, EncodeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, EncodeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, EncodeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, EncodeError> {
        Ok(Value::Integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, EncodeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, EncodeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, EncodeError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, EncodeError> {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| EncodeError::IntegerOutOfRange(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, EncodeError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, EncodeError> {
        Ok(Value::Double(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, EncodeError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, EncodeError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, EncodeError> {
        Ok(Value::Binary(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value, EncodeError> {
        Ok(Value::Nil)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, EncodeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, EncodeError> {
        Ok(Value::Nil)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, EncodeError> {
        Ok(Value::Nil)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, EncodeError> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Value, EncodeError> {
        if name != DATE_TIME_TOKEN {
            return value.serialize(self);
        }
        match value.serialize(self)? {
            Value::String(text) => NaiveDateTime::parse_from_str(&text, DATE_TIME_FORMAT)
                .map(Value::DateTime)
                .map_err(|e| EncodeError::Unsupported(format!("timestamp {:?}: {}", text, e))),
            other => Err(EncodeError::Unsupported(format!(
                "timestamp carried as <{}>",
                other.wire_tag()
            ))),
        }
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, EncodeError> {
        let mut members = Object::new();
        members.insert(variant.to_string(), value.serialize(self)?);
        Ok(Value::Struct(members))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqSerializer, EncodeError> {
        Ok(SeqSerializer {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqSerializer, EncodeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqSerializer, EncodeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<TupleVariantSerializer, EncodeError> {
        Ok(TupleVariantSerializer {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapSerializer, EncodeError> {
        Ok(MapSerializer {
            members: Object::new(),
            next_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<StructSerializer, EncodeError> {
        Ok(StructSerializer {
            members: Object::new(),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<StructVariantSerializer, EncodeError> {
        Ok(StructVariantSerializer {
            variant,
            members: Object::new(),
        })
    }
}

struct SeqSerializer {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SeqSerializer {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqSerializer {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqSerializer {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        ser::SerializeSeq::end(self)
    }
}

struct TupleVariantSerializer {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for TupleVariantSerializer {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, EncodeError> {
        let mut members = Object::new();
        members.insert(self.variant.to_string(), Value::Array(self.items));
        Ok(Value::Struct(members))
    }
}

struct MapSerializer {
    members: Object,
    next_key: Option<String>,
}

impl ser::SerializeMap for MapSerializer {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), EncodeError> {
        match to_value(key)? {
            Value::String(name) => {
                self.next_key = Some(name);
                Ok(())
            }
            other => Err(EncodeError::Unsupported(format!(
                "struct member names must be strings, got <{}>",
                other.wire_tag()
            ))),
        }
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        let name = self
            .next_key
            .take()
            .ok_or_else(|| EncodeError::Unsupported("map value without a key".to_string()))?;
        self.members.insert(name, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(Value::Struct(self.members))
    }
}

struct StructSerializer {
    members: Object,
}

impl ser::SerializeStruct for StructSerializer {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        self.members.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(Value::Struct(self.members))
    }
}

struct StructVariantSerializer {
    variant: &'static str,
    members: Object,
}

impl ser::SerializeStructVariant for StructVariantSerializer {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        self.members.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, EncodeError> {
        let mut outer = Object::new();
        outer.insert(self.variant.to_string(), Value::Struct(self.members));
        Ok(Value::Struct(outer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde::Serialize;
    use std::collections::{BTreeMap, HashMap};

    #[derive(Serialize)]
    struct Record {
        name: String,
        #[serde(rename = "type")]
        kind: String,
        ttl: u32,
        #[serde(skip)]
        #[allow(dead_code)]
        secret: String,
    }

    #[derive(Serialize)]
    struct Upload {
        #[serde(with = "raw_bytes")]
        payload: Vec<u8>,
        #[serde(serialize_with = "datetime")]
        stamp: NaiveDateTime,
        tags: Vec<&'static str>,
        note: Option<String>,
    }

    mod raw_bytes {
        pub fn serialize<S: serde::Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
            s.serialize_bytes(bytes)
        }
    }

    #[derive(Serialize)]
    enum Command {
        Stop,
        Move(i32),
        Jump(i32, i32),
        Rename { to: String },
    }

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(1998, 7, 17)
            .and_then(|d| d.and_hms_opt(14, 8, 55))
            .unwrap()
    }

    #[test]
    fn record_becomes_struct_without_skipped_fields() {
        let record = Record {
            name: "www".to_string(),
            kind: "A".to_string(),
            ttl: 300,
            secret: "hidden".to_string(),
        };
        let value = to_value(&record).unwrap();
        assert_eq!(value["name"], Value::String("www".into()));
        assert_eq!(value["type"], Value::String("A".into()));
        assert_eq!(value["ttl"], Value::Integer(300));
        assert!(value.find("secret").is_none());
        assert_eq!(value.as_struct().map(|m| m.len()), Some(3));
    }

    #[test]
    fn bytes_and_timestamps_take_precedence() {
        let upload = Upload {
            payload: b"you can't read this!".to_vec(),
            stamp: stamp(),
            tags: vec!["a", "b"],
            note: None,
        };
        let value = to_value(&upload).unwrap();
        assert_eq!(value["payload"], Value::Binary(b"you can't read this!".to_vec()));
        assert_eq!(value["stamp"], Value::DateTime(stamp()));
        assert_eq!(
            value["tags"],
            Value::Array(vec![Value::from("a"), Value::from("b")])
        );
        assert_eq!(value.find("note"), Some(&Value::Nil));
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Zone {
        zone_id: i64,
        #[serde(rename = "Type")]
        kind: String,
    }

    #[test]
    fn field_names_are_kept_as_serde_names_them() {
        let zone = Zone {
            zone_id: 1404,
            kind: "A".to_string(),
        };
        let value = to_value(&zone).unwrap();
        assert_eq!(value["zoneId"], Value::Integer(1404));
        assert_eq!(value["Type"], Value::from("A"));
        assert!(value.find("zoneid").is_none());
        assert!(value.find("type").is_none());
    }

    #[test]
    fn maps_need_string_keys() {
        let mut by_name = HashMap::new();
        by_name.insert("one", 1);
        assert_eq!(to_value(&by_name).unwrap()["one"], Value::Integer(1));

        let mut by_number = BTreeMap::new();
        by_number.insert(1, 1);
        match to_value(&by_number) {
            Err(EncodeError::Unsupported(msg)) => assert!(msg.contains("<int>")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn enum_variants() {
        assert_eq!(to_value(&Command::Stop).unwrap(), Value::from("Stop"));
        assert_eq!(to_value(&Command::Move(3)).unwrap()["Move"], Value::Integer(3));
        assert_eq!(
            to_value(&Command::Jump(1, 2)).unwrap()["Jump"],
            Value::Array(vec![Value::Integer(1), Value::Integer(2)])
        );
        assert_eq!(
            to_value(&Command::Rename { to: "x".into() }).unwrap()["Rename"]["to"],
            Value::from("x")
        );
    }

    #[test]
    fn large_unsigned_is_rejected() {
        assert!(matches!(
            to_value(&u64::MAX),
            Err(EncodeError::IntegerOutOfRange(u64::MAX))
        ));
    }

    #[test]
    fn value_serializes_to_itself() {
        let mut members = Object::new();
        members.insert("when".to_string(), Value::DateTime(stamp()));
        members.insert("blob".to_string(), Value::Binary(vec![0, 1, 2]));
        members.insert(
            "list".to_string(),
            Value::Array(vec![Value::Nil, Value::Boolean(false), Value::Double(1.5)]),
        );
        let value = Value::Struct(members);
        assert_eq!(to_value(&value).unwrap(), value);
    }
}
