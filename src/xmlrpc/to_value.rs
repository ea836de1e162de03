// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

//! Classification of host values into wire values.
//!
//! Every type that can be sent as an argument implements [`ToValue`]. The
//! set of implementations is closed at compile time; there is no runtime
//! inspection. Records with named fields go through [`to_value`] instead,
//! which walks them with serde.
//!
//! [`to_value`]: super::ser::to_value

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use chrono::{DateTime, NaiveDateTime, TimeZone};

use crate::error::EncodeError;
use super::value::{Object, Value};

/// A trait for converting values to XML-RPC values
pub trait ToValue {
    /// Converts the value of `self` to a [`Value`]
    fn to_value(&self) -> Result<Value, EncodeError>;
}

/// A byte sequence sent as `base64` rather than as an array of integers.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bytes<'a>(pub &'a [u8]);

macro_rules! to_value_impl_signed {
    ($($t:ty),+) => (
        $(impl ToValue for $t {
            fn to_value(&self) -> Result<Value, EncodeError> { Ok(Value::Integer(*self as i64)) }
        })+
    )
}

macro_rules! to_value_impl_unsigned {
    ($($t:ty),+) => (
        $(impl ToValue for $t {
            fn to_value(&self) -> Result<Value, EncodeError> {
                i64::try_from(*self)
                    .map(Value::Integer)
                    .map_err(|_| EncodeError::IntegerOutOfRange(*self as u64))
            }
        })+
    )
}

to_value_impl_signed! { isize, i8, i16, i32, i64 }
to_value_impl_unsigned! { usize, u8, u16, u32, u64 }

impl ToValue for Value {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(self.clone())
    }
}

impl ToValue for () {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::Nil)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::Boolean(*self))
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::Double(f64::from(*self)))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::Double(*self))
    }
}

impl ToValue for char {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::String(self.to_string()))
    }
}

impl ToValue for str {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::String(self.to_string()))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::String(self.clone()))
    }
}

impl<'a> ToValue for Bytes<'a> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::Binary(self.0.to_vec()))
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::DateTime(*self))
    }
}

/// Timestamps are sent as the wall-clock time of their own offset.
impl<Tz: TimeZone> ToValue for DateTime<Tz> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        Ok(Value::DateTime(self.naive_local()))
    }
}

impl<'a, T: ToValue + ?Sized> ToValue for &'a T {
    fn to_value(&self) -> Result<Value, EncodeError> {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        match *self {
            None => Ok(Value::Nil),
            Some(ref value) => value.to_value(),
        }
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Result<Value, EncodeError> {
        self.iter()
            .map(ToValue::to_value)
            .collect::<Result<_, _>>()
            .map(Value::Array)
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        self.as_slice().to_value()
    }
}

macro_rules! tuple_impl {
    // use variables to indicate the arity of the tuple
    ($($tyvar:ident),* ) => {
        // the trailing commas are for the 1 tuple
        impl<
            $( $tyvar : ToValue ),*
            > ToValue for ( $( $tyvar ),* , ) {

            #[inline]
            #[allow(non_snake_case)]
            fn to_value(&self) -> Result<Value, EncodeError> {
                let ($(ref $tyvar),*,) = *self;
                Ok(Value::Array(vec![$($tyvar.to_value()?),*]))
            }
        }
    }
}

tuple_impl!{A}
tuple_impl!{A, B}
tuple_impl!{A, B, C}
tuple_impl!{A, B, C, D}
tuple_impl!{A, B, C, D, E}
tuple_impl!{A, B, C, D, E, F}
tuple_impl!{A, B, C, D, E, F, G}
tuple_impl!{A, B, C, D, E, F, G, H}

fn members<'a, K, V, I>(entries: I) -> Result<Value, EncodeError>
where
    K: AsRef<str> + 'a,
    V: ToValue + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    let mut d = Object::new();
    for (key, value) in entries {
        d.insert(key.as_ref().to_string(), value.to_value()?);
    }
    Ok(Value::Struct(d))
}

/// Map keys are emitted as-is.
impl<K: AsRef<str>, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        members(self.iter())
    }
}

impl<K: AsRef<str>, V: ToValue, S: BuildHasher> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Result<Value, EncodeError> {
        members(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn integer_family_is_signed_decimal() {
        assert_eq!(7u8.to_value().unwrap(), Value::Integer(7));
        assert_eq!((-7i16).to_value().unwrap(), Value::Integer(-7));
        assert_eq!(u64::from(u32::MAX).to_value().unwrap(), Value::Integer(4294967295));
        assert_eq!((i64::MAX as u64).to_value().unwrap(), Value::Integer(i64::MAX));
    }

    #[test]
    fn unsigned_beyond_i64_is_rejected() {
        match u64::MAX.to_value() {
            Err(EncodeError::IntegerOutOfRange(n)) => assert_eq!(n, u64::MAX),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bytes_are_binary_but_vectors_are_arrays() {
        let raw = [1u8, 2, 3];
        assert_eq!(Bytes(&raw).to_value().unwrap(), Value::Binary(vec![1, 2, 3]));
        assert_eq!(
            raw.to_vec().to_value().unwrap(),
            Value::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );
    }

    #[test]
    fn timestamps_are_datetime() {
        let naive = NaiveDate::from_ymd_opt(1998, 7, 17)
            .and_then(|d| d.and_hms_opt(14, 8, 55))
            .unwrap();
        assert_eq!(naive.to_value().unwrap(), Value::DateTime(naive));
        assert_eq!(
            Utc.from_utc_datetime(&naive).to_value().unwrap(),
            Value::DateTime(naive)
        );
    }

    #[test]
    fn options_tuples_and_maps() {
        assert_eq!(None::<i32>.to_value().unwrap(), Value::Nil);
        assert_eq!(Some("x").to_value().unwrap(), Value::String("x".into()));
        assert_eq!(
            (1, "two", 3.0).to_value().unwrap(),
            Value::Array(vec![Value::Integer(1), "two".into(), Value::Double(3.0)])
        );

        let mut map = HashMap::new();
        map.insert("one", 1);
        map.insert("two", 2);
        let value = map.to_value().unwrap();
        assert_eq!(value["one"], Value::Integer(1));
        assert_eq!(value["two"], Value::Integer(2));
        assert_eq!(value.as_struct().map(|m| m.len()), Some(2));
    }

    #[test]
    fn nested_errors_propagate() {
        let nested = vec![vec![1u64], vec![u64::MAX]];
        assert!(nested.to_value().is_err());
    }
}
