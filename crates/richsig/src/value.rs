// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoded value tree produced by [`crate::decode`].

use std::fmt;

use crate::kind::PointerKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Usize(usize),
    F32(f32),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// `None` only for an absent `Option`.
    Pointer(PointerKind, Option<Box<Value>>),
    Aggregate {
        name: String,
        fields: Vec<(String, Value)>,
    },
    /// Non-`pub` field left at its default.
    Default,
    /// Aggregate whose layout is unknown; nothing was consumed.
    Opaque(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{:?}", v),
            Value::I8(v) => write!(f, "{}_i8", v),
            Value::I16(v) => write!(f, "{}_i16", v),
            Value::I32(v) => write!(f, "{}_i32", v),
            Value::I64(v) => write!(f, "{}_i64", v),
            Value::I128(v) => write!(f, "{}_i128", v),
            Value::Isize(v) => write!(f, "{}_isize", v),
            Value::U8(v) => write!(f, "{}_u8", v),
            Value::U16(v) => write!(f, "{}_u16", v),
            Value::U32(v) => write!(f, "{}_u32", v),
            Value::U64(v) => write!(f, "{}_u64", v),
            Value::U128(v) => write!(f, "{}_u128", v),
            Value::Usize(v) => write!(f, "{}_usize", v),
            Value::F32(v) => write!(f, "{:?}_f32", v),
            Value::F64(v) => write!(f, "{:?}_f64", v),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => {
                f.write_str("b\"")?;
                for byte in b {
                    write!(f, "{}", std::ascii::escape_default(*byte))?;
                }
                f.write_str("\"")
            }
            Value::Pointer(PointerKind::Option, None) => f.write_str("None"),
            Value::Pointer(PointerKind::Option, Some(inner)) => write!(f, "Some({})", inner),
            Value::Pointer(kind, Some(inner)) => write!(f, "{}({})", kind.as_str(), inner),
            Value::Pointer(kind, None) => write!(f, "{}(?)", kind.as_str()),
            Value::Aggregate { name, fields } => {
                if fields.is_empty() {
                    return f.write_str(name);
                }
                write!(f, "{} {{ ", name)?;
                for (i, (field, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field, value)?;
                }
                f.write_str(" }")
            }
            Value::Default => f.write_str("<default>"),
            Value::Opaque(name) => write!(f, "<opaque {}>", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested() {
        let value = Value::Aggregate {
            name: "Frame".into(),
            fields: vec![
                ("id".into(), Value::U32(7)),
                ("payload".into(), Value::Bytes(vec![b'a', 0x00])),
                ("next".into(), Value::Pointer(PointerKind::Option, None)),
                ("cache".into(), Value::Default),
            ],
        };
        assert_eq!(
            value.to_string(),
            r#"Frame { id: 7_u32, payload: b"a\x00", next: None, cache: <default> }"#
        );
    }

    #[test]
    fn test_display_pointer() {
        let boxed = Value::Pointer(PointerKind::Box, Some(Box::new(Value::Str("hi".into()))));
        assert_eq!(boxed.to_string(), r#"Box("hi")"#);
        let some = Value::Pointer(PointerKind::Option, Some(Box::new(Value::F64(1.0))));
        assert_eq!(some.to_string(), "Some(1.0_f64)");
    }
}
