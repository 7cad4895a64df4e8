// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic decoder over [`TypeKind`] descriptors.
//!
//! Consumes entropy exactly like the compiled [`Fill`] implementations of the
//! described types, so a corpus buffer can be explained without compiling a
//! harness.

use crate::fill::Fill;
use crate::kind::{PrimitiveKind, TypeKind};
use crate::stream::EntropyStream;
use crate::value::Value;

/// Decode one value of the described type.
///
/// # Panics
///
/// Panics on [`TypeKind::Slice`], [`TypeKind::Interface`] and
/// [`TypeKind::Function`]. These have no decoder; callers are expected to
/// reject them with [`TypeKind::is_decodable`] first.
pub fn decode(kind: &TypeKind, stream: &mut EntropyStream<'_>) -> Value {
    match kind {
        TypeKind::Primitive(p) => decode_primitive(*p, stream),
        TypeKind::String => Value::Str(String::fill(stream)),
        TypeKind::Bytes => Value::Bytes(Vec::<u8>::fill(stream)),
        TypeKind::Pointer { kind, pointee } => {
            if kind.is_nullable() && stream.pointer_depth() > 0 {
                return Value::Pointer(*kind, None);
            }
            let inner = stream.enter_pointee(|s| decode(pointee, s));
            Value::Pointer(*kind, Some(Box::new(inner)))
        }
        TypeKind::Aggregate(agg) => match &agg.fields {
            None => Value::Opaque(agg.name.clone()),
            Some(fields) => Value::Aggregate {
                name: agg.name.clone(),
                fields: fields
                    .iter()
                    .map(|field| {
                        let value = if field.visible {
                            decode(&field.kind, stream)
                        } else {
                            Value::Default
                        };
                        (field.name.clone(), value)
                    })
                    .collect(),
            },
        },
        TypeKind::Slice(_) | TypeKind::Interface(_) | TypeKind::Function(_) => {
            panic!("no decoder for parameter type `{}`", kind)
        }
    }
}

/// Decode a whole parameter list from one buffer, in order.
pub fn decode_all(kinds: &[TypeKind], input: &[u8]) -> Vec<Value> {
    let mut stream = EntropyStream::new(input);
    let values = kinds.iter().map(|k| decode(k, &mut stream)).collect();
    log::debug!(
        "[decode] {} values from {} bytes ({} unused)",
        kinds.len(),
        stream.consumed() + stream.remaining(),
        stream.remaining()
    );
    values
}

fn decode_primitive(kind: PrimitiveKind, stream: &mut EntropyStream<'_>) -> Value {
    match kind {
        PrimitiveKind::Bool => Value::Bool(Fill::fill(stream)),
        PrimitiveKind::Char => Value::Char(Fill::fill(stream)),
        PrimitiveKind::I8 => Value::I8(Fill::fill(stream)),
        PrimitiveKind::I16 => Value::I16(Fill::fill(stream)),
        PrimitiveKind::I32 => Value::I32(Fill::fill(stream)),
        PrimitiveKind::I64 => Value::I64(Fill::fill(stream)),
        PrimitiveKind::I128 => Value::I128(Fill::fill(stream)),
        PrimitiveKind::Isize => Value::Isize(Fill::fill(stream)),
        PrimitiveKind::U8 => Value::U8(Fill::fill(stream)),
        PrimitiveKind::U16 => Value::U16(Fill::fill(stream)),
        PrimitiveKind::U32 => Value::U32(Fill::fill(stream)),
        PrimitiveKind::U64 => Value::U64(Fill::fill(stream)),
        PrimitiveKind::U128 => Value::U128(Fill::fill(stream)),
        PrimitiveKind::Usize => Value::Usize(Fill::fill(stream)),
        PrimitiveKind::F32 => Value::F32(Fill::fill(stream)),
        PrimitiveKind::F64 => Value::F64(Fill::fill(stream)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{AggregateDescriptor, FieldDescriptor, PointerKind};

    fn field(name: &str, visible: bool, kind: TypeKind) -> FieldDescriptor {
        FieldDescriptor {
            name: name.into(),
            visible,
            kind,
        }
    }

    /// `struct Node { pub val: i32, pub next: Option<Box<Node>> }` with the
    /// recursion cut at the inner `Node`.
    fn node_kind() -> TypeKind {
        TypeKind::Aggregate(AggregateDescriptor::with_fields(
            "Node",
            vec![
                field("val", true, TypeKind::Primitive(PrimitiveKind::I32)),
                field(
                    "next",
                    true,
                    TypeKind::pointer(
                        PointerKind::Option,
                        TypeKind::pointer(
                            PointerKind::Box,
                            TypeKind::Aggregate(AggregateDescriptor::opaque("Node")),
                        ),
                    ),
                ),
            ],
        ))
    }

    #[test]
    fn test_decode_primitive_list() {
        let mut input = vec![0x42, 0, 0, 0, 0, 0, 0, 0];
        input.extend_from_slice(&[0x02, b'o', b'k']);
        let values = decode_all(
            &[TypeKind::Primitive(PrimitiveKind::I32), TypeKind::String],
            &input,
        );
        assert_eq!(values, vec![Value::I32(0x42), Value::Str("ok".into())]);
    }

    #[test]
    fn test_decode_hidden_field_consumes_nothing() {
        let kind = TypeKind::Aggregate(AggregateDescriptor::with_fields(
            "Pair",
            vec![
                field("secret", false, TypeKind::Primitive(PrimitiveKind::U64)),
                field("open", true, TypeKind::Primitive(PrimitiveKind::U8)),
            ],
        ));
        let input = [9u8];
        let mut stream = EntropyStream::new(&input);
        let value = decode(&kind, &mut stream);
        assert_eq!(
            value,
            Value::Aggregate {
                name: "Pair".into(),
                fields: vec![
                    ("secret".into(), Value::Default),
                    ("open".into(), Value::U8(9)),
                ],
            }
        );
    }

    #[test]
    fn test_decode_option_inside_pointee_is_none() {
        let kind = TypeKind::pointer(PointerKind::Option, node_kind());
        let input = [5u8; 32];
        let mut stream = EntropyStream::new(&input);
        let value = decode(&kind, &mut stream);
        assert_eq!(value.to_string(), "Some(Node { val: 84215045_i32, next: None })");
        assert_eq!(stream.consumed(), 8);
    }

    #[test]
    fn test_decode_opaque_consumes_nothing() {
        let kind = TypeKind::Aggregate(AggregateDescriptor::opaque("Duration"));
        let input = [1u8; 4];
        let mut stream = EntropyStream::new(&input);
        assert_eq!(decode(&kind, &mut stream), Value::Opaque("Duration".into()));
        assert_eq!(stream.remaining(), 4);
    }

    #[test]
    #[should_panic(expected = "no decoder")]
    fn test_decode_interface_panics() {
        let mut stream = EntropyStream::new(&[]);
        decode(&TypeKind::Interface("Read".into()), &mut stream);
    }
}
