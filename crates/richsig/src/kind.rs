// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for harness parameters.
//!
//! A [`TypeKind`] is computed once when a signature is analyzed. The
//! generator uses it to decide whether a parameter can be decoded at all;
//! the dynamic decoder walks it to explain what a corpus buffer means.

use std::fmt;

/// Fixed-width scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 16] = [
        Self::Bool,
        Self::Char,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::I128,
        Self::Isize,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::U128,
        Self::Usize,
        Self::F32,
        Self::F64,
    ];

    /// Map a Rust primitive type name (`"u32"`, `"f64"`, ...) to its kind.
    pub fn from_ident(ident: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == ident)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::I128 => "i128",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

/// Single-pointee wrappers the decoder follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Box,
    Option,
    Rc,
    Arc,
}

impl PointerKind {
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "Box" => Some(Self::Box),
            "Option" => Some(Self::Option),
            "Rc" => Some(Self::Rc),
            "Arc" => Some(Self::Arc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Box => "Box",
            Self::Option => "Option",
            Self::Rc => "Rc",
            Self::Arc => "Arc",
        }
    }

    /// Only `Option` can be absent.
    pub fn is_nullable(self) -> bool {
        matches!(self, Self::Option)
    }
}

/// One struct field, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    /// `pub` fields are decoded; all others take their default value.
    pub visible: bool,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateDescriptor {
    /// Type name as written in generated code.
    pub name: String,
    /// `None` when the definition was not available (foreign types, enums,
    /// recursion cut points).
    pub fields: Option<Vec<FieldDescriptor>>,
}

impl AggregateDescriptor {
    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: None,
        }
    }

    pub fn with_fields(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            fields: Some(fields),
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.fields.is_none()
    }
}

/// Decoding category of a parameter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    String,
    Bytes,
    Pointer {
        kind: PointerKind,
        pointee: Box<TypeKind>,
    },
    Aggregate(AggregateDescriptor),
    /// Sequence of anything other than bytes.
    Slice(Box<TypeKind>),
    /// Trait object or trait-bounded generic.
    Interface(String),
    Function(String),
}

impl TypeKind {
    pub fn pointer(kind: PointerKind, pointee: TypeKind) -> Self {
        Self::Pointer {
            kind,
            pointee: Box::new(pointee),
        }
    }

    /// First component that has no decoder, searching visible fields and
    /// pointees depth first.
    pub fn first_undecodable(&self) -> Option<&TypeKind> {
        match self {
            Self::Primitive(_) | Self::String | Self::Bytes => None,
            Self::Pointer { pointee, .. } => pointee.first_undecodable(),
            Self::Aggregate(agg) => agg
                .fields
                .iter()
                .flatten()
                .filter(|f| f.visible)
                .find_map(|f| f.kind.first_undecodable()),
            Self::Slice(_) | Self::Interface(_) | Self::Function(_) => Some(self),
        }
    }

    pub fn is_decodable(&self) -> bool {
        self.first_undecodable().is_none()
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.as_str()),
            Self::String => f.write_str("String"),
            Self::Bytes => f.write_str("Vec<u8>"),
            Self::Pointer { kind, pointee } => write!(f, "{}<{}>", kind.as_str(), pointee),
            Self::Aggregate(agg) => f.write_str(&agg.name),
            Self::Slice(elem) => write!(f, "[{}]", elem),
            Self::Interface(name) => write!(f, "dyn {}", name),
            Self::Function(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_ident_round_trip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_ident(kind.as_str()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_ident("str"), None);
    }

    #[test]
    fn test_hidden_fields_do_not_block_decoding() {
        let agg = AggregateDescriptor::with_fields(
            "Conn",
            vec![
                FieldDescriptor {
                    name: "port".into(),
                    visible: true,
                    kind: TypeKind::Primitive(PrimitiveKind::U16),
                },
                FieldDescriptor {
                    name: "sink".into(),
                    visible: false,
                    kind: TypeKind::Interface("Write".into()),
                },
            ],
        );
        assert!(TypeKind::Aggregate(agg).is_decodable());
    }

    #[test]
    fn test_visible_slice_field_is_reported() {
        let agg = AggregateDescriptor::with_fields(
            "Batch",
            vec![FieldDescriptor {
                name: "items".into(),
                visible: true,
                kind: TypeKind::Slice(Box::new(TypeKind::String)),
            }],
        );
        let kind = TypeKind::pointer(PointerKind::Option, TypeKind::Aggregate(agg));
        let bad = kind.first_undecodable().map(ToString::to_string);
        assert_eq!(bad.as_deref(), Some("[String]"));
    }

    #[test]
    fn test_display() {
        let kind = TypeKind::pointer(PointerKind::Box, TypeKind::Bytes);
        assert_eq!(kind.to_string(), "Box<Vec<u8>>");
        assert_eq!(TypeKind::Interface("Read".into()).to_string(), "dyn Read");
    }
}
