// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use richsig::{
    AggregateDescriptor, EntropyStream, FieldDescriptor, Fill, PointerKind, PrimitiveKind,
    TypeKind,
};

#[derive(Fill, Default)]
pub struct Packet {
    pub id: u16,
    pub label: String,
    pub body: Vec<u8>,
    pub next: Option<Box<Packet>>,
    pub flags: Option<u8>,
    checksum: u32,
}

fn packet_kind(depth: usize) -> TypeKind {
    let next = if depth == 0 {
        TypeKind::pointer(
            PointerKind::Option,
            TypeKind::pointer(PointerKind::Box, packet_kind(depth + 1)),
        )
    } else {
        TypeKind::pointer(
            PointerKind::Option,
            TypeKind::Aggregate(AggregateDescriptor::opaque("Box<Packet>")),
        )
    };
    let field = |name: &str, visible: bool, kind: TypeKind| FieldDescriptor {
        name: name.to_string(),
        visible,
        kind,
    };
    TypeKind::Aggregate(AggregateDescriptor::with_fields(
        "Packet",
        vec![
            field("id", true, TypeKind::Primitive(PrimitiveKind::U16)),
            field("label", true, TypeKind::String),
            field("body", true, TypeKind::Bytes),
            field("next", true, next),
            field(
                "flags",
                true,
                TypeKind::pointer(PointerKind::Option, TypeKind::Primitive(PrimitiveKind::U8)),
            ),
            field("checksum", false, TypeKind::Primitive(PrimitiveKind::U32)),
        ],
    ))
}

fuzz_target!(|data: &[u8]| {
    // Compiled and dynamic decoders must draw the same bytes
    let mut compiled = EntropyStream::new(data);
    let packet = Packet::fill(&mut compiled);

    let mut dynamic = EntropyStream::new(data);
    let value = richsig::decode(&packet_kind(0), &mut dynamic);

    assert_eq!(compiled.consumed(), dynamic.consumed());
    assert_eq!(packet.checksum, 0);
    if let Some(next) = &packet.next {
        assert!(next.next.is_none());
        assert!(next.flags.is_none());
    }
    let _ = value.to_string();
});
