// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use proptest::prelude::*;

use richsig::{EntropyStream, Fill, PrimitiveKind, TypeKind};

proptest! {
    /// A length byte followed by enough content decodes to that content.
    #[test]
    fn len_prefixed_exact_consumption(
        content in prop::collection::vec(any::<u8>(), 0..=255),
        trailer in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let mut input = vec![content.len() as u8];
        input.extend_from_slice(&content);
        input.extend_from_slice(&trailer);

        let mut stream = EntropyStream::new(&input);
        let got = Vec::<u8>::fill(&mut stream);
        prop_assert_eq!(&got, &content);
        prop_assert_eq!(stream.consumed(), 1 + content.len());
        prop_assert_eq!(stream.remaining(), trailer.len());
    }

    /// Missing content bytes are zero-filled up to the declared length.
    #[test]
    fn len_prefixed_short_buffer_zero_fill(
        len in 1u8..=255,
        available in prop::collection::vec(any::<u8>(), 0..255),
    ) {
        prop_assume!(available.len() < usize::from(len));
        let mut input = vec![len];
        input.extend_from_slice(&available);

        let mut stream = EntropyStream::new(&input);
        let got = Vec::<u8>::fill(&mut stream);
        prop_assert_eq!(got.len(), usize::from(len));
        prop_assert_eq!(&got[..available.len()], &available[..]);
        prop_assert!(got[available.len()..].iter().all(|&b| b == 0));
        prop_assert!(stream.is_exhausted());
    }

    /// A short tail decodes as its zero-extended little-endian value.
    #[test]
    fn u64_short_tail_zero_extends(tail in prop::collection::vec(any::<u8>(), 1..8)) {
        let mut padded = [0u8; 8];
        padded[..tail.len()].copy_from_slice(&tail);

        let mut stream = EntropyStream::new(&tail);
        prop_assert_eq!(u64::fill(&mut stream), u64::from_le_bytes(padded));
        prop_assert!(stream.is_exhausted());
    }

    /// Once exhausted, every draw of every width is zero.
    #[test]
    fn exhaustion_is_stable(input in prop::collection::vec(any::<u8>(), 0..32), rounds in 1usize..64) {
        let mut stream = EntropyStream::new(&input);
        while !stream.is_exhausted() {
            stream.draw_byte();
        }
        for _ in 0..rounds {
            prop_assert_eq!(u8::fill(&mut stream), 0);
            prop_assert_eq!(i128::fill(&mut stream), 0);
            prop_assert_eq!(f64::fill(&mut stream).to_bits(), 0);
            prop_assert_eq!(String::fill(&mut stream), "");
            prop_assert_eq!(stream.draw_byte(), 0);
        }
        prop_assert_eq!(stream.consumed(), input.len());
    }

    /// Dynamic decoding of primitives consumes exactly what `Fill` does.
    #[test]
    fn dynamic_primitive_matches_fill(
        input in prop::collection::vec(any::<u8>(), 0..24),
        idx in 0usize..PrimitiveKind::ALL.len(),
    ) {
        let kind = PrimitiveKind::ALL[idx];
        let mut dynamic = EntropyStream::new(&input);
        richsig::decode(&TypeKind::Primitive(kind), &mut dynamic);

        let mut compiled = EntropyStream::new(&input);
        compiled.draw_u64();
        prop_assert_eq!(dynamic.consumed(), compiled.consumed());
    }
}

#[test]
fn test_u64_golden_word() {
    let input = 0xfeed_face_dead_beef_u64.to_le_bytes();
    let mut stream = EntropyStream::new(&input);
    assert_eq!(u64::fill(&mut stream), 0xfeed_face_dead_beef);

    let input = [0xef, 0xbe, 0xad, 0xde];
    let mut stream = EntropyStream::new(&input);
    assert_eq!(u64::fill(&mut stream), 0xdead_beef);
}
