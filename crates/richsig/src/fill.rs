// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compiled decoders: the [`Fill`] trait and its implementations for the
//! primitive, variable-length and pointer types a harness can declare.
//!
//! Struct types get their implementation from `#[derive(Fill)]`.

use std::rc::Rc;
use std::sync::Arc;

use crate::stream::EntropyStream;

/// Build a value of `Self` from the front of an [`EntropyStream`].
///
/// Implementations never fail: an exhausted stream yields zero-valued
/// primitives and empty strings.
pub trait Fill: Sized {
    fn fill(stream: &mut EntropyStream<'_>) -> Self;
}

/// Generate `Fill` for fixed-width integers.
///
/// Every width draws one 64-bit word and truncates; 128-bit kinds get the
/// word zero-extended.
macro_rules! impl_fill_int {
    ($($type:ty),* $(,)?) => {
        $(
            impl Fill for $type {
                fn fill(stream: &mut EntropyStream<'_>) -> Self {
                    stream.draw_u64() as $type
                }
            }
        )*
    };
}

// A lone `u8` still draws a whole word; single-byte draws are reserved for
// length-prefixed content.
impl_fill_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Fill for bool {
    fn fill(stream: &mut EntropyStream<'_>) -> Self {
        stream.draw_u64() & 1 == 1
    }
}

impl Fill for f32 {
    fn fill(stream: &mut EntropyStream<'_>) -> Self {
        f32::from_bits(stream.draw_u64() as u32)
    }
}

impl Fill for f64 {
    fn fill(stream: &mut EntropyStream<'_>) -> Self {
        f64::from_bits(stream.draw_u64())
    }
}

impl Fill for char {
    fn fill(stream: &mut EntropyStream<'_>) -> Self {
        char::from_u32(stream.draw_u64() as u32).unwrap_or('\0')
    }
}

impl Fill for () {
    fn fill(_stream: &mut EntropyStream<'_>) -> Self {}
}

impl Fill for Vec<u8> {
    fn fill(stream: &mut EntropyStream<'_>) -> Self {
        stream.draw_len_prefixed()
    }
}

impl Fill for String {
    fn fill(stream: &mut EntropyStream<'_>) -> Self {
        let bytes = stream.draw_len_prefixed();
        match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

impl<T: Fill> Fill for Box<T> {
    fn fill(stream: &mut EntropyStream<'_>) -> Self {
        Box::new(stream.enter_pointee(T::fill))
    }
}

impl<T: Fill> Fill for Rc<T> {
    fn fill(stream: &mut EntropyStream<'_>) -> Self {
        Rc::new(stream.enter_pointee(T::fill))
    }
}

impl<T: Fill> Fill for Arc<T> {
    fn fill(stream: &mut EntropyStream<'_>) -> Self {
        Arc::new(stream.enter_pointee(T::fill))
    }
}

/// Top-level optionals are always present. Optionals met while decoding a
/// pointee are left empty and consume nothing, which bounds recursion
/// through `Option<Box<Self>>` links.
impl<T: Fill> Fill for Option<T> {
    fn fill(stream: &mut EntropyStream<'_>) -> Self {
        if stream.pointer_depth() > 0 {
            return None;
        }
        Some(stream.enter_pointee(T::fill))
    }
}
