// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # richsig - structured decoding of fuzzer input
//!
//! Coverage-guided fuzzers hand a target one opaque byte buffer. `richsig`
//! turns that buffer into the arguments of an arbitrary Rust signature, so
//! functions taking strings, integers, optionals and plain structs can be
//! fuzzed directly.
//!
//! ## Quick Start
//!
//! ```rust
//! use richsig::{EntropyStream, Fill};
//!
//! #[derive(Fill, Default, Debug)]
//! pub struct Request {
//!     pub method: String,
//!     pub retries: u8,
//!     cache_hint: u64,
//! }
//!
//! let data = [0x03, b'G', b'E', b'T', 0x02];
//! let mut stream = EntropyStream::new(&data);
//! let req = Request::fill(&mut stream);
//! assert_eq!(req.method, "GET");
//! assert_eq!(req.retries, 2);
//! ```
//!
//! ## Decoding rules
//!
//! | Type | Entropy drawn |
//! |------|---------------|
//! | integers, `bool`, `char`, floats | one little-endian 64-bit word, truncated |
//! | `String`, `Vec<u8>` | one length byte `L`, then `L` bytes |
//! | `Box`, `Rc`, `Arc` | the pointee |
//! | `Option` | the pointee at top level; nothing inside a pointee |
//! | `#[derive(Fill)]` structs | every `pub` field in order |
//!
//! Exhausted input never fails: missing bytes read as zero.
//!
//! ## Modules Overview
//!
//! - [`stream`] - the entropy cursor
//! - [`fill`] - compiled decoders
//! - [`kind`] - type descriptors shared with the harness generator
//! - [`decode`] - dynamic decoder over descriptors, producing [`Value`]s

// Lets `#[derive(Fill)]` expand to `::richsig::...` paths inside this crate.
extern crate self as richsig;

pub mod decode;
pub mod fill;
pub mod kind;
pub mod stream;
pub mod value;

pub use decode::{decode, decode_all};
pub use fill::Fill;
pub use kind::{AggregateDescriptor, FieldDescriptor, PointerKind, PrimitiveKind, TypeKind};
pub use stream::EntropyStream;
pub use value::Value;

#[cfg(feature = "derive")]
pub use richsig_derive::Fill;
