// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Entropy stream over a fuzzer-supplied byte buffer.
//!
//! Every draw removes bytes from the front of the buffer. Once the buffer is
//! exhausted, draws return zero forever; no draw can fail, so decoders may be
//! called in any order without handling an error path.

/// Read cursor that turns a raw input buffer into a stream of values.
pub struct EntropyStream<'a> {
    data: &'a [u8],
    consumed: usize,
    pointer_depth: u32,
}

impl<'a> EntropyStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            consumed: 0,
            pointer_depth: 0,
        }
    }

    /// Draw one byte, or `0` once the stream is exhausted.
    pub fn draw_byte(&mut self) -> u8 {
        let data = self.data;
        match data.split_first() {
            Some((&first, rest)) => {
                self.advance(rest, 1);
                first
            }
            None => 0,
        }
    }

    /// Draw a little-endian 64-bit word.
    ///
    /// Consumes 8 bytes when available. A shorter tail is consumed entirely
    /// and zero-extended; an empty stream yields `0`.
    pub fn draw_u64(&mut self) -> u64 {
        let data = self.data;
        let take = data.len().min(8);
        if take == 0 {
            return 0;
        }
        let (head, rest) = data.split_at(take);
        let mut bytes = [0u8; 8];
        bytes[..take].copy_from_slice(head);
        self.advance(rest, take);
        u64::from_le_bytes(bytes)
    }

    /// Draw a length byte `L`, then `L` content bytes.
    ///
    /// Content reads past the end of the stream degrade to zero bytes, so the
    /// result always has exactly `L` elements.
    pub fn draw_len_prefixed(&mut self) -> Vec<u8> {
        let len = usize::from(self.draw_byte());
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.draw_byte());
        }
        out
    }

    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn is_exhausted(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of pointer levels currently being decoded.
    pub fn pointer_depth(&self) -> u32 {
        self.pointer_depth
    }

    /// Run `f` one pointer level deeper.
    ///
    /// Decoders use the depth to stop following optional pointers found
    /// inside a pointee.
    pub fn enter_pointee<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.pointer_depth += 1;
        let value = f(self);
        self.pointer_depth -= 1;
        value
    }

    fn advance(&mut self, rest: &'a [u8], taken: usize) {
        self.data = rest;
        self.consumed += taken;
        if self.data.is_empty() {
            log::trace!(
                "[EntropyStream] input exhausted after {} bytes, further draws are zero",
                self.consumed
            );
        }
    }
}

impl std::fmt::Debug for EntropyStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntropyStream")
            .field("remaining", &self.data.len())
            .field("consumed", &self.consumed)
            .field("pointer_depth", &self.pointer_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_WORD: u64 = 0xfeed_face_dead_beef;

    #[test]
    fn test_draw_u64_full_word_little_endian() {
        let input = TEST_WORD.to_le_bytes();
        let mut stream = EntropyStream::new(&input);
        assert_eq!(stream.draw_u64(), TEST_WORD);
        assert!(stream.is_exhausted());
        assert_eq!(stream.consumed(), 8);
    }

    #[test]
    fn test_draw_u64_short_tail_zero_extends() {
        let input = [0xef, 0xbe, 0xad, 0xde];
        let mut stream = EntropyStream::new(&input);
        assert_eq!(stream.draw_u64(), 0xdead_beef);
        assert_eq!(stream.remaining(), 0);
    }

    #[test]
    fn test_draw_u64_leaves_following_bytes() {
        let mut input = TEST_WORD.to_le_bytes().to_vec();
        input.push(0x42);
        let mut stream = EntropyStream::new(&input);
        assert_eq!(stream.draw_u64(), TEST_WORD);
        assert_eq!(stream.remaining(), 1);
        assert_eq!(stream.draw_byte(), 0x42);
    }

    #[test]
    fn test_draw_byte_pops_front() {
        let input = [1u8, 2, 3];
        let mut stream = EntropyStream::new(&input);
        assert_eq!(stream.draw_byte(), 1);
        assert_eq!(stream.draw_byte(), 2);
        assert_eq!(stream.remaining(), 1);
    }

    #[test]
    fn test_exhausted_stream_draws_zero() {
        let input = [7u8];
        let mut stream = EntropyStream::new(&input);
        assert_eq!(stream.draw_byte(), 7);
        for _ in 0..64 {
            assert_eq!(stream.draw_byte(), 0);
            assert_eq!(stream.draw_u64(), 0);
        }
        assert_eq!(stream.consumed(), 1);
    }

    #[test]
    fn test_len_prefixed_exact() {
        let input = [0x05, b'1', b'2', b'3', b'4', b'5', b'6'];
        let mut stream = EntropyStream::new(&input);
        assert_eq!(stream.draw_len_prefixed(), b"12345".to_vec());
        assert_eq!(stream.consumed(), 6);
        assert_eq!(stream.remaining(), 1);
    }

    #[test]
    fn test_len_prefixed_short_buffer_pads_with_zero() {
        let input = [0x09, b'1', b'2'];
        let mut stream = EntropyStream::new(&input);
        let got = stream.draw_len_prefixed();
        assert_eq!(got, vec![b'1', b'2', 0, 0, 0, 0, 0, 0, 0]);
        assert!(stream.is_exhausted());
    }

    #[test]
    fn test_len_prefixed_empty_stream() {
        let mut stream = EntropyStream::new(&[]);
        assert!(stream.draw_len_prefixed().is_empty());
    }

    #[test]
    fn test_enter_pointee_restores_depth() {
        let mut stream = EntropyStream::new(&[]);
        let inner = stream.enter_pointee(|s| s.enter_pointee(|s| s.pointer_depth()));
        assert_eq!(inner, 2);
        assert_eq!(stream.pointer_depth(), 0);
    }
}
