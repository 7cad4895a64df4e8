// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use richsig::{EntropyStream, Fill};

fuzz_target!(|data: &[u8]| {
    // Draw a mixed sequence; consumption never exceeds the input
    let mut stream = EntropyStream::new(data);
    let mut rounds = 0;
    while !stream.is_exhausted() && rounds < 64 {
        let selector = u8::fill(&mut stream);
        match selector % 4 {
            0 => {
                let _ = String::fill(&mut stream);
            }
            1 => {
                let bytes = Vec::<u8>::fill(&mut stream);
                assert!(bytes.len() <= 255);
            }
            2 => {
                let _ = <Option<Box<u64>>>::fill(&mut stream);
            }
            _ => {
                let _ = char::fill(&mut stream);
            }
        }
        assert_eq!(stream.consumed() + stream.remaining(), data.len());
        rounds += 1;
    }
});
