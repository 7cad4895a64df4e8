// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::io::Read;

pub struct Frame {
    pub kind: u8,
    pub payload: Vec<u8>,
    seq: u64,
}

impl Frame {
    pub fn new(kind: u8, payload: Vec<u8>) -> Frame {
        Frame {
            kind,
            payload,
            seq: 0,
        }
    }

    pub fn encoded_len(&self) -> usize {
        2 + self.payload.len()
    }

    pub fn read_from<R: Read>(mut reader: R) -> Option<Frame> {
        let mut head = [0u8; 2];
        reader.read_exact(&mut head).ok()?;
        let mut payload = vec![0u8; usize::from(head[1])];
        reader.read_exact(&mut payload).ok()?;
        Some(Frame::new(head[0], payload))
    }

    pub fn visit(&self, f: &dyn Fn(u8)) {
        self.payload.iter().for_each(|b| f(*b));
    }

    fn bump(&mut self) {
        self.seq += 1;
    }
}

pub fn split(frame: &Frame, at: usize) -> (Vec<u8>, Vec<u8>) {
    let at = at.min(frame.payload.len());
    (frame.payload[..at].to_vec(), frame.payload[at..].to_vec())
}
