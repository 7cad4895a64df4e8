// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

pub mod frame;

pub fn checksum(data: &[u8]) -> i32 {
    data.iter().fold(0i32, |acc, b| acc.wrapping_add(i32::from(*b)))
}

pub fn parse_header(name: &str, version: Option<u8>, strict: bool) -> Result<u32, String> {
    if strict && name.is_empty() {
        return Err("empty header name".into());
    }
    Ok(u32::from(version.unwrap_or(1)))
}

pub fn fuzz_checksum_reference(data: &[u8]) -> i32 {
    checksum(data)
}

fn mask(x: u32) -> u32 {
    x & 0x7fff_ffff
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_mask() {
        assert_eq!(super::mask(u32::MAX), 0x7fff_ffff);
    }
}
