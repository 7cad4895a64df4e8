// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! cargo-fuzz target files.

/// Source of `fuzz_targets/<harness>.rs`, forwarding the engine's buffer to
/// `harness` in the library module `module`.
pub fn emit_fuzz_target(module: &str, harness: &str) -> String {
    format!(
        "#![no_main]\n\
         \n\
         use libfuzzer_sys::fuzz_target;\n\
         \n\
         fuzz_target!(|data: &[u8]| {{\n    \
         let _ = {module}::{harness}(data);\n\
         }});\n"
    )
}
