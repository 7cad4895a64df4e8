// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use richsig_gen::config::GenConfig;
use richsig_gen::discover::scan_source;
use richsig_gen::Generator;

fuzz_target!(|data: &[u8]| {
    // Any source that parses must synthesize without panicking
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(discovery) = scan_source("fuzzed", source) else {
        return;
    };

    let mut config = GenConfig::default();
    config.generator.include_unexported = true;
    config.generator.constructors = data.len() % 2 == 0;
    config.generator.qualify_all = data.len() % 3 != 0;

    let generator = Generator::new(discovery, config);
    if let Ok(batch) = generator.generate() {
        assert!(batch.source.starts_with("// Code generated by richsig-gen."));
    }
    let _ = generator.list();
});
