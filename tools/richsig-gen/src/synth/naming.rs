// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Identifier assignment for harness functions and their locals.

use std::collections::HashSet;

/// Locals every adapter declares.
pub const RESERVED_LOCALS: [&str; 2] = ["fuzz_data", "fuzz_stream"];

/// `HttpClient` -> `http_client`, `URLParser` -> `url_parser`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// A local the adapter needs a name for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRequest {
    pub base: String,
    pub placeholder: bool,
}

impl NameRequest {
    pub fn new(base: impl Into<String>, placeholder: bool) -> Self {
        Self {
            base: base.into(),
            placeholder,
        }
    }
}

/// Assign collision-free names, in request order.
///
/// A request collides when its base is shared with another request, equals
/// one of `scope` (crate and module names) or a reserved local, or is a
/// placeholder. Colliding requests get their 1-based position appended,
/// then `_2`, `_3`, ... while the result is still taken. Every other request
/// keeps its base.
pub fn assign_names(requests: &[NameRequest], scope: &[&str]) -> Vec<String> {
    let mut counts = std::collections::HashMap::new();
    for req in requests.iter().filter(|r| !r.placeholder) {
        *counts.entry(req.base.as_str()).or_insert(0usize) += 1;
    }
    let reserved = |base: &str| scope.contains(&base) || RESERVED_LOCALS.contains(&base);
    let collides = |req: &NameRequest| {
        req.placeholder || counts[req.base.as_str()] > 1 || reserved(req.base.as_str())
    };

    let mut taken: HashSet<String> = scope
        .iter()
        .chain(RESERVED_LOCALS.iter())
        .map(|s| s.to_string())
        .collect();
    taken.extend(
        requests
            .iter()
            .filter(|r| !collides(*r))
            .map(|r| r.base.clone()),
    );

    requests
        .iter()
        .enumerate()
        .map(|(i, req)| {
            if !collides(req) {
                return req.base.clone();
            }
            let positional = format!("{}{}", req.base, i + 1);
            let mut name = positional.clone();
            let mut bump = 2;
            while taken.contains(&name) {
                name = format!("{positional}_{bump}");
                bump += 1;
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

/// De-duplicates harness function names across a batch.
#[derive(Debug, Default)]
pub struct HarnessNames {
    used: HashSet<String>,
}

impl HarnessNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// `fuzz_<fn>` or `fuzz_<type>_<method>`, with `_2`, `_3`, ... on reuse.
    pub fn assign(&mut self, owner: Option<&str>, function: &str) -> String {
        let base = match owner {
            Some(owner) => format!("fuzz_{}_{}", snake_case(owner), function),
            None => format!("fuzz_{function}"),
        };
        let mut name = base.clone();
        let mut bump = 2;
        while !self.used.insert(name.clone()) {
            name = format!("{base}_{bump}");
            bump += 1;
        }
        name
    }
}
