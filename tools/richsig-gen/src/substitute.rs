// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stand-in values for trait-typed parameters.
//!
//! A parameter bounded by a trait with an entry here (`impl Read`,
//! `&mut dyn Write`, `R: BufRead`) is bound to a concrete value instead of
//! being decoded. `{bytes}` in an expression is replaced by a decoded
//! length-prefixed byte vector.

use serde::{Deserialize, Serialize};

/// Placeholder for decoded bytes inside a stand-in expression.
pub const BYTES_PLACEHOLDER: &str = "{bytes}";

const BYTES_EXPR: &str = "<::std::vec::Vec<u8> as ::richsig::Fill>::fill(&mut fuzz_stream)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    /// Trait or type name, either a bare identifier (`Read`) or a full path
    /// (`std::io::Read`).
    pub name: String,
    pub expr: String,
    /// Crate the expression needs in a staged package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<CrateDependency>,
}

/// A registry dependency added to staged packages.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CrateDependency {
    pub name: String,
    pub version: String,
}

impl Substitution {
    pub fn new(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expr: expr.into(),
            dependency: None,
        }
    }

    pub fn with_dependency(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.dependency = Some(CrateDependency {
            name: name.into(),
            version: version.into(),
        });
        self
    }

    /// The expression consumes entropy.
    pub fn draws_bytes(&self) -> bool {
        self.expr.contains(BYTES_PLACEHOLDER)
    }

    /// Expression text for generated code.
    pub fn render(&self) -> String {
        self.expr.replace(BYTES_PLACEHOLDER, BYTES_EXPR)
    }
}

#[derive(Debug, Clone)]
pub struct SubstitutionTable {
    entries: Vec<Substitution>,
}

impl Default for SubstitutionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SubstitutionTable {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn builtin() -> Self {
        Self {
            entries: vec![
                Substitution::new("Read", "::std::io::Cursor::new({bytes})"),
                Substitution::new("BufRead", "::std::io::Cursor::new({bytes})"),
                Substitution::new("Write", "::std::vec::Vec::<u8>::new()"),
                Substitution::new(
                    "Hasher",
                    "::std::collections::hash_map::DefaultHasher::new()",
                ),
                Substitution::new(
                    "CancellationToken",
                    "::tokio_util::sync::CancellationToken::new()",
                )
                .with_dependency("tokio-util", "0.7"),
            ],
        }
    }

    /// Add entries; a later entry with the same name replaces the earlier one.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = Substitution>) {
        for entry in entries {
            self.entries.retain(|e| e.name != entry.name);
            self.entries.push(entry);
        }
    }

    /// Look up a written path, by full path first, then by last segment.
    pub fn lookup(&self, path: &str) -> Option<&Substitution> {
        let path = path.trim_start_matches("::");
        if let Some(entry) = self.entries.iter().find(|e| e.name == path) {
            return Some(entry);
        }
        let last = path.rsplit("::").next()?;
        self.entries.iter().find(|e| e.name == last)
    }

    pub fn entries(&self) -> &[Substitution] {
        &self.entries
    }

    /// Dependencies of the stand-ins that appear in `source`.
    pub fn dependencies_for(&self, source: &str) -> Vec<CrateDependency> {
        let mut deps: Vec<CrateDependency> = self
            .entries
            .iter()
            .filter(|e| source.contains(&e.render()))
            .filter_map(|e| e.dependency.clone())
            .collect();
        deps.sort();
        deps.dedup();
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let table = SubstitutionTable::builtin();
        assert!(table.lookup("Read").is_some());
        assert!(table.lookup("std::io::BufRead").is_some());
        assert!(table.lookup("::tokio_util::sync::CancellationToken").is_some());
        assert!(table.lookup("Seek").is_none());
    }

    #[test]
    fn test_render_replaces_bytes() {
        let table = SubstitutionTable::builtin();
        let read = table.lookup("Read").expect("builtin");
        assert!(read.draws_bytes());
        assert_eq!(
            read.render(),
            "::std::io::Cursor::new(<::std::vec::Vec<u8> as ::richsig::Fill>::fill(&mut fuzz_stream))"
        );
        let write = table.lookup("Write").expect("builtin");
        assert!(!write.draws_bytes());
        assert_eq!(write.render(), "::std::vec::Vec::<u8>::new()");
    }

    #[test]
    fn test_dependencies_follow_usage() {
        let table = SubstitutionTable::builtin();
        let uses_token = "    let token = ::tokio_util::sync::CancellationToken::new();\n";
        assert_eq!(
            table.dependencies_for(uses_token),
            vec![CrateDependency {
                name: "tokio-util".into(),
                version: "0.7".into(),
            }]
        );
        let uses_writer = "    let mut out = ::std::vec::Vec::<u8>::new();\n";
        assert!(table.dependencies_for(uses_writer).is_empty());
    }

    #[test]
    fn test_extend_overrides_by_name() {
        let mut table = SubstitutionTable::builtin();
        table.extend([
            Substitution::new("Write", "::std::io::sink()"),
            Substitution::new("std::path::PathBuf", "::std::path::PathBuf::new()"),
        ]);
        assert_eq!(table.lookup("Write").map(|s| s.expr.as_str()), Some("::std::io::sink()"));
        assert!(table.lookup("std::path::PathBuf").is_some());
        assert!(table.lookup("PathBuf").is_none());
    }
}
