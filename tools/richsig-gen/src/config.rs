// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generator configuration.
//!
//! Loaded from an optional `richsig.toml`; command-line flags override the
//! file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::substitute::{Substitution, SubstitutionTable};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenConfig {
    #[serde(default)]
    pub generator: GeneratorSection,

    #[serde(default)]
    pub staging: StagingSection,

    /// Extra stand-ins, replacing built-in entries of the same name.
    #[serde(default)]
    pub substitutions: Vec<Substitution>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSection {
    /// Render crate types with their crate prefix.
    #[serde(default = "default_true")]
    pub qualify_all: bool,

    /// Build receivers through constructors.
    #[serde(default)]
    pub constructors: bool,

    #[serde(default = "default_constructor_pattern")]
    pub constructor_pattern: String,

    #[serde(default)]
    pub include_unexported: bool,

    #[serde(default = "default_func_pattern")]
    pub func_pattern: String,

    /// Empty means no exclusion.
    #[serde(default = "default_exclude_pattern")]
    pub exclude_pattern: String,

    #[serde(default)]
    pub allow_unsafe: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingSection {
    /// Local checkout of `richsig`; the published version is used when unset.
    #[serde(default)]
    pub richsig_path: Option<PathBuf>,

    #[serde(default = "default_libfuzzer_version")]
    pub libfuzzer_version: String,
}

fn default_true() -> bool {
    true
}

fn default_constructor_pattern() -> String {
    "^new".to_string()
}

fn default_func_pattern() -> String {
    ".".to_string()
}

fn default_exclude_pattern() -> String {
    "^fuzz_".to_string()
}

fn default_libfuzzer_version() -> String {
    "0.4".to_string()
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            qualify_all: true,
            constructors: false,
            constructor_pattern: default_constructor_pattern(),
            include_unexported: false,
            func_pattern: default_func_pattern(),
            exclude_pattern: default_exclude_pattern(),
            allow_unsafe: false,
        }
    }
}

impl Default for StagingSection {
    fn default() -> Self {
        Self {
            richsig_path: None,
            libfuzzer_version: default_libfuzzer_version(),
        }
    }
}

impl GenConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let generator = &self.generator;
        for (key, pattern) in [
            ("func_pattern", &generator.func_pattern),
            ("exclude_pattern", &generator.exclude_pattern),
            ("constructor_pattern", &generator.constructor_pattern),
        ] {
            regex::Regex::new(pattern).map_err(|e| {
                ConfigError::Invalid(format!("{} is not a valid regex: {}", key, e))
            })?;
        }

        for (i, sub) in self.substitutions.iter().enumerate() {
            if sub.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Substitution {} has an empty name",
                    i
                )));
            }
            if sub.expr.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Substitution {} ({}) has an empty expression",
                    i, sub.name
                )));
            }
        }
        if self.staging.libfuzzer_version.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "staging.libfuzzer_version is empty".into(),
            ));
        }
        Ok(())
    }

    /// Built-in stand-ins extended with the configured ones.
    pub fn substitution_table(&self) -> SubstitutionTable {
        let mut table = SubstitutionTable::builtin();
        table.extend(self.substitutions.iter().cloned());
        table
    }

    /// Example configuration file content.
    pub fn example() -> String {
        r#"# richsig-gen configuration

[generator]
# Render crate types with their crate prefix. Set to false to place the
# generated file inside the crate (it then starts with `use super::*;`).
qualify_all = true

# Build method receivers by calling a constructor instead of decoding them.
constructors = false
constructor_pattern = "^new"

# Candidate selection.
include_unexported = false
func_pattern = "."
exclude_pattern = "^fuzz_"

# Call unsafe functions from generated adapters.
allow_unsafe = false

[staging]
libfuzzer_version = "0.4"
# richsig_path = "../richsig/crates/richsig"

# Stand-ins for trait-typed parameters. `{bytes}` is replaced by decoded
# bytes. Entries replace built-ins of the same name. `dependency` is added
# to staged packages that use the stand-in.
[[substitutions]]
name = "Seek"
expr = "::std::io::Cursor::new({bytes})"

[[substitutions]]
name = "RngCore"
expr = "::rand::rngs::mock::StepRng::new(0, 1)"
dependency = { name = "rand", version = "0.8" }
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GenConfig::default();
        assert!(config.generator.qualify_all);
        assert!(!config.generator.constructors);
        assert_eq!(config.generator.exclude_pattern, "^fuzz_");
        assert_eq!(config.staging.libfuzzer_version, "0.4");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = GenConfig::from_toml("[generator]\nconstructors = true\n").expect("config");
        assert!(config.generator.constructors);
        assert_eq!(config.generator.constructor_pattern, "^new");
        assert!(config.substitutions.is_empty());
    }

    #[test]
    fn test_example_parses() {
        let config = GenConfig::from_toml(&GenConfig::example()).expect("example");
        assert_eq!(config.substitutions.len(), 2);
        assert_eq!(
            config.substitutions[1].dependency.as_ref().map(|d| d.name.as_str()),
            Some("rand")
        );
        let table = config.substitution_table();
        assert!(table.lookup("Seek").is_some());
        assert!(table.lookup("Read").is_some());
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let err = GenConfig::from_toml("[generator]\nfunc_pattern = \"(\"\n").expect_err("invalid");
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.starts_with("func_pattern")));
    }

    #[test]
    fn test_empty_substitution_rejected() {
        let err = GenConfig::from_toml("[[substitutions]]\nname = \"\"\nexpr = \"x\"\n")
            .expect_err("invalid");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("richsig.toml");
        std::fs::write(&path, "[staging]\nlibfuzzer_version = \"0.4.7\"\n").expect("write");
        let config = GenConfig::from_file(&path).expect("config");
        assert_eq!(config.staging.libfuzzer_version, "0.4.7");
        assert!(matches!(
            GenConfig::from_file(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
