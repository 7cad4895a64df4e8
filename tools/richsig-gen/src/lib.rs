// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # richsig-gen - fuzz adapters for rich Rust signatures
//!
//! Scans a crate's sources, finds functions whose parameters can be decoded
//! from a byte buffer, and writes one `pub fn fuzz_x(fuzz_data: &[u8]) -> i32`
//! adapter per function. Adapters decode their arguments with
//! [`richsig::Fill`], so the output depends on the `richsig` runtime.
//!
//! ## Pipeline
//!
//! 1. [`discover`] - parse the crate with `syn`, index its types, list
//!    candidate functions.
//! 2. [`analyze`] - classify each candidate and describe its parameters.
//! 3. [`synth`] - name locals, promote constructors, render adapters.
//! 4. [`workspace`] - optionally stage a cargo-fuzz package around them.
//!
//! ## Example
//!
//! ```rust
//! use richsig_gen::{config::GenConfig, discover::scan_source, Generator};
//!
//! let discovery = scan_source("demo", "pub fn parse(s: &str, strict: bool) {}").unwrap();
//! let generator = Generator::new(discovery, GenConfig::default());
//! let batch = generator.generate().unwrap();
//! assert!(batch.source.contains("pub fn fuzz_parse(fuzz_data: &[u8]) -> i32 {"));
//! ```

pub mod analyze;
pub mod config;
pub mod discover;
pub mod render;
pub mod substitute;
pub mod synth;
pub mod workspace;

use std::path::{Path, PathBuf};

use regex::Regex;
use richsig::{EntropyStream, TypeKind, Value};
use serde::Serialize;
use thiserror::Error;

use analyze::SkipReason;
use config::{ConfigError, GenConfig};
use discover::{CandidateFilter, CandidateFunction, Discovery, DiscoveryError};
use synth::{Batch, Plan, SynthOptions, Synthesizer};
use workspace::{PackageRequest, RichsigSource, StagingWorkspace, WorkspaceError};

#[derive(Debug, Error)]
pub enum GenError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error("cannot decode for {function}: {reason}")]
    Unsupported { function: String, reason: SkipReason },

    #[error("no adapter could be generated for functions matching {0}")]
    NothingToStage(String),
}

/// One line of `richsig-gen list`.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub function: String,
    pub file: String,
    pub line: usize,
    pub exported: bool,
    pub classification: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// How `decode` reads a buffer for one function.
#[derive(Debug, Clone)]
pub struct DecodePlan {
    pub function: String,
    /// The buffer is passed through as is.
    pub forward: bool,
    /// Adapter locals in decode order; `None` for stand-ins that draw nothing.
    pub locals: Vec<(String, Option<TypeKind>)>,
}

#[derive(Debug, Clone)]
pub struct DecodeReport {
    pub values: Vec<(String, Option<Value>)>,
    pub consumed: usize,
    pub total: usize,
}

impl DecodePlan {
    pub fn decode(&self, input: &[u8]) -> DecodeReport {
        if self.forward {
            return DecodeReport {
                values: vec![("fuzz_data".to_string(), Some(Value::Bytes(input.to_vec())))],
                consumed: input.len(),
                total: input.len(),
            };
        }
        let mut stream = EntropyStream::new(input);
        let values = self
            .locals
            .iter()
            .map(|(name, kind)| {
                let value = kind.as_ref().map(|k| richsig::decode(k, &mut stream));
                (name.clone(), value)
            })
            .collect();
        DecodeReport {
            values,
            consumed: stream.consumed(),
            total: input.len(),
        }
    }
}

/// Scanned crate plus the configuration to generate with.
pub struct Generator {
    discovery: Discovery,
    config: GenConfig,
    crate_dir: Option<PathBuf>,
}

impl Generator {
    pub fn new(discovery: Discovery, config: GenConfig) -> Self {
        Self {
            discovery,
            config,
            crate_dir: None,
        }
    }

    /// Scan the crate at `dir`.
    pub fn open(dir: &Path, config: GenConfig) -> Result<Self, GenError> {
        config.validate()?;
        let discovery = discover::scan_crate(dir)?;
        tracing::info!(
            "scanned {}: {} candidates, {} types",
            discovery.crate_name,
            discovery.candidates.len(),
            discovery.index.len()
        );
        Ok(Self {
            discovery,
            config,
            crate_dir: Some(dir.to_path_buf()),
        })
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    pub fn filter(&self) -> Result<CandidateFilter, GenError> {
        let g = &self.config.generator;
        Ok(CandidateFilter::new(
            &g.func_pattern,
            &g.exclude_pattern,
            g.include_unexported,
        )?)
    }

    pub fn candidates(&self) -> Result<Vec<&CandidateFunction>, GenError> {
        let filter = self.filter()?;
        Ok(filter.apply(&self.discovery).collect())
    }

    fn synth_options(&self, qualify_all: bool) -> SynthOptions {
        SynthOptions {
            qualify_all,
            constructors: self.config.generator.constructors,
            allow_unsafe: self.config.generator.allow_unsafe,
        }
    }

    fn with_synthesizer<T>(
        &self,
        qualify_all: bool,
        f: impl FnOnce(&Synthesizer<'_>) -> T,
    ) -> Result<T, GenError> {
        let g = &self.config.generator;
        let pattern = Regex::new(&g.constructor_pattern).map_err(DiscoveryError::from)?;
        let table = self.config.substitution_table();
        let synth = synth::synthesizer(
            &self.discovery,
            &table,
            self.synth_options(qualify_all),
            &pattern,
            g.include_unexported,
        );
        Ok(f(&synth))
    }

    /// Adapters for every selected candidate.
    pub fn generate(&self) -> Result<Batch, GenError> {
        self.generate_with(self.config.generator.qualify_all)
    }

    fn generate_with(&self, qualify_all: bool) -> Result<Batch, GenError> {
        let candidates = self.candidates()?;
        self.with_synthesizer(qualify_all, |synth| synth.batch(&candidates))
    }

    /// Classification of every selected candidate, in description order.
    pub fn list(&self) -> Result<Vec<Listing>, GenError> {
        let mut candidates = self.candidates()?;
        candidates.sort_by_cached_key(|c| c.description());
        self.with_synthesizer(self.config.generator.qualify_all, |synth| {
            candidates
                .iter()
                .map(|c| {
                    let (label, reason) = match synth.plan(c) {
                        Ok(_) => (synth.analyzer().classify(c).label(), None),
                        Err(reason) => ("unsupported", Some(reason.to_string())),
                    };
                    Listing {
                        function: c.description(),
                        file: c.file.display().to_string(),
                        line: c.line,
                        exported: c.exported,
                        classification: label,
                        reason,
                    }
                })
                .collect()
        })
    }

    /// Decode plan for the single candidate matching `func`.
    pub fn decode_plan(&self, func: &str) -> Result<DecodePlan, GenError> {
        let g = &self.config.generator;
        let filter = CandidateFilter::new(func, &g.exclude_pattern, g.include_unexported)?;
        let candidate = self.discovery.find_one(&filter)?;
        let function = candidate.description();
        let plan = self
            .with_synthesizer(g.qualify_all, |synth| synth.plan(candidate))?
            .map_err(|reason| GenError::Unsupported {
                function: function.clone(),
                reason,
            })?;
        Ok(match plan {
            Plan::Forward(_) => DecodePlan {
                function,
                forward: true,
                locals: Vec::new(),
            },
            Plan::Adapter(spec) => DecodePlan {
                function,
                forward: false,
                locals: spec
                    .bindings
                    .into_iter()
                    .map(|b| {
                        let kind = b.spec.decode_kind();
                        (b.name, kind)
                    })
                    .collect(),
            },
        })
    }

    /// Stage a cargo-fuzz package for the selected candidates under `out`.
    /// Staged adapters always use qualified paths.
    pub fn stage(&self, out: &Path) -> Result<PathBuf, GenError> {
        let batch = self.generate_with(true)?;
        let harnesses: Vec<&str> = batch.harness_names().collect();
        if harnesses.is_empty() {
            return Err(GenError::NothingToStage(self.config.generator.func_pattern.clone()));
        }

        let crate_dir = match &self.crate_dir {
            Some(dir) => dir.canonicalize().map_err(|source| WorkspaceError::Io {
                path: dir.clone(),
                source,
            })?,
            None => PathBuf::from("."),
        };
        let staging = &self.config.staging;
        let request = PackageRequest {
            package: self.discovery.package.clone(),
            crate_name: self.discovery.crate_name.clone(),
            crate_dir,
            richsig: match &staging.richsig_path {
                Some(path) => RichsigSource::Path(path.clone()),
                None => RichsigSource::Version(env!("CARGO_PKG_VERSION").to_string()),
            },
            libfuzzer_version: staging.libfuzzer_version.clone(),
            extra_dependencies: self.config.substitution_table().dependencies_for(&batch.source),
        };

        let workspace = StagingWorkspace::create()?;
        workspace.write_package(&request, &batch.source, &harnesses)?;
        workspace.persist_to(out)?;
        Ok(out.join(request.fuzz_package()))
    }
}
