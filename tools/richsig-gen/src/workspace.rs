// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Staging of cargo-fuzz packages.
//!
//! A [`StagingWorkspace`] owns a temporary directory for the lifetime of one
//! `stage` run. The package is written there in full, then copied to its
//! destination with [`StagingWorkspace::persist_to`]. Dropping the handle
//! removes the directory, whatever the outcome.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::substitute::CrateDependency;
use crate::synth::target::emit_fuzz_target;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize manifest: {0}")]
    Toml(#[from] toml::ser::Error),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> WorkspaceError + '_ {
    move |source| WorkspaceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Where the staged package gets `richsig` from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichsigSource {
    Version(String),
    Path(PathBuf),
}

/// Inputs for the staged package manifest.
#[derive(Debug, Clone)]
pub struct PackageRequest {
    /// Package name of the crate under test.
    pub package: String,
    /// Library name of the crate under test, as used in generated paths.
    pub crate_name: String,
    pub crate_dir: PathBuf,
    pub richsig: RichsigSource,
    pub libfuzzer_version: String,
    /// Crates needed by stand-in expressions.
    pub extra_dependencies: Vec<CrateDependency>,
}

impl PackageRequest {
    pub fn fuzz_package(&self) -> String {
        format!("{}-fuzz", self.package)
    }

    /// Library name of the staged package.
    pub fn fuzz_lib(&self) -> String {
        self.fuzz_package().replace('-', "_")
    }
}

#[derive(Serialize)]
struct Manifest {
    package: PackageSection,
    lib: LibSection,
    dependencies: BTreeMap<String, Dependency>,
    #[serde(rename = "bin")]
    bins: Vec<BinSection>,
    workspace: WorkspaceSection,
}

#[derive(Serialize)]
struct PackageSection {
    name: String,
    version: &'static str,
    publish: bool,
    edition: &'static str,
    metadata: Metadata,
}

#[derive(Serialize)]
struct Metadata {
    #[serde(rename = "cargo-fuzz")]
    cargo_fuzz: bool,
}

#[derive(Serialize)]
struct LibSection {
    name: String,
    path: &'static str,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Dependency {
    Version(String),
    Detailed {
        #[serde(skip_serializing_if = "Option::is_none")]
        package: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
}

#[derive(Serialize)]
struct BinSection {
    name: String,
    path: String,
    test: bool,
    doc: bool,
    bench: bool,
}

/// Empty `[workspace]`, keeping the package out of any enclosing workspace.
#[derive(Serialize)]
struct WorkspaceSection {}

/// `Cargo.toml` text of the staged package.
pub fn render_manifest(request: &PackageRequest, harnesses: &[&str]) -> Result<String, WorkspaceError> {
    let mut dependencies = BTreeMap::new();
    dependencies.insert(
        "libfuzzer-sys".to_string(),
        Dependency::Version(request.libfuzzer_version.clone()),
    );
    dependencies.insert(
        "richsig".to_string(),
        match &request.richsig {
            RichsigSource::Version(v) => Dependency::Version(v.clone()),
            RichsigSource::Path(p) => Dependency::Detailed {
                package: None,
                version: None,
                path: Some(p.display().to_string()),
            },
        },
    );
    for dep in &request.extra_dependencies {
        dependencies
            .entry(dep.name.clone())
            .or_insert_with(|| Dependency::Version(dep.version.clone()));
    }
    let package = (request.package != request.crate_name).then(|| request.package.clone());
    dependencies.insert(
        request.crate_name.clone(),
        Dependency::Detailed {
            package,
            version: None,
            path: Some(request.crate_dir.display().to_string()),
        },
    );

    let manifest = Manifest {
        package: PackageSection {
            name: request.fuzz_package(),
            version: "0.0.0",
            publish: false,
            edition: "2021",
            metadata: Metadata { cargo_fuzz: true },
        },
        lib: LibSection {
            name: request.fuzz_lib(),
            path: "src/lib.rs",
        },
        dependencies,
        bins: harnesses
            .iter()
            .map(|h| BinSection {
                name: h.to_string(),
                path: format!("fuzz_targets/{h}.rs"),
                test: false,
                doc: false,
                bench: false,
            })
            .collect(),
        workspace: WorkspaceSection {},
    };
    Ok(toml::to_string(&manifest)?)
}

pub struct StagingWorkspace {
    dir: tempfile::TempDir,
}

impl StagingWorkspace {
    pub fn create() -> Result<Self, WorkspaceError> {
        let dir = tempfile::Builder::new()
            .prefix("richsig-stage-")
            .tempdir()
            .map_err(io_err(&std::env::temp_dir()))?;
        tracing::debug!("staging in {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the manifest, the harness library and one fuzz target per
    /// harness. Returns the package directory.
    pub fn write_package(
        &self,
        request: &PackageRequest,
        harness_src: &str,
        harnesses: &[&str],
    ) -> Result<PathBuf, WorkspaceError> {
        let root = self.dir.path().join(request.fuzz_package());
        let src = root.join("src");
        let targets = root.join("fuzz_targets");
        fs::create_dir_all(&src).map_err(io_err(&src))?;
        fs::create_dir_all(&targets).map_err(io_err(&targets))?;

        let manifest_path = root.join("Cargo.toml");
        fs::write(&manifest_path, render_manifest(request, harnesses)?)
            .map_err(io_err(&manifest_path))?;
        let lib_path = src.join("lib.rs");
        fs::write(&lib_path, harness_src).map_err(io_err(&lib_path))?;

        let lib = request.fuzz_lib();
        for harness in harnesses {
            let path = targets.join(format!("{harness}.rs"));
            fs::write(&path, emit_fuzz_target(&lib, harness)).map_err(io_err(&path))?;
        }
        tracing::info!(
            "staged {} with {} fuzz targets",
            request.fuzz_package(),
            harnesses.len()
        );
        Ok(root)
    }

    /// Copy the staged tree into `dest`, creating it if needed.
    pub fn persist_to(&self, dest: &Path) -> Result<(), WorkspaceError> {
        copy_tree(self.dir.path(), dest)
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), WorkspaceError> {
    fs::create_dir_all(to).map_err(io_err(to))?;
    for entry in fs::read_dir(from).map_err(io_err(from))? {
        let entry = entry.map_err(io_err(from))?;
        let source = entry.path();
        let target = to.join(entry.file_name());
        let file_type = entry.file_type().map_err(io_err(&source))?;
        if file_type.is_dir() {
            copy_tree(&source, &target)?;
        } else {
            fs::copy(&source, &target).map_err(io_err(&target))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PackageRequest {
        PackageRequest {
            package: "wire-fmt".into(),
            crate_name: "wire_fmt".into(),
            crate_dir: PathBuf::from("/src/wire-fmt"),
            richsig: RichsigSource::Version("0.3".into()),
            libfuzzer_version: "0.4".into(),
            extra_dependencies: Vec::new(),
        }
    }

    #[test]
    fn test_manifest_contents() {
        let text = render_manifest(&request(), &["fuzz_decode"]).expect("manifest");
        let value: toml::Value = toml::from_str(&text).expect("valid toml");

        assert_eq!(value["package"]["name"].as_str(), Some("wire-fmt-fuzz"));
        assert_eq!(
            value["package"]["metadata"]["cargo-fuzz"].as_bool(),
            Some(true)
        );
        assert_eq!(value["lib"]["name"].as_str(), Some("wire_fmt_fuzz"));
        assert_eq!(value["dependencies"]["libfuzzer-sys"].as_str(), Some("0.4"));
        assert_eq!(value["dependencies"]["richsig"].as_str(), Some("0.3"));
        assert_eq!(
            value["dependencies"]["wire_fmt"]["package"].as_str(),
            Some("wire-fmt")
        );
        assert_eq!(
            value["dependencies"]["wire_fmt"]["path"].as_str(),
            Some("/src/wire-fmt")
        );
        let bins = value["bin"].as_array().expect("bins");
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0]["path"].as_str(), Some("fuzz_targets/fuzz_decode.rs"));
        assert!(value.get("workspace").is_some());
    }

    #[test]
    fn test_stand_in_dependencies_are_added() {
        let mut req = request();
        req.extra_dependencies = vec![CrateDependency {
            name: "tokio-util".into(),
            version: "0.7".into(),
        }];
        let text = render_manifest(&req, &["fuzz_run"]).expect("manifest");
        let value: toml::Value = toml::from_str(&text).expect("valid toml");
        assert_eq!(value["dependencies"]["tokio-util"].as_str(), Some("0.7"));
    }

    #[test]
    fn test_same_name_has_no_package_key() {
        let mut req = request();
        req.package = "demo".into();
        req.crate_name = "demo".into();
        let text = render_manifest(&req, &[]).expect("manifest");
        let value: toml::Value = toml::from_str(&text).expect("valid toml");
        assert!(value["dependencies"]["demo"].get("package").is_none());
    }

    #[test]
    fn test_stage_and_persist() {
        let staging = StagingWorkspace::create().expect("staging");
        let staged_root = staging.path().to_path_buf();
        let root = staging
            .write_package(&request(), "pub fn fuzz_decode(_: &[u8]) -> i32 { 0 }\n", &["fuzz_decode"])
            .expect("write");
        assert!(root.join("Cargo.toml").is_file());
        let target = fs::read_to_string(root.join("fuzz_targets/fuzz_decode.rs")).expect("target");
        assert!(target.contains("let _ = wire_fmt_fuzz::fuzz_decode(data);"));

        let dest = tempfile::tempdir().expect("dest");
        staging.persist_to(dest.path()).expect("persist");
        assert!(dest.path().join("wire-fmt-fuzz/src/lib.rs").is_file());
        assert!(dest
            .path()
            .join("wire-fmt-fuzz/fuzz_targets/fuzz_decode.rs")
            .is_file());

        drop(staging);
        assert!(!staged_root.exists());
    }
}
