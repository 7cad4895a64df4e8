// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Source discovery: parse a crate with `syn` and collect every function that
//! could become a fuzz target, plus the type definitions needed to analyze
//! their signatures.

pub mod filter;
pub mod index;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub use filter::CandidateFilter;
pub use index::{FieldDef, TypeDef, TypeDefKind, TypeIndex};

/// Discovery errors.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: syn::Error,
    },

    #[error("no src/lib.rs or src/main.rs under {0}")]
    MissingEntry(PathBuf),

    #[error("invalid manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("pattern `{pattern}` matches {} functions: {}", .matches.len(), .matches.join(", "))]
    Ambiguous {
        pattern: String,
        matches: Vec<String>,
    },

    #[error("no function matches `{0}`")]
    NotFound(String),
}

/// How a method takes `self`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverMode {
    Value,
    Ref,
    RefMut,
    /// `self: Box<Self>`
    Boxed,
    /// Any other typed receiver (`self: Rc<Self>`, `self: Pin<&mut Self>`).
    Other(String),
}

/// Where a function is declared.
#[derive(Debug, Clone)]
pub enum Owner {
    Free,
    /// Inherent `impl` block. `generics` lists the impl's type parameters.
    Inherent {
        self_ty: syn::Type,
        generics: Vec<GenericInfo>,
    },
    /// Default method of a trait, or a method of `impl dyn Trait`.
    Trait { name: String },
}

/// A type or const parameter in scope, with the trait names bounding it.
#[derive(Debug, Clone)]
pub struct GenericInfo {
    pub name: String,
    pub bounds: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RawParam {
    pub pat: syn::Pat,
    pub ty: syn::Type,
}

impl RawParam {
    /// Identifier bound by the pattern, `None` for `_` and destructuring.
    pub fn ident(&self) -> Option<String> {
        match &self.pat {
            syn::Pat::Ident(p) if p.subpat.is_none() => Some(p.ident.to_string()),
            _ => None,
        }
    }
}

/// A function or method considered for wrapping.
#[derive(Debug, Clone)]
pub struct CandidateFunction {
    pub name: String,
    /// Defining module, crate name first.
    pub module: Vec<String>,
    pub file: PathBuf,
    pub line: usize,
    pub owner: Owner,
    pub receiver: Option<ReceiverMode>,
    pub params: Vec<RawParam>,
    pub output: Option<syn::Type>,
    /// Function-level generics; impl-level ones live on [`Owner::Inherent`].
    pub generics: Vec<GenericInfo>,
    pub exported: bool,
    pub is_unsafe: bool,
    pub is_async: bool,
    pub is_variadic: bool,
}

impl CandidateFunction {
    /// Name of the owning type or trait, if any.
    pub fn owner_name(&self) -> Option<String> {
        match &self.owner {
            Owner::Free => None,
            Owner::Inherent { self_ty, .. } => Some(type_ident(self_ty)),
            Owner::Trait { name } => Some(name.clone()),
        }
    }

    /// Fully qualified description: `krate::module::Type::method` or
    /// `krate::module::function`. Used for ordering and messages.
    pub fn description(&self) -> String {
        let mut out = self.module.join("::");
        if let Some(owner) = self.owner_name() {
            out.push_str("::");
            out.push_str(&owner);
        }
        out.push_str("::");
        out.push_str(&self.name);
        out
    }

    pub fn all_generics(&self) -> impl Iterator<Item = &GenericInfo> {
        let impl_generics: &[GenericInfo] = match &self.owner {
            Owner::Inherent { generics, .. } => generics,
            _ => &[],
        };
        impl_generics.iter().chain(self.generics.iter())
    }
}

/// Last path segment of a type, used to name owners (`Parser`, `Vec`).
pub fn type_ident(ty: &syn::Type) -> String {
    match ty {
        syn::Type::Path(p) => p
            .path
            .segments
            .last()
            .map(|s| s.ident.to_string())
            .unwrap_or_default(),
        syn::Type::Reference(r) => type_ident(&r.elem),
        syn::Type::Paren(p) => type_ident(&p.elem),
        syn::Type::Group(g) => type_ident(&g.elem),
        syn::Type::TraitObject(t) => t
            .bounds
            .iter()
            .find_map(|b| match b {
                syn::TypeParamBound::Trait(t) => t.path.segments.last().map(|s| s.ident.to_string()),
                _ => None,
            })
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Result of scanning one crate.
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Library name as used in paths (`-` replaced by `_`).
    pub crate_name: String,
    /// Package name from the manifest.
    pub package: String,
    pub root: PathBuf,
    pub candidates: Vec<CandidateFunction>,
    pub index: TypeIndex,
}

impl Discovery {
    /// The single candidate selected by `filter`.
    pub fn find_one(&self, filter: &CandidateFilter) -> Result<&CandidateFunction, DiscoveryError> {
        let matches: Vec<&CandidateFunction> = filter.apply(self).collect();
        match matches.as_slice() {
            [] => Err(DiscoveryError::NotFound(filter.pattern().to_string())),
            [one] => Ok(one),
            many => {
                let mut names: Vec<String> = many.iter().map(|c| c.description()).collect();
                names.sort();
                Err(DiscoveryError::Ambiguous {
                    pattern: filter.pattern().to_string(),
                    matches: names,
                })
            }
        }
    }
}

#[derive(Deserialize)]
struct Manifest {
    package: Option<ManifestPackage>,
    lib: Option<ManifestLib>,
}

#[derive(Deserialize)]
struct ManifestPackage {
    name: String,
}

#[derive(Deserialize)]
struct ManifestLib {
    name: Option<String>,
    path: Option<PathBuf>,
}

/// Scan the crate rooted at `dir` (the directory holding `Cargo.toml`).
pub fn scan_crate(dir: &Path) -> Result<Discovery, DiscoveryError> {
    let manifest_path = dir.join("Cargo.toml");
    let content = std::fs::read_to_string(&manifest_path).map_err(|source| DiscoveryError::Io {
        path: manifest_path.clone(),
        source,
    })?;
    let manifest: Manifest = toml::from_str(&content).map_err(|e| DiscoveryError::Manifest {
        path: manifest_path.clone(),
        reason: e.to_string(),
    })?;
    let package = manifest.package.ok_or_else(|| DiscoveryError::Manifest {
        path: manifest_path.clone(),
        reason: "missing [package] table".into(),
    })?;

    let lib_name = manifest.lib.as_ref().and_then(|l| l.name.clone());
    let crate_name = lib_name.unwrap_or_else(|| package.name.clone()).replace('-', "_");

    let entry = match manifest.lib.and_then(|l| l.path) {
        Some(path) => dir.join(path),
        None => ["src/lib.rs", "src/main.rs"]
            .iter()
            .map(|p| dir.join(p))
            .find(|p| p.is_file())
            .ok_or_else(|| DiscoveryError::MissingEntry(dir.to_path_buf()))?,
    };

    tracing::debug!("scanning crate {} from {}", crate_name, entry.display());
    let mut scanner = Scanner::new(&crate_name);
    scanner.scan_file(&entry, vec![crate_name.clone()], true, ModuleFile::Root)?;
    Ok(scanner.finish(package.name, dir.to_path_buf()))
}

/// Scan a single in-memory source file as the root module of `crate_name`.
pub fn scan_source(crate_name: &str, source: &str) -> Result<Discovery, DiscoveryError> {
    let path = PathBuf::from("src/lib.rs");
    let file = syn::parse_file(source).map_err(|source| DiscoveryError::Parse {
        path: path.clone(),
        source,
    })?;
    let mut scanner = Scanner::new(crate_name);
    let module = vec![crate_name.to_string()];
    scanner.index.add_module(&module, true);
    scanner.scan_items(&file.items, &module, true, &path, None)?;
    Ok(scanner.finish(crate_name.to_string(), PathBuf::from(".")))
}

/// How a module file relates to the directory holding its children.
#[derive(Clone, Copy)]
enum ModuleFile {
    /// `lib.rs`, `main.rs` and `mod.rs`: children live next to the file.
    Root,
    /// `name.rs`: children live in `name/`.
    Named,
}

struct PendingMethod {
    candidate: CandidateFunction,
    method_pub: bool,
}

struct Scanner {
    crate_name: String,
    index: TypeIndex,
    candidates: Vec<CandidateFunction>,
    /// Inherent methods whose exported flag depends on the self type.
    pending: Vec<PendingMethod>,
    /// `impl Fill for X` blocks, resolved once every type is indexed.
    fill_impls: Vec<(Vec<String>, syn::Path)>,
}

impl Scanner {
    fn new(crate_name: &str) -> Self {
        Self {
            crate_name: crate_name.to_string(),
            index: TypeIndex::new(crate_name),
            candidates: Vec::new(),
            pending: Vec::new(),
            fill_impls: Vec::new(),
        }
    }

    fn scan_file(
        &mut self,
        path: &Path,
        module: Vec<String>,
        exported: bool,
        kind: ModuleFile,
    ) -> Result<(), DiscoveryError> {
        let source = std::fs::read_to_string(path).map_err(|source| DiscoveryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = syn::parse_file(&source).map_err(|source| DiscoveryError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("scanned {} ({} items)", path.display(), file.items.len());

        let child_dir = match kind {
            ModuleFile::Root => path.parent().map(Path::to_path_buf),
            ModuleFile::Named => {
                let stem = path.file_stem().map(|s| s.to_os_string());
                path.parent()
                    .zip(stem)
                    .map(|(parent, stem)| parent.join(stem))
            }
        };
        self.index.add_module(&module, exported);
        self.scan_items(&file.items, &module, exported, path, child_dir.as_deref())
    }

    fn scan_items(
        &mut self,
        items: &[syn::Item],
        module: &[String],
        module_exported: bool,
        file: &Path,
        child_dir: Option<&Path>,
    ) -> Result<(), DiscoveryError> {
        // Types and imports first, so impl blocks earlier in the file resolve.
        for item in items {
            match item {
                syn::Item::Struct(s) if !is_cfg_test(&s.attrs) => {
                    self.index_struct(s, module, module_exported);
                }
                syn::Item::Enum(e) if !is_cfg_test(&e.attrs) => {
                    self.index_simple(
                        &e.ident,
                        &e.vis,
                        &e.generics,
                        &e.attrs,
                        TypeDefKind::Enum,
                        module,
                        module_exported,
                    );
                }
                syn::Item::Type(t) => {
                    self.index_simple(
                        &t.ident,
                        &t.vis,
                        &t.generics,
                        &t.attrs,
                        TypeDefKind::Alias((*t.ty).clone()),
                        module,
                        module_exported,
                    );
                }
                syn::Item::Trait(t) => {
                    self.index_simple(
                        &t.ident,
                        &t.vis,
                        &t.generics,
                        &t.attrs,
                        TypeDefKind::Trait,
                        module,
                        module_exported,
                    );
                }
                syn::Item::Use(u) => self.collect_use(module, &u.tree, Vec::new()),
                syn::Item::Mod(m) if !is_cfg_test(&m.attrs) => {
                    let mut child = module.to_vec();
                    child.push(m.ident.to_string());
                    self.index.add_module(&child, module_exported && is_pub(&m.vis));
                }
                _ => {}
            }
        }

        for item in items {
            match item {
                syn::Item::Fn(f) if !is_cfg_test(&f.attrs) => {
                    let candidate = self.candidate_from_sig(
                        &f.sig,
                        module,
                        file,
                        Owner::Free,
                        module_exported && is_pub(&f.vis),
                    );
                    self.candidates.push(candidate);
                }
                syn::Item::Impl(imp) if !is_cfg_test(&imp.attrs) => {
                    self.scan_impl(imp, module, file);
                }
                syn::Item::Trait(t) => {
                    let name = t.ident.to_string();
                    for trait_item in &t.items {
                        if let syn::TraitItem::Fn(f) = trait_item {
                            if f.default.is_none() {
                                continue;
                            }
                            let candidate = self.candidate_from_sig(
                                &f.sig,
                                module,
                                file,
                                Owner::Trait { name: name.clone() },
                                module_exported && is_pub(&t.vis),
                            );
                            self.candidates.push(candidate);
                        }
                    }
                }
                syn::Item::ForeignMod(fm) => {
                    for foreign in &fm.items {
                        if let syn::ForeignItem::Fn(f) = foreign {
                            let mut candidate = self.candidate_from_sig(
                                &f.sig,
                                module,
                                file,
                                Owner::Free,
                                module_exported && is_pub(&f.vis),
                            );
                            candidate.is_unsafe = true;
                            self.candidates.push(candidate);
                        }
                    }
                }
                syn::Item::Mod(m) if !is_cfg_test(&m.attrs) => {
                    let mut child = module.to_vec();
                    child.push(m.ident.to_string());
                    let exported = module_exported && is_pub(&m.vis);
                    if let Some((_, content)) = &m.content {
                        self.scan_items(content, &child, exported, file, None)?;
                        continue;
                    }
                    match self.module_path(m, child_dir) {
                        Some((path, kind)) => self.scan_file(&path, child, exported, kind)?,
                        None => tracing::warn!(
                            "module {} declared in {} not found, skipping",
                            child.join("::"),
                            file.display()
                        ),
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn module_path(&self, m: &syn::ItemMod, child_dir: Option<&Path>) -> Option<(PathBuf, ModuleFile)> {
        let dir = child_dir?;
        if let Some(explicit) = path_attr(&m.attrs) {
            let path = dir.join(explicit);
            let kind = if path.file_name().is_some_and(|n| n == "mod.rs") {
                ModuleFile::Root
            } else {
                ModuleFile::Named
            };
            return path.is_file().then_some((path, kind));
        }
        let name = m.ident.to_string();
        let flat = dir.join(format!("{name}.rs"));
        if flat.is_file() {
            return Some((flat, ModuleFile::Named));
        }
        let nested = dir.join(&name).join("mod.rs");
        nested.is_file().then_some((nested, ModuleFile::Root))
    }

    fn index_struct(&mut self, s: &syn::ItemStruct, module: &[String], module_exported: bool) {
        let fields = s
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| FieldDef {
                name: f
                    .ident
                    .as_ref()
                    .map_or_else(|| i.to_string(), ToString::to_string),
                visible: is_pub(&f.vis),
                ty: f.ty.clone(),
            })
            .collect();
        self.index_simple(
            &s.ident,
            &s.vis,
            &s.generics,
            &s.attrs,
            TypeDefKind::Struct { fields },
            module,
            module_exported,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn index_simple(
        &mut self,
        ident: &syn::Ident,
        vis: &syn::Visibility,
        generics: &syn::Generics,
        attrs: &[syn::Attribute],
        kind: TypeDefKind,
        module: &[String],
        module_exported: bool,
    ) {
        let ident = ident.to_string();
        let canonical = format!("{}::{}", module.join("::"), ident);
        self.index.insert(TypeDef {
            canonical,
            module: module.to_vec(),
            ident,
            exported: module_exported && is_pub(vis),
            generics: generics.type_params().map(|p| p.ident.to_string()).collect(),
            kind,
            has_fill: derives_fill(attrs),
        });
    }

    fn collect_use(&mut self, module: &[String], tree: &syn::UseTree, mut prefix: Vec<String>) {
        match tree {
            syn::UseTree::Path(p) => {
                prefix.push(p.ident.to_string());
                self.collect_use(module, &p.tree, prefix);
            }
            syn::UseTree::Name(n) => {
                let local = n.ident.to_string();
                if local == "self" {
                    if let Some(last) = prefix.last().cloned() {
                        let target = self.index.resolve_use(module, &prefix);
                        self.index.add_import(module, last, target);
                    }
                    return;
                }
                prefix.push(local.clone());
                let target = self.index.resolve_use(module, &prefix);
                self.index.add_import(module, local, target);
            }
            syn::UseTree::Rename(r) => {
                prefix.push(r.ident.to_string());
                let target = self.index.resolve_use(module, &prefix);
                self.index.add_import(module, r.rename.to_string(), target);
            }
            syn::UseTree::Group(g) => {
                for item in &g.items {
                    self.collect_use(module, item, prefix.clone());
                }
            }
            syn::UseTree::Glob(_) => {}
        }
    }

    fn scan_impl(&mut self, imp: &syn::ItemImpl, module: &[String], file: &Path) {
        if let Some((_, trait_path, _)) = &imp.trait_ {
            // Trait impl methods are reached through the trait; only note
            // hand-written decoders.
            if trait_path.segments.last().is_some_and(|s| s.ident == "Fill") {
                if let syn::Type::Path(tp) = &*imp.self_ty {
                    self.fill_impls.push((module.to_vec(), tp.path.clone()));
                }
            }
            return;
        }

        let owner = match &*imp.self_ty {
            syn::Type::TraitObject(_) => Owner::Trait {
                name: type_ident(&imp.self_ty),
            },
            self_ty => Owner::Inherent {
                self_ty: self_ty.clone(),
                generics: generic_infos(&imp.generics),
            },
        };

        for impl_item in &imp.items {
            let syn::ImplItem::Fn(f) = impl_item else {
                continue;
            };
            if is_cfg_test(&f.attrs) {
                continue;
            }
            let method_pub = is_pub(&f.vis);
            let candidate = self.candidate_from_sig(&f.sig, module, file, owner.clone(), false);
            self.pending.push(PendingMethod {
                candidate,
                method_pub,
            });
        }
    }

    fn candidate_from_sig(
        &self,
        sig: &syn::Signature,
        module: &[String],
        file: &Path,
        owner: Owner,
        exported: bool,
    ) -> CandidateFunction {
        let mut receiver = None;
        let mut params = Vec::new();
        for input in &sig.inputs {
            match input {
                syn::FnArg::Receiver(r) => receiver = Some(receiver_mode(r)),
                syn::FnArg::Typed(t) => params.push(RawParam {
                    pat: (*t.pat).clone(),
                    ty: (*t.ty).clone(),
                }),
            }
        }
        let output = match &sig.output {
            syn::ReturnType::Default => None,
            syn::ReturnType::Type(_, ty) => Some((**ty).clone()),
        };
        CandidateFunction {
            name: sig.ident.to_string(),
            module: module.to_vec(),
            file: file.to_path_buf(),
            line: sig.ident.span().start().line,
            owner,
            receiver,
            params,
            output,
            generics: generic_infos(&sig.generics),
            exported,
            is_unsafe: sig.unsafety.is_some(),
            is_async: sig.asyncness.is_some(),
            is_variadic: sig.variadic.is_some(),
        }
    }

    fn finish(mut self, package: String, root: PathBuf) -> Discovery {
        self.index.fixup_imports();

        for (module, path) in std::mem::take(&mut self.fill_impls) {
            if let Some(canonical) = self.index.resolve_path(&module, &path) {
                self.index.mark_fill(&canonical);
            }
        }

        for pending in std::mem::take(&mut self.pending) {
            let mut candidate = pending.candidate;
            candidate.exported = pending.method_pub
                && self.index.module_exported(&candidate.module)
                && match &candidate.owner {
                    Owner::Inherent {
                        self_ty: syn::Type::Path(tp),
                        ..
                    } => self
                        .index
                        .resolve_path(&candidate.module, &tp.path)
                        .and_then(|c| self.index.get(&c))
                        .is_some_and(|def| def.exported),
                    _ => false,
                };
            self.candidates.push(candidate);
        }

        tracing::debug!(
            "crate {}: {} candidates, {} types",
            self.crate_name,
            self.candidates.len(),
            self.index.len()
        );
        Discovery {
            crate_name: self.crate_name,
            package,
            root,
            candidates: self.candidates,
            index: self.index,
        }
    }
}

fn receiver_mode(r: &syn::Receiver) -> ReceiverMode {
    if r.colon_token.is_none() {
        return match (&r.reference, &r.mutability) {
            (Some(_), Some(_)) => ReceiverMode::RefMut,
            (Some(_), None) => ReceiverMode::Ref,
            (None, _) => ReceiverMode::Value,
        };
    }
    match &*r.ty {
        syn::Type::Path(tp)
            if tp.path.segments.len() == 1
                && tp.path.segments[0].ident == "Box"
                && matches!(
                    &tp.path.segments[0].arguments,
                    syn::PathArguments::AngleBracketed(a)
                        if matches!(a.args.first(), Some(syn::GenericArgument::Type(syn::Type::Path(inner))) if inner.path.is_ident("Self"))
                ) =>
        {
            ReceiverMode::Boxed
        }
        syn::Type::Path(tp) if tp.path.is_ident("Self") => ReceiverMode::Value,
        syn::Type::Reference(r) if matches!(&*r.elem, syn::Type::Path(p) if p.path.is_ident("Self")) => {
            if r.mutability.is_some() {
                ReceiverMode::RefMut
            } else {
                ReceiverMode::Ref
            }
        }
        other => ReceiverMode::Other(quote::ToTokens::to_token_stream(other).to_string()),
    }
}

fn generic_infos(generics: &syn::Generics) -> Vec<GenericInfo> {
    let mut infos: Vec<GenericInfo> = generics
        .params
        .iter()
        .filter_map(|p| match p {
            syn::GenericParam::Type(t) => Some(GenericInfo {
                name: t.ident.to_string(),
                bounds: bound_names(t.bounds.iter()),
            }),
            syn::GenericParam::Const(c) => Some(GenericInfo {
                name: c.ident.to_string(),
                bounds: Vec::new(),
            }),
            syn::GenericParam::Lifetime(_) => None,
        })
        .collect();

    if let Some(where_clause) = &generics.where_clause {
        for predicate in &where_clause.predicates {
            let syn::WherePredicate::Type(pt) = predicate else {
                continue;
            };
            let syn::Type::Path(tp) = &pt.bounded_ty else {
                continue;
            };
            let Some(ident) = tp.path.get_ident() else {
                continue;
            };
            if let Some(info) = infos.iter_mut().find(|i| *ident == i.name) {
                info.bounds.extend(bound_names(pt.bounds.iter()));
            }
        }
    }
    infos
}

fn bound_names<'a>(bounds: impl Iterator<Item = &'a syn::TypeParamBound>) -> Vec<String> {
    bounds
        .filter_map(|b| match b {
            syn::TypeParamBound::Trait(t) => t.path.segments.last().map(|s| s.ident.to_string()),
            _ => None,
        })
        .collect()
}

fn is_pub(vis: &syn::Visibility) -> bool {
    matches!(vis, syn::Visibility::Public(_))
}

fn is_cfg_test(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .parse_args::<syn::Ident>()
                .is_ok_and(|ident| ident == "test")
    })
}

fn derives_fill(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().filter(|a| a.path().is_ident("derive")).any(|attr| {
        attr.parse_args_with(
            syn::punctuated::Punctuated::<syn::Path, syn::Token![,]>::parse_terminated,
        )
        .is_ok_and(|paths| {
            paths
                .iter()
                .any(|p| p.segments.last().is_some_and(|s| s.ident == "Fill"))
        })
    })
}

fn path_attr(attrs: &[syn::Attribute]) -> Option<String> {
    attrs.iter().find_map(|attr| {
        if !attr.path().is_ident("path") {
            return None;
        }
        let syn::Meta::NameValue(nv) = &attr.meta else {
            return None;
        };
        match &nv.value {
            syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(s),
                ..
            }) => Some(s.value()),
            _ => None,
        }
    })
}
