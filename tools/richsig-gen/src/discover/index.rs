// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type index built while scanning a crate.
//!
//! Maps canonical paths (`crate_name::module::Item`) to the struct, enum,
//! alias and trait definitions found in the sources, and keeps each module's
//! `use` imports so written paths can be resolved the way rustc would for the
//! common cases: `crate::`, `self::`, `super::`, imported names and items
//! defined in the same module. Glob imports and macro-generated items are
//! not resolved.

use std::collections::HashMap;

/// One field of a scanned struct, in declaration order.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Identifier for named fields, the position for tuple fields.
    pub name: String,
    pub visible: bool,
    pub ty: syn::Type,
}

#[derive(Debug, Clone)]
pub enum TypeDefKind {
    Struct { fields: Vec<FieldDef> },
    Enum,
    Alias(syn::Type),
    Trait,
}

#[derive(Debug, Clone)]
pub struct TypeDef {
    pub canonical: String,
    /// Module the item is defined in, crate name first.
    pub module: Vec<String>,
    pub ident: String,
    pub exported: bool,
    /// Names of the item's type parameters, in order.
    pub generics: Vec<String>,
    pub kind: TypeDefKind,
    /// `#[derive(Fill)]` or a hand-written `impl Fill for ...` was seen.
    pub has_fill: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ModuleScope {
    pub exported: bool,
    /// Local name -> canonical (or as-written external) path.
    pub imports: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct TypeIndex {
    crate_name: String,
    items: HashMap<String, TypeDef>,
    modules: HashMap<String, ModuleScope>,
}

impl TypeIndex {
    pub fn new(crate_name: impl Into<String>) -> Self {
        let crate_name = crate_name.into();
        let mut modules = HashMap::new();
        modules.insert(
            crate_name.clone(),
            ModuleScope {
                exported: true,
                imports: HashMap::new(),
            },
        );
        Self {
            crate_name,
            items: HashMap::new(),
            modules,
        }
    }

    pub fn crate_name(&self) -> &str {
        &self.crate_name
    }

    pub fn get(&self, canonical: &str) -> Option<&TypeDef> {
        self.items.get(canonical)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn insert(&mut self, def: TypeDef) {
        self.items.insert(def.canonical.clone(), def);
    }

    pub(crate) fn mark_fill(&mut self, canonical: &str) {
        if let Some(def) = self.items.get_mut(canonical) {
            def.has_fill = true;
        }
    }

    pub(crate) fn add_module(&mut self, module: &[String], exported: bool) {
        self.modules
            .entry(module.join("::"))
            .or_insert_with(ModuleScope::default)
            .exported = exported;
    }

    pub(crate) fn add_import(&mut self, module: &[String], local: String, target: String) {
        self.modules
            .entry(module.join("::"))
            .or_default()
            .imports
            .insert(local, target);
    }

    pub fn module_exported(&self, module: &[String]) -> bool {
        self.modules
            .get(&module.join("::"))
            .is_some_and(|m| m.exported)
    }

    fn has_module(&self, joined: &str) -> bool {
        self.modules.contains_key(joined)
    }

    /// Normalize the leading `crate` / `self` / `super` segments of a path
    /// written inside `module`. Returns `None` for paths that start with any
    /// other segment.
    pub fn normalize_prefix(&self, module: &[String], segments: &[String]) -> Option<Vec<String>> {
        let first = segments.first()?;
        match first.as_str() {
            "crate" => {
                let mut out = vec![self.crate_name.clone()];
                out.extend_from_slice(&segments[1..]);
                Some(out)
            }
            "self" => {
                let mut out = module.to_vec();
                out.extend_from_slice(&segments[1..]);
                Some(out)
            }
            "super" => {
                let mut base = module.to_vec();
                let mut rest = segments;
                while rest.first().is_some_and(|s| s == "super") {
                    if base.len() > 1 {
                        base.pop();
                    }
                    rest = &rest[1..];
                }
                base.extend_from_slice(rest);
                Some(base)
            }
            _ => None,
        }
    }

    /// Resolve a written path to its canonical form.
    ///
    /// Returns `None` when the path is not known to the index (prelude types,
    /// extern crates used without a `use`, glob imports); callers then keep
    /// the path as written.
    pub fn resolve_segments(&self, module: &[String], segments: &[String]) -> Option<String> {
        if let Some(normalized) = self.normalize_prefix(module, segments) {
            return Some(self.follow_imports(normalized.join("::")));
        }
        let first = segments.first()?;
        let scope = self.modules.get(&module.join("::"));
        if let Some(target) = scope.and_then(|s| s.imports.get(first)) {
            let mut out = target.clone();
            for seg in &segments[1..] {
                out.push_str("::");
                out.push_str(seg);
            }
            return Some(self.follow_imports(out));
        }
        let local = format!("{}::{}", module.join("::"), first);
        if self.items.contains_key(&local) || self.has_module(&local) {
            let mut out = module.to_vec();
            out.extend_from_slice(segments);
            return Some(self.follow_imports(out.join("::")));
        }
        if *first == self.crate_name {
            return Some(self.follow_imports(segments.join("::")));
        }
        None
    }

    /// Rewrite a crate path that names an import (`use` or `pub use`
    /// re-export) to the imported item.
    fn follow_imports(&self, mut path: String) -> String {
        const MAX_HOPS: usize = 8;
        for _ in 0..MAX_HOPS {
            if self.items.contains_key(&path) {
                break;
            }
            let segments: Vec<&str> = path.split("::").collect();
            let hop = (1..segments.len()).rev().find_map(|i| {
                let scope = self.modules.get(&segments[..i].join("::"))?;
                let target = scope.imports.get(segments[i])?;
                let mut out = target.clone();
                for seg in &segments[i + 1..] {
                    out.push_str("::");
                    out.push_str(seg);
                }
                Some(out)
            });
            match hop {
                Some(next) if next != path => path = next,
                _ => break,
            }
        }
        path
    }

    pub fn resolve_path(&self, module: &[String], path: &syn::Path) -> Option<String> {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        if path.leading_colon.is_some() {
            return Some(segments.join("::"));
        }
        self.resolve_segments(module, &segments)
    }

    /// Resolve a `use` target, which may be crate-relative, module-relative
    /// or an extern crate path.
    pub(crate) fn resolve_use(&self, module: &[String], segments: &[String]) -> String {
        if let Some(normalized) = self.normalize_prefix(module, segments) {
            return normalized.join("::");
        }
        match segments.first() {
            Some(first) if *first == self.crate_name => segments.join("::"),
            Some(first) => {
                let local = format!("{}::{}", module.join("::"), first);
                if self.items.contains_key(&local) || self.has_module(&local) {
                    let mut out = module.to_vec();
                    out.extend_from_slice(segments);
                    out.join("::")
                } else {
                    segments.join("::")
                }
            }
            None => String::new(),
        }
    }

    /// Re-resolve imports recorded before all items were known.
    ///
    /// A `use sibling::Item;` may be seen before `mod sibling;` is scanned;
    /// such targets were recorded as written and are rewritten here.
    pub(crate) fn fixup_imports(&mut self) {
        let mut updates = Vec::new();
        for (module_key, scope) in &self.modules {
            let module: Vec<String> = module_key.split("::").map(str::to_string).collect();
            for (local, target) in &scope.imports {
                let segments: Vec<String> = target.split("::").map(str::to_string).collect();
                let resolved = self.resolve_use(&module, &segments);
                if resolved != *target {
                    updates.push((module_key.clone(), local.clone(), resolved));
                }
            }
        }
        for (module_key, local, resolved) in updates {
            if let Some(scope) = self.modules.get_mut(&module_key) {
                scope.imports.insert(local, resolved);
            }
        }
    }
}
