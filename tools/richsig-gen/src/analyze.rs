// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Signature analysis.
//!
//! Classifies each candidate as directly fuzzable (`fn(&[u8]) -> i32`),
//! needing an adapter, or unsupported. For adapters, every parameter gets a
//! [`ParamSpec`]: its rendered type, its [`TypeKind`], how it is passed to
//! the target and, for trait-typed parameters, the stand-in expression that
//! replaces decoding.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use richsig::{AggregateDescriptor, FieldDescriptor, PointerKind, PrimitiveKind, TypeKind};
use syn::visit_mut::VisitMut;

use crate::discover::{
    type_ident, CandidateFunction, GenericInfo, Owner, RawParam, ReceiverMode, TypeDefKind,
    TypeIndex,
};
use crate::render::TypeRenderer;
use crate::substitute::SubstitutionTable;
use crate::synth::naming::snake_case;

/// Why a candidate gets no adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TraitOrFn(String),
    NonByteSequence(String),
    TraitReceiver(String),
    NoInputs,
    UnresolvedReceiver(String),
    GenericParam(String),
    Async,
    Unsafe,
    RecursiveAggregate(String),
    UnsupportedType(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TraitOrFn(ty) => write!(
                f,
                "parameters include traits or functions without a substitution: {}",
                ty
            ),
            Self::NonByteSequence(ty) => {
                write!(f, "only byte sequences can be decoded, found {}", ty)
            }
            Self::TraitReceiver(name) => {
                write!(f, "the receiver is the trait {}, not a concrete type", name)
            }
            Self::NoInputs => f.write_str("it takes no inputs"),
            Self::UnresolvedReceiver(ty) => write!(f, "receiver type {} could not be resolved", ty),
            Self::GenericParam(name) => {
                write!(f, "generic parameter {} has no substitution", name)
            }
            Self::Async => f.write_str("async functions are not supported"),
            Self::Unsafe => f.write_str("unsafe functions are not called unless allowed"),
            Self::RecursiveAggregate(ty) => {
                write!(f, "{} contains itself without an Option in between", ty)
            }
            Self::UnsupportedType(ty) => write!(f, "no decoder for type {}", ty),
        }
    }
}

/// How a harness local reaches the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passing {
    Value,
    Ref,
    RefMut,
    /// Wrapped with `Box::new` (stand-ins for `Box<dyn Trait>`).
    Boxed,
}

impl Passing {
    pub fn argument(self, local: &str) -> String {
        match self {
            Self::Value => local.to_string(),
            Self::Ref => format!("&{local}"),
            Self::RefMut => format!("&mut {local}"),
            Self::Boxed => format!("Box::new({local})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandIn {
    pub trait_name: String,
    /// Expression text, ready for generated code.
    pub expr: String,
    pub draws_bytes: bool,
}

/// One adapter parameter, before naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Identifier written in the signature, `arg` for placeholders.
    pub base: String,
    /// `_` or a destructuring pattern.
    pub placeholder: bool,
    /// Type of the harness local; empty for stand-ins.
    pub ty: String,
    pub kind: TypeKind,
    pub passing: Passing,
    pub mutable: bool,
    pub stand_in: Option<StandIn>,
    /// Crate types that must implement `richsig::Fill` for the local to
    /// decode.
    pub needs_fill: BTreeSet<String>,
}

impl ParamSpec {
    /// Gets an absence guard in the adapter.
    pub fn is_optional(&self) -> bool {
        self.stand_in.is_none()
            && matches!(
                self.kind,
                TypeKind::Pointer {
                    kind: PointerKind::Option,
                    ..
                }
            )
    }

    /// Kind the dynamic decoder walks for this local, `None` when the local
    /// consumes nothing.
    pub fn decode_kind(&self) -> Option<TypeKind> {
        match &self.stand_in {
            Some(s) if s.draws_bytes => Some(TypeKind::Bytes),
            Some(_) => None,
            None => Some(self.kind.clone()),
        }
    }
}

/// A candidate the engine can drive without decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardPlan {
    pub call_path: String,
    /// Takes `Vec<u8>` rather than `&[u8]`.
    pub owned: bool,
    pub is_unsafe: bool,
}

#[derive(Debug, Clone)]
pub struct ReceiverInfo {
    /// Qualified self type, compared against constructor results.
    pub canonical: String,
    pub short_name: String,
    pub mode: ReceiverMode,
    /// The receiver as an adapter parameter, when it can be decoded.
    pub spec: Result<ParamSpec, SkipReason>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// Free or associated function path.
    Path(String),
    /// Method called on the receiver local.
    Method(String),
}

#[derive(Debug, Clone)]
pub struct AnalyzedFn {
    pub receiver: Option<ReceiverInfo>,
    pub params: Vec<ParamSpec>,
    pub call: CallTarget,
    pub returns_value: bool,
    pub is_unsafe: bool,
}

#[derive(Debug, Clone)]
pub enum Classification {
    Fuzzable(ForwardPlan),
    NeedsAdapter(AnalyzedFn),
    Unsupported(SkipReason),
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fuzzable(_) => "fuzzable",
            Self::NeedsAdapter(_) => "needs-adapter",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

#[derive(Default)]
struct KindCtx {
    stack: Vec<(String, bool)>,
    needs_fill: BTreeSet<String>,
}

pub struct Analyzer<'a> {
    index: &'a TypeIndex,
    table: &'a SubstitutionTable,
    renderer: TypeRenderer<'a>,
    allow_unsafe: bool,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        index: &'a TypeIndex,
        table: &'a SubstitutionTable,
        qualify_all: bool,
        allow_unsafe: bool,
    ) -> Self {
        Self {
            index,
            table,
            renderer: TypeRenderer::new(index, qualify_all),
            allow_unsafe,
        }
    }

    pub fn renderer(&self) -> &TypeRenderer<'a> {
        &self.renderer
    }

    pub fn classify(&self, candidate: &CandidateFunction) -> Classification {
        match self.analyze(candidate) {
            Ok(classification) => classification,
            Err(reason) => Classification::Unsupported(reason),
        }
    }

    fn analyze(&self, candidate: &CandidateFunction) -> Result<Classification, SkipReason> {
        if candidate.is_async {
            return Err(SkipReason::Async);
        }
        if candidate.is_unsafe && !self.allow_unsafe {
            return Err(SkipReason::Unsafe);
        }
        let candidate = with_concrete_self(candidate);

        if let Some(plan) = self.forward_plan(&candidate) {
            return Ok(Classification::Fuzzable(plan));
        }
        if candidate.params.is_empty() && candidate.receiver.is_none() {
            return Err(SkipReason::NoInputs);
        }
        match &candidate.owner {
            Owner::Trait { name } => return Err(SkipReason::TraitReceiver(name.clone())),
            Owner::Inherent { generics, .. } => {
                if let Some(generic) = generics.first() {
                    return Err(SkipReason::GenericParam(generic.name.clone()));
                }
            }
            Owner::Free => {}
        }

        let receiver = match (&candidate.owner, &candidate.receiver) {
            (Owner::Inherent { self_ty, .. }, Some(mode)) => {
                Some(self.receiver_info(&candidate.module, self_ty, mode))
            }
            _ => None,
        };
        let params = self.param_specs(&candidate)?;
        if candidate.is_variadic {
            tracing::debug!(
                "{}: variadic tail is called with no extra arguments",
                candidate.description()
            );
        }
        let call = match &candidate.receiver {
            Some(_) => CallTarget::Method(candidate.name.clone()),
            None => CallTarget::Path(self.call_path(&candidate)),
        };
        Ok(Classification::NeedsAdapter(AnalyzedFn {
            receiver,
            params,
            call,
            returns_value: candidate.output.is_some(),
            is_unsafe: candidate.is_unsafe,
        }))
    }

    /// Specs for a function's own parameters, in order.
    pub fn param_specs(&self, candidate: &CandidateFunction) -> Result<Vec<ParamSpec>, SkipReason> {
        let candidate = with_concrete_self(candidate);
        let generics: Vec<&GenericInfo> = candidate.all_generics().collect();
        candidate
            .params
            .iter()
            .map(|param| self.param_spec(&candidate.module, param, &generics))
            .collect()
    }

    /// Path that calls a receiver-less function from generated code.
    pub fn call_path(&self, candidate: &CandidateFunction) -> String {
        match &candidate.owner {
            Owner::Inherent { self_ty, .. } => {
                let ty = self.renderer.render(&candidate.module, self_ty);
                if ty.contains('<') {
                    format!("<{}>::{}", ty, candidate.name)
                } else {
                    format!("{}::{}", ty, candidate.name)
                }
            }
            Owner::Trait { name } => format!("{}::{}", name, candidate.name),
            Owner::Free => self
                .renderer
                .item_path(&format!("{}::{}", candidate.module.join("::"), candidate.name)),
        }
    }

    fn forward_plan(&self, candidate: &CandidateFunction) -> Option<ForwardPlan> {
        if candidate.receiver.is_some() || candidate.params.len() != 1 {
            return None;
        }
        match &candidate.owner {
            Owner::Trait { .. } => return None,
            Owner::Inherent { generics, .. } if !generics.is_empty() => return None,
            _ => {}
        }
        let returns_status = match &candidate.output {
            Some(syn::Type::Path(tp)) => tp
                .path
                .segments
                .last()
                .is_some_and(|s| s.ident == "i32" || s.ident == "c_int"),
            _ => false,
        };
        if !returns_status {
            return None;
        }
        let owned = match &candidate.params[0].ty {
            syn::Type::Reference(r) if r.mutability.is_none() && is_byte_slice(&r.elem) => false,
            syn::Type::Path(tp) if is_byte_vec(tp) => true,
            _ => return None,
        };
        Some(ForwardPlan {
            call_path: self.call_path(candidate),
            owned,
            is_unsafe: candidate.is_unsafe,
        })
    }

    fn receiver_info(&self, module: &[String], self_ty: &syn::Type, mode: &ReceiverMode) -> ReceiverInfo {
        ReceiverInfo {
            canonical: self.renderer.canonical(module, self_ty),
            short_name: type_ident(self_ty),
            mode: mode.clone(),
            spec: self.receiver_spec(module, self_ty, mode),
        }
    }

    fn receiver_spec(
        &self,
        module: &[String],
        self_ty: &syn::Type,
        mode: &ReceiverMode,
    ) -> Result<ParamSpec, SkipReason> {
        let rendered = self.renderer.render(module, self_ty);
        if let ReceiverMode::Other(ty) = mode {
            return Err(SkipReason::UnsupportedType(ty.clone()));
        }
        let known = match self_ty {
            syn::Type::Path(tp) => self
                .index
                .resolve_path(module, &tp.path)
                .is_some_and(|c| self.index.get(&c).is_some()),
            _ => false,
        };
        if !known {
            return Err(SkipReason::UnresolvedReceiver(rendered));
        }

        let boxed = *mode == ReceiverMode::Boxed;
        let mut ctx = KindCtx::default();
        let mut kind = self.kind_of(module, self_ty, &[], boxed, &mut ctx)?;
        if let Some(bad) = kind.first_undecodable() {
            return Err(undecodable(bad, &rendered, std::ptr::eq(bad, &kind)));
        }
        let ty = if boxed {
            kind = TypeKind::pointer(PointerKind::Box, kind);
            format!("Box<{}>", rendered)
        } else {
            rendered
        };
        Ok(ParamSpec {
            base: snake_case(&type_ident(self_ty)),
            placeholder: false,
            ty,
            kind,
            passing: Passing::Value,
            mutable: *mode == ReceiverMode::RefMut,
            stand_in: None,
            needs_fill: ctx.needs_fill,
        })
    }

    fn param_spec(
        &self,
        module: &[String],
        param: &RawParam,
        generics: &[&GenericInfo],
    ) -> Result<ParamSpec, SkipReason> {
        let (base, placeholder) = match param.ident() {
            Some(ident) => (ident, false),
            None => ("arg".to_string(), true),
        };
        let declared = self.renderer.render(module, &param.ty);

        if let Some((passing, stand_in)) = self.stand_in(module, &param.ty, generics)? {
            return Ok(ParamSpec {
                base,
                placeholder,
                ty: String::new(),
                kind: if stand_in.draws_bytes {
                    TypeKind::Bytes
                } else {
                    TypeKind::Interface(stand_in.trait_name.clone())
                },
                passing,
                mutable: passing == Passing::RefMut,
                stand_in: Some(stand_in),
                needs_fill: BTreeSet::new(),
            });
        }

        let (passing, inner) = match &param.ty {
            syn::Type::Reference(r) => {
                let passing = if r.mutability.is_some() {
                    Passing::RefMut
                } else {
                    Passing::Ref
                };
                match &*r.elem {
                    syn::Type::Path(tp) if tp.path.is_ident("str") => {
                        return Ok(simple_spec(base, placeholder, "String", TypeKind::String, passing));
                    }
                    syn::Type::Slice(s) if is_u8(&s.elem) => {
                        return Ok(simple_spec(base, placeholder, "Vec<u8>", TypeKind::Bytes, passing));
                    }
                    syn::Type::Slice(_) => return Err(SkipReason::NonByteSequence(declared)),
                    elem => (passing, elem),
                }
            }
            ty => (Passing::Value, ty),
        };

        let names: Vec<String> = generics.iter().map(|g| g.name.clone()).collect();
        let mut ctx = KindCtx::default();
        let kind = self.kind_of(module, inner, &names, false, &mut ctx)?;
        if let Some(bad) = kind.first_undecodable() {
            return Err(undecodable(bad, &declared, std::ptr::eq(bad, &kind)));
        }
        Ok(ParamSpec {
            base,
            placeholder,
            ty: self.renderer.render(module, inner),
            kind,
            passing,
            mutable: passing == Passing::RefMut,
            stand_in: None,
            needs_fill: ctx.needs_fill,
        })
    }

    /// Stand-in for a trait-typed parameter, looking through one `&`,
    /// `&mut` or `Box`.
    fn stand_in(
        &self,
        module: &[String],
        ty: &syn::Type,
        generics: &[&GenericInfo],
    ) -> Result<Option<(Passing, StandIn)>, SkipReason> {
        let (passing, inner) = match ty {
            syn::Type::Reference(r) if r.mutability.is_some() => (Passing::RefMut, &*r.elem),
            syn::Type::Reference(r) => (Passing::Ref, &*r.elem),
            syn::Type::Path(tp) => match box_inner(tp) {
                Some(inner) => (Passing::Boxed, inner),
                None => (Passing::Value, ty),
            },
            _ => (Passing::Value, ty),
        };
        let inner = strip_parens(inner);

        let names: Vec<String> = match inner {
            syn::Type::TraitObject(t) => bound_paths(t.bounds.iter()),
            syn::Type::ImplTrait(t) => bound_paths(t.bounds.iter()),
            syn::Type::Path(tp) if tp.qself.is_none() => {
                if let Some(generic) = tp
                    .path
                    .get_ident()
                    .and_then(|ident| generics.iter().find(|g| *ident == g.name))
                {
                    let hit = generic.bounds.iter().find_map(|b| self.table.lookup(b));
                    return match hit {
                        Some(sub) => Ok(Some((passing, self.make_stand_in(&sub.name, sub)))),
                        None => Err(SkipReason::GenericParam(generic.name.clone())),
                    };
                }
                let local = self
                    .index
                    .resolve_path(module, &tp.path)
                    .is_some_and(|c| self.is_local(&c));
                if local {
                    return Ok(None);
                }
                let written = tp
                    .path
                    .segments
                    .iter()
                    .map(|s| s.ident.to_string())
                    .collect::<Vec<_>>()
                    .join("::");
                vec![written]
            }
            _ => return Ok(None),
        };

        Ok(names.iter().find_map(|name| {
            self.table
                .lookup(name)
                .map(|sub| (passing, self.make_stand_in(name, sub)))
        }))
    }

    fn make_stand_in(&self, name: &str, sub: &crate::substitute::Substitution) -> StandIn {
        StandIn {
            trait_name: name.rsplit("::").next().unwrap_or(name).to_string(),
            expr: sub.render(),
            draws_bytes: sub.draws_bytes(),
        }
    }

    fn is_local(&self, canonical: &str) -> bool {
        let crate_name = self.index.crate_name();
        canonical == crate_name
            || canonical
                .strip_prefix(crate_name)
                .is_some_and(|rest| rest.starts_with("::"))
    }

    /// Decoding kind of `ty`, written in `module`. `in_pointee` is true while
    /// inside a `Box`/`Option`/`Rc`/`Arc` pointee, where optionals are not
    /// followed.
    fn kind_of(
        &self,
        module: &[String],
        ty: &syn::Type,
        generics: &[String],
        in_pointee: bool,
        ctx: &mut KindCtx,
    ) -> Result<TypeKind, SkipReason> {
        match ty {
            syn::Type::Paren(p) => self.kind_of(module, &p.elem, generics, in_pointee, ctx),
            syn::Type::Group(g) => self.kind_of(module, &g.elem, generics, in_pointee, ctx),
            syn::Type::Path(tp) if tp.qself.is_none() => {
                self.path_kind(module, tp, generics, in_pointee, ctx)
            }
            syn::Type::TraitObject(_) | syn::Type::ImplTrait(_) => {
                let rendered = self.renderer.render(module, ty);
                let name = rendered
                    .strip_prefix("dyn ")
                    .or_else(|| rendered.strip_prefix("impl "))
                    .unwrap_or(&rendered)
                    .to_string();
                Ok(TypeKind::Interface(name))
            }
            syn::Type::BareFn(_) => Ok(TypeKind::Function(self.renderer.render(module, ty))),
            syn::Type::Slice(s) => {
                let elem = self
                    .kind_of(module, &s.elem, generics, in_pointee, ctx)
                    .unwrap_or_else(|_| {
                        TypeKind::Aggregate(AggregateDescriptor::opaque(
                            self.renderer.render(module, &s.elem),
                        ))
                    });
                Ok(TypeKind::Slice(Box::new(elem)))
            }
            syn::Type::Tuple(t) if t.elems.is_empty() => {
                Ok(TypeKind::Aggregate(AggregateDescriptor::with_fields("()", Vec::new())))
            }
            _ => Err(SkipReason::UnsupportedType(self.renderer.render(module, ty))),
        }
    }

    fn path_kind(
        &self,
        module: &[String],
        tp: &syn::TypePath,
        generics: &[String],
        in_pointee: bool,
        ctx: &mut KindCtx,
    ) -> Result<TypeKind, SkipReason> {
        let rendered = self.renderer.render(module, &syn::Type::Path(tp.clone()));
        let Some(last) = tp.path.segments.last() else {
            return Err(SkipReason::UnsupportedType(rendered));
        };
        if let Some(ident) = tp.path.get_ident() {
            if generics.iter().any(|g| ident == g) {
                return Err(SkipReason::GenericParam(ident.to_string()));
            }
        }

        let resolved = self.index.resolve_path(module, &tp.path);
        let canonical = match resolved {
            Some(c) if self.is_local(&c) => c,
            other => {
                let written = other.unwrap_or_else(|| {
                    tp.path
                        .segments
                        .iter()
                        .map(|s| s.ident.to_string())
                        .collect::<Vec<_>>()
                        .join("::")
                });
                return match std_ident(&written) {
                    Some(ident) => self.std_kind(module, ident, last, generics, in_pointee, ctx, &rendered),
                    None => Err(SkipReason::UnsupportedType(rendered)),
                };
            }
        };

        let Some(def) = self.index.get(&canonical) else {
            ctx.needs_fill.insert(self.renderer.item_path(&canonical));
            return Ok(TypeKind::Aggregate(AggregateDescriptor::opaque(rendered)));
        };

        match &def.kind {
            TypeDefKind::Trait => Ok(TypeKind::Interface(rendered)),
            TypeDefKind::Enum => {
                if !def.has_fill {
                    ctx.needs_fill.insert(self.renderer.item_path(&canonical));
                }
                Ok(TypeKind::Aggregate(AggregateDescriptor::opaque(rendered)))
            }
            TypeDefKind::Alias(target) => {
                let key = (canonical.clone(), in_pointee);
                if ctx.stack.contains(&key) {
                    return Err(SkipReason::RecursiveAggregate(rendered));
                }
                ctx.stack.push(key);
                let kind = self.kind_of(&def.module, target, &[], in_pointee, ctx);
                ctx.stack.pop();
                kind
            }
            TypeDefKind::Struct { fields } => {
                let key = (canonical.clone(), in_pointee);
                if ctx.stack.contains(&key) {
                    return Err(SkipReason::RecursiveAggregate(rendered));
                }
                if !def.has_fill {
                    ctx.needs_fill.insert(self.renderer.item_path(&canonical));
                }

                let substitutions = self.generic_args(module, &def.generics, last);
                ctx.stack.push(key);
                let descriptors = fields
                    .iter()
                    .map(|field| {
                        if !field.visible {
                            // Not decoded; the kind only names the type.
                            return Ok(FieldDescriptor {
                                name: field.name.clone(),
                                visible: false,
                                kind: TypeKind::Aggregate(AggregateDescriptor::opaque(
                                    self.renderer.render(&def.module, &field.ty),
                                )),
                            });
                        }
                        let mut ty = field.ty.clone();
                        if !substitutions.is_empty() {
                            SubstituteGenerics(&substitutions).visit_type_mut(&mut ty);
                        }
                        Ok(FieldDescriptor {
                            name: field.name.clone(),
                            visible: true,
                            kind: self.kind_of(&def.module, &ty, &[], in_pointee, ctx)?,
                        })
                    })
                    .collect::<Result<Vec<_>, SkipReason>>();
                ctx.stack.pop();
                Ok(TypeKind::Aggregate(AggregateDescriptor::with_fields(
                    rendered,
                    descriptors?,
                )))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn std_kind(
        &self,
        module: &[String],
        ident: &str,
        last: &syn::PathSegment,
        generics: &[String],
        in_pointee: bool,
        ctx: &mut KindCtx,
        rendered: &str,
    ) -> Result<TypeKind, SkipReason> {
        let unsupported = || SkipReason::UnsupportedType(rendered.to_string());
        if matches!(last.arguments, syn::PathArguments::None) {
            if let Some(primitive) = PrimitiveKind::from_ident(ident) {
                return Ok(TypeKind::Primitive(primitive));
            }
            if ident == "String" {
                return Ok(TypeKind::String);
            }
            return Err(unsupported());
        }

        let inner = single_type_arg(last).ok_or_else(unsupported)?;
        if ident == "Vec" {
            if is_u8(inner) {
                return Ok(TypeKind::Bytes);
            }
            let elem = self
                .kind_of(module, inner, generics, in_pointee, ctx)
                .unwrap_or_else(|_| {
                    TypeKind::Aggregate(AggregateDescriptor::opaque(
                        self.renderer.render(module, inner),
                    ))
                });
            return Ok(TypeKind::Slice(Box::new(elem)));
        }

        let pointer = PointerKind::from_ident(ident).ok_or_else(unsupported)?;
        if pointer.is_nullable() && in_pointee {
            // Never followed: decodes to None.
            return Ok(TypeKind::pointer(
                pointer,
                TypeKind::Aggregate(AggregateDescriptor::opaque(
                    self.renderer.render(module, inner),
                )),
            ));
        }
        let pointee = self.kind_of(module, inner, generics, true, ctx)?;
        Ok(TypeKind::pointer(pointer, pointee))
    }

    /// Map a struct's type parameters to the arguments written at the use
    /// site, rendered canonically so they resolve from the struct's module.
    fn generic_args(
        &self,
        module: &[String],
        params: &[String],
        segment: &syn::PathSegment,
    ) -> HashMap<String, syn::Type> {
        let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
            return HashMap::new();
        };
        let types = args.args.iter().filter_map(|arg| match arg {
            syn::GenericArgument::Type(t) => Some(t),
            _ => None,
        });
        params
            .iter()
            .zip(types)
            .map(|(name, ty)| {
                let canonical = syn::parse_str::<syn::Type>(&self.renderer.canonical(module, ty))
                    .unwrap_or_else(|_| ty.clone());
                (name.clone(), canonical)
            })
            .collect()
    }
}

fn simple_spec(base: String, placeholder: bool, ty: &str, kind: TypeKind, passing: Passing) -> ParamSpec {
    ParamSpec {
        base,
        placeholder,
        ty: ty.to_string(),
        kind,
        passing,
        mutable: passing == Passing::RefMut,
        stand_in: None,
        needs_fill: BTreeSet::new(),
    }
}

fn undecodable(bad: &TypeKind, declared: &str, whole: bool) -> SkipReason {
    let name = if whole {
        declared.to_string()
    } else {
        bad.to_string()
    };
    match bad {
        TypeKind::Slice(_) => SkipReason::NonByteSequence(name),
        _ => SkipReason::TraitOrFn(name),
    }
}

/// Last identifier of a std path (`Vec`, `std::sync::Arc`), `None` for
/// paths into other crates.
fn std_ident(path: &str) -> Option<&str> {
    let path = path.trim_start_matches("::");
    if !path.contains("::") {
        return Some(path);
    }
    let root = path.split("::").next()?;
    if matches!(root, "std" | "alloc" | "core") {
        path.rsplit("::").next()
    } else {
        None
    }
}

fn single_type_arg(segment: &syn::PathSegment) -> Option<&syn::Type> {
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    let mut types = args.args.iter().filter_map(|arg| match arg {
        syn::GenericArgument::Type(t) => Some(t),
        _ => None,
    });
    let first = types.next()?;
    types.next().is_none().then_some(first)
}

fn is_u8(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Path(tp) if tp.qself.is_none() && tp.path.is_ident("u8"))
}

fn is_byte_slice(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Slice(s) if is_u8(&s.elem))
}

fn is_byte_vec(tp: &syn::TypePath) -> bool {
    tp.path
        .segments
        .last()
        .is_some_and(|s| s.ident == "Vec" && single_type_arg(s).is_some_and(is_u8))
}

fn box_inner(tp: &syn::TypePath) -> Option<&syn::Type> {
    let last = tp.path.segments.last()?;
    if last.ident != "Box" {
        return None;
    }
    single_type_arg(last)
}

fn strip_parens(ty: &syn::Type) -> &syn::Type {
    match ty {
        syn::Type::Paren(p) => strip_parens(&p.elem),
        syn::Type::Group(g) => strip_parens(&g.elem),
        other => other,
    }
}

fn bound_paths<'b>(bounds: impl Iterator<Item = &'b syn::TypeParamBound>) -> Vec<String> {
    bounds
        .filter_map(|b| match b {
            syn::TypeParamBound::Trait(t) => Some(
                t.path
                    .segments
                    .iter()
                    .map(|s| s.ident.to_string())
                    .collect::<Vec<_>>()
                    .join("::"),
            ),
            _ => None,
        })
        .collect()
}

/// Copy of `candidate` with `Self` replaced by the impl's self type.
pub fn with_concrete_self(candidate: &CandidateFunction) -> CandidateFunction {
    let mut out = candidate.clone();
    if let Owner::Inherent { self_ty, .. } = &candidate.owner {
        let mut replace = ReplaceSelf(self_ty);
        for param in &mut out.params {
            replace.visit_type_mut(&mut param.ty);
        }
        if let Some(output) = &mut out.output {
            replace.visit_type_mut(output);
        }
    }
    out
}

struct ReplaceSelf<'a>(&'a syn::Type);

impl VisitMut for ReplaceSelf<'_> {
    fn visit_type_mut(&mut self, ty: &mut syn::Type) {
        if let syn::Type::Path(tp) = ty {
            if tp.qself.is_none() && tp.path.is_ident("Self") {
                *ty = self.0.clone();
                return;
            }
        }
        syn::visit_mut::visit_type_mut(self, ty);
    }
}

struct SubstituteGenerics<'a>(&'a HashMap<String, syn::Type>);

impl VisitMut for SubstituteGenerics<'_> {
    fn visit_type_mut(&mut self, ty: &mut syn::Type) {
        if let syn::Type::Path(tp) = ty {
            if let Some(replacement) = tp
                .path
                .get_ident()
                .filter(|_| tp.qself.is_none())
                .and_then(|ident| self.0.get(&ident.to_string()))
            {
                *ty = replacement.clone();
                return;
            }
        }
        syn::visit_mut::visit_type_mut(self, ty);
    }
}
