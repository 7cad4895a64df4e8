// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Constructor promotion.
//!
//! A method's receiver can be built by calling a constructor instead of
//! being decoded. Constructors are receiver-less functions whose name
//! matches a pattern (default `^new`) and that take at least one parameter.
//! Their result is compared to the receiver by qualified type name after
//! stripping one `Result`/`Option` and one `Box`/`Rc`/`Arc`. This is a
//! name comparison, not type identity: aliases and re-exports under a
//! different path do not match.

use regex::Regex;
use richsig::PointerKind;

use crate::analyze::with_concrete_self;
use crate::discover::{CandidateFunction, Discovery, Owner, ReceiverMode};
use crate::render::TypeRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallible {
    Result,
    Option,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtorResult {
    /// Qualified name of the constructed type.
    pub canonical: String,
    pub fallible: Option<Fallible>,
    pub pointer: Option<PointerKind>,
}

impl CtorResult {
    pub fn of(renderer: &TypeRenderer<'_>, module: &[String], output: &syn::Type) -> Self {
        let (fallible, rest) = match unwrap_generic(output, &["Result", "Option"]) {
            Some(("Result", inner)) => (Some(Fallible::Result), inner),
            Some((_, inner)) => (Some(Fallible::Option), inner),
            None => (None, output),
        };
        let (pointer, inner) = match unwrap_generic(rest, &["Box", "Rc", "Arc"]) {
            Some((ident, inner)) => (PointerKind::from_ident(ident), inner),
            None => (None, rest),
        };
        Self {
            canonical: renderer.canonical(module, inner),
            fallible,
            pointer,
        }
    }

    /// The result can stand in for a receiver taken as `mode`.
    pub fn serves(&self, mode: &ReceiverMode) -> bool {
        match (self.pointer, mode) {
            (_, ReceiverMode::Other(_)) => false,
            (None, ReceiverMode::Boxed) => false,
            (None, _) | (Some(PointerKind::Box), _) => true,
            (Some(PointerKind::Rc | PointerKind::Arc), ReceiverMode::Ref) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConstructorCandidate<'a> {
    pub function: &'a CandidateFunction,
    pub result: CtorResult,
}

/// Eligible constructors, ranked by name length then qualified path.
pub fn collect<'a>(
    discovery: &'a Discovery,
    renderer: &TypeRenderer<'_>,
    pattern: &Regex,
    include_unexported: bool,
) -> Vec<ConstructorCandidate<'a>> {
    let mut ctors: Vec<ConstructorCandidate<'a>> = discovery
        .candidates
        .iter()
        .filter(|c| {
            c.receiver.is_none()
                && !c.params.is_empty()
                && !c.is_async
                && !c.is_unsafe
                && (c.exported || include_unexported)
                && pattern.is_match(&c.name)
                && match &c.owner {
                    Owner::Free => true,
                    Owner::Inherent { generics, .. } => generics.is_empty(),
                    Owner::Trait { .. } => false,
                }
        })
        .filter_map(|c| {
            let concrete = with_concrete_self(c);
            let output = concrete.output.as_ref()?;
            Some(ConstructorCandidate {
                function: c,
                result: CtorResult::of(renderer, &c.module, output),
            })
        })
        .collect();
    ctors.sort_by_cached_key(|c| (c.function.name.len(), c.function.description()));
    tracing::debug!("{} constructor candidates", ctors.len());
    ctors
}

/// Constructors that can build a receiver of type `canonical` taken as
/// `mode`, best first.
pub fn select<'c, 'a>(
    ctors: &'c [ConstructorCandidate<'a>],
    canonical: &str,
    mode: &ReceiverMode,
) -> Vec<&'c ConstructorCandidate<'a>> {
    ctors
        .iter()
        .filter(|c| c.result.canonical == canonical && c.result.serves(mode))
        .collect()
}

fn unwrap_generic<'t>(ty: &'t syn::Type, idents: &[&'static str]) -> Option<(&'static str, &'t syn::Type)> {
    let syn::Type::Path(tp) = ty else {
        return None;
    };
    let last = tp.path.segments.last()?;
    let ident = idents.iter().copied().find(|i| last.ident == i)?;
    let syn::PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some((ident, inner)),
        _ => None,
    }
}
