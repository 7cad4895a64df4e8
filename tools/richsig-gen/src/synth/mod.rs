// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Harness synthesis.
//!
//! Turns analyzed candidates into `pub fn fuzz_x(fuzz_data: &[u8]) -> i32`
//! adapters. Each adapter builds an [`richsig::EntropyStream`] over the
//! engine's buffer, decodes one local per parameter with
//! `richsig::Fill`, returns early on absent optionals, optionally builds
//! the receiver through a constructor, and calls the target.
//!
//! Output is deterministic: candidates are sorted by qualified description
//! and named in that order before the text is rendered in parallel.

pub mod ctor;
pub mod naming;
pub mod target;

use std::collections::BTreeSet;
use std::fmt::Write as _;

use rayon::prelude::*;

use crate::analyze::{
    Analyzer, CallTarget, Classification, ForwardPlan, ParamSpec, SkipReason,
};
use crate::discover::{CandidateFunction, Discovery, ReceiverMode};
use crate::substitute::SubstitutionTable;

use ctor::{ConstructorCandidate, CtorResult, Fallible};
use naming::{assign_names, HarnessNames, NameRequest};

/// Synthesis switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthOptions {
    /// Render crate types with their crate prefix. When false the batch is
    /// meant to be placed inside the target crate and starts with
    /// `use super::*;`.
    pub qualify_all: bool,
    /// Replace receivers with constructor calls where possible.
    pub constructors: bool,
    pub allow_unsafe: bool,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            qualify_all: true,
            constructors: false,
            allow_unsafe: false,
        }
    }
}

/// One named adapter local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub spec: ParamSpec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    /// Qualified description of the constructor.
    pub constructor: String,
    pub call_path: String,
    pub result: CtorResult,
    /// Arguments, as expressions over the bindings.
    pub args: Vec<String>,
}

/// Everything needed to render one adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperSpec {
    /// Locals in decode order: constructor parameters (or the receiver),
    /// then the target's own parameters.
    pub bindings: Vec<Binding>,
    pub promotion: Option<Promotion>,
    /// Receiver local and whether the call goes through `(*local)`.
    pub receiver: Option<(String, bool)>,
    pub receiver_mutable: bool,
    pub call: CallTarget,
    pub args: Vec<String>,
    pub returns_value: bool,
    pub is_unsafe: bool,
}

impl WrapperSpec {
    pub fn needs_fill(&self) -> BTreeSet<String> {
        self.bindings
            .iter()
            .flat_map(|b| b.spec.needs_fill.iter().cloned())
            .collect()
    }
}

/// What gets emitted for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Forward(ForwardPlan),
    Adapter(WrapperSpec),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitted {
    Harness {
        name: String,
        description: String,
        source: String,
        needs_fill: BTreeSet<String>,
    },
    Skipped {
        name: String,
        description: String,
        reason: SkipReason,
    },
}

impl Emitted {
    pub fn name(&self) -> &str {
        match self {
            Self::Harness { name, .. } | Self::Skipped { name, .. } => name,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Self::Harness { source, .. } => source.clone(),
            Self::Skipped { name, reason, .. } => format!("// skipping {name} because {reason}\n"),
        }
    }
}

/// The generated source for a set of candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub source: String,
    pub emitted: Vec<Emitted>,
}

impl Batch {
    pub fn harness_names(&self) -> impl Iterator<Item = &str> {
        self.emitted.iter().filter_map(|e| match e {
            Emitted::Harness { name, .. } => Some(name.as_str()),
            Emitted::Skipped { .. } => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &SkipReason)> {
        self.emitted.iter().filter_map(|e| match e {
            Emitted::Skipped { name, reason, .. } => Some((name.as_str(), reason)),
            Emitted::Harness { .. } => None,
        })
    }
}

pub struct Synthesizer<'a> {
    crate_name: String,
    analyzer: Analyzer<'a>,
    ctors: Vec<ConstructorCandidate<'a>>,
    options: SynthOptions,
}

impl<'a> Synthesizer<'a> {
    /// `ctors` is the ranked constructor list from [`ctor::collect`]; it is
    /// only consulted when `options.constructors` is set.
    pub fn new(
        discovery: &'a Discovery,
        table: &'a SubstitutionTable,
        options: SynthOptions,
        ctors: Vec<ConstructorCandidate<'a>>,
    ) -> Self {
        Self {
            crate_name: discovery.crate_name.clone(),
            analyzer: Analyzer::new(
                &discovery.index,
                table,
                options.qualify_all,
                options.allow_unsafe,
            ),
            ctors,
            options,
        }
    }

    pub fn analyzer(&self) -> &Analyzer<'a> {
        &self.analyzer
    }

    /// Plan the adapter for one candidate.
    pub fn plan(&self, candidate: &CandidateFunction) -> Result<Plan, SkipReason> {
        match self.analyzer.classify(candidate) {
            Classification::Fuzzable(plan) => Ok(Plan::Forward(plan)),
            Classification::Unsupported(reason) => Err(reason),
            Classification::NeedsAdapter(analyzed) => {
                let receiver = analyzed.receiver;
                let promoted = match &receiver {
                    Some(info) if self.options.constructors => {
                        self.promote(&info.canonical, &info.mode)
                    }
                    _ => None,
                };

                let mut specs: Vec<ParamSpec> = Vec::new();
                let mut requests: Vec<NameRequest> = Vec::new();
                let receiver_mutable = receiver
                    .as_ref()
                    .is_some_and(|r| r.mode == ReceiverMode::RefMut);

                let own_start;
                let mut receiver_slot = None;
                match (&receiver, &promoted) {
                    (Some(info), Some((_, ctor_specs))) => {
                        specs.extend(ctor_specs.iter().cloned());
                        own_start = specs.len();
                        specs.extend(analyzed.params.iter().cloned());
                        receiver_slot = Some(specs.len());
                        requests.extend(specs.iter().map(request));
                        requests.push(NameRequest::new(
                            naming::snake_case(&info.short_name),
                            false,
                        ));
                    }
                    (Some(info), None) => {
                        let spec = info.spec.clone()?;
                        receiver_slot = Some(0);
                        specs.push(spec);
                        own_start = 1;
                        specs.extend(analyzed.params.iter().cloned());
                        requests.extend(specs.iter().map(request));
                    }
                    (None, _) => {
                        own_start = 0;
                        specs.extend(analyzed.params.iter().cloned());
                        requests.extend(specs.iter().map(request));
                    }
                }

                let module_name = candidate.module.last().map(String::as_str);
                let mut scope = vec![self.crate_name.as_str()];
                if let Some(module) = module_name.filter(|m| *m != self.crate_name) {
                    scope.push(module);
                }
                // A single-segment call path must not be shadowed by a local.
                let ctor_path = promoted
                    .as_ref()
                    .map(|(ctor, _)| self.analyzer.call_path(ctor.function));
                let target_path = match &analyzed.call {
                    CallTarget::Path(path) => Some(path.as_str()),
                    CallTarget::Method(_) => None,
                };
                scope.extend(
                    [target_path, ctor_path.as_deref()]
                        .into_iter()
                        .flatten()
                        .filter(|path| !path.contains("::")),
                );
                let mut names = assign_names(&requests, &scope);

                let receiver_local = receiver_slot.map(|slot| names[slot].clone());
                if promoted.is_some() {
                    names.pop();
                }
                let bindings: Vec<Binding> = names
                    .into_iter()
                    .zip(specs)
                    .map(|(name, spec)| Binding { name, spec })
                    .collect();

                let promotion = promoted.map(|(ctor, _)| Promotion {
                    constructor: ctor.function.description(),
                    call_path: self.analyzer.call_path(ctor.function),
                    result: ctor.result.clone(),
                    args: bindings[..own_start].iter().map(argument).collect(),
                });
                let deref = promotion.as_ref().is_some_and(|p| {
                    p.result.pointer == Some(richsig::PointerKind::Box)
                        && receiver.as_ref().is_some_and(|r| r.mode == ReceiverMode::Value)
                });

                Ok(Plan::Adapter(WrapperSpec {
                    args: bindings[own_start..].iter().map(argument).collect(),
                    bindings,
                    promotion,
                    receiver: receiver_local.map(|local| (local, deref)),
                    receiver_mutable,
                    call: analyzed.call,
                    returns_value: analyzed.returns_value,
                    is_unsafe: analyzed.is_unsafe,
                }))
            }
        }
    }

    /// First ranked constructor for the receiver whose parameters can all
    /// be decoded.
    fn promote(
        &self,
        canonical: &str,
        mode: &ReceiverMode,
    ) -> Option<(&ConstructorCandidate<'a>, Vec<ParamSpec>)> {
        ctor::select(&self.ctors, canonical, mode)
            .into_iter()
            .find_map(|ctor| match self.analyzer.param_specs(ctor.function) {
                Ok(specs) => Some((ctor, specs)),
                Err(reason) => {
                    tracing::debug!(
                        "constructor {} not usable for {}: {}",
                        ctor.function.description(),
                        canonical,
                        reason
                    );
                    None
                }
            })
    }

    /// Synthesize one adapter named `name`.
    pub fn synthesize(&self, candidate: &CandidateFunction, name: &str) -> Emitted {
        render(name.to_string(), candidate.description(), self.plan(candidate))
    }

    /// Synthesize every candidate, in description order, into one source
    /// unit. A skipped candidate never stops the others.
    pub fn batch(&self, candidates: &[&CandidateFunction]) -> Batch {
        let mut ordered: Vec<&CandidateFunction> = candidates.to_vec();
        ordered.sort_by_cached_key(|c| c.description());

        let mut names = HarnessNames::new();
        let planned: Vec<(String, String, Result<Plan, SkipReason>)> = ordered
            .iter()
            .map(|c| {
                let name = names.assign(c.owner_name().as_deref(), &c.name);
                (name, c.description(), self.plan(c))
            })
            .collect();

        let emitted: Vec<Emitted> = planned
            .into_par_iter()
            .map(|(name, description, plan)| render(name, description, plan))
            .collect();

        for e in &emitted {
            if let Emitted::Skipped {
                description,
                reason,
                ..
            } = e
            {
                tracing::debug!("skipping {}: {}", description, reason);
            }
        }
        let source = self.assemble(&emitted);
        tracing::info!(
            "synthesized {} harnesses, skipped {}",
            emitted
                .iter()
                .filter(|e| matches!(e, Emitted::Harness { .. }))
                .count(),
            emitted
                .iter()
                .filter(|e| matches!(e, Emitted::Skipped { .. }))
                .count()
        );
        Batch { source, emitted }
    }

    fn assemble(&self, emitted: &[Emitted]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "// Code generated by richsig-gen. DO NOT EDIT.");
        let _ = writeln!(out, "// Source crate: {}", self.crate_name);
        let _ = writeln!(out, "#![allow(unused_mut, unused_variables, clippy::all)]");
        if !self.options.qualify_all {
            let _ = writeln!(out);
            let _ = writeln!(out, "use super::*;");
        }

        let needs_fill: BTreeSet<&String> = emitted
            .iter()
            .flat_map(|e| match e {
                Emitted::Harness { needs_fill, .. } => needs_fill.iter().collect::<Vec<_>>(),
                Emitted::Skipped { .. } => Vec::new(),
            })
            .collect();
        if !needs_fill.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "// These types must implement richsig::Fill (#[derive(richsig::Fill)] on structs):"
            );
            for ty in needs_fill {
                let _ = writeln!(out, "//   {ty}");
            }
        }

        for e in emitted {
            out.push('\n');
            out.push_str(&e.text());
        }
        out
    }
}

fn request(spec: &ParamSpec) -> NameRequest {
    NameRequest::new(spec.base.clone(), spec.placeholder)
}

fn argument(binding: &Binding) -> String {
    binding.spec.passing.argument(&binding.name)
}

fn render(name: String, description: String, plan: Result<Plan, SkipReason>) -> Emitted {
    match plan {
        Ok(Plan::Forward(forward)) => Emitted::Harness {
            source: render_forward(&name, &forward),
            name,
            description,
            needs_fill: BTreeSet::new(),
        },
        Ok(Plan::Adapter(spec)) => Emitted::Harness {
            source: render_adapter(&name, &spec),
            needs_fill: spec.needs_fill(),
            name,
            description,
        },
        Err(reason) => Emitted::Skipped {
            name,
            description,
            reason,
        },
    }
}

fn render_forward(name: &str, plan: &ForwardPlan) -> String {
    let arg = if plan.owned {
        "fuzz_data.to_vec()"
    } else {
        "fuzz_data"
    };
    let call = format!("{}({})", plan.call_path, arg);
    let call = if plan.is_unsafe {
        format!("unsafe {{ {call} }}")
    } else {
        call
    };
    format!("pub fn {name}(fuzz_data: &[u8]) -> i32 {{\n    {call}\n}}\n")
}

fn render_adapter(name: &str, spec: &WrapperSpec) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "pub fn {name}(fuzz_data: &[u8]) -> i32 {{");
    let _ = writeln!(
        out,
        "    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);"
    );

    for binding in &spec.bindings {
        let mutability = if binding.spec.mutable { "mut " } else { "" };
        match &binding.spec.stand_in {
            Some(stand_in) => {
                let _ = writeln!(
                    out,
                    "    let {}{} = {};",
                    mutability, binding.name, stand_in.expr
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "    let {}{}: {} = ::richsig::Fill::fill(&mut fuzz_stream);",
                    mutability, binding.name, binding.spec.ty
                );
            }
        }
    }

    for binding in spec.bindings.iter().filter(|b| b.spec.is_optional()) {
        let _ = writeln!(out, "    if {}.is_none() {{", binding.name);
        let _ = writeln!(out, "        return 0;");
        let _ = writeln!(out, "    }}");
    }

    if let (Some(promotion), Some((local, _))) = (&spec.promotion, &spec.receiver) {
        let mutability = if spec.receiver_mutable { "mut " } else { "" };
        let call = format!("{}({})", promotion.call_path, promotion.args.join(", "));
        let _ = match promotion.result.fallible {
            None => writeln!(out, "    let {mutability}{local} = {call};"),
            Some(Fallible::Result) => writeln!(
                out,
                "    let Ok({mutability}{local}) = {call} else {{\n        return 0;\n    }};"
            ),
            Some(Fallible::Option) => writeln!(
                out,
                "    let Some({mutability}{local}) = {call} else {{\n        return 0;\n    }};"
            ),
        };
    }

    let args = spec.args.join(", ");
    let call = match (&spec.call, &spec.receiver) {
        (CallTarget::Method(method), Some((local, true))) => format!("(*{local}).{method}({args})"),
        (CallTarget::Method(method), Some((local, false))) => format!("{local}.{method}({args})"),
        (CallTarget::Method(method), None) => format!("{method}({args})"),
        (CallTarget::Path(path), _) => format!("{path}({args})"),
    };
    let call = if spec.is_unsafe {
        format!("unsafe {{ {call} }}")
    } else {
        call
    };
    if spec.returns_value {
        let _ = writeln!(out, "    let _ = {call};");
    } else {
        let _ = writeln!(out, "    {call};");
    }
    let _ = writeln!(out, "    0");
    let _ = writeln!(out, "}}");
    out
}

/// Convenience for callers holding a whole discovery: collect constructors
/// per `options` and build a synthesizer.
pub fn synthesizer<'a>(
    discovery: &'a Discovery,
    table: &'a SubstitutionTable,
    options: SynthOptions,
    ctor_pattern: &regex::Regex,
    include_unexported: bool,
) -> Synthesizer<'a> {
    let renderer = crate::render::TypeRenderer::new(&discovery.index, options.qualify_all);
    let ctors = if options.constructors {
        ctor::collect(discovery, &renderer, ctor_pattern, include_unexported)
    } else {
        Vec::new()
    };
    Synthesizer::new(discovery, table, options, ctors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::scan_source;

    fn synth_one(source: &str, function: &str, options: SynthOptions) -> Emitted {
        let discovery = scan_source("demo", source).expect("parse");
        let table = SubstitutionTable::builtin();
        let pattern = regex::Regex::new("^new").expect("regex");
        let synth = synthesizer(&discovery, &table, options, &pattern, false);
        let candidate = discovery
            .candidates
            .iter()
            .find(|c| c.name == function)
            .expect("candidate");
        synth.synthesize(candidate, &format!("fuzz_{function}"))
    }

    #[test]
    fn test_forwarding_adapter() {
        let emitted = synth_one(
            "pub fn parse(data: &[u8]) -> i32 { 0 }",
            "parse",
            SynthOptions::default(),
        );
        assert_eq!(
            emitted.text(),
            "pub fn fuzz_parse(fuzz_data: &[u8]) -> i32 {\n    demo::parse(fuzz_data)\n}\n"
        );
    }

    #[test]
    fn test_adapter_with_guard_and_renames() {
        let emitted = synth_one(
            "pub fn mix(demo: &str, n: Option<u32>, _: bool) -> bool { true }",
            "mix",
            SynthOptions::default(),
        );
        let expected = "\
pub fn fuzz_mix(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let demo1: String = ::richsig::Fill::fill(&mut fuzz_stream);
    let n: Option<u32> = ::richsig::Fill::fill(&mut fuzz_stream);
    let arg3: bool = ::richsig::Fill::fill(&mut fuzz_stream);
    if n.is_none() {
        return 0;
    }
    let _ = demo::mix(&demo1, n, arg3);
    0
}
";
        assert_eq!(emitted.text(), expected);
    }

    #[test]
    fn test_local_call_is_not_shadowed() {
        let options = SynthOptions {
            qualify_all: false,
            ..SynthOptions::default()
        };
        let emitted = synth_one("pub fn parse(parse: u8) -> u8 { parse }", "parse", options);
        let expected = "\
pub fn fuzz_parse(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let parse1: u8 = ::richsig::Fill::fill(&mut fuzz_stream);
    let _ = parse(parse1);
    0
}
";
        assert_eq!(emitted.text(), expected);
    }

    #[test]
    fn test_variadic_tail_gets_no_arguments() {
        let source = r#"extern "C" { pub fn log_line(level: u8, ...); }"#;
        let discovery = scan_source("demo", source).expect("parse");
        assert!(discovery.candidates[0].is_variadic);

        let options = SynthOptions {
            allow_unsafe: true,
            ..SynthOptions::default()
        };
        let text = synth_one(source, "log_line", options).text();
        assert!(text.contains("    let level: u8 = ::richsig::Fill::fill(&mut fuzz_stream);\n"));
        assert!(text.contains("    unsafe { demo::log_line(level) };\n"));
    }

    #[test]
    fn test_unsupported_becomes_comment() {
        let emitted = synth_one(
            "pub fn visit(f: &dyn Fn(u8)) {}",
            "visit",
            SynthOptions::default(),
        );
        assert_eq!(
            emitted.text(),
            "// skipping fuzz_visit because parameters include traits or functions without a substitution: &dyn Fn(u8)\n"
        );
    }

    #[test]
    fn test_promoted_constructor_is_first_after_guards() {
        let source = r#"
            pub struct Counter { pub total: u64 }
            impl Counter {
                pub fn new(start: u64) -> Option<Counter> { Some(Counter { total: start }) }
                pub fn add(&mut self, step: Option<u8>) {}
            }
        "#;
        let options = SynthOptions {
            constructors: true,
            ..SynthOptions::default()
        };
        let emitted = synth_one(source, "add", options);
        let expected = "\
pub fn fuzz_add(fuzz_data: &[u8]) -> i32 {
    let mut fuzz_stream = ::richsig::EntropyStream::new(fuzz_data);
    let start: u64 = ::richsig::Fill::fill(&mut fuzz_stream);
    let step: Option<u8> = ::richsig::Fill::fill(&mut fuzz_stream);
    if step.is_none() {
        return 0;
    }
    let Some(mut counter) = demo::Counter::new(start) else {
        return 0;
    };
    counter.add(step);
    0
}
";
        assert_eq!(emitted.text(), expected);
    }

    #[test]
    fn test_stand_in_binding() {
        let emitted = synth_one(
            "pub fn load<R: std::io::Read>(r: R, limit: usize) -> usize { 0 }",
            "load",
            SynthOptions::default(),
        );
        let text = emitted.text();
        assert!(text.contains(
            "    let r = ::std::io::Cursor::new(<::std::vec::Vec<u8> as ::richsig::Fill>::fill(&mut fuzz_stream));\n"
        ));
        assert!(text.contains("    let _ = demo::load(r, limit);\n"));
    }

    #[test]
    fn test_batch_skip_does_not_block_others() {
        let source = r#"
            pub fn b_ok(x: u8) {}
            pub fn a_bad(f: fn(u8)) {}
            pub fn c_ok(s: String) {}
        "#;
        let discovery = scan_source("demo", source).expect("parse");
        let table = SubstitutionTable::builtin();
        let pattern = regex::Regex::new("^new").expect("regex");
        let synth = synthesizer(&discovery, &table, SynthOptions::default(), &pattern, false);
        let candidates: Vec<&CandidateFunction> = discovery.candidates.iter().collect();
        let batch = synth.batch(&candidates);

        assert_eq!(batch.harness_names().collect::<Vec<_>>(), vec!["fuzz_b_ok", "fuzz_c_ok"]);
        let skipped: Vec<&str> = batch.skipped().map(|(name, _)| name).collect();
        assert_eq!(skipped, vec!["fuzz_a_bad"]);
        assert!(batch
            .source
            .contains("// skipping fuzz_a_bad because parameters include traits or functions without a substitution: fn(u8)\n"));
        assert!(!batch.source.contains("pub fn fuzz_a_bad"));
    }

    #[test]
    fn test_batch_is_deterministic() {
        let source = r#"
            pub struct Pt { pub x: i32 }
            impl Pt { pub fn shift(&self, d: i32) {} }
            pub fn one(a: u8, b: u8) {}
            pub fn two(a: Option<Box<Pt>>) {}
            pub fn three(s: &mut String) {}
        "#;
        let discovery = scan_source("demo", source).expect("parse");
        let table = SubstitutionTable::builtin();
        let pattern = regex::Regex::new("^new").expect("regex");
        let synth = synthesizer(&discovery, &table, SynthOptions::default(), &pattern, false);

        let forward: Vec<&CandidateFunction> = discovery.candidates.iter().collect();
        let reversed: Vec<&CandidateFunction> = discovery.candidates.iter().rev().collect();
        let first = synth.batch(&forward).source;
        for _ in 0..8 {
            assert_eq!(synth.batch(&reversed).source, first);
        }
    }
}
