// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Render `syn` types as Rust source for generated harnesses.
//!
//! Paths are resolved through the [`TypeIndex`] so a type written as `Addr`
//! inside `demo::net` comes out as `demo::net::Addr` (qualified) or
//! `net::Addr` (unqualified, for harnesses placed at the crate root with
//! `use super::*;`). Lifetimes are dropped: harness locals are owned.

use quote::ToTokens;

use crate::discover::TypeIndex;

#[derive(Debug, Clone, Copy)]
pub struct TypeRenderer<'a> {
    index: &'a TypeIndex,
    qualify_all: bool,
}

impl<'a> TypeRenderer<'a> {
    pub fn new(index: &'a TypeIndex, qualify_all: bool) -> Self {
        Self { index, qualify_all }
    }

    pub fn qualify_all(&self) -> bool {
        self.qualify_all
    }

    /// Render `ty`, written inside `module`, for generated code.
    pub fn render(&self, module: &[String], ty: &syn::Type) -> String {
        self.render_type(module, ty, self.qualify_all)
    }

    /// Fully qualified rendering, used to compare types by name.
    pub fn canonical(&self, module: &[String], ty: &syn::Type) -> String {
        self.render_type(module, ty, true)
    }

    /// Place a canonical item path (`demo::net::parse`) in generated code.
    pub fn item_path(&self, canonical: &str) -> String {
        self.place(canonical, self.qualify_all)
    }

    fn place(&self, canonical: &str, qualify: bool) -> String {
        if qualify {
            return canonical.to_string();
        }
        let crate_name = self.index.crate_name();
        match canonical.strip_prefix(crate_name) {
            Some(rest) if rest.is_empty() => String::new(),
            Some(rest) => match rest.strip_prefix("::") {
                Some(local) => local.to_string(),
                None => canonical.to_string(),
            },
            None => canonical.to_string(),
        }
    }

    fn render_type(&self, module: &[String], ty: &syn::Type, qualify: bool) -> String {
        match ty {
            syn::Type::Path(tp) if tp.qself.is_none() => self.render_path(module, &tp.path, qualify),
            syn::Type::Reference(r) => {
                let mutability = if r.mutability.is_some() { "mut " } else { "" };
                format!("&{}{}", mutability, self.render_type(module, &r.elem, qualify))
            }
            syn::Type::Slice(s) => format!("[{}]", self.render_type(module, &s.elem, qualify)),
            syn::Type::Array(a) => format!(
                "[{}; {}]",
                self.render_type(module, &a.elem, qualify),
                tokens(&a.len)
            ),
            syn::Type::Tuple(t) => {
                let elems: Vec<String> = t
                    .elems
                    .iter()
                    .map(|e| self.render_type(module, e, qualify))
                    .collect();
                match elems.len() {
                    1 => format!("({},)", elems[0]),
                    _ => format!("({})", elems.join(", ")),
                }
            }
            syn::Type::Paren(p) => format!("({})", self.render_type(module, &p.elem, qualify)),
            syn::Type::Group(g) => self.render_type(module, &g.elem, qualify),
            syn::Type::TraitObject(t) => {
                format!("dyn {}", self.render_bounds(module, t.bounds.iter(), qualify))
            }
            syn::Type::ImplTrait(t) => {
                format!("impl {}", self.render_bounds(module, t.bounds.iter(), qualify))
            }
            syn::Type::Ptr(p) => {
                let kind = if p.mutability.is_some() { "mut" } else { "const" };
                format!("*{} {}", kind, self.render_type(module, &p.elem, qualify))
            }
            syn::Type::Never(_) => "!".to_string(),
            other => tokens(other),
        }
    }

    fn render_bounds<'b>(
        &self,
        module: &[String],
        bounds: impl Iterator<Item = &'b syn::TypeParamBound>,
        qualify: bool,
    ) -> String {
        bounds
            .filter_map(|b| match b {
                syn::TypeParamBound::Trait(t) => {
                    let maybe = if matches!(t.modifier, syn::TraitBoundModifier::Maybe(_)) {
                        "?"
                    } else {
                        ""
                    };
                    Some(format!("{}{}", maybe, self.render_path(module, &t.path, qualify)))
                }
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" + ")
    }

    fn render_path(&self, module: &[String], path: &syn::Path, qualify: bool) -> String {
        let base = match self.index.resolve_path(module, path) {
            Some(canonical) => self.place(&canonical, qualify),
            None => {
                let joined = path
                    .segments
                    .iter()
                    .map(|s| s.ident.to_string())
                    .collect::<Vec<_>>()
                    .join("::");
                if path.leading_colon.is_some() {
                    format!("::{joined}")
                } else {
                    joined
                }
            }
        };
        let Some(last) = path.segments.last() else {
            return base;
        };
        match &last.arguments {
            syn::PathArguments::None => base,
            syn::PathArguments::AngleBracketed(args) => {
                let rendered: Vec<String> = args
                    .args
                    .iter()
                    .filter_map(|arg| match arg {
                        syn::GenericArgument::Lifetime(_) => None,
                        syn::GenericArgument::Type(t) => Some(self.render_type(module, t, qualify)),
                        syn::GenericArgument::AssocType(a) => Some(format!(
                            "{} = {}",
                            a.ident,
                            self.render_type(module, &a.ty, qualify)
                        )),
                        other => Some(tokens(other)),
                    })
                    .collect();
                if rendered.is_empty() {
                    base
                } else {
                    format!("{}<{}>", base, rendered.join(", "))
                }
            }
            syn::PathArguments::Parenthesized(args) => {
                let inputs: Vec<String> = args
                    .inputs
                    .iter()
                    .map(|t| self.render_type(module, t, qualify))
                    .collect();
                match &args.output {
                    syn::ReturnType::Default => format!("{}({})", base, inputs.join(", ")),
                    syn::ReturnType::Type(_, out) => format!(
                        "{}({}) -> {}",
                        base,
                        inputs.join(", "),
                        self.render_type(module, out, qualify)
                    ),
                }
            }
        }
    }
}

/// Token-stream text with the spacing `proc_macro2` inserts removed.
fn tokens(node: &impl ToTokens) -> String {
    let mut text = node.to_token_stream().to_string();
    for (from, to) in [
        (" :: ", "::"),
        (":: ", "::"),
        (" < ", "<"),
        ("< ", "<"),
        (" >", ">"),
        (" ,", ","),
        ("& ", "&"),
        (" (", "("),
        ("( ", "("),
        (" )", ")"),
    ] {
        text = text.replace(from, to);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::scan_source;

    const SOURCE: &str = r#"
        use std::time::Duration;

        pub mod net {
            pub struct Addr { pub port: u16 }
            pub fn connect(a: &'static Addr, d: super::Duration) {}
        }
    "#;

    fn ty(src: &str) -> syn::Type {
        syn::parse_str(src).expect("type")
    }

    fn module(path: &str) -> Vec<String> {
        path.split("::").map(str::to_string).collect()
    }

    #[test]
    fn test_qualified_and_unqualified_paths() {
        let discovery = scan_source("demo", SOURCE).expect("parse");
        let net = module("demo::net");

        let qualified = TypeRenderer::new(&discovery.index, true);
        assert_eq!(qualified.render(&net, &ty("Option<Box<Addr>>")), "Option<Box<demo::net::Addr>>");
        assert_eq!(qualified.render(&net, &ty("&'a mut [u8]")), "&mut [u8]");

        let local = TypeRenderer::new(&discovery.index, false);
        assert_eq!(local.render(&net, &ty("Option<Box<Addr>>")), "Option<Box<net::Addr>>");
        assert_eq!(local.item_path("demo::net::connect"), "net::connect");
        assert_eq!(local.item_path("demo::top"), "top");
    }

    #[test]
    fn test_imports_and_externals() {
        let discovery = scan_source("demo", SOURCE).expect("parse");
        let renderer = TypeRenderer::new(&discovery.index, false);
        assert_eq!(
            renderer.render(&module("demo::net"), &ty("super::Duration")),
            "std::time::Duration"
        );
        assert_eq!(
            renderer.render(&module("demo"), &ty("Duration")),
            "std::time::Duration"
        );
        assert_eq!(
            renderer.render(&module("demo"), &ty("::std::rc::Rc<String>")),
            "std::rc::Rc<String>"
        );
    }

    #[test]
    fn test_trait_objects_and_functions() {
        let discovery = scan_source("demo", SOURCE).expect("parse");
        let renderer = TypeRenderer::new(&discovery.index, true);
        let root = module("demo");
        assert_eq!(
            renderer.render(&root, &ty("&mut (dyn std::io::Read + Send + 'static)")),
            "&mut (dyn std::io::Read + Send)"
        );
        assert_eq!(renderer.render(&root, &ty("Box<dyn Fn(u8) -> bool>")), "Box<dyn Fn(u8) -> bool>");
        assert_eq!(renderer.render(&root, &ty("fn(u8) -> u8")), "fn(u8) -> u8");
        assert_eq!(renderer.render(&root, &ty("(u8, String)")), "(u8, String)");
        assert_eq!(renderer.render(&root, &ty("[u8; 4]")), "[u8; 4]");
    }
}
