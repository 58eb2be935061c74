//! Route handlers pass through the access guard.

use std::collections::BTreeSet;

use syn::parse::ParseStream;
use syn::visit::Visit;

use crate::{Rule, SourceFile, Violation};

const ROUTE_MACROS: &[&str] = &["get", "post", "put", "patch", "delete"];

/// Entries open to visitors without a session.
const PUBLIC_ROUTES: &[&str] = &["/login", "/logout", "/health/ready", "/health/live"];

/// Free function every protected entry must reach.
const GUARD: &str = "enter";

pub(crate) fn check(file: &SourceFile<'_>) -> Vec<Violation> {
    if !file.location().starts_with("inbound/http/") {
        return Vec::new();
    }
    let functions: Vec<&syn::ItemFn> = file
        .syntax
        .items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Fn(function) => Some(function),
            _ => None,
        })
        .collect();
    let guarded = guarded(&functions);

    functions
        .iter()
        .filter_map(|function| route_of(function).map(|route| (function, route)))
        .filter(|(_, route)| !PUBLIC_ROUTES.contains(&route.as_str()))
        .filter(|(function, _)| !guarded.contains(&function.sig.ident.to_string()))
        .map(|(function, route)| {
            file.violation(
                Rule::Guard,
                format!(
                    "handler `{}` for {route} never calls guard::{GUARD}",
                    function.sig.ident
                ),
            )
        })
        .collect()
}

/// Names of the functions that reach the guard, directly or through other
/// functions of the same file.
fn guarded(functions: &[&syn::ItemFn]) -> BTreeSet<String> {
    let calls: Vec<(String, BTreeSet<String>)> = functions
        .iter()
        .map(|function| (function.sig.ident.to_string(), callees(&function.block)))
        .collect();
    let mut guarded = BTreeSet::new();
    loop {
        let before = guarded.len();
        for (name, callees) in &calls {
            if callees.contains(GUARD) || callees.iter().any(|callee| guarded.contains(callee)) {
                guarded.insert(name.clone());
            }
        }
        if guarded.len() == before {
            return guarded;
        }
    }
}

fn route_of(function: &syn::ItemFn) -> Option<String> {
    function
        .attrs
        .iter()
        .find(|attr| {
            attr.path()
                .get_ident()
                .is_some_and(|ident| ROUTE_MACROS.iter().any(|name| ident == name))
        })
        .and_then(|attr| attr.parse_args_with(route_path).ok())
}

fn route_path(input: ParseStream<'_>) -> syn::Result<String> {
    let path: syn::LitStr = input.parse()?;
    input.step(|cursor| {
        let mut rest = *cursor;
        while let Some((_, next)) = rest.token_tree() {
            rest = next;
        }
        Ok(((), rest))
    })?;
    Ok(path.value())
}

fn callees(block: &syn::Block) -> BTreeSet<String> {
    let mut calls = Calls::default();
    calls.visit_block(block);
    calls.0
}

/// Free-function calls; method calls are not followed.
#[derive(Default)]
struct Calls(BTreeSet<String>);

impl<'ast> Visit<'ast> for Calls {
    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        if let syn::Expr::Path(callee) = node.func.as_ref() {
            if let Some(last) = callee.path.segments.last() {
                self.0.insert(last.ident.to_string());
            }
        }
        syn::visit::visit_expr_call(self, node);
    }
}
