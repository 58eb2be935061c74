//! Paths a source file names, through `use` items or inline.
//!
//! Items gated on `#[cfg(test)]` are not followed.

use std::collections::BTreeSet;

use syn::visit::Visit;

/// Segments of one path, e.g. `["crate", "domain", "LoanId"]`.
pub(crate) type Segments = Vec<String>;

pub(crate) fn collect(file: &syn::File) -> BTreeSet<Segments> {
    let mut collector = Collector::default();
    collector.visit_file(file);
    collector.paths
}

fn is_relative(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super")
}

/// Module path inside the portal crate with `crate`, `self`, `super` and
/// `portal` prefixes removed. `None` when the path leaves the crate.
pub(crate) fn internal(segments: &[String]) -> Option<&[String]> {
    match segments.first()?.as_str() {
        "portal" => segments.get(1..),
        "domain" | "inbound" | "outbound" => Some(segments),
        first if is_relative(first) => {
            let start = segments
                .iter()
                .position(|segment| !is_relative(segment))?;
            segments.get(start..)
        }
        _ => None,
    }
}

/// Crate a path starts from when it is not a portal path.
pub(crate) fn external_crate(segments: &[String]) -> Option<&str> {
    let root = segments.first()?.as_str();
    if is_relative(root) || internal(segments).is_some() {
        return None;
    }
    Some(root)
}

fn is_test_only(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .parse_args::<syn::Ident>()
                .is_ok_and(|ident| ident == "test")
    })
}

#[derive(Default)]
struct Collector {
    paths: BTreeSet<Segments>,
}

impl Collector {
    fn use_tree(&mut self, tree: &syn::UseTree, mut prefix: Segments) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.use_tree(&path.tree, prefix);
            }
            syn::UseTree::Name(name) => {
                prefix.push(name.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Rename(rename) => {
                prefix.push(rename.ident.to_string());
                self.paths.insert(prefix);
            }
            syn::UseTree::Glob(_) => {
                prefix.push("*".to_owned());
                self.paths.insert(prefix);
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.use_tree(item, prefix.clone());
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for Collector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Segments = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        if !segments.is_empty() {
            self.paths.insert(segments);
        }
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        if !is_test_only(&node.attrs) {
            self.use_tree(&node.tree, Vec::new());
        }
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        if !is_test_only(&node.attrs) {
            syn::visit::visit_item_mod(self, node);
        }
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        if !is_test_only(&node.attrs) {
            syn::visit::visit_item_fn(self, node);
        }
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        if !is_test_only(&node.attrs) {
            syn::visit::visit_item_impl(self, node);
        }
    }
}
