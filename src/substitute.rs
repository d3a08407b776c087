//! Variable substitution over a tree fragment.
//!
//! Rewrites `$name` and `$(name)` references in declaration properties and
//! values, rule selectors and at-rule params. Only names present in the
//! supplied mapping are touched; every other `$` reference is kept verbatim,
//! so a fragment can be substituted with a partial mapping safely.
//!
//! A bare `$name` only counts at the start of the text or after a non-word
//! character, so `x$a` is left alone. `$(name)` matches anywhere.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::tree::{NodeId, NodeKind, Tree};

// The bare form captures its leading boundary character so it can be put back.
static VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\(\s*(?P<inner>[\w-]+)\s*\)|(?P<lead>^|[^\w])\$(?P<bare>[\w-]+)")
        .expect("variable pattern is valid")
});

/// Rewrites every variable reference inside `node` (and `node` itself) in place.
pub fn substitute_variables(tree: &mut Tree, node: NodeId, vars: &HashMap<String, String>) {
    if vars.is_empty() {
        return;
    }
    let mut targets = tree.descendants(node);
    targets.push(node);
    for id in targets {
        match tree.kind_mut(id) {
            NodeKind::Decl { prop, value } => {
                replace_in_place(prop, vars);
                replace_in_place(value, vars);
            }
            NodeKind::Rule { selector } => replace_in_place(selector, vars),
            NodeKind::AtRule { params, .. } => replace_in_place(params, vars),
            NodeKind::Root => {}
        }
    }
}

/// Substitutes references in a single string.
pub fn substitute_text(text: &str, vars: &HashMap<String, String>) -> String {
    if !text.contains('$') {
        return text.to_string();
    }
    VARIABLE
        .replace_all(text, |caps: &Captures| {
            let lead = caps.name("lead").map_or("", |m| m.as_str());
            let name = caps
                .name("inner")
                .or_else(|| caps.name("bare"))
                .map_or("", |m| m.as_str());
            match vars.get(name) {
                Some(value) => format!("{lead}{value}"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn replace_in_place(text: &mut String, vars: &HashMap<String, String>) {
    if text.contains('$') {
        *text = substitute_text(text, vars);
    }
}
