//! Turns a [`Tree`] back into style-sheet text.
//!
//! Output is normalized: two-space indentation, one statement per line,
//! declarations always end in `;`.

use std::fmt::Write;

use crate::tree::{NodeId, NodeKind, Tree};

const INDENT: &str = "  ";

/// Serializes the children of `node` (or `node` itself if it is not a root).
pub fn stringify(tree: &Tree, node: NodeId) -> String {
    let mut out = String::new();
    match tree.kind(node) {
        NodeKind::Root => {
            for &child in tree.children(node) {
                write_node(tree, child, 0, &mut out);
            }
        }
        _ => write_node(tree, node, 0, &mut out),
    }
    out
}

fn write_node(tree: &Tree, node: NodeId, depth: usize, out: &mut String) {
    let indent = INDENT.repeat(depth);
    match tree.kind(node) {
        NodeKind::Root => {
            for &child in tree.children(node) {
                write_node(tree, child, depth, out);
            }
        }
        NodeKind::Decl { prop, value } => {
            let _ = writeln!(out, "{indent}{prop}: {value};");
        }
        NodeKind::Rule { selector } => {
            let _ = writeln!(out, "{indent}{selector} {{");
            write_children(tree, node, depth, out);
            let _ = writeln!(out, "{indent}}}");
        }
        NodeKind::AtRule {
            name,
            params,
            has_block,
        } => {
            let head = if params.is_empty() {
                format!("@{name}")
            } else {
                format!("@{name} {params}")
            };
            if *has_block || !tree.children(node).is_empty() {
                let _ = writeln!(out, "{indent}{head} {{");
                write_children(tree, node, depth, out);
                let _ = writeln!(out, "{indent}}}");
            } else {
                let _ = writeln!(out, "{indent}{head};");
            }
        }
    }
}

fn write_children(tree: &Tree, node: NodeId, depth: usize, out: &mut String) {
    for &child in tree.children(node) {
        write_node(tree, child, depth + 1, out);
    }
}
