//! Fragment converter: plain records to tree fragments.
//!
//! Used for record-defined mixins and for records returned by callbacks.
//! The returned fragment goes through the same import-and-insert path as a
//! tree mixin's body.

use serde_json::Value;

use crate::mixins::types::Record;
use crate::tree::{NodeId, NodeKind, Source, Tree};

/// Builds a fragment rooted at a detached root node from `record`.
///
/// Every node created carries `source`, the provenance of the call site that
/// triggered the conversion.
pub fn record_to_fragment(record: &Record, source: Option<&Source>) -> Tree {
    let mut fragment = Tree::with_root_source(source.cloned());
    let root = fragment.root();
    append_record(&mut fragment, root, record, source);
    fragment
}

fn append_record(tree: &mut Tree, parent: NodeId, record: &Record, source: Option<&Source>) {
    for (key, value) in record {
        append_entry(tree, parent, key, value, source);
    }
}

fn append_entry(tree: &mut Tree, parent: NodeId, key: &str, value: &Value, source: Option<&Source>) {
    match value {
        Value::Object(nested) => {
            let node = append_container(tree, parent, key, source);
            append_record(tree, node, nested, source);
        }
        // Arrays nest like records keyed by index.
        Value::Array(items) => {
            let node = append_container(tree, parent, key, source);
            for (index, item) in items.iter().enumerate() {
                append_entry(tree, node, &index.to_string(), item, source);
            }
        }
        Value::Null => {
            append_container(tree, parent, key, source);
        }
        Value::String(text) => append_decl(tree, parent, key, text.clone(), source),
        Value::Number(number) => append_decl(tree, parent, key, number.to_string(), source),
        Value::Bool(flag) => append_decl(tree, parent, key, flag.to_string(), source),
    }
}

fn append_container(tree: &mut Tree, parent: NodeId, key: &str, source: Option<&Source>) -> NodeId {
    let node = tree.create(container_kind(key), source.cloned());
    tree.append(parent, node);
    node
}

fn append_decl(tree: &mut Tree, parent: NodeId, prop: &str, value: String, source: Option<&Source>) {
    let node = tree.create(NodeKind::decl(prop, value), source.cloned());
    tree.append(parent, node);
}

/// `@media print` becomes an at-rule, anything else a rule.
fn container_kind(key: &str) -> NodeKind {
    match key.strip_prefix('@') {
        Some(rest) => {
            let rest = rest.trim();
            let (name, params) = rest
                .split_once(char::is_whitespace)
                .unwrap_or((rest, ""));
            NodeKind::at_rule(name, params.trim(), true)
        }
        None => NodeKind::rule(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::stringify;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_flat_record_becomes_declarations() {
        let fragment = record_to_fragment(
            &record(json!({ "color": "red", "z-index": 3, "visible": true })),
            None,
        );
        assert_eq!(
            stringify(&fragment, fragment.root()),
            "color: red;\nz-index: 3;\nvisible: true;\n"
        );
    }

    #[test]
    fn test_nested_rules_and_at_rules_keep_insertion_order() {
        let fragment = record_to_fragment(
            &record(json!({
                "&:hover": { "color": "blue" },
                "@media (max-width: 100px)": { "a": { "top": 0 } },
                "margin": "0"
            })),
            None,
        );
        assert_eq!(
            stringify(&fragment, fragment.root()),
            "&:hover {\n  color: blue;\n}\n@media (max-width: 100px) {\n  a {\n    top: 0;\n  }\n}\nmargin: 0;\n"
        );
    }

    #[test]
    fn test_at_rule_without_params() {
        let fragment = record_to_fragment(&record(json!({ "@font-face": { "src": "x" } })), None);
        let node = fragment.children(fragment.root())[0];
        assert_eq!(fragment.kind(node), &NodeKind::at_rule("font-face", "", true));
    }

    #[test]
    fn test_arrays_and_null_nest() {
        let fragment = record_to_fragment(&record(json!({ "a": ["x"], "b": null })), None);
        assert_eq!(
            stringify(&fragment, fragment.root()),
            "a {\n  0: x;\n}\nb {\n}\n"
        );
    }

    #[test]
    fn test_nodes_inherit_call_site_source() {
        let tree = crate::syntax::parse_str("@include m;").unwrap();
        let call = tree.children(tree.root())[0];
        let source = tree.source(call);
        let fragment = record_to_fragment(&record(json!({ "a": { "b": "c" } })), source);
        for id in fragment.descendants(fragment.root()) {
            assert_eq!(fragment.source(id), source);
        }
    }
}
