//! Mixin expansion engine.
//!
//! Replaces every `@include` call site with the expansion of the mixin it
//! names: binds arguments, imports a fresh copy of the body, substitutes
//! variables, splices caller content into `@content`, inserts the result where
//! the call site stood and removes the call site.
//!
//! ## Ordering
//!
//! Call sites are processed from an explicit work-list rather than by
//! recursion. Call sites found inside a freshly inserted expansion are pushed
//! on top of the list, so a mixin whose body includes other mixins is fully
//! expanded before the engine moves on to the next call site in the document.
//! The resulting order is depth first, document order.
//!
//! ## Recursion
//!
//! Each work item carries its nesting depth. A call site that comes from a
//! mixin body is one level deeper than the call that imported the body; a
//! call site the caller wrote inside its own content block keeps the caller's
//! depth. With `max_depth` set, an expansion nested deeper than the limit
//! fails with [`MixinError::RecursionLimit`]; with `None`, a mixin that
//! includes itself never terminates.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, trace, warn};

use crate::errors::MixinError;
use crate::mixins::convert::record_to_fragment;
use crate::mixins::params::{parse_arguments, parse_invocation};
use crate::mixins::registry::MixinRegistry;
use crate::mixins::types::{Argument, CallSite, MixinKind, Parameter, Record, TreeMixin};
use crate::mixins::{CONTENT, INCLUDE, MAX_EXPANSION_DEPTH};
use crate::substitute::substitute_variables;
use crate::syntax::stringify;
use crate::tree::{NodeId, NodeKind, Tree};

// =============================
// Options and results
// =============================

/// Knobs for one expansion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Treat a call to an undefined mixin as a no-op instead of an error.
    pub silent: bool,
    /// Maximum nesting depth of expansions; `None` disables the guard.
    pub max_depth: Option<usize>,
    /// Record an [`ExpansionStep`] with a document snapshot per expansion.
    pub trace: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            silent: false,
            max_depth: Some(MAX_EXPANSION_DEPTH),
            trace: false,
        }
    }
}

/// A single expansion, for traceability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionStep {
    pub mixin_name: String,
    /// `tree`, `record` or `callback`.
    pub kind: &'static str,
    pub depth: usize,
    /// The serialized document right after this expansion.
    pub snapshot: String,
}

/// Summary of an expansion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionReport {
    /// Call sites replaced by an expansion.
    pub expanded: usize,
    /// Call sites to undefined mixins dropped in silent mode.
    pub skipped: usize,
    pub trace: Vec<ExpansionStep>,
}

// =============================
// Public API
// =============================

/// Expands every `@include` under `root` against `registry`.
pub fn expand_includes(
    tree: &mut Tree,
    root: NodeId,
    registry: &MixinRegistry,
    options: &ExpandOptions,
) -> Result<ExpansionReport, MixinError> {
    let expander = Expander {
        tree,
        root,
        registry,
        options,
        report: ExpansionReport::default(),
    };
    expander.run()
}

/// Binds call arguments to a tree mixin's parameters.
///
/// Every parameter starts at its default. Keyed arguments set their slot;
/// positional arguments fill the next slot not already set, and are dropped
/// once the parameters run out. For a variadic mixin the first parameter is
/// then overwritten with all positional values joined by spaces.
pub fn bind_arguments(
    parameters: &[Parameter],
    is_variadic: bool,
    arguments: &[Argument],
) -> HashMap<String, String> {
    let mut binding: HashMap<String, String> = parameters
        .iter()
        .map(|p| (p.name.clone(), p.default.clone()))
        .collect();
    let mut filled: HashSet<&str> = HashSet::new();
    let mut cursor = 0;

    for argument in arguments {
        match &argument.key {
            Some(key) => {
                binding.insert(key.clone(), argument.value.clone());
                filled.insert(key.as_str());
            }
            None => {
                while cursor < parameters.len() && filled.contains(parameters[cursor].name.as_str()) {
                    cursor += 1;
                }
                match parameters.get(cursor) {
                    Some(parameter) => {
                        binding.insert(parameter.name.clone(), argument.value.clone());
                        filled.insert(parameter.name.as_str());
                        cursor += 1;
                    }
                    None => trace!(value = %argument.value, "discarding excess positional argument"),
                }
            }
        }
    }

    if is_variadic {
        if let Some(first) = parameters.first() {
            let rest: Vec<&str> = arguments
                .iter()
                .filter(|a| a.key.is_none())
                .map(|a| a.value.as_str())
                .collect();
            binding.insert(first.name.clone(), rest.join(" "));
        }
    }

    binding
}

// =============================
// Expansion engine
// =============================

/// Top-level nodes inserted for one call site, plus the roots of the caller
/// content spliced into them.
#[derive(Default)]
struct Inserted {
    nodes: Vec<NodeId>,
    content: Vec<NodeId>,
}

struct Expander<'a> {
    tree: &'a mut Tree,
    root: NodeId,
    registry: &'a MixinRegistry,
    options: &'a ExpandOptions,
    report: ExpansionReport,
}

impl Expander<'_> {
    fn run(mut self) -> Result<ExpansionReport, MixinError> {
        let mut pending: Vec<(NodeId, usize)> = self
            .tree
            .at_rules(self.root, INCLUDE)
            .into_iter()
            .rev()
            .map(|call| (call, 0))
            .collect();

        while let Some((call, depth)) = pending.pop() {
            // Dropped with an enclosing call site, or already expanded.
            if !self.tree.is_attached(call, self.root) {
                continue;
            }
            let inserted = self.expand_call(call, depth)?;

            let from_content: HashSet<NodeId> =
                self.includes_within(&inserted.content).into_iter().collect();
            let discovered: Vec<(NodeId, usize)> = self
                .includes_within(&inserted.nodes)
                .into_iter()
                .map(|node| {
                    if from_content.contains(&node) {
                        (node, depth)
                    } else {
                        (node, depth + 1)
                    }
                })
                .collect();
            pending.extend(discovered.into_iter().rev());
        }

        info!(
            expanded = self.report.expanded,
            skipped = self.report.skipped,
            "mixin expansion finished"
        );
        Ok(self.report)
    }

    /// `@include` nodes among `nodes` and their descendants, in document order.
    fn includes_within(&self, nodes: &[NodeId]) -> Vec<NodeId> {
        let mut found = Vec::new();
        for &node in nodes {
            if self.tree.kind(node).is_at_rule(INCLUDE) {
                found.push(node);
            }
            found.extend(self.tree.at_rules(node, INCLUDE));
        }
        found
    }

    /// Expands one call site and returns what was inserted for it.
    fn expand_call(&mut self, call: NodeId, depth: usize) -> Result<Inserted, MixinError> {
        let text = match self.tree.kind(call) {
            NodeKind::AtRule { params, .. } => params.clone(),
            _ => return Ok(Inserted::default()),
        };
        let invocation = parse_invocation(&text)
            .map_err(|_| MixinError::syntax(format!("@{INCLUDE} {text}"), self.tree.source(call)))?;
        let arguments = invocation
            .args
            .as_deref()
            .map(parse_arguments)
            .unwrap_or_default();

        let registry = self.registry;
        let Some(definition) = registry.lookup(&invocation.name) else {
            if self.options.silent {
                warn!(mixin = %invocation.name, "skipping call to undefined mixin");
                self.tree.detach(call);
                self.report.skipped += 1;
                return Ok(Inserted::default());
            }
            return Err(MixinError::undefined(invocation.name, self.tree.source(call)));
        };

        if let Some(limit) = self.options.max_depth {
            if depth > limit {
                return Err(MixinError::recursion_limit(
                    invocation.name,
                    limit,
                    self.tree.source(call),
                ));
            }
        }

        debug!(
            mixin = %invocation.name,
            kind = definition.kind.label(),
            depth,
            arguments = arguments.len(),
            "expanding @include"
        );

        let mut content = Vec::new();
        let fragment = match &definition.kind {
            MixinKind::Tree(mixin) => {
                let (proxy, spliced) = self.materialize(mixin, call, &arguments);
                content = spliced;
                Some(proxy)
            }
            MixinKind::Record(record) => Some(self.import_record(record, call)),
            MixinKind::Callback(callback) => {
                let site = CallSite {
                    tree: &*self.tree,
                    node: call,
                    name: &invocation.name,
                    arguments: &arguments,
                };
                callback(&site)?.map(|record| self.import_record(&record, call))
            }
        };

        let nodes = match fragment {
            Some(proxy) => self.insert_in_place(call, proxy),
            None => Vec::new(),
        };
        self.tree.detach(call);
        self.report.expanded += 1;

        if self.options.trace {
            self.report.trace.push(ExpansionStep {
                mixin_name: invocation.name,
                kind: definition.kind.label(),
                depth,
                snapshot: stringify(self.tree, self.root),
            });
        }
        Ok(Inserted { nodes, content })
    }

    /// Imports a fresh copy of the body under a detached proxy, substitutes
    /// bound arguments and splices caller content. Returns the proxy and the
    /// spliced content roots.
    fn materialize(
        &mut self,
        mixin: &TreeMixin,
        call: NodeId,
        arguments: &[Argument],
    ) -> (NodeId, Vec<NodeId>) {
        let proxy = self.tree.import(&mixin.body, mixin.body.root());

        // Zero-parameter bodies are never substituted, so literal `$` text
        // in them survives untouched.
        if !mixin.parameters.is_empty() {
            let binding = bind_arguments(&mixin.parameters, mixin.is_variadic, arguments);
            trace!(?binding, "bound mixin arguments");
            substitute_variables(self.tree, proxy, &binding);
        }

        let content = if mixin.accepts_content {
            self.splice_content(proxy, call)
        } else {
            Vec::new()
        };
        (proxy, content)
    }

    /// Replaces `@content` placeholders with the call site's children.
    ///
    /// The first placeholder receives the children themselves; any further
    /// placeholder receives deep copies. Returns every node placed.
    fn splice_content(&mut self, proxy: NodeId, call: NodeId) -> Vec<NodeId> {
        let placeholders = self.tree.at_rules(proxy, CONTENT);
        let content: Vec<NodeId> = self.tree.children(call).to_vec();
        let mut placed = Vec::new();

        for (index, placeholder) in placeholders.into_iter().enumerate() {
            for &node in &content {
                let node = if index == 0 {
                    node
                } else {
                    self.tree.deep_clone(node)
                };
                self.tree.insert_before(placeholder, node);
                placed.push(node);
            }
            self.tree.detach(placeholder);
        }
        placed
    }

    fn import_record(&mut self, record: &Record, call: NodeId) -> NodeId {
        let fragment = record_to_fragment(record, self.tree.source(call));
        self.tree.import(&fragment, fragment.root())
    }

    /// Moves the proxy's children before `call`, preserving order.
    fn insert_in_place(&mut self, call: NodeId, proxy: NodeId) -> Vec<NodeId> {
        let nodes: Vec<NodeId> = self.tree.children(proxy).to_vec();
        for &node in &nodes {
            self.tree.insert_before(call, node);
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_no_arguments() {
        let params = vec![Parameter::new("a", "1"), Parameter::new("b", "2")];
        let binding = bind_arguments(&params, false, &[]);
        assert_eq!(binding["a"], "1");
        assert_eq!(binding["b"], "2");
    }

    #[test]
    fn test_positional_skips_slots_set_by_key() {
        let params = vec![Parameter::new("a", "1"), Parameter::new("b", "2")];
        let binding = bind_arguments(
            &params,
            false,
            &[Argument::keyed("a", "9"), Argument::positional("5")],
        );
        assert_eq!(binding["a"], "9");
        assert_eq!(binding["b"], "5");
    }

    #[test]
    fn test_excess_positional_arguments_are_discarded() {
        let params = vec![Parameter::new("a", "")];
        let binding = bind_arguments(
            &params,
            false,
            &[Argument::positional("1"), Argument::positional("2")],
        );
        assert_eq!(binding.len(), 1);
        assert_eq!(binding["a"], "1");
    }

    #[test]
    fn test_variadic_collects_positional_values_only() {
        let params = vec![Parameter::new("rest", ""), Parameter::new("sep", ",")];
        let binding = bind_arguments(
            &params,
            true,
            &[
                Argument::positional("1"),
                Argument::keyed("sep", "/"),
                Argument::positional("2"),
                Argument::positional("3"),
            ],
        );
        assert_eq!(binding["rest"], "1 2 3");
        assert_eq!(binding["sep"], "/");
    }

    #[test]
    fn test_variadic_without_parameters_binds_nothing() {
        let binding = bind_arguments(&[], true, &[Argument::positional("1")]);
        assert!(binding.is_empty());
    }
}
