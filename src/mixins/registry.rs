//! Mixin registry for storage and lookup of mixin definitions.
//!
//! # Mixin Kinds
//! - **Tree mixins**: harvested from `@mixin` blocks in the document.
//! - **Record mixins**: plain records, from data files or inline options.
//! - **Callback mixins**: Rust closures registered programmatically.
//!
//! # Features
//! - Register, lookup, and remove mixins by name (case-sensitive).
//! - Overwriting an existing mixin is silent and returns the old definition;
//!   the last writer wins.
//! - The registry is an ordinary value: each processing run builds its own,
//!   so independent runs never see each other's definitions.
//!
//! # Thread Safety
//! This type is **not** thread-safe; callbacks are `Rc`.

use std::collections::HashMap;

use tracing::debug;

use crate::errors::MixinError;
use crate::mixins::params::{parse_invocation, parse_parameters};
use crate::mixins::types::{Definition, MixinCallback, MixinKind, Record, TreeMixin};
use crate::mixins::{CONTENT, MIXIN};
use crate::tree::{NodeId, NodeKind, Tree};

/// Mixin registry for tree, record and callback mixins.
#[derive(Debug, Clone, Default)]
pub struct MixinRegistry {
    /// Map from mixin name to definition.
    pub mixins: HashMap<String, Definition>,
}

impl MixinRegistry {
    /// Creates a new, empty mixin registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `definition` under its name.
    ///
    /// # Returns
    /// `Some(old)` if a mixin with this name was already registered.
    pub fn insert(&mut self, definition: Definition) -> Option<Definition> {
        self.mixins.insert(definition.name.clone(), definition)
    }

    pub fn register(&mut self, name: &str, kind: MixinKind) -> Option<Definition> {
        self.insert(Definition::new(name, kind))
    }

    pub fn register_record(&mut self, name: &str, record: Record) -> Option<Definition> {
        self.register(name, MixinKind::Record(record))
    }

    pub fn register_callback(&mut self, name: &str, callback: MixinCallback) -> Option<Definition> {
        self.register(name, MixinKind::Callback(callback))
    }

    pub fn unregister(&mut self, name: &str) -> Option<Definition> {
        self.mixins.remove(name)
    }

    pub fn lookup(&self, name: &str) -> Option<&Definition> {
        self.mixins.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.mixins.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.mixins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mixins.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.mixins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Moves every `@mixin` block under `root` out of the tree and into the
    /// registry. Returns the number of blocks harvested.
    ///
    /// All blocks are detached before any body is copied, so a definition
    /// nested inside another definition's body is registered on its own and
    /// does not remain in the outer body. Duplicate names resolve in
    /// document order, last one wins.
    pub fn harvest(&mut self, tree: &mut Tree, root: NodeId) -> Result<usize, MixinError> {
        let blocks = tree.at_rules(root, MIXIN);
        for &block in &blocks {
            tree.detach(block);
        }
        for &block in &blocks {
            let definition = define_from_block(tree, block)?;
            debug!(
                mixin = %definition.name,
                signature = %definition.signature(),
                "harvested @mixin"
            );
            self.insert(definition);
        }
        Ok(blocks.len())
    }
}

/// Builds a tree mixin from an `@mixin name(params) { body }` node.
fn define_from_block(tree: &Tree, block: NodeId) -> Result<Definition, MixinError> {
    let params = match tree.kind(block) {
        NodeKind::AtRule { params, .. } => params.as_str(),
        _ => "",
    };
    let invocation = parse_invocation(params)
        .map_err(|_| MixinError::syntax(format!("@{MIXIN} {params}"), tree.source(block)))?;

    let (parameters, is_variadic) = invocation
        .args
        .as_deref()
        .map(parse_parameters)
        .unwrap_or_default();

    let mixin = TreeMixin {
        body: tree.extract(block),
        parameters,
        accepts_content: tree.first_at_rule(block, CONTENT).is_some(),
        is_variadic,
    };
    Ok(Definition::new(invocation.name, MixinKind::Tree(mixin)))
}
