//! Core mixin types
//!
//! This module defines the fundamental types used throughout the mixin system.
//! It has no dependencies on other mixin modules, making it the foundation layer.
//!
//! ## Ownership and Borrowing
//!
//! - A tree mixin owns its body as a detached [`Tree`]; expansion imports a
//!   fresh copy of it, so the body is never mutated after harvesting.
//! - Callbacks are reference counted (`Rc`), cheaply cloneable and, like the
//!   registry holding them, confined to one thread.
//! - [`CallSite`] borrows the document for the duration of one callback call.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::errors::MixinError;
use crate::tree::{NodeId, Source, Tree};

/// A plain nested key/value record, iterated in insertion order.
///
/// Objects are nested blocks; strings, numbers and booleans are declaration
/// values.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A mixin implemented in Rust.
///
/// Receives the call site and returns a record to insert in its place, or
/// `None` to insert nothing.
pub type MixinCallback = Rc<dyn Fn(&CallSite<'_>) -> Result<Option<Record>, MixinError>>;

/// One declared parameter of a tree mixin: `$name` or `$name: default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Empty when the declaration had no default.
    pub default: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
        }
    }
}

/// One argument at a call site: positional (`key` is `None`) or `$key: value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub key: Option<String>,
    pub value: String,
}

impl Argument {
    pub fn positional(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: value.into(),
        }
    }

    pub fn keyed(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
        }
    }
}

/// A mixin defined by an `@mixin` block in the document.
#[derive(Debug, Clone)]
pub struct TreeMixin {
    /// The block's children, detached from the document.
    pub body: Tree,
    pub parameters: Vec<Parameter>,
    /// The body contains an `@content` placeholder.
    pub accepts_content: bool,
    /// The parameter list contained `...`; the first parameter collects
    /// every positional argument.
    pub is_variadic: bool,
}

/// The three ways a mixin can be defined.
#[derive(Clone)]
pub enum MixinKind {
    Tree(TreeMixin),
    Record(Record),
    Callback(MixinCallback),
}

impl MixinKind {
    pub fn label(&self) -> &'static str {
        match self {
            MixinKind::Tree(_) => "tree",
            MixinKind::Record(_) => "record",
            MixinKind::Callback(_) => "callback",
        }
    }
}

impl fmt::Debug for MixinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixinKind::Tree(mixin) => f.debug_tuple("Tree").field(mixin).finish(),
            MixinKind::Record(record) => f.debug_tuple("Record").field(record).finish(),
            MixinKind::Callback(_) => f.debug_tuple("Callback").finish(),
        }
    }
}

/// A named mixin.
#[derive(Debug, Clone)]
pub struct Definition {
    pub name: String,
    pub kind: MixinKind,
}

impl Definition {
    pub fn new(name: impl Into<String>, kind: MixinKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Human-readable signature, e.g. `button($color, $size: 1em...)`.
    pub fn signature(&self) -> String {
        match &self.kind {
            MixinKind::Tree(mixin) => {
                let params: Vec<String> = mixin
                    .parameters
                    .iter()
                    .map(|p| {
                        if p.default.is_empty() {
                            format!("${}", p.name)
                        } else {
                            format!("${}: {}", p.name, p.default)
                        }
                    })
                    .collect();
                let rest = if mixin.is_variadic { "..." } else { "" };
                format!("{}({}{})", self.name, params.join(", "), rest)
            }
            _ => self.name.clone(),
        }
    }
}

/// The call site handed to a [`MixinCallback`].
pub struct CallSite<'a> {
    pub tree: &'a Tree,
    /// The `@include` node; still attached, with its content children.
    pub node: NodeId,
    pub name: &'a str,
    pub arguments: &'a [Argument],
}

impl<'a> CallSite<'a> {
    /// Argument values in call order, keys dropped.
    pub fn values(&self) -> Vec<&'a str> {
        self.arguments.iter().map(|a| a.value.as_str()).collect()
    }

    pub fn source(&self) -> Option<&'a Source> {
        self.tree.source(self.node)
    }
}
