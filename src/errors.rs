//! Sassy Error Handling
//!
//! Every failure the pipeline can produce is a [`MixinError`]. Variants that
//! point at a place in a style sheet carry the whole source as a
//! [`NamedSource`] plus a labelled span, so a `miette::Report` can render the
//! offending rule directly.
//!
//! Construct located errors through the helper constructors
//! (`MixinError::syntax`, `MixinError::undefined`, ...) which take the node's
//! optional [`Source`] and fall back to an empty source when there is none.

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::tree::{Source, Span};

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// The text a tree was parsed from, shared by every node's provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Create a source context from real file content.
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Create a fallback when real source is unavailable.
    pub fn fallback(context: &str) -> Self {
        Self {
            name: "fallback".to_string(),
            content: format!("/* {} */", context),
        }
    }

    /// Convert to NamedSource for use with miette error reporting.
    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.clone())
    }

    pub fn into_shared(self) -> Arc<SourceContext> {
        Arc::new(self)
    }
}

impl Default for SourceContext {
    fn default() -> Self {
        Self::fallback("no source available")
    }
}

/// Converts a byte span into the span type miette labels use.
pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from((span.start, span.end.saturating_sub(span.start)))
}

fn locate(source: Option<&Source>) -> (NamedSource<String>, SourceSpan) {
    match source {
        Some(source) => (
            source.context.to_named_source(),
            to_source_span(source.span),
        ),
        None => (
            SourceContext::default().to_named_source(),
            SourceSpan::from((0, 0)),
        ),
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// Unified error type for every stage: parsing, harvesting, loading, expansion.
#[derive(Debug, Error, Diagnostic)]
pub enum MixinError {
    #[error("Syntax error in `{rule}`")]
    #[diagnostic(
        code(sassy::syntax),
        help("argument lists must be wrapped in parentheses, e.g. `name($a, $b: 1)`")
    )]
    Syntax {
        rule: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("malformed argument list")]
        span: SourceSpan,
    },

    #[error("Undefined mixin {name}")]
    #[diagnostic(
        code(sassy::undefined_mixin),
        help("define it with `@mixin {name} {{ ... }}`, load it from a mixins directory, or enable `silent`")
    )]
    UndefinedMixin {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("no mixin named `{name}`")]
        span: SourceSpan,
    },

    #[error("Failed to load mixins from {}: {reason}", .path.display())]
    #[diagnostic(code(sassy::load))]
    Load {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    #[error("Mixin `{name}` exceeded the expansion depth limit of {limit}")]
    #[diagnostic(
        code(sassy::recursion_limit),
        help("a mixin that includes itself, directly or indirectly, never terminates")
    )]
    RecursionLimit {
        name: String,
        limit: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("included here")]
        span: SourceSpan,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(sassy::parse))]
    Parse {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("Invalid configuration in {}: {reason}", .path.display())]
    #[diagnostic(code(sassy::config))]
    Config { path: PathBuf, reason: String },

    #[error("Mixin `{name}` failed: {message}")]
    #[diagnostic(code(sassy::callback))]
    Callback { name: String, message: String },
}

impl MixinError {
    pub fn syntax(rule: impl Into<String>, source: Option<&Source>) -> Self {
        let (src, span) = locate(source);
        MixinError::Syntax {
            rule: rule.into(),
            src,
            span,
        }
    }

    pub fn undefined(name: impl Into<String>, source: Option<&Source>) -> Self {
        let (src, span) = locate(source);
        MixinError::UndefinedMixin {
            name: name.into(),
            src,
            span,
        }
    }

    pub fn recursion_limit(name: impl Into<String>, limit: usize, source: Option<&Source>) -> Self {
        let (src, span) = locate(source);
        MixinError::RecursionLimit {
            name: name.into(),
            limit,
            src,
            span,
        }
    }

    pub fn parse(message: impl Into<String>, context: &SourceContext, span: Span) -> Self {
        MixinError::Parse {
            message: message.into(),
            src: context.to_named_source(),
            span: to_source_span(span),
        }
    }

    pub fn load<E>(path: impl AsRef<Path>, reason: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MixinError::Load {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// A load failure with no underlying error to chain.
    pub fn load_reason(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        MixinError::Load {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
            source: None,
        }
    }

    pub fn config(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        MixinError::Config {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn callback(name: impl Into<String>, message: impl Into<String>) -> Self {
        MixinError::Callback {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Short stable label for the error kind, used by the CLI and tests.
    pub fn kind(&self) -> &'static str {
        match self {
            MixinError::Syntax { .. } => "Syntax",
            MixinError::UndefinedMixin { .. } => "UndefinedMixin",
            MixinError::Load { .. } => "Load",
            MixinError::RecursionLimit { .. } => "RecursionLimit",
            MixinError::Parse { .. } => "Parse",
            MixinError::Config { .. } => "Config",
            MixinError::Callback { .. } => "Callback",
        }
    }
}
