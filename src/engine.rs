use std::path::Path;

use tracing::{debug, info_span};

use crate::config::MixinOptions;
use crate::errors::{MixinError, SourceContext};
use crate::mixins::{expand_includes, load_external, ExpansionReport, MixinRegistry};
use crate::syntax::{parse, stringify};
use crate::tree::Tree;

// ============================================================================
// PIPELINE
// ============================================================================

/// One processing run: load external mixins, harvest document definitions,
/// expand every call site.
///
/// Each call to [`Pipeline::process`] builds a fresh registry, so runs never
/// share definitions with each other.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: MixinOptions,
    trace: bool,
}

/// Result of processing a source text.
#[derive(Debug, Clone)]
pub struct Output {
    pub css: String,
    pub report: ExpansionReport,
}

impl Pipeline {
    pub fn new(options: MixinOptions) -> Self {
        Self {
            options,
            trace: false,
        }
    }

    /// Record a snapshot per expansion in the returned report.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn options(&self) -> &MixinOptions {
        &self.options
    }

    /// Builds the registry for `tree`: external mixins first, then the
    /// document's own `@mixin` blocks, which are removed from the tree.
    /// Document definitions overwrite external ones with the same name.
    pub fn build_registry(&self, tree: &mut Tree) -> Result<MixinRegistry, MixinError> {
        let mut registry = MixinRegistry::new();
        let loaded = load_external(&mut registry, &self.options)?;
        let root = tree.root();
        let harvested = registry.harvest(tree, root)?;
        debug!(loaded, harvested, "mixin registry ready");
        Ok(registry)
    }

    /// Runs the whole pipeline over `tree` in place, then compacts its arena.
    /// Node ids taken from `tree` before the call are invalid afterwards.
    pub fn process(&self, tree: &mut Tree) -> Result<ExpansionReport, MixinError> {
        let registry = self.build_registry(tree)?;
        let root = tree.root();
        let report = expand_includes(tree, root, &registry, &self.options.expand_options(self.trace))?;
        tree.compact();
        Ok(report)
    }

    /// Parses `text`, processes it and serializes the result.
    pub fn process_source(&self, text: &str, name: &str) -> Result<Output, MixinError> {
        let _span = info_span!("process", file = name).entered();
        let mut tree = parse(text, SourceContext::from_file(name, text))?;
        let report = self.process(&mut tree)?;
        Ok(Output {
            css: stringify(&tree, tree.root()),
            report,
        })
    }

    /// Reads and processes a file.
    pub fn process_file(&self, path: &Path) -> Result<Output, MixinError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MixinError::load(path, "cannot read input", Some(e)))?;
        self.process_source(&text, &path.display().to_string())
    }
}

/// Expands `text` with default options.
pub fn expand_source(text: &str) -> Result<String, MixinError> {
    Pipeline::default()
        .process_source(text, "<inline>")
        .map(|output| output.css)
}
