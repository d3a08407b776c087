//! Sass-style mixins for style-sheet trees.
//!
//! Parse a document, harvest its `@mixin` definitions, load record and
//! callback mixins from options, and replace every `@include` with its
//! expansion.
//!
//! ```no_run
//! use sassy_mixins::{MixinOptions, Pipeline};
//!
//! let pipeline = Pipeline::new(MixinOptions::new().with_mixins_dir("mixins"));
//! let output = pipeline.process_source("a { @include clearfix; }", "a.css")?;
//! println!("{}", output.css);
//! # Ok::<(), sassy_mixins::MixinError>(())
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod mixins;
pub mod substitute;
pub mod syntax;
pub mod tree;

pub use config::{MixinOptions, MixinSource};
pub use engine::{expand_source, Output, Pipeline};
pub use errors::{MixinError, SourceContext};
pub use mixins::{
    expand_includes, CallSite, ExpandOptions, ExpansionReport, ExpansionStep, MixinRegistry, Record,
};
pub use tree::{NodeId, NodeKind, Tree};
