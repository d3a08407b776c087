//! # Sassy Mixin System
//!
//! Mixins are named, parameterised fragments of style-sheet tree, defined once
//! and expanded at every call site:
//!
//! ```css
//! @mixin button($color, $size: 1em) {
//!   color: $color;
//!   font-size: $size;
//!   &:hover { @content; }
//! }
//!
//! .ok { @include button(green) { opacity: .8 } }
//! ```
//!
//! ## Pipeline
//!
//! 1. [`MixinRegistry::harvest`] moves every `@mixin` block out of the document.
//! 2. [`loader::load_external`] adds record and callback mixins from options.
//! 3. [`expand_includes`] replaces every `@include` with its expansion,
//!    depth first, until no call site remains.
//!
//! The registry is read-only during step 3. Expansion never mutates a
//! definition: each call site gets its own deep copy of the body.

pub mod convert;
pub mod expander;
pub mod loader;
pub mod params;
pub mod registry;
pub mod types;

pub use convert::record_to_fragment;
pub use expander::{bind_arguments, expand_includes, ExpandOptions, ExpansionReport, ExpansionStep};
pub use loader::load_external;
pub use params::{parse_arguments, parse_invocation, parse_parameters, Invocation};
pub use registry::MixinRegistry;
pub use types::{
    Argument, CallSite, Definition, MixinCallback, MixinKind, Parameter, Record, TreeMixin,
};

/// At-rule name of a definition block.
pub const MIXIN: &str = "mixin";
/// At-rule name of a call site.
pub const INCLUDE: &str = "include";
/// At-rule name of the content placeholder.
pub const CONTENT: &str = "content";

/// Default bound on nested expansion depth.
pub const MAX_EXPANSION_DEPTH: usize = 128;
