//! Syntax module for the Sassy style-sheet language
//!
//! Text in, [`Tree`](crate::tree::Tree) out, and back again. The mixin
//! pipeline never looks at text; it only consumes the tree these produce.

pub mod parser;
pub mod serializer;

pub use parser::{parse, parse_str};
pub use serializer::stringify;
