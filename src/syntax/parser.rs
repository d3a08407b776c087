//! Sassy Parser - Clean, Minimal Implementation
//!
//! Converts style-sheet text into a [`Tree`] with source location tracking.
//! This parser is purely syntactic: `@mixin` and `@include` are ordinary
//! at-rules here and only gain meaning in the mixin pipeline.

use std::sync::Arc;

use pest::{error::Error, iterators::Pair, Parser};
use pest_derive::Parser;

use crate::errors::{MixinError, SourceContext};
use crate::tree::{NodeId, NodeKind, Source, Span, Tree};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct SassyParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse style-sheet text into a tree whose root holds the top-level statements.
pub fn parse(source_text: &str, source_context: SourceContext) -> Result<Tree, MixinError> {
    let context = Arc::new(source_context);
    let root_source = Source {
        context: Arc::clone(&context),
        span: Span {
            start: 0,
            end: source_text.len(),
        },
        line: 1,
        column: 1,
    };
    let mut tree = Tree::with_root_source(Some(root_source));
    if source_text.trim().is_empty() {
        return Ok(tree);
    }

    let mut pairs = SassyParser::parse(Rule::stylesheet, source_text)
        .map_err(|e| convert_parse_error(e, &context))?;
    let Some(stylesheet) = pairs.next() else {
        return Ok(tree);
    };

    let root = tree.root();
    for pair in stylesheet.into_inner() {
        build_statement(&mut tree, root, pair, &context);
    }
    Ok(tree)
}

/// Parse a standalone snippet, naming its source `<inline>`.
pub fn parse_str(source_text: &str) -> Result<Tree, MixinError> {
    parse(
        source_text,
        SourceContext::from_file("<inline>", source_text),
    )
}

// ============================================================================
// TREE BUILDERS
// ============================================================================

fn build_statement(tree: &mut Tree, parent: NodeId, pair: Pair<Rule>, context: &Arc<SourceContext>) {
    let source = make_source(&pair, context);

    match pair.as_rule() {
        Rule::at_rule => {
            let mut name = String::new();
            let mut params = String::new();
            let mut block = None;
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::at_keyword => name = inner.as_str().trim_start_matches('@').to_string(),
                    Rule::at_params => params = inner.as_str().trim().to_string(),
                    Rule::block => block = Some(inner),
                    _ => {}
                }
            }
            let node = tree.create(
                NodeKind::at_rule(name, params, block.is_some()),
                Some(source),
            );
            tree.append(parent, node);
            if let Some(block) = block {
                build_block(tree, node, block, context);
            }
        }

        Rule::rule => {
            let mut selector = String::new();
            let mut block = None;
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::selector => selector = inner.as_str().trim().to_string(),
                    Rule::block => block = Some(inner),
                    _ => {}
                }
            }
            let node = tree.create(NodeKind::rule(selector), Some(source));
            tree.append(parent, node);
            if let Some(block) = block {
                build_block(tree, node, block, context);
            }
        }

        Rule::declaration => {
            let mut prop = String::new();
            let mut value = String::new();
            for inner in pair.into_inner() {
                match inner.as_rule() {
                    Rule::property => prop = inner.as_str().trim().to_string(),
                    Rule::value => value = inner.as_str().trim().to_string(),
                    _ => {}
                }
            }
            let node = tree.create(NodeKind::decl(prop, value), Some(source));
            tree.append(parent, node);
        }

        // EOI and anything silent
        _ => {}
    }
}

fn build_block(tree: &mut Tree, parent: NodeId, block: Pair<Rule>, context: &Arc<SourceContext>) {
    for statement in block.into_inner() {
        build_statement(tree, parent, statement, context);
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn make_source(pair: &Pair<Rule>, context: &Arc<SourceContext>) -> Source {
    let (line, column) = pair.as_span().start_pos().line_col();
    Source {
        context: Arc::clone(context),
        span: get_span(pair),
        line,
        column,
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn convert_parse_error(error: Error<Rule>, context: &SourceContext) -> MixinError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => Span {
            start: pos,
            end: pos,
        },
        pest::error::InputLocation::Span((start, end)) => Span { start, end },
    };

    let message = if span.start >= context.content.trim_end().len() {
        "Unexpected end of input (missing closing brace?)".to_string()
    } else {
        error.variant.message().to_string()
    };

    MixinError::parse(message, context, span)
}
