//! Shared helpers for the integration tests.
#![allow(dead_code)]

use sassy_mixins::{MixinError, MixinOptions, Pipeline, Record};
use serde_json::Value;

/// Expands `text` with `options`, returning the serialized result.
pub fn expand_with(options: MixinOptions, text: &str) -> Result<String, MixinError> {
    Pipeline::new(options)
        .process_source(text, "test.css")
        .map(|output| output.css)
}

/// Expands `text` with default options and panics on failure.
pub fn must_expand(text: &str) -> String {
    match expand_with(MixinOptions::default(), text) {
        Ok(css) => css,
        Err(e) => panic!("expansion failed: {e:?}"),
    }
}

/// Converts a `json!` object literal into a record.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}
