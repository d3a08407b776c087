//! Invocation syntax parser.
//!
//! Parses the text after `@mixin` / `@include`, e.g. `button($color, $size: 1em)`,
//! into a name and a structured parameter or argument list.

use thiserror::Error;

use crate::mixins::types::{Argument, Parameter};

/// Marker that makes a definition variadic.
pub const VARIADIC_MARKER: &str = "...";

/// `name(args)` split into its parts; `args` is `None` without parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: Option<String>,
}

/// The text after the name is not a parenthesised list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("argument list must start with `(` and end with `)`")]
pub struct MalformedArguments;

/// Splits `name(args)` into the name and the raw text between the parentheses.
pub fn parse_invocation(text: &str) -> Result<Invocation, MalformedArguments> {
    let name = text.split('(').next().unwrap_or_default();
    let rest = text[name.len()..].trim();

    let args = if rest.is_empty() {
        None
    } else {
        if !rest.starts_with('(') || !rest.ends_with(')') {
            return Err(MalformedArguments);
        }
        Some(rest[1..rest.len() - 1].to_string())
    };

    Ok(Invocation {
        name: name.trim().to_string(),
        args,
    })
}

/// Parses a definition's parameter list. Returns the parameters and whether
/// the list was variadic.
pub fn parse_parameters(args: &str) -> (Vec<Parameter>, bool) {
    let is_variadic = args.contains(VARIADIC_MARKER);
    let cleaned = args.replace(VARIADIC_MARKER, "");

    let parameters = split_top_level(&cleaned)
        .into_iter()
        .map(|entry| match entry.split_once(':') {
            Some((name, default)) => Parameter::new(strip_sigil(name), default.trim()),
            None => Parameter::new(strip_sigil(entry), ""),
        })
        .collect();

    (parameters, is_variadic)
}

/// Parses a call site's argument list.
///
/// `$key: value` (or `key: value`) entries are keyed; anything else,
/// including values that merely contain a colon such as `url(http://x)`,
/// is positional.
pub fn parse_arguments(args: &str) -> Vec<Argument> {
    split_top_level(args)
        .into_iter()
        .map(|entry| match entry.split_once(':') {
            Some((key, value)) if is_key(key.trim()) => {
                Argument::keyed(strip_sigil(key), value.trim())
            }
            _ => Argument::positional(entry),
        })
        .collect()
}

/// Splits on commas outside parentheses, brackets and quotes. Entries are
/// trimmed and empty entries dropped.
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

fn strip_sigil(text: &str) -> String {
    let text = text.trim();
    text.strip_prefix('$').unwrap_or(text).trim().to_string()
}

fn is_key(text: &str) -> bool {
    let name = text.strip_prefix('$').unwrap_or(text);
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_without_arguments() {
        let inv = parse_invocation("clearfix").unwrap();
        assert_eq!(inv.name, "clearfix");
        assert_eq!(inv.args, None);
    }

    #[test]
    fn test_invocation_with_empty_arguments() {
        let inv = parse_invocation("m()").unwrap();
        assert_eq!(inv.name, "m");
        assert_eq!(inv.args.as_deref(), Some(""));
    }

    #[test]
    fn test_invocation_name_is_trimmed() {
        let inv = parse_invocation("m (1, 2)").unwrap();
        assert_eq!(inv.name, "m");
        assert_eq!(inv.args.as_deref(), Some("1, 2"));
    }

    #[test]
    fn test_unbalanced_parenthesis_is_malformed() {
        assert_eq!(parse_invocation("m(foo"), Err(MalformedArguments));
        assert_eq!(parse_invocation("m(foo) bar"), Err(MalformedArguments));
    }

    #[test]
    fn test_parameters_with_defaults() {
        let (params, variadic) = parse_parameters("$a: 1, $b: 2, $c");
        assert!(!variadic);
        assert_eq!(
            params,
            vec![
                Parameter::new("a", "1"),
                Parameter::new("b", "2"),
                Parameter::new("c", ""),
            ]
        );
    }

    #[test]
    fn test_variadic_marker_is_removed() {
        let (params, variadic) = parse_parameters("$rest...");
        assert!(variadic);
        assert_eq!(params, vec![Parameter::new("rest", "")]);
    }

    #[test]
    fn test_default_keeps_everything_after_first_colon() {
        let (params, _) = parse_parameters("$bg: url(http://x/a.png)");
        assert_eq!(params, vec![Parameter::new("bg", "url(http://x/a.png)")]);
    }

    #[test]
    fn test_arguments_positional_and_keyed() {
        let args = parse_arguments("5, $b: 9, url(http://x)");
        assert_eq!(
            args,
            vec![
                Argument::positional("5"),
                Argument::keyed("b", "9"),
                Argument::positional("url(http://x)"),
            ]
        );
    }

    #[test]
    fn test_commas_inside_parentheses_do_not_split() {
        assert_eq!(
            split_top_level("rgba(0, 0, 0, .5), 'a, b', 1px"),
            vec!["rgba(0, 0, 0, .5)", "'a, b'", "1px"]
        );
    }

    #[test]
    fn test_blank_entries_are_dropped() {
        assert!(split_top_level("  ").is_empty());
        assert_eq!(split_top_level("a, , b"), vec!["a", "b"]);
    }
}
