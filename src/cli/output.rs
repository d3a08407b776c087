//! Handles all user-facing output for the CLI.

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::mixins::{ExpansionStep, MixinRegistry};

/// Prints the starting document, then each expansion step as a coloured
/// line diff against the previous one.
pub fn print_trace(initial: &str, trace: &[ExpansionStep]) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    print_header(&mut stdout, "--- Initial ---");
    print!("{initial}");
    println!();

    let mut previous = initial;
    for (i, step) in trace.iter().enumerate() {
        print_header(
            &mut stdout,
            &format!(
                "--- Step {}: {} ({}, depth {}) ---",
                i + 1,
                step.mixin_name,
                step.kind,
                step.depth
            ),
        );
        let changeset = Changeset::new(previous, &step.snapshot, "\n");
        print_diff(&mut stdout, &changeset.diffs);
        previous = &step.snapshot;
        println!();
    }
}

/// Prints one line per registered mixin: kind and signature.
pub fn print_listing(registry: &MixinRegistry) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for name in registry.names() {
        let Some(definition) = registry.lookup(name) else {
            continue;
        };
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
        print!("{:<9}", definition.kind.label());
        let _ = stdout.reset();
        println!("{}", definition.signature());
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_header(stdout: &mut StandardStream, text: &str) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    println!("{text}");
    let _ = stdout.reset();
}

fn print_diff(stdout: &mut StandardStream, diffs: &[Difference]) {
    for diff in diffs {
        match diff {
            Difference::Same(x) => {
                let _ = stdout.reset();
                println!(" {}", x);
            }
            Difference::Add(x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                println!("+{}", x);
            }
            Difference::Rem(x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                println!("-{}", x);
            }
        }
    }
    let _ = stdout.reset();
}
