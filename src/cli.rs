//! The `sassy` command-line interface.
//!
//! Parses arguments, installs logging and dispatches to one handler per
//! subcommand. Errors are rendered as miette reports and exit with status 1.

use std::{fs, process};

use clap::Parser;
use miette::{IntoDiagnostic, Report, WrapErr};
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Command, InputArgs, SassyArgs};
use crate::config::MixinOptions;
use crate::engine::Pipeline;
use crate::errors::SourceContext;
use crate::mixins::expand_includes;
use crate::syntax::{parse, stringify};

pub mod args;
pub mod output;

/// Environment variable holding the log filter; `RUST_LOG` is the fallback.
pub const LOG_ENV: &str = "SASSY_LOG";

/// The main entry point for the CLI.
pub fn run() {
    init_tracing();
    let args = SassyArgs::parse();

    let result = match args.command {
        Command::Expand { input, output } => handle_expand(&input, output.as_deref()),
        Command::Trace { input } => handle_trace(&input),
        Command::List { input } => handle_list(&input),
    };

    if let Err(report) = result {
        eprintln!("{report:?}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Merges the options file, if any, with flags given on the command line.
fn build_options(input: &InputArgs) -> Result<MixinOptions, Report> {
    let mut options = match &input.config {
        Some(path) => MixinOptions::from_path(path)?,
        None => MixinOptions::default(),
    };
    options.mixins_dir.extend(input.mixins_dir.iter().cloned());
    options.mixins_files.extend(input.mixins_files.iter().cloned());
    options.silent |= input.silent;
    if input.no_depth_limit {
        options.max_depth = None;
    } else if let Some(limit) = input.max_depth {
        options.max_depth = Some(limit);
    }
    Ok(options)
}

fn read_input(input: &InputArgs) -> Result<(String, String), Report> {
    let text = fs::read_to_string(&input.file)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot read {}", input.file.display()))?;
    Ok((input.file.display().to_string(), text))
}

/// Handles the `expand` subcommand.
fn handle_expand(input: &InputArgs, output: Option<&std::path::Path>) -> Result<(), Report> {
    let (name, text) = read_input(input)?;
    let pipeline = Pipeline::new(build_options(input)?);
    let result = pipeline.process_source(&text, &name)?;

    match output {
        Some(path) => fs::write(path, &result.css)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot write {}", path.display()))?,
        None => print!("{}", result.css),
    }
    Ok(())
}

/// Handles the `trace` subcommand.
fn handle_trace(input: &InputArgs) -> Result<(), Report> {
    let (name, text) = read_input(input)?;
    let pipeline = Pipeline::new(build_options(input)?);

    let mut tree = parse(&text, SourceContext::from_file(name, text.as_str()))?;
    let registry = pipeline.build_registry(&mut tree)?;
    let root = tree.root();
    let initial = stringify(&tree, root);
    let report = expand_includes(&mut tree, root, &registry, &pipeline.options().expand_options(true))?;

    output::print_trace(&initial, &report.trace);
    Ok(())
}

/// Handles the `list` subcommand.
fn handle_list(input: &InputArgs) -> Result<(), Report> {
    let (name, text) = read_input(input)?;
    let pipeline = Pipeline::new(build_options(input)?);

    let mut tree = parse(&text, SourceContext::from_file(name, text.as_str()))?;
    let registry = pipeline.build_registry(&mut tree)?;
    output::print_listing(&registry);
    Ok(())
}
