//! The codegraft command-line interface.
//!
//! Each subcommand builds one transform, runs it through a single
//! parse→edit→print cycle, and either prints the result or rewrites the
//! file in place.

use std::path::Path;
use std::{fs, process};

use clap::Parser;

use crate::cli::args::{
    Command, FormatArgs, GraftArgs, LocationArg, NewlineArg, PolicyArg,
};
use crate::edit::{
    AddCodeBlock, AddConfigProperty, AddImport, AddRegistrationCall, ConstructorRef,
    DuplicatePolicy, NewlinePolicy, Placement, RemoveImport, SearchAnchor, SpecifierRequest,
};
use crate::errors::{io_error, print_error, GraftError, SourceContext};
use crate::logger::Logger;
use crate::runner::{run_transformation, ErrorPolicy, FileInfo, Pipeline, RunOptions, Transform};
use crate::syntax::printer::FormatOptions;
use crate::syntax::{parser, Exported, QuoteStyle};

pub mod args;

/// The main entry point for the CLI.
pub fn run() {
    let args = GraftArgs::parse();

    let options = RunOptions {
        error_policy: if args.strict {
            ErrorPolicy::Propagate
        } else {
            ErrorPolicy::Continue
        },
        format: to_format_options(&args.format),
        logger: Logger::new(args.verbose),
    };

    let result = dispatch(args.command, &options, args.write);

    if let Err(error) = result {
        print_error(error);
        process::exit(1);
    }
}

fn dispatch(command: Command, options: &RunOptions, write: bool) -> Result<(), GraftError> {
    match command {
        Command::AddImport {
            file,
            source,
            specifiers,
            comment,
        } => {
            let transform = AddImport {
                source,
                specifiers: parse_specifiers(&specifiers)?,
                comment,
            };
            transform_file(&file, &transform, options, write)
        }
        Command::RemoveImport {
            file,
            source,
            specifiers,
            keep_source,
        } => {
            let transform = RemoveImport {
                source,
                specifiers: parse_specifiers(&specifiers)?,
                keep_source_for_side_effects: keep_source,
            };
            transform_file(&file, &transform, options, write)
        }
        Command::AddBlock {
            file,
            title,
            code,
            search,
            location,
            ignore,
            newline,
        } => {
            let transform = AddCodeBlock {
                title,
                code,
                search: search.map(SearchAnchor::Code),
                location: match location {
                    LocationArg::Before => Placement::Before,
                    LocationArg::After => Placement::After,
                },
                ignore: match ignore {
                    PolicyArg::Strict => DuplicatePolicy::Strict,
                    PolicyArg::Selective => DuplicatePolicy::Selective,
                    PolicyArg::Never => DuplicatePolicy::Never,
                },
                newline: newline.map(|n| match n {
                    NewlineArg::Before => NewlinePolicy::Before,
                    NewlineArg::After => NewlinePolicy::After,
                    NewlineArg::Both => NewlinePolicy::Both,
                }),
            };
            transform_file(&file, &transform, options, write)
        }
        Command::RegisterCall {
            file,
            receiver,
            method,
            argument,
            extra_args,
            comment,
        } => {
            let transform = AddRegistrationCall {
                receiver,
                method,
                argument,
                extra_args,
                comment,
            };
            transform_file(&file, &transform, options, write)
        }
        Command::SetOption {
            file,
            key,
            value,
            constructor,
            from_module,
            comment,
        } => {
            let constructor = match (constructor, from_module) {
                (Some(name), _) => ConstructorRef::Ident(name),
                (None, Some(source)) => ConstructorRef::DefaultImportOf(source),
                (None, None) => {
                    eprintln!("Error: set-option requires --constructor or --from-module.");
                    process::exit(2);
                }
            };
            let transform = AddConfigProperty {
                constructor,
                key,
                value,
                comment,
            };
            transform_file(&file, &transform, options, write)
        }
        Command::Ast { file } => handle_ast(&file),
        Command::Format { file } => {
            // An empty pipeline is a pure parse→print cycle.
            let identity = Pipeline {
                transforms: Vec::new(),
            };
            transform_file(&file, &identity, options, write)
        }
    }
}

/// Run one transform against a file and emit the result.
fn transform_file(
    path: &Path,
    transform: &dyn Transform,
    options: &RunOptions,
    write: bool,
) -> Result<(), GraftError> {
    let source = fs::read_to_string(path).map_err(|e| io_error(path, &e))?;
    let name = path.display().to_string();
    let file = FileInfo {
        path: &name,
        source: &source,
    };

    let output = run_transformation(&file, transform, options)?;

    if write {
        fs::write(path, output).map_err(|e| io_error(path, &e))?;
    } else {
        print!("{}", output);
    }
    Ok(())
}

/// Handles the `ast` subcommand.
fn handle_ast(path: &Path) -> Result<(), GraftError> {
    let source = fs::read_to_string(path).map_err(|e| io_error(path, &e))?;
    let context = SourceContext::from_file(path.display().to_string(), source.clone());
    let module = parser::parse(&source, &context)?;

    let json = serde_json::to_string_pretty(&module)
        .map_err(|e| io_error(path, &std::io::Error::other(e)))?;
    println!("{}", json);
    Ok(())
}

fn to_format_options(args: &FormatArgs) -> FormatOptions {
    FormatOptions {
        indent_width: args.indent_width,
        use_tabs: args.tabs,
        quote: if args.double_quotes {
            QuoteStyle::Double
        } else {
            QuoteStyle::Single
        },
        trailing_comma: !args.no_trailing_comma,
        max_width: args.max_width,
    }
}

/// Parse `EXPORTED[:LOCAL]` binding descriptors. `default` and `*` need an
/// explicit local name; a named export defaults its local to itself.
fn parse_specifiers(raw: &[String]) -> Result<Vec<SpecifierRequest>, GraftError> {
    raw.iter().map(|s| parse_specifier(s)).collect()
}

fn parse_specifier(raw: &str) -> Result<SpecifierRequest, GraftError> {
    let (exported, local) = match raw.split_once(':') {
        Some((exported, local)) => (exported.trim(), Some(local.trim())),
        None => (raw.trim(), None),
    };

    let exported = match exported {
        "default" => Exported::Default,
        "*" => Exported::Namespace,
        name => Exported::Named(name.to_string()),
    };

    let local = match (&exported, local) {
        (_, Some(local)) if !local.is_empty() => local.to_string(),
        (Exported::Named(name), None) => name.clone(),
        _ => {
            eprintln!(
                "Error: binding '{}' needs an explicit local name ('{}:<local>').",
                raw, raw
            );
            process::exit(2);
        }
    };

    Ok(SpecifierRequest { exported, local })
}
