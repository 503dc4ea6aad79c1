//! Defines the command-line arguments and subcommands for the codegraft CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "codegraft",
    version,
    about = "An idempotent structural editing engine for ES-module style sources."
)]
pub struct GraftArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Log every operation and its outcome to stderr.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Fail on recoverable errors instead of leaving the file unchanged.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Rewrite the file in place instead of printing to stdout.
    #[arg(long, global = true)]
    pub write: bool,

    #[command(flatten)]
    pub format: FormatArgs,
}

/// Output formatting options, mirrored onto the printer.
#[derive(Debug, Args)]
pub struct FormatArgs {
    /// Spaces per indent level.
    #[arg(long, global = true, default_value_t = 4)]
    pub indent_width: usize,

    /// Indent with tabs instead of spaces.
    #[arg(long, global = true)]
    pub tabs: bool,

    /// Prefer double quotes for string literals.
    #[arg(long, global = true)]
    pub double_quotes: bool,

    /// Omit trailing commas in wrapped lists.
    #[arg(long, global = true)]
    pub no_trailing_comma: bool,

    /// Maximum line width before wrapping.
    #[arg(long, global = true, default_value_t = 130)]
    pub max_width: usize,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add import bindings, merging into existing declarations.
    AddImport {
        /// The file to transform.
        #[arg(required = true)]
        file: PathBuf,
        /// The module source to import from.
        #[arg(required = true)]
        source: String,
        /// Bindings as EXPORTED[:LOCAL]; `default` and `*` are recognized.
        /// None means a side-effect-only import.
        #[arg(long = "bind", value_name = "EXPORTED[:LOCAL]")]
        specifiers: Vec<String>,
        /// Leading comment for a newly created declaration.
        #[arg(long)]
        comment: Option<String>,
    },
    /// Remove import bindings, pruning emptied declarations.
    RemoveImport {
        #[arg(required = true)]
        file: PathBuf,
        #[arg(required = true)]
        source: String,
        /// Bindings as EXPORTED[:LOCAL]. None means remove every
        /// declaration for the source.
        #[arg(long = "bind", value_name = "EXPORTED[:LOCAL]")]
        specifiers: Vec<String>,
        /// Keep a declaration alive for its load side effects.
        #[arg(long)]
        keep_source: bool,
    },
    /// Insert a titled block of statements.
    AddBlock {
        #[arg(required = true)]
        file: PathBuf,
        /// Title rendered as leading comments on the block.
        #[arg(long, required = true)]
        title: String,
        /// The statements to insert, as raw code.
        #[arg(long, required = true)]
        code: String,
        /// Anchor statements to search for, as raw code.
        #[arg(long)]
        search: Option<String>,
        /// Where the block lands relative to the anchor.
        #[arg(long, value_enum, default_value = "after")]
        location: LocationArg,
        /// Reaction to a block that is (partially) present already.
        #[arg(long, value_enum, default_value = "strict")]
        ignore: PolicyArg,
        /// Blank lines to splice around the block.
        #[arg(long, value_enum)]
        newline: Option<NewlineArg>,
    },
    /// Insert a `Receiver.method(Argument)` registration call.
    RegisterCall {
        #[arg(required = true)]
        file: PathBuf,
        #[arg(required = true)]
        receiver: String,
        #[arg(required = true)]
        method: String,
        #[arg(required = true)]
        argument: String,
        /// Further call arguments as raw expression code.
        #[arg(long = "with", value_name = "EXPR")]
        extra_args: Vec<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Add a property to a constructor's configuration object.
    SetOption {
        #[arg(required = true)]
        file: PathBuf,
        #[arg(required = true)]
        key: String,
        /// The property value as raw expression code.
        #[arg(required = true)]
        value: String,
        /// The constructed identifier, named directly.
        #[arg(long, conflicts_with = "from_module")]
        constructor: Option<String>,
        /// Resolve the constructor as the default import of this module.
        #[arg(long)]
        from_module: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Show the syntax tree for a file as JSON.
    Ast {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Pretty-print and normalize a file.
    Format {
        #[arg(required = true)]
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LocationArg {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    Strict,
    Selective,
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NewlineArg {
    Before,
    After,
    Both,
}
