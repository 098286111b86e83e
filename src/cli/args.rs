//! Defines the command-line arguments and subcommands for the coolast CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "coolast",
    version,
    about = "Parse, re-print and check the Cool compiler's textual AST dumps."
)]
pub struct CoolAstArgs {
    /// Raise log verbosity: -v for debug, -vv for trace.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a dump and print it back in canonical form.
    Print {
        /// The dump to read, or `-` for stdin.
        #[arg(default_value = "-")]
        file: PathBuf,
        /// Spaces per nesting level.
        #[arg(long, default_value_t = 1)]
        indent: usize,
    },
    /// Show the parsed tree.
    Ast {
        /// The dump to read, or `-` for stdin.
        #[arg(default_value = "-")]
        file: PathBuf,
        /// Emit JSON instead of the debug representation.
        #[arg(long)]
        json: bool,
    },
    /// Verify that dumps survive a parse/print round trip unchanged.
    Check {
        /// Files, or directories searched for `*.ast` files.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Spaces per nesting level the dumps were written with.
        #[arg(long, default_value_t = 1)]
        indent: usize,
    },
    /// Discover and run the YAML round-trip suites in a directory.
    Test {
        /// The directory containing `*.yaml` suites.
        #[arg(default_value = "tests/suites")]
        path: PathBuf,
        /// Only run cases whose name contains this substring.
        #[arg(long)]
        filter: Option<String>,
    },
}
