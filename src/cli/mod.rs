//! The coolast command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::Parser;
use tracing::{debug, Level};
use walkdir::WalkDir;

use crate::cli::args::{Command, CoolAstArgs};
use crate::cli::output::{print_error, print_json, print_mismatch, print_raw};
use crate::diagnostics::{io_error, Result};
use crate::printer::{print_with, PrintConfig};
use crate::syntax::parser::parse_named;
use crate::test_harness::{run_all_tests, HarnessConfig};

pub mod args;
pub mod output;

const STDIN_PATH: &str = "-";
const DUMP_EXTENSION: &str = "ast";

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    let args = CoolAstArgs::parse();
    init_logging(args.verbose);
    let use_colors = !args.no_color && atty::is(atty::Stream::Stderr);

    let result = match args.command {
        Command::Print { file, indent } => handle_print(&file, indent),
        Command::Ast { file, json } => handle_ast(&file, json),
        Command::Check { paths, indent } => handle_check(&paths, indent, use_colors),
        Command::Test { path, filter } => handle_test(path, filter, use_colors),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            print_error(e);
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. Warnings only unless `-v` is given.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn handle_print(file: &Path, indent: usize) -> Result<bool> {
    let (name, source) = read_input(file)?;
    let program = parse_named(&source, &name)?;
    let config = PrintConfig {
        indent_width: indent,
    };
    print_raw(&print_with(&config, &program))?;
    Ok(true)
}

fn handle_ast(file: &Path, json: bool) -> Result<bool> {
    let (name, source) = read_input(file)?;
    let program = parse_named(&source, &name)?;
    if json {
        print_json(&program)?;
    } else {
        println!("{program:#?}");
    }
    Ok(true)
}

fn handle_check(paths: &[PathBuf], indent: usize, use_colors: bool) -> Result<bool> {
    let config = PrintConfig {
        indent_width: indent,
    };
    let files = collect_dump_files(paths);
    let mut failed = 0;

    for path in &files {
        let name = path.display().to_string();
        let source = fs::read_to_string(path).map_err(|e| io_error(&name, e))?;
        debug!(file = %name, "checking round trip");
        match parse_named(&source, &name) {
            Ok(program) => {
                let printed = print_with(&config, &program);
                if printed != source {
                    failed += 1;
                    print_mismatch(&name, &source, &printed, use_colors)?;
                }
            }
            Err(e) => {
                failed += 1;
                print_error(e);
            }
        }
    }

    eprintln!("checked {} file(s), {failed} failed", files.len());
    Ok(failed == 0)
}

fn handle_test(path: PathBuf, filter: Option<String>, use_colors: bool) -> Result<bool> {
    let config = HarnessConfig {
        suite_root: path,
        use_colors,
        filter,
        ..HarnessConfig::default()
    };
    let report = run_all_tests(&config)?;
    Ok(report.is_success())
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Reads a dump from `path`, or from stdin for `-`. Returns the display name
/// used in diagnostics together with the text.
fn read_input(path: &Path) -> Result<(String, String)> {
    if path.as_os_str() == STDIN_PATH {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .map_err(|e| io_error("<stdin>", e))?;
        return Ok(("<stdin>".to_string(), source));
    }
    let name = path.display().to_string();
    let source = fs::read_to_string(path).map_err(|e| io_error(&name, e))?;
    Ok((name, source))
}

/// Expands directories into the `*.ast` files below them, keeping plain files.
fn collect_dump_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_type().is_file()
                    && e.path().extension().is_some_and(|ext| ext == DUMP_EXTENSION)
            })
            .map(|e| e.into_path())
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}
