//! Round-trip test harness for YAML suites.
//!
//! Each suite file holds a list of cases. A case feeds its `input` through
//! `parse` and `print` and passes when the printed text equals `expected`
//! (or the input itself, when `expected` is absent). Error cases instead name
//! the error class and/or a message substring the parse must fail with.
//!
//! # Test Format
//!
//! ```yaml
//! - name: "empty class"
//!   input: |
//!     #1
//!     _program
//!      #1
//!      _class
//!       Main
//!       Object
//!       "main.cl"
//!       (
//!       )
//! - name: "class with parenthesized name"
//!   input: "#1 _class (A) ()"
//!   expect_error_type: Syntax       # error class, see `ErrorType::as_str`
//!   expect_error: "line 1"          # substring of the error message
//! - name: "not ready yet"
//!   input: "..."
//!   skip: true
//! ```
//!
//! # Public API
//!
//! - [`discover_yaml_files`] finds suite files under a directory tree.
//! - [`load_test_cases`] reads one suite.
//! - [`run_test_case`] runs one case.
//! - [`run_all_tests`] runs every suite under the configured root and reports.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use termcolor::{Color, ColorSpec, StandardStream, WriteColor};
use tracing::debug;
use walkdir::WalkDir;

use crate::cli::output::{color_choice, write_diff};
use crate::diagnostics::{io_error, CoolAstError, Result};
use crate::printer::{print_with, PrintConfig};
use crate::syntax::parser::parse_named;

// =============================================================================
// CORE TYPES
// =============================================================================

/// One YAML test case.
#[derive(Debug, Deserialize, Clone)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    /// Printed form to expect when the input is not already canonical.
    #[serde(default)]
    pub expected: Option<String>,
    /// Substring the error message must contain.
    #[serde(default)]
    pub expect_error: Option<String>,
    /// Error class the parse must fail with, e.g. `Syntax` or `Lexical`.
    #[serde(default)]
    pub expect_error_type: Option<String>,
    #[serde(default)]
    pub skip: bool,
}

impl TestCase {
    pub fn expects_error(&self) -> bool {
        self.expect_error.is_some() || self.expect_error_type.is_some()
    }
}

/// Outcome of a single case.
#[derive(Debug, Clone, PartialEq)]
pub enum TestResult {
    Pass {
        file: String,
        name: String,
    },
    Fail {
        file: String,
        name: String,
        error: String,
        /// Expected and actual printed text, for a round-trip mismatch.
        diff: Option<(String, String)>,
    },
    Skipped {
        file: String,
        name: String,
        reason: String,
    },
}

/// Configuration for suite discovery, execution and reporting.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub suite_root: PathBuf,
    pub use_colors: bool,
    pub print: PrintConfig,
    /// Only run cases whose name contains this substring (case-insensitive).
    pub filter: Option<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            suite_root: PathBuf::from("tests/suites"),
            use_colors: atty::is(atty::Stream::Stderr),
            print: PrintConfig::default(),
            filter: None,
        }
    }
}

/// Results of a full run.
#[derive(Debug, Clone, Default)]
pub struct HarnessReport {
    pub results: Vec<TestResult>,
}

impl HarnessReport {
    pub fn passed(&self) -> usize {
        self.count(|r| matches!(r, TestResult::Pass { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|r| matches!(r, TestResult::Fail { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, TestResult::Skipped { .. }))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&TestResult) -> bool) -> usize {
        self.results.iter().filter(|r| pred(r)).count()
    }
}

// =============================================================================
// TEST DISCOVERY AND LOADING
// =============================================================================

/// Every `.yaml`/`.yml` file under `root`, in a stable order.
pub fn discover_yaml_files<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

pub fn load_test_cases(path: &Path) -> Result<Vec<TestCase>> {
    let content = fs::read_to_string(path).map_err(|e| io_error(path.display(), e))?;
    serde_yaml::from_str(&content).map_err(|e| CoolAstError::Io {
        message: format!("invalid test suite '{}': {e}", path.display()),
        source: None,
    })
}

pub fn skip_reason(case: &TestCase, filter: Option<&str>) -> Option<String> {
    if case.skip {
        return Some("Marked 'skip'".to_string());
    }
    let filter = filter?;
    if !case.name.to_lowercase().contains(&filter.to_lowercase()) {
        return Some(format!("Filtered out by substring: {filter}"));
    }
    None
}

// =============================================================================
// EXECUTION
// =============================================================================

/// Parses and re-prints one case.
pub fn run_test_case(file: &str, case: &TestCase, print: &PrintConfig) -> TestResult {
    let fail = |error: String, diff: Option<(String, String)>| TestResult::Fail {
        file: file.to_string(),
        name: case.name.clone(),
        error,
        diff,
    };
    let pass = || TestResult::Pass {
        file: file.to_string(),
        name: case.name.clone(),
    };

    match parse_named(&case.input, &case.name) {
        Ok(_) if case.expects_error() => fail(
            format!(
                "Expected an error ({}) but the input parsed",
                describe_expected_error(case)
            ),
            None,
        ),
        Ok(program) => {
            let actual = print_with(print, &program);
            let expected = case.expected.as_deref().unwrap_or(&case.input);
            if actual == expected {
                pass()
            } else {
                fail(
                    "Printed output did not match".to_string(),
                    Some((expected.to_string(), actual)),
                )
            }
        }
        Err(err) if error_matches(&err, case) => pass(),
        Err(err) => fail(format!("{} error: {err}", err.error_type()), None),
    }
}

fn error_matches(err: &CoolAstError, case: &TestCase) -> bool {
    if !case.expects_error() {
        return false;
    }
    let type_ok = case
        .expect_error_type
        .as_deref()
        .map_or(true, |ty| err.error_type().as_str().eq_ignore_ascii_case(ty));
    let message_ok = case
        .expect_error
        .as_deref()
        .map_or(true, |needle| err.to_string().contains(needle));
    type_ok && message_ok
}

fn describe_expected_error(case: &TestCase) -> String {
    match (&case.expect_error_type, &case.expect_error) {
        (Some(ty), Some(msg)) => format!("{ty} containing '{msg}'"),
        (Some(ty), None) => ty.clone(),
        (None, Some(msg)) => format!("containing '{msg}'"),
        (None, None) => String::new(),
    }
}

/// Runs every case of every suite under `config.suite_root`.
pub fn collect_results(config: &HarnessConfig) -> Result<HarnessReport> {
    let files = discover_yaml_files(&config.suite_root);
    debug!(root = %config.suite_root.display(), suites = files.len(), "discovered suites");

    let mut report = HarnessReport::default();
    for path in &files {
        let file = path.display().to_string();
        for case in load_test_cases(path)? {
            let result = match skip_reason(&case, config.filter.as_deref()) {
                Some(reason) => TestResult::Skipped {
                    file: file.clone(),
                    name: case.name,
                    reason,
                },
                None => run_test_case(&file, &case, &config.print),
            };
            report.results.push(result);
        }
    }
    Ok(report)
}

/// Runs every suite and prints a colored report to stderr.
pub fn run_all_tests(config: &HarnessConfig) -> Result<HarnessReport> {
    let report = collect_results(config)?;
    let mut out = StandardStream::stderr(color_choice(config.use_colors));
    report_results(&mut out, &report).map_err(|e| io_error("<stderr>", e))?;
    Ok(report)
}

// =============================================================================
// REPORTING
// =============================================================================

pub fn report_results(out: &mut impl WriteColor, report: &HarnessReport) -> std::io::Result<()> {
    for result in &report.results {
        match result {
            TestResult::Pass { file, name } => {
                status(out, "PASS", Color::Green)?;
                writeln!(out, ": {name} [{file}]")?;
            }
            TestResult::Fail {
                file,
                name,
                error,
                diff,
            } => {
                status(out, "FAIL", Color::Red)?;
                writeln!(out, ": {name} [{file}]")?;
                writeln!(out, "  Error: {error}")?;
                if let Some((expected, actual)) = diff {
                    write_diff(out, expected, actual)?;
                }
            }
            TestResult::Skipped { file, name, reason } => {
                status(out, "SKIP", Color::Yellow)?;
                writeln!(out, ": {name} [{file}] ({reason})")?;
            }
        }
    }

    writeln!(
        out,
        "\nTest summary: total {}, passed {}, failed {}, skipped {}",
        report.results.len(),
        report.passed(),
        report.failed(),
        report.skipped()
    )
}

fn status(out: &mut impl WriteColor, label: &str, color: Color) -> std::io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{label}")?;
    out.reset()
}
