//! Handles all user-facing output for the CLI.
//!
//! Errors are rendered as `miette` reports on stderr; round-trip mismatches as
//! colored line diffs. Machine-readable output (printed dumps, JSON) goes to
//! stdout.

use std::io::{self, Write};

use difference::{Changeset, Difference};
use miette::Report;
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::diagnostics::{CoolAstError, Result};

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Renders an error as a `miette` report on stderr.
pub fn print_error(error: CoolAstError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}

pub fn color_choice(use_colors: bool) -> ColorChoice {
    if use_colors {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Writes a line diff from `expected` to `actual`.
pub fn write_diff(out: &mut impl WriteColor, expected: &str, actual: &str) -> io::Result<()> {
    let changeset = Changeset::new(expected, actual, "\n");
    for diff in &changeset.diffs {
        match diff {
            Difference::Same(text) => {
                out.reset()?;
                write_prefixed(out, ' ', text)?;
            }
            Difference::Add(text) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                write_prefixed(out, '+', text)?;
            }
            Difference::Rem(text) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                write_prefixed(out, '-', text)?;
            }
        }
    }
    out.reset()
}

/// Prints a mismatch header and diff for `path` to stderr.
pub fn print_mismatch(path: &str, expected: &str, actual: &str, use_colors: bool) -> Result<()> {
    let mut stderr = StandardStream::stderr(color_choice(use_colors));
    let written = (|| -> io::Result<()> {
        stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(stderr, "MISMATCH")?;
        stderr.reset()?;
        writeln!(stderr, ": {path}")?;
        write_diff(&mut stderr, expected, actual)
    })();
    written.map_err(|e| crate::diagnostics::io_error("<stderr>", e))
}

/// Writes `value` as pretty JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CoolAstError::Io {
        message: format!("failed to serialize AST: {e}"),
        source: None,
    })?;
    println!("{json}");
    Ok(())
}

/// Writes already-rendered text to stdout without adding a newline.
pub fn print_raw(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| crate::diagnostics::io_error("<stdout>", e))
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn write_prefixed(out: &mut impl WriteColor, prefix: char, text: &str) -> io::Result<()> {
    for line in text.split('\n') {
        writeln!(out, "{prefix}{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::NoColor;

    #[test]
    fn test_diff_marks_changed_lines() {
        let mut out = NoColor::new(Vec::new());
        write_diff(&mut out, "a\nb\nc", "a\nx\nc").unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("-b"));
        assert!(text.contains("+x"));
        assert!(text.contains(" a"));
    }
}
