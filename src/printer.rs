//! Canonical printer for the Cool AST dump format.
//!
//! Output is driven by the same per-variant schema the parser reads, so for
//! canonical input `print(parse(text)) == text` byte for byte. Layout rules,
//! with `u` the configured indent unit and `d` the node's depth:
//!
//! - `#<line>` and the variant keyword at `d * u` spaces;
//! - every field one level deeper, child nodes recursively;
//! - parenthesized sequences (class features, dispatch actuals) put `(` and `)`
//!   on their own lines at the field's depth;
//! - expressions close with `: <Type>` (or `: _no_type`) back at depth `d`.
//!
//! Integer constants print exactly as they were spelled. String constants are
//! stored decoded and re-escaped on output, so a string written with a raw tab
//! or an escaped line break comes back as `\t` or `\n`. Byte-exact round trips
//! therefore hold for canonical string spellings.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::{Field, NodeRef};

/// Printer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    /// Spaces per nesting level. `1` matches the dump format; `2` matches the
    /// reference compiler's own dumps.
    pub indent_width: usize,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self { indent_width: 1 }
    }
}

/// Renders `node` in canonical form with the default indent unit.
pub fn print<'a>(node: impl Into<NodeRef<'a>>) -> String {
    print_with(&PrintConfig::default(), node)
}

pub fn print_with<'a>(config: &PrintConfig, node: impl Into<NodeRef<'a>>) -> String {
    let mut printer = Printer::new(*config);
    printer.node(node.into(), 0);
    debug!(bytes = printer.out.len(), "print completed");
    printer.finish()
}

/// Renders each node at depth zero and concatenates the results.
pub fn print_sequence<'a, I>(config: &PrintConfig, nodes: I) -> String
where
    I: IntoIterator,
    I::Item: Into<NodeRef<'a>>,
{
    let mut printer = Printer::new(*config);
    for node in nodes {
        printer.node(node.into(), 0);
    }
    printer.finish()
}

/// Re-escapes string contents for a quoted field.
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            other => out.push(other),
        }
    }
    out
}

struct Printer {
    config: PrintConfig,
    out: String,
}

impl Printer {
    fn new(config: PrintConfig) -> Self {
        Self {
            config,
            out: String::new(),
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, depth: usize, text: &str) {
        let width = depth * self.config.indent_width;
        self.out.extend(std::iter::repeat(' ').take(width));
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn node(&mut self, node: NodeRef<'_>, depth: usize) {
        self.line(depth, &format!("#{}", node.line()));
        self.line(depth, node.kind().keyword());

        let inner = depth + 1;
        for (spec, field) in node.fields() {
            match field {
                Field::Symbol(symbol) => self.line(inner, symbol),
                Field::Integer(value) => self.line(inner, value.as_str()),
                Field::Boolean(value) => self.line(inner, if value { "1" } else { "0" }),
                Field::String(value) => {
                    self.line(inner, &format!("\"{}\"", escape_string(value)))
                }
                Field::Node(child) => self.node(child, inner),
                Field::Nodes(children) => {
                    let parenthesized = spec.shape.is_parenthesized();
                    if parenthesized {
                        self.line(inner, "(");
                    }
                    for child in children {
                        self.node(child, inner);
                    }
                    if parenthesized {
                        self.line(inner, ")");
                    }
                }
            }
        }

        if let Some(ty) = node.static_type() {
            self.line(depth, &format!(": {ty}"));
        }
    }
}
