// Output writer: pretty JSON to the terminal (colorized) or to a file.

use std::fmt::Write as _;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

const INDENT: &str = "    ";

/// Where command results go.
#[derive(Debug, Clone)]
pub struct Output {
    path: Option<PathBuf>,
    color: bool,
}

impl Output {
    /// Color is used only for a terminal stdout with `NO_COLOR` unset.
    pub fn new(path: Option<PathBuf>) -> Self {
        let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Output { path, color }
    }

    /// Serialize `value` and write it to the configured destination.
    pub fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        match &self.path {
            Some(path) => {
                let mut text = to_pretty(value)?;
                text.push('\n');
                std::fs::write(path, text)
                    .with_context(|| format!("Failed to write output to {}", path.display()))
            }
            None => {
                let text = if self.color {
                    let value = serde_json::to_value(value).context("Serializing response")?;
                    colorize(&value)
                } else {
                    to_pretty(value)?
                };
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                writeln!(out, "{text}").context("Failed to write to stdout")
            }
        }
    }

    /// Raw text (metrics exposition) written verbatim.
    pub fn text(&self, text: &str) -> Result<()> {
        match &self.path {
            Some(path) => std::fs::write(path, text)
                .with_context(|| format!("Failed to write output to {}", path.display())),
            None => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                out.write_all(text.as_bytes())
                    .and_then(|()| out.flush())
                    .context("Failed to write to stdout")
            }
        }
    }

    /// Plain status line such as `entry 4 successfully deleted`.
    pub fn message(&self, text: &str) {
        println!("{text}");
    }
}

/// JSON indented by four spaces, no color.
pub fn to_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(INDENT.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).context("Serializing response")?;
    String::from_utf8(buf).context("Response JSON is not valid UTF-8")
}

/// Same layout as [`to_pretty`], with ANSI colors on keys and scalars.
pub fn colorize(value: &Value) -> String {
    let mut out = String::new();
    render(value, 0, &mut out);
    out
}

fn render(value: &Value, depth: usize, out: &mut String) {
    match value {
        Value::Null => {
            let _ = write!(out, "{}", "null".dark_grey());
        }
        Value::Bool(b) => {
            let _ = write!(out, "{}", b.to_string().yellow());
        }
        Value::Number(n) => {
            let _ = write!(out, "{}", n.to_string().cyan());
        }
        Value::String(s) => {
            let _ = write!(out, "{}", quote(s).green());
        }
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                push_indent(out, depth + 1);
                render(item, depth + 1, out);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push(']');
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            for (i, (key, item)) in map.iter().enumerate() {
                push_indent(out, depth + 1);
                let _ = write!(out, "{}: ", quote(key).blue().bold());
                render(item, depth + 1, out);
                if i + 1 < map.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push('}');
        }
    }
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' {
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn pretty_uses_four_space_indent() {
        let text = to_pretty(&json!({ "id": 1, "tags": ["a"] })).unwrap();
        assert_eq!(text, "{\n    \"id\": 1,\n    \"tags\": [\n        \"a\"\n    ]\n}");
    }

    #[test]
    fn colorized_layout_matches_plain_layout() {
        let value = json!({
            "name": "Lobby \"main\"",
            "is_active": true,
            "min_facesize": 40,
            "parent": null,
            "spaces": [],
            "meta": {},
            "nested": { "ids": [1, 2] }
        });
        let colored = colorize(&value);
        assert!(colored.contains('\u{1b}'));
        assert_eq!(strip_ansi(&colored), to_pretty(&value).unwrap());
    }

    #[test]
    fn file_output_is_uncolored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let output = Output {
            path: Some(path.clone()),
            color: true,
        };
        output.write(&json!({ "ok": true })).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n    \"ok\": true\n}\n");
    }
}
