//! Reply formatter
//!
//! Renders every reply shape into the classic redis-cli textual form.
//! Nested lists use a recursive, depth-aware renderer parameterized by
//! the current indent and the index path carried down from enclosing
//! lists; values nested two levels or deeper are quoted.

use crate::reply::Reply;
use std::fmt;

const INDENT_STEP: usize = 3;

/// Formatted reply: a single line or an ordered sequence of lines.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Line(String),
    Lines(Vec<String>),
}

impl Rendered {
    pub fn into_lines(self) -> Vec<String> {
        match self {
            Rendered::Line(line) => vec![line],
            Rendered::Lines(lines) => lines,
        }
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendered::Line(line) => write!(f, "{}", line),
            Rendered::Lines(lines) => write!(f, "{}", lines.join("\n")),
        }
    }
}

/// Format a reply. Pure: the same reply always renders identically.
pub fn format_reply(reply: &Reply) -> Rendered {
    match reply {
        Reply::Nil => Rendered::Line("(nil)".to_string()),
        Reply::Int(i) => Rendered::Line(format!("(integer) {}", i)),
        Reply::Text(s) => Rendered::Line(s.clone()),
        Reply::List(items) => {
            let mut out = Vec::new();
            walk(items, 0, "", 0, &mut out);
            Rendered::Lines(out)
        }
        Reply::Map(entries) => {
            let flattened = flatten_map(entries);
            let out = flattened
                .iter()
                .enumerate()
                .map(|(i, entry)| format!("{}) \"{}\"", i + 1, scalar_text(entry)))
                .collect();
            Rendered::Lines(out)
        }
    }
}

/// Scalar cell text used inside list renderings.
fn scalar_text(reply: &Reply) -> String {
    match reply {
        Reply::Nil => "(nil)".to_string(),
        Reply::Int(i) => i.to_string(),
        Reply::Text(s) => s.clone(),
        // walk() recurses before reaching here
        Reply::List(_) | Reply::Map(_) => String::new(),
    }
}

fn flatten_map(entries: &[(String, Reply)]) -> Vec<Reply> {
    let mut flattened = Vec::with_capacity(entries.len() * 2);
    for (key, value) in entries {
        flattened.push(Reply::Text(key.clone()));
        flattened.push(value.clone());
    }
    flattened
}

/// Recursive list renderer.
///
/// `carried` is the index path inherited from enclosing lists; it applies
/// only to the first element of this list. Subsequent elements of a
/// carried list drop one indent level deeper.
fn walk(items: &[Reply], indent: usize, carried: &str, depth: usize, out: &mut Vec<String>) {
    for (pos, item) in items.iter().enumerate() {
        let (pad, lead) = if pos == 0 || carried.is_empty() {
            (indent, if pos == 0 { carried } else { "" })
        } else {
            (indent + INDENT_STEP, "")
        };

        match item {
            Reply::List(inner) => {
                let lead = format!("{}{}) ", lead, pos + 1);
                walk(inner, pad, &lead, depth + 1, out);
            }
            Reply::Map(entries) => {
                let flattened = flatten_map(entries);
                let lead = format!("{}{}) ", lead, pos + 1);
                walk(&flattened, pad, &lead, depth + 1, out);
            }
            scalar => {
                let cell = if depth >= 2 {
                    format!("\"{}\"", scalar_text(scalar))
                } else {
                    scalar_text(scalar)
                };
                out.push(format!("{:pad$}{}{}) {}", "", lead, pos + 1, cell, pad = pad));
            }
        }
    }
}
