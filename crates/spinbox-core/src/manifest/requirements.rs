//! `requirements.txt` as a structured document.
//!
//! Layout on output: the leading comment block, pip option lines, then one
//! entry per package sorted by normalized name. Comment and blank lines
//! directly above an entry travel with it; anything after the last entry
//! stays at the end. A line ending in `\` is joined with the lines that
//! follow it, so hash-pinned entries move as one unit and keep their layout.

use crate::error::{Result, SpinboxError};
use crate::manifest::{normalize_package_name, MergeOutcome};
use crate::resolve::ResolvedPackage;
use crate::types::Ecosystem;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

const DEFAULT_HEADER: &[&str] = &[
    "# Python dependencies",
    "# Managed by spinbox: existing lines are never rewritten.",
    "",
];

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    // name, optional extras, then end of line, a version operator, marker,
    // direct reference, inline comment, or per-requirement option
    NAME_RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[[^\]]*\])?\s*(?:(?:[=<>!~;@#]|--).*)?$")
            .unwrap()
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    key: String,
    /// Comment and blank lines directly above the entry.
    comments: Vec<String>,
    /// Physical lines of the entry; more than one when continued with `\`.
    lines: Vec<String>,
}

/// One pip-level line: a physical line plus any `\` continuation lines.
struct LogicalLine {
    number: usize,
    lines: Vec<String>,
}

impl LogicalLine {
    fn first(&self) -> &str {
        self.lines.first().map(|l| l.trim_start()).unwrap_or("")
    }

    fn is_single(&self) -> bool {
        self.lines.len() == 1
    }

    /// Continuation markers removed and the pieces joined with spaces.
    fn joined(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.trim().trim_end_matches('\\').trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Lines as written, first one without indentation.
    fn into_verbatim(self) -> Vec<String> {
        self.lines
            .into_iter()
            .enumerate()
            .map(|(i, l)| if i == 0 { l.trim_start().to_string() } else { l })
            .collect()
    }
}

fn logical_lines(text: &str) -> Vec<LogicalLine> {
    let mut out = Vec::new();
    let mut open: Option<LogicalLine> = None;
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim_end().to_string();
        let continued = line.ends_with('\\');
        let current = open.get_or_insert_with(|| LogicalLine {
            number: idx + 1,
            lines: Vec::new(),
        });
        current.lines.push(line);
        if !continued {
            out.extend(open.take());
        }
    }
    // a trailing `\` on the last line has nothing to join
    out.extend(open);
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirements {
    header: Vec<String>,
    directives: Vec<String>,
    entries: Vec<Entry>,
    trailer: Vec<String>,
}

impl Requirements {
    /// An empty file with the default header.
    pub fn new() -> Self {
        Self {
            header: DEFAULT_HEADER.iter().map(|s| s.to_string()).collect(),
            directives: Vec::new(),
            entries: Vec::new(),
            trailer: Vec::new(),
        }
    }

    /// Parse `text`; `path` is only used in error messages.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let mut header = Vec::new();
        let mut directives = Vec::new();
        let mut entries = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        let mut in_header = true;

        for logical in logical_lines(text) {
            let first = logical.first();
            let is_note = logical.is_single() && (first.is_empty() || first.starts_with('#'));
            if in_header && is_note {
                header.extend(logical.lines);
                continue;
            }
            in_header = false;

            if is_note {
                pending.extend(logical.lines);
                continue;
            }
            if first.starts_with('-') {
                directives.append(&mut pending);
                directives.extend(logical.into_verbatim());
                continue;
            }
            let joined = logical.joined();
            let caps = name_re().captures(&joined).ok_or_else(|| SpinboxError::ManifestParse {
                path: path.to_path_buf(),
                message: format!("line {}: no valid package name in '{joined}'", logical.number),
            })?;
            let key = normalize_package_name(Ecosystem::Python, &caps[1]);
            entries.push(Entry {
                key,
                comments: std::mem::take(&mut pending),
                lines: logical.into_verbatim(),
            });
        }

        Ok(Self {
            header,
            directives,
            entries,
            trailer: pending,
        })
    }

    /// Parse the file at `path`, or start a new document when it is absent.
    pub fn load(path: &Path) -> Result<(Self, bool)> {
        match crate::io::read_optional(path)? {
            Some(text) => Ok((Self::parse(path, &text)?, true)),
            None => Ok((Self::new(), false)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        let key = normalize_package_name(Ecosystem::Python, name);
        self.entries.iter().any(|e| e.key == key)
    }

    #[cfg(test)]
    fn entry(&self, name: &str) -> Option<String> {
        let key = normalize_package_name(Ecosystem::Python, name);
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.lines.join("\n"))
    }

    /// Add every package not already listed. Listed packages keep their line.
    pub fn merge<'a>(&mut self, packages: impl IntoIterator<Item = &'a ResolvedPackage>) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        for pkg in packages {
            if self.contains(&pkg.name) {
                outcome.preserved.push(pkg.name.clone());
                continue;
            }
            self.entries.push(Entry {
                key: normalize_package_name(Ecosystem::Python, &pkg.name),
                comments: Vec::new(),
                lines: vec![format!("{}{}", pkg.name, pkg.constraint)],
            });
            outcome.added.push(pkg.name.clone());
        }
        outcome
    }

    pub fn render(&self) -> String {
        let mut lines: Vec<&str> = self.header.iter().map(String::as_str).collect();
        lines.extend(self.directives.iter().map(String::as_str));
        if !self.directives.is_empty() && !self.entries.is_empty() {
            lines.push("");
        }
        let mut sorted: Vec<&Entry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.key.cmp(&b.key));
        for entry in sorted {
            let mut comments = entry.comments.iter().map(String::as_str).peekable();
            // no blank run at the top of the file or after the separator
            if lines.last().map_or(true, |l| l.is_empty()) {
                while comments.next_if(|l| l.trim().is_empty()).is_some() {}
            }
            lines.extend(comments);
            lines.extend(entry.lines.iter().map(String::as_str));
        }
        lines.extend(self.trailer.iter().map(String::as_str));

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

impl Default for Requirements {
    fn default() -> Self {
        Self::new()
    }
}
