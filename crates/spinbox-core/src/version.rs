//! Version constraints as written in the catalog (`>=0.104.0`, `^14.0.0`, `==2.31.0`).
//!
//! Only the lower bound and the constraint kind take part in conflict
//! resolution; the raw text is what lands in the manifest.

use semver::Version;
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Constraint kinds, ordered from least to most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Any,
    Other,
    Minimum,
    Compatible,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    raw: String,
    kind: ConstraintKind,
    lower: Option<Version>,
}

impl VersionConstraint {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        if raw.is_empty() || raw == "*" || raw == "latest" {
            return Self {
                raw,
                kind: ConstraintKind::Any,
                lower: None,
            };
        }

        let (kind, rest) = if let Some(rest) = raw.strip_prefix("==") {
            (ConstraintKind::Exact, rest)
        } else if let Some(rest) = raw.strip_prefix("~=") {
            (ConstraintKind::Compatible, rest)
        } else if let Some(rest) = raw.strip_prefix(">=") {
            (ConstraintKind::Minimum, rest)
        } else if let Some(rest) = raw.strip_prefix('^') {
            (ConstraintKind::Minimum, rest)
        } else if let Some(rest) = raw.strip_prefix('~') {
            (ConstraintKind::Compatible, rest)
        } else if let Some(rest) = raw.strip_prefix('=') {
            (ConstraintKind::Exact, rest)
        } else if raw.starts_with(|c: char| c.is_ascii_digit()) {
            (ConstraintKind::Exact, raw.as_str())
        } else {
            return Self {
                raw,
                kind: ConstraintKind::Other,
                lower: None,
            };
        };

        match lenient_version(rest) {
            Some(v) => Self {
                kind,
                lower: Some(v),
                raw,
            },
            None => Self {
                raw,
                kind: ConstraintKind::Other,
                lower: None,
            },
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn lower_bound(&self) -> Option<&Version> {
        self.lower.as_ref()
    }

    /// Order two constraints by how much they narrow the version range:
    /// higher lower bound first, then the more specific kind.
    pub fn specificity_cmp(&self, other: &Self) -> Ordering {
        self.lower_bound()
            .cmp(&other.lower_bound())
            .then(self.kind().cmp(&other.kind()))
    }

    /// Render as a `package.json` version value.
    pub fn npm_value(&self) -> String {
        if self.raw.is_empty() {
            "*".to_string()
        } else {
            self.raw.clone()
        }
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse `1`, `1.2`, `1.2.3`, `1.2.3.4`, `14.0.0-canary` into a semver
/// `Version`, padding or truncating to three numeric parts.
fn lenient_version(s: &str) -> Option<Version> {
    let s = s.trim();
    let numeric: String = s
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut parts = numeric
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>());
    let major = parts.next()?.ok()?;
    let minor = parts.next().transpose().ok()?.unwrap_or(0);
    let patch = parts.next().transpose().ok()?.unwrap_or(0);
    Some(Version::new(major, minor, patch))
}
