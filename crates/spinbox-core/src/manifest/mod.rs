//! Parse, merge and serialize dependency manifests.
//!
//! Every manifest follows the same rule: entries already in the file win
//! over resolved ones, and anything the merger does not understand is
//! carried through untouched.

pub mod package_json;
pub mod requirements;
pub mod scripts;

use crate::types::Ecosystem;
use serde::Serialize;

pub use package_json::PackageJson;
pub use requirements::Requirements;

/// Key under which two package names are considered the same package.
///
/// Python names compare case-insensitively with `_` and `.` folded into `-`
/// (PEP 503). npm names are already canonical.
pub fn normalize_package_name(ecosystem: Ecosystem, name: &str) -> String {
    match ecosystem {
        Ecosystem::Python => name
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '_' || c == '.' { '-' } else { c })
            .collect(),
        Ecosystem::Node => name.trim().to_string(),
    }
}

/// What a merge did with each resolved package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// Packages written into the manifest by this merge.
    pub added: Vec<String>,
    /// Resolved packages left alone because the manifest already lists them.
    pub preserved: Vec<String>,
}

impl MergeOutcome {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_names_fold_case_and_separators() {
        assert_eq!(normalize_package_name(Ecosystem::Python, "Flask_SQLAlchemy"), "flask-sqlalchemy");
        assert_eq!(normalize_package_name(Ecosystem::Python, "zope.interface"), "zope-interface");
        assert_eq!(normalize_package_name(Ecosystem::Python, " PyYAML "), "pyyaml");
    }

    #[test]
    fn node_names_are_kept() {
        assert_eq!(normalize_package_name(Ecosystem::Node, "@types/node"), "@types/node");
    }
}
