use crate::error::{Result, SpinboxError};
use crate::manifest::MergeOutcome;
use crate::resolve::ResolvedPackage;
use crate::types::DependencyClass;
use serde_json::{Map, Value};
use std::path::Path;

const DEPENDENCIES: &str = "dependencies";
const DEV_DEPENDENCIES: &str = "devDependencies";

const NEXT_SCRIPTS: &[(&str, &str)] = &[
    ("dev", "next dev"),
    ("build", "next build"),
    ("start", "next start"),
    ("lint", "next lint"),
];

fn section_key(class: DependencyClass) -> &'static str {
    match class {
        DependencyClass::Runtime => DEPENDENCIES,
        DependencyClass::Dev => DEV_DEPENDENCIES,
    }
}

/// A `package.json` document. Keys the merger does not manage keep their
/// position and value.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageJson {
    root: Map<String, Value>,
}

impl PackageJson {
    /// A fresh document for a new project.
    pub fn new(project_name: &str, next_scripts: bool) -> Self {
        let mut root = Map::new();
        root.insert("name".into(), Value::String(npm_project_name(project_name)));
        root.insert("version".into(), Value::String("0.1.0".into()));
        root.insert("private".into(), Value::Bool(true));
        if next_scripts {
            let scripts: Map<String, Value> = NEXT_SCRIPTS
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect();
            root.insert("scripts".into(), Value::Object(scripts));
        }
        Self { root }
    }

    /// Parse `text`; `path` is only used in error messages.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| parse_error(path, e.to_string()))?;
        let Value::Object(root) = value else {
            return Err(parse_error(path, "top-level value is not an object".into()));
        };
        for key in [DEPENDENCIES, DEV_DEPENDENCIES] {
            if let Some(v) = root.get(key) {
                if !v.is_object() {
                    return Err(parse_error(path, format!("'{key}' is not an object")));
                }
            }
        }
        Ok(Self { root })
    }

    /// Parse the file at `path`, or start a new document when it is absent.
    pub fn load(path: &Path, project_name: &str, next_scripts: bool) -> Result<(Self, bool)> {
        match crate::io::read_optional(path)? {
            Some(text) => Ok((Self::parse(path, &text)?, true)),
            None => Ok((Self::new(project_name, next_scripts), false)),
        }
    }

    /// Version range listed for `name` in either dependency map.
    #[cfg(test)]
    fn version_of(&self, name: &str) -> Option<&str> {
        [DEPENDENCIES, DEV_DEPENDENCIES]
            .iter()
            .filter_map(|k| self.root.get(*k).and_then(Value::as_object))
            .find_map(|m| m.get(name))
            .and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        [DEPENDENCIES, DEV_DEPENDENCIES].iter().any(|k| {
            self.root
                .get(*k)
                .and_then(Value::as_object)
                .is_some_and(|m| m.contains_key(name))
        })
    }

    /// Add packages missing from both dependency maps into the map for
    /// `class`. A package listed in either map keeps its entry.
    pub fn merge<'a>(
        &mut self,
        class: DependencyClass,
        packages: impl IntoIterator<Item = &'a ResolvedPackage>,
    ) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        let mut additions: Vec<(String, Value)> = Vec::new();
        for pkg in packages {
            if self.contains(&pkg.name) {
                outcome.preserved.push(pkg.name.clone());
                continue;
            }
            additions.push((pkg.name.clone(), Value::String(pkg.constraint.npm_value())));
            outcome.added.push(pkg.name.clone());
        }
        if additions.is_empty() {
            return outcome;
        }

        // Replace in place so the section keeps its position in the document.
        let section = self
            .root
            .entry(section_key(class))
            .or_insert_with(|| Value::Object(Map::new()));
        let mut entries: Vec<(String, Value)> = match section.take() {
            Value::Object(map) => map.into_iter().collect(),
            _ => Vec::new(),
        };
        entries.extend(additions);
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        *section = Value::Object(entries.into_iter().collect());
        outcome
    }

    pub fn render(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(&self.root)?;
        out.push('\n');
        Ok(out)
    }
}

fn parse_error(path: &Path, message: String) -> SpinboxError {
    SpinboxError::ManifestParse {
        path: path.to_path_buf(),
        message,
    }
}

/// npm package names are lowercase URL-safe strings.
fn npm_project_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '-' || c == '.' || c == '_');
    if cleaned.is_empty() {
        "app".to_string()
    } else {
        cleaned.to_string()
    }
}
