use crate::error::Result;
use crate::paths;
use crate::types::Component;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

// ---------------------------------------------------------------------------
// Generated-file ledger
// ---------------------------------------------------------------------------

/// A file spinbox wrote, keyed in the ledger by its project-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// sha256 of the content as written.
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// ProjectRecord
// ---------------------------------------------------------------------------

/// `.spinbox/project.yaml`: what spinbox knows about a scaffolded project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default)]
    pub components: BTreeSet<Component>,
    pub spinbox_version: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub generated: BTreeMap<String, GeneratedFile>,
}

fn default_version() -> u32 {
    1
}

impl ProjectRecord {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version: 1,
            name: name.into(),
            profile: None,
            template: None,
            components: BTreeSet::new(),
            spinbox_version: crate::SPINBOX_VERSION.to_string(),
            created_at: now,
            updated_at: now,
            generated: BTreeMap::new(),
        }
    }

    /// Project name derived from the target directory.
    pub fn name_for(root: &Path) -> String {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "project".to_string())
    }

    pub fn exists(root: &Path) -> bool {
        paths::project_file(root).exists()
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// `Ok(None)` when the project has no record yet.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = paths::project_file(root);
        let Some(data) = crate::io::read_optional(&path)? else {
            return Ok(None);
        };
        let record: ProjectRecord = serde_yaml::from_str(&data)?;
        Ok(Some(record))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::project_file(root), data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn add_components(&mut self, components: impl IntoIterator<Item = Component>) {
        self.components.extend(components);
        self.touch();
    }

    pub fn record_generated(
        &mut self,
        path: &str,
        content: &[u8],
        owner: Option<String>,
        description: Option<String>,
    ) {
        self.generated.insert(
            path.to_string(),
            GeneratedFile {
                hash: crate::io::content_hash(content),
                owner,
                description,
            },
        );
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.spinbox_version = crate::SPINBOX_VERSION.to_string();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// True when `path` was written by spinbox and `current` still matches
    /// what was written, so regenerating it loses no user edits.
    pub fn is_unmodified(&self, path: &str, current: &[u8]) -> bool {
        self.generated
            .get(path)
            .is_some_and(|g| g.hash == crate::io::content_hash(current))
    }

    /// Ledger entries under `dir/` (one level or deeper), sorted by path.
    pub fn generated_in<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = (&'a String, &'a GeneratedFile)> + 'a {
        let prefix = format!("{dir}/");
        self.generated
            .iter()
            .filter(move |(path, _)| path.starts_with(&prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_record_loads_as_none() {
        let dir = TempDir::new().unwrap();
        assert!(ProjectRecord::load(dir.path()).unwrap().is_none());
        assert!(!ProjectRecord::exists(dir.path()));
    }

    #[test]
    fn save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut record = ProjectRecord::new("demo");
        record.profile = Some("api-only".to_string());
        record.add_components([Component::Redis, Component::Fastapi]);
        record.record_generated(
            "fastapi/example-basic-crud.py",
            b"print('hi')\n",
            Some("fastapi".to_string()),
            Some("CRUD".to_string()),
        );
        record.save(dir.path()).unwrap();

        let loaded = ProjectRecord::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.name, "demo");
        assert_eq!(loaded.profile.as_deref(), Some("api-only"));
        assert_eq!(
            loaded.components.iter().copied().collect::<Vec<_>>(),
            vec![Component::Fastapi, Component::Redis]
        );
        assert_eq!(loaded.generated, record.generated);
    }

    #[test]
    fn components_serialize_by_name() {
        let mut record = ProjectRecord::new("demo");
        record.add_components([Component::Postgresql]);
        let yaml = serde_yaml::to_string(&record).unwrap();
        assert!(yaml.contains("- postgresql"));
    }

    #[test]
    fn unmodified_detection() {
        let mut record = ProjectRecord::new("demo");
        record.record_generated("redis/example-caching.py", b"v1", None, None);
        assert!(record.is_unmodified("redis/example-caching.py", b"v1"));
        assert!(!record.is_unmodified("redis/example-caching.py", b"edited"));
        assert!(!record.is_unmodified("redis/other.py", b"v1"));
    }

    #[test]
    fn generated_in_filters_by_directory() {
        let mut record = ProjectRecord::new("demo");
        record.record_generated("fastapi/a.py", b"a", None, None);
        record.record_generated("fastapi-extra/b.py", b"b", None, None);
        record.record_generated("redis/c.py", b"c", None, None);
        let paths: Vec<&String> = record.generated_in("fastapi").map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["fastapi/a.py"]);
    }

    #[test]
    fn name_for_uses_directory_name() {
        assert_eq!(ProjectRecord::name_for(Path::new("/tmp/my-api")), "my-api");
    }
}
