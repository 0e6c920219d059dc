//! Persist resolver output into a project directory.
//!
//! Manifests are merged, never replaced. Generated files (install scripts,
//! examples, `EXAMPLES.md`) are written when absent and regenerated only
//! while the project ledger shows them unmodified. Each artifact fails on its
//! own: an error is captured in the summary and the remaining artifacts are
//! still written.

use crate::catalog::{DependencySource, ExampleAsset, TemplateStore};
use crate::error::{Result, SpinboxError};
use crate::manifest::scripts::{render_setup_script, ScriptContext};
use crate::manifest::{MergeOutcome, PackageJson, Requirements};
use crate::paths;
use crate::project::ProjectRecord;
use crate::resolve::{EcosystemDependencies, ResolvedDependencies};
use crate::types::{Component, DependencyClass, Ecosystem};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// Options and summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub project_name: String,
    pub python_version: String,
    pub node_version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestState {
    Created,
    Merged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    Created,
    /// Regenerated because it was unmodified since spinbox wrote it.
    Updated,
    Unchanged,
    /// Left alone because it was edited or not written by spinbox.
    Preserved,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileAction::Created => "created",
            FileAction::Updated => "updated",
            FileAction::Unchanged => "unchanged",
            FileAction::Preserved => "preserved",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestOutcome {
    pub ecosystem: Ecosystem,
    pub path: String,
    pub state: ManifestState,
    pub added: Vec<String>,
    pub preserved: Vec<String>,
    pub script: FileAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactFailure {
    pub artifact: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyWriteSummary {
    pub manifests: Vec<ManifestOutcome>,
    pub failures: Vec<ArtifactFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WrittenFile {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub action: FileAction,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExampleWriteSummary {
    pub files: Vec<WrittenFile>,
    pub failures: Vec<ArtifactFailure>,
}

impl ExampleWriteSummary {
    pub fn count(&self, action: FileAction) -> usize {
        self.files.iter().filter(|f| f.action == action).count()
    }
}

// ---------------------------------------------------------------------------
// Dependencies
// ---------------------------------------------------------------------------

/// Merge each non-empty ecosystem into its manifest and write its install
/// script. A failure in one ecosystem does not stop the other.
pub fn write_dependencies(
    target: &Path,
    resolved: &ResolvedDependencies,
    record: &mut ProjectRecord,
    opts: &WriteOptions,
) -> DependencyWriteSummary {
    let mut summary = DependencyWriteSummary::default();
    for &ecosystem in Ecosystem::all() {
        let group = resolved.get(ecosystem);
        if group.is_empty() {
            continue;
        }
        match write_manifest(target, ecosystem, group, record, opts) {
            Ok(outcome) => {
                tracing::info!(
                    manifest = %outcome.path,
                    added = outcome.added.len(),
                    preserved = outcome.preserved.len(),
                    "manifest written"
                );
                summary.manifests.push(outcome);
            }
            Err(e) => {
                tracing::warn!(manifest = ecosystem.manifest_file(), error = %e, "manifest not written");
                summary.failures.push(ArtifactFailure {
                    artifact: ecosystem.manifest_file().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
    summary
}

fn write_manifest(
    target: &Path,
    ecosystem: Ecosystem,
    group: &EcosystemDependencies,
    record: &mut ProjectRecord,
    opts: &WriteOptions,
) -> Result<ManifestOutcome> {
    let path = target.join(ecosystem.manifest_file());
    let (existed, outcome) = match ecosystem {
        Ecosystem::Python => {
            let (mut doc, existed) = Requirements::load(&path)?;
            // pip has no dev section; dev tools install alongside runtime packages
            let outcome = doc.merge(group.runtime.iter().chain(group.dev.iter()));
            if !existed || !outcome.is_noop() {
                crate::io::atomic_write(&path, doc.render().as_bytes())?;
            }
            (existed, outcome)
        }
        Ecosystem::Node => {
            let next_scripts = group
                .iter()
                .any(|(_, p)| p.sources.contains(&DependencySource::Component(Component::Nextjs)));
            let (mut doc, existed) = PackageJson::load(&path, &opts.project_name, next_scripts)?;
            let mut outcome = doc.merge(DependencyClass::Runtime, &group.runtime);
            let dev = doc.merge(DependencyClass::Dev, &group.dev);
            outcome.added.extend(dev.added);
            outcome.preserved.extend(dev.preserved);
            if !existed || !outcome.is_noop() {
                crate::io::atomic_write(&path, doc.render()?.as_bytes())?;
            }
            (existed, outcome)
        }
    };

    let ctx = ScriptContext {
        project_name: &opts.project_name,
        python_version: &opts.python_version,
        node_version: &opts.node_version,
    };
    let script = render_setup_script(ecosystem, &ctx);
    let script_action = write_generated(
        target,
        ecosystem.setup_script(),
        script.as_bytes(),
        record,
        None,
        None,
        true,
    )?;

    let MergeOutcome { added, preserved } = outcome;
    Ok(ManifestOutcome {
        ecosystem,
        path: ecosystem.manifest_file().to_string(),
        state: if existed {
            ManifestState::Merged
        } else {
            ManifestState::Created
        },
        added,
        preserved,
        script: script_action,
    })
}

// ---------------------------------------------------------------------------
// Examples
// ---------------------------------------------------------------------------

/// Copy staged example assets into the project and refresh the `EXAMPLES.md`
/// index of every directory touched.
pub fn write_examples(
    target: &Path,
    assets: &[ExampleAsset],
    store: &TemplateStore,
    record: &mut ProjectRecord,
) -> ExampleWriteSummary {
    let mut summary = ExampleWriteSummary::default();
    let mut dirs: BTreeSet<String> = BTreeSet::new();

    for asset in assets {
        let owner = asset.owner.to_string();
        let result = store
            .asset_content(&asset.source)
            .ok_or_else(|| {
                SpinboxError::Catalog(format!("asset '{}' not found", asset.source))
            })
            .and_then(|content| {
                write_generated(
                    target,
                    &asset.path,
                    &content,
                    record,
                    Some(owner.clone()),
                    Some(asset.description.clone()),
                    false,
                )
            });
        match result {
            Ok(action) => {
                tracing::debug!(path = %asset.path, %action, "example");
                if let Some(dir) = top_dir(&asset.path) {
                    dirs.insert(dir.to_string());
                }
                summary.files.push(WrittenFile {
                    path: asset.path.clone(),
                    owner: Some(owner),
                    action,
                });
            }
            Err(e) => {
                tracing::warn!(path = %asset.path, error = %e, "example not written");
                summary.failures.push(ArtifactFailure {
                    artifact: asset.path.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    for dir in dirs {
        let index_path = format!("{dir}/{}", paths::EXAMPLES_MD);
        let content = render_examples_index(&dir, record);
        match write_generated(target, &index_path, content.as_bytes(), record, None, None, false) {
            Ok(action) => summary.files.push(WrittenFile {
                path: index_path,
                owner: None,
                action,
            }),
            Err(e) => summary.failures.push(ArtifactFailure {
                artifact: index_path,
                error: e.to_string(),
            }),
        }
    }
    summary
}

fn top_dir(path: &str) -> Option<&str> {
    path.split_once('/').map(|(dir, _)| dir)
}

/// Index of every described file spinbox has generated under `dir`.
fn render_examples_index(dir: &str, record: &ProjectRecord) -> String {
    let mut out = format!("# {dir} examples\n\n");
    out.push_str("Generated by spinbox. Files you edit are never overwritten.\n\n");
    let prefix = format!("{dir}/");
    for (path, file) in record.generated_in(dir) {
        let Some(description) = file.description.as_deref() else {
            continue;
        };
        let rel = path.strip_prefix(&prefix).unwrap_or(path);
        match file.owner.as_deref() {
            Some(owner) => out.push_str(&format!("- `{rel}` ({owner}): {description}\n")),
            None => out.push_str(&format!("- `{rel}`: {description}\n")),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Generated files
// ---------------------------------------------------------------------------

/// Write `content` to `rel` unless that would clobber a user's edits, and
/// keep the ledger in step with what is on disk.
fn write_generated(
    target: &Path,
    rel: &str,
    content: &[u8],
    record: &mut ProjectRecord,
    owner: Option<String>,
    description: Option<String>,
    executable: bool,
) -> Result<FileAction> {
    let path = target.join(rel);
    let action = match crate::io::read_optional_bytes(&path)? {
        None => FileAction::Created,
        Some(current) if current == content => FileAction::Unchanged,
        Some(current) if record.is_unmodified(rel, &current) => FileAction::Updated,
        Some(_) => return Ok(FileAction::Preserved),
    };
    if action != FileAction::Unchanged {
        if executable {
            crate::io::write_script(&path, content)?;
        } else {
            crate::io::atomic_write(&path, content)?;
        }
    }
    record.record_generated(rel, content, owner, description);
    Ok(action)
}
