//! The `create` and `add` pipelines: resolve a validated request, write the
//! results, and record what was done in `.spinbox/project.yaml`.

use crate::catalog::TemplateStore;
use crate::error::{Result, SpinboxError};
use crate::project::ProjectRecord;
use crate::request::{Mode, ProjectRequest};
use crate::resolve::{resolve_dependencies, resolve_examples, ResolutionWarning};
use crate::types::Component;
use crate::writer::{
    write_dependencies, write_examples, DependencyWriteSummary, ExampleWriteSummary, WriteOptions,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Toolchain versions substituted into generated install scripts.
#[derive(Debug, Clone)]
pub struct ScaffoldOptions {
    pub python_version: String,
    pub node_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScaffoldReport {
    pub target: PathBuf,
    pub mode: Mode,
    pub name: String,
    /// Components this run introduced to the project.
    pub added_components: BTreeSet<Component>,
    /// Every component the project now has.
    pub components: BTreeSet<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<DependencyWriteSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<ExampleWriteSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ResolutionWarning>,
}

impl ScaffoldReport {
    /// True when at least one artifact could not be written.
    pub fn has_failures(&self) -> bool {
        self.dependencies
            .as_ref()
            .is_some_and(|d| !d.failures.is_empty())
            || self
                .examples
                .as_ref()
                .is_some_and(|e| !e.failures.is_empty())
    }
}

/// Run `request` according to its mode.
pub fn scaffold(
    store: &TemplateStore,
    request: &ProjectRequest,
    opts: &ScaffoldOptions,
) -> Result<ScaffoldReport> {
    match request.mode() {
        Mode::Create => create(store, request, opts),
        Mode::Add => add(store, request, opts),
    }
}

/// Scaffold a new project. Fails if the target already holds a project record.
pub fn create(
    store: &TemplateStore,
    request: &ProjectRequest,
    opts: &ScaffoldOptions,
) -> Result<ScaffoldReport> {
    let target = request.target();
    if ProjectRecord::exists(target) {
        return Err(SpinboxError::ProjectExists(target.to_path_buf()));
    }
    crate::io::ensure_dir(target)?;

    let mut record = ProjectRecord::new(ProjectRecord::name_for(target));
    record.profile = request.profile().map(str::to_string);
    record.template = request.template_name(store).map(str::to_string);
    tracing::info!(target = %target.display(), "creating project");
    run(store, request, record, opts)
}

/// Add components to an existing directory. A directory without a project
/// record starts one.
pub fn add(
    store: &TemplateStore,
    request: &ProjectRequest,
    opts: &ScaffoldOptions,
) -> Result<ScaffoldReport> {
    let target = request.target();
    if !target.is_dir() {
        return Err(SpinboxError::TargetNotFound(target.to_path_buf()));
    }
    let record = match ProjectRecord::load(target)? {
        Some(r) => r,
        None => {
            tracing::debug!(target = %target.display(), "no project record, starting one");
            ProjectRecord::new(ProjectRecord::name_for(target))
        }
    };
    let request = request
        .clone()
        .with_existing(record.components.clone())
        .with_recorded_profile(record.profile.clone());
    run(store, &request, record, opts)
}

fn run(
    store: &TemplateStore,
    request: &ProjectRequest,
    mut record: ProjectRecord,
    opts: &ScaffoldOptions,
) -> Result<ScaffoldReport> {
    let target = request.target();
    let added_components: BTreeSet<Component> = request
        .components()
        .difference(request.existing())
        .copied()
        .collect();

    let dependencies = if request.with_deps() {
        let resolved = resolve_dependencies(store, request)?;
        let write_opts = WriteOptions {
            project_name: record.name.clone(),
            python_version: opts.python_version.clone(),
            node_version: opts.node_version.clone(),
        };
        Some(write_dependencies(target, &resolved, &mut record, &write_opts))
    } else {
        None
    };

    let mut warnings = Vec::new();
    let examples = if request.with_examples() {
        let resolution = resolve_examples(store, request);
        warnings = resolution.warnings;
        Some(write_examples(target, &resolution.assets, store, &mut record))
    } else {
        None
    };

    record.add_components(request.components().iter().copied());
    if record.profile.is_none() {
        record.profile = request.profile().map(str::to_string);
    }
    if record.template.is_none() {
        record.template = request.template_name(store).map(str::to_string);
    }
    record.save(target)?;

    Ok(ScaffoldReport {
        target: target.to_path_buf(),
        mode: request.mode(),
        name: record.name.clone(),
        added_components,
        components: record.components.clone(),
        dependencies,
        examples,
        warnings,
    })
}
