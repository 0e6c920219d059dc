use crate::catalog::{DependencySource, DependencySpec, TemplateStore};
use crate::error::Result;
use crate::manifest::normalize_package_name;
use crate::request::ProjectRequest;
use crate::types::{Component, DependencyClass, Ecosystem};
use crate::version::VersionConstraint;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPackage {
    pub name: String,
    pub constraint: VersionConstraint,
    /// Every catalog entry that asked for this package, in resolution order.
    pub sources: Vec<DependencySource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EcosystemDependencies {
    pub runtime: Vec<ResolvedPackage>,
    pub dev: Vec<ResolvedPackage>,
}

impl EcosystemDependencies {
    pub fn is_empty(&self) -> bool {
        self.runtime.is_empty() && self.dev.is_empty()
    }

    pub fn len(&self) -> usize {
        self.runtime.len() + self.dev.len()
    }

    /// Runtime then dev packages.
    pub fn iter(&self) -> impl Iterator<Item = (DependencyClass, &ResolvedPackage)> {
        self.runtime
            .iter()
            .map(|p| (DependencyClass::Runtime, p))
            .chain(self.dev.iter().map(|p| (DependencyClass::Dev, p)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedDependencies {
    pub python: EcosystemDependencies,
    pub node: EcosystemDependencies,
}

impl ResolvedDependencies {
    pub fn get(&self, ecosystem: Ecosystem) -> &EcosystemDependencies {
        match ecosystem {
            Ecosystem::Python => &self.python,
            Ecosystem::Node => &self.node,
        }
    }

    fn get_mut(&mut self, ecosystem: Ecosystem) -> &mut EcosystemDependencies {
        match ecosystem {
            Ecosystem::Python => &mut self.python,
            Ecosystem::Node => &mut self.node,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.python.is_empty() && self.node.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Ecosystems the component set brings in. Service components follow the
/// language components; a set with no language component defaults to Python.
pub fn active_ecosystems(components: &BTreeSet<Component>) -> BTreeSet<Ecosystem> {
    let mut active: BTreeSet<Ecosystem> =
        components.iter().filter_map(|c| c.ecosystem()).collect();
    if active.is_empty() {
        active.insert(Ecosystem::Python);
    }
    active
}

struct Candidate {
    name: String,
    constraint: VersionConstraint,
    runtime: bool,
    sources: Vec<DependencySource>,
}

impl Candidate {
    fn merge(&mut self, spec: &DependencySpec) {
        if spec.constraint.specificity_cmp(&self.constraint) == Ordering::Greater {
            self.constraint = spec.constraint.clone();
        }
        self.runtime |= spec.class == DependencyClass::Runtime;
        if !self.sources.contains(&spec.source) {
            self.sources.push(spec.source.clone());
        }
    }
}

/// Compute the de-duplicated, sorted package set per ecosystem.
///
/// Only the requested components contribute packages; components the
/// project already has only widen the set of active ecosystems. When two
/// sources ask for the same package the narrower constraint wins (higher
/// lower bound, then exact > compatible > minimum); on a full tie the first
/// source in lexical component order is kept.
pub fn resolve_dependencies(
    store: &TemplateStore,
    request: &ProjectRequest,
) -> Result<ResolvedDependencies> {
    let active = active_ecosystems(&request.effective_components());
    let mut groups: BTreeMap<Ecosystem, BTreeMap<String, Candidate>> = BTreeMap::new();

    for component in request.components() {
        for ecosystem in &active {
            let group = groups.entry(*ecosystem).or_default();
            for spec in store.lookup_dependencies(*component, *ecosystem) {
                add_spec(group, spec);
            }
        }
    }

    if active.contains(&Ecosystem::Python) {
        if let Some(name) = request.template_name(store) {
            let template = store.template(name)?;
            let group = groups.entry(Ecosystem::Python).or_default();
            for spec in &template.packages {
                add_spec(group, spec);
            }
        }
    }

    let mut resolved = ResolvedDependencies::default();
    for (ecosystem, group) in groups {
        let out = resolved.get_mut(ecosystem);
        // BTreeMap iteration is already sorted by normalized name.
        for (_, candidate) in group {
            let package = ResolvedPackage {
                name: candidate.name,
                constraint: candidate.constraint,
                sources: candidate.sources,
            };
            if candidate.runtime {
                out.runtime.push(package);
            } else {
                out.dev.push(package);
            }
        }
    }
    tracing::debug!(
        python = resolved.python.len(),
        node = resolved.node.len(),
        "resolved dependencies"
    );
    Ok(resolved)
}

fn add_spec(group: &mut BTreeMap<String, Candidate>, spec: &DependencySpec) {
    let key = normalize_package_name(spec.ecosystem, &spec.name);
    match group.get_mut(&key) {
        Some(existing) => existing.merge(spec),
        None => {
            group.insert(
                key,
                Candidate {
                    name: spec.name.clone(),
                    constraint: spec.constraint.clone(),
                    runtime: spec.class == DependencyClass::Runtime,
                    sources: vec![spec.source.clone()],
                },
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
