//! The template store: component dependencies, requirements templates,
//! profiles and example assets, loaded once from a YAML catalog.

use crate::assets::{AssetSource, EmbeddedAssets, CATALOG_PATH};
use crate::error::{Result, SpinboxError};
use crate::types::{Component, DependencyClass, Ecosystem};
use crate::version::VersionConstraint;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

const CATALOG_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Public catalog types
// ---------------------------------------------------------------------------

/// Where a dependency came from. Components order before templates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DependencySource {
    Component(Component),
    Template(String),
}

impl fmt::Display for DependencySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencySource::Component(c) => write!(f, "{c}"),
            DependencySource::Template(t) => write!(f, "template:{t}"),
        }
    }
}

impl Serialize for DependencySource {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub source: DependencySource,
    pub ecosystem: Ecosystem,
    pub name: String,
    pub constraint: VersionConstraint,
    pub class: DependencyClass,
}

/// The catalog entry an example asset belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetOwner {
    Component(Component),
    Combination {
        components: BTreeSet<Component>,
        profile: Option<String>,
    },
    Profile(String),
}

impl fmt::Display for AssetOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetOwner::Component(c) => write!(f, "{c}"),
            AssetOwner::Combination { components, profile } => {
                let names: Vec<&str> = components.iter().map(|c| c.as_str()).collect();
                f.write_str(&names.join("+"))?;
                match profile {
                    Some(p) => write!(f, "+profile:{p}"),
                    None => Ok(()),
                }
            }
            AssetOwner::Profile(p) => write!(f, "profile:{p}"),
        }
    }
}

impl Serialize for AssetOwner {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleAsset {
    pub owner: AssetOwner,
    /// Destination path relative to the project root.
    pub path: String,
    /// Source path inside the asset tree.
    pub source: String,
    pub description: String,
}

/// Examples staged when components are selected together. A combination
/// with a profile only applies to projects built from that profile.
#[derive(Debug, Clone)]
pub struct Combination {
    pub components: BTreeSet<Component>,
    pub profile: Option<String>,
    pub examples: Vec<ExampleAsset>,
}

impl Combination {
    /// Every member is in the effective set, at least one was requested now,
    /// and the profile gate, if any, matches.
    pub fn applies_to(&self, query: &ExampleQuery<'_>) -> bool {
        self.components.is_subset(query.effective)
            && !self.components.is_disjoint(query.requested)
            && self
                .profile
                .as_deref()
                .map_or(true, |p| query.project_profile == Some(p))
    }
}

/// Input to [`TemplateStore::lookup_examples`].
#[derive(Debug, Clone, Copy)]
pub struct ExampleQuery<'a> {
    /// Components chosen by this invocation.
    pub requested: &'a BTreeSet<Component>,
    /// Requested plus the components the project already had.
    pub effective: &'a BTreeSet<Component>,
    /// Profile the project is built from.
    pub project_profile: Option<&'a str>,
    /// Profile whose own bundle is staged on top.
    pub bundle: Option<&'a Profile>,
}

impl<'a> ExampleQuery<'a> {
    /// Everything a fresh project with `components` would get.
    pub fn fresh(components: &'a BTreeSet<Component>, profile: Option<&'a Profile>) -> Self {
        Self {
            requested: components,
            effective: components,
            project_profile: profile.map(|p| p.name.as_str()),
            bundle: profile,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub description: String,
    pub components: Vec<Component>,
    pub template: Option<String>,
    pub examples: Vec<ExampleAsset>,
}

impl Profile {
    pub fn component_set(&self) -> BTreeSet<Component> {
        self.components.iter().copied().collect()
    }
}

#[derive(Debug, Clone)]
pub struct RequirementsTemplate {
    pub name: String,
    pub description: String,
    pub packages: Vec<DependencySpec>,
}

#[derive(Debug, Clone, Default)]
struct ComponentDefinition {
    dependencies: BTreeMap<Ecosystem, Vec<DependencySpec>>,
    examples: Vec<ExampleAsset>,
}

// ---------------------------------------------------------------------------
// On-disk catalog shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    version: u32,
    #[serde(default)]
    components: BTreeMap<String, ComponentFile>,
    #[serde(default)]
    combinations: Vec<CombinationFile>,
    #[serde(default)]
    profiles: BTreeMap<String, ProfileFile>,
    #[serde(default)]
    templates: BTreeMap<String, TemplateFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ComponentFile {
    #[serde(default)]
    dependencies: BTreeMap<Ecosystem, Vec<PackageFile>>,
    #[serde(default)]
    examples: Vec<ExampleFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageFile {
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    class: DependencyClass,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExampleFile {
    path: String,
    source: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CombinationFile {
    components: Vec<String>,
    #[serde(default)]
    profile: Option<String>,
    #[serde(default)]
    examples: Vec<ExampleFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileFile {
    #[serde(default)]
    description: String,
    components: Vec<String>,
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    examples: Vec<ExampleFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateFile {
    #[serde(default)]
    description: String,
    packages: Vec<PackageFile>,
}

// ---------------------------------------------------------------------------
// TemplateStore
// ---------------------------------------------------------------------------

/// Immutable, process-wide catalog. Load once and pass by reference.
pub struct TemplateStore {
    components: BTreeMap<Component, ComponentDefinition>,
    combinations: Vec<Combination>,
    profiles: BTreeMap<String, Profile>,
    templates: BTreeMap<String, RequirementsTemplate>,
    assets: Box<dyn AssetSource>,
}

impl TemplateStore {
    /// Load the catalog compiled into the binary.
    pub fn builtin() -> Result<Self> {
        let data = EmbeddedAssets
            .get(CATALOG_PATH)
            .ok_or_else(|| SpinboxError::Catalog(format!("{CATALOG_PATH} not embedded")))?;
        let yaml = String::from_utf8(data)
            .map_err(|e| SpinboxError::Catalog(format!("{CATALOG_PATH} is not UTF-8: {e}")))?;
        Self::from_yaml(&yaml, EmbeddedAssets)
    }

    /// Load a catalog from YAML, resolving example sources against `assets`.
    pub fn from_yaml(yaml: &str, assets: impl AssetSource + 'static) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        if file.version != CATALOG_VERSION {
            return Err(SpinboxError::Catalog(format!(
                "unsupported catalog version {} (expected {CATALOG_VERSION})",
                file.version
            )));
        }

        let mut components = BTreeMap::new();
        for (key, entry) in file.components {
            let component = parse_catalog_component(&key, "components")?;
            let mut dependencies = BTreeMap::new();
            for (ecosystem, packages) in entry.dependencies {
                let source = DependencySource::Component(component);
                let specs = packages
                    .into_iter()
                    .map(|p| p.into_spec(source.clone(), ecosystem))
                    .collect();
                dependencies.insert(ecosystem, specs);
            }
            let examples = entry
                .examples
                .into_iter()
                .map(|e| e.into_asset(AssetOwner::Component(component)))
                .collect();
            components.insert(
                component,
                ComponentDefinition {
                    dependencies,
                    examples,
                },
            );
        }

        let mut templates = BTreeMap::new();
        for (name, entry) in file.templates {
            let source = DependencySource::Template(name.clone());
            let packages = entry
                .packages
                .into_iter()
                .map(|p| p.into_spec(source.clone(), Ecosystem::Python))
                .collect();
            templates.insert(
                name.clone(),
                RequirementsTemplate {
                    name,
                    description: entry.description,
                    packages,
                },
            );
        }

        let mut profiles = BTreeMap::new();
        for (name, entry) in file.profiles {
            let mut seen = BTreeSet::new();
            let mut members = Vec::new();
            for c in &entry.components {
                let component = parse_catalog_component(c, &format!("profile '{name}'"))?;
                if seen.insert(component) {
                    members.push(component);
                }
            }
            if members.is_empty() {
                return Err(SpinboxError::Catalog(format!(
                    "profile '{name}' has no components"
                )));
            }
            if let Some(t) = &entry.template {
                if !templates.contains_key(t) {
                    return Err(SpinboxError::Catalog(format!(
                        "profile '{name}' references unknown template '{t}'"
                    )));
                }
            }
            let owner = AssetOwner::Profile(name.clone());
            let examples = entry
                .examples
                .into_iter()
                .map(|e| e.into_asset(owner.clone()))
                .collect();
            profiles.insert(
                name.clone(),
                Profile {
                    name,
                    description: entry.description,
                    components: members,
                    template: entry.template,
                    examples,
                },
            );
        }

        let mut combinations: Vec<Combination> = Vec::new();
        for entry in file.combinations {
            let label = entry.components.join(", ");
            let mut set = BTreeSet::new();
            for name in &entry.components {
                set.insert(parse_catalog_component(name, "combinations")?);
            }
            match &entry.profile {
                Some(p) if !profiles.contains_key(p) => {
                    return Err(SpinboxError::Catalog(format!(
                        "combination [{label}] references unknown profile '{p}'"
                    )));
                }
                Some(_) if set.is_empty() => {
                    return Err(SpinboxError::Catalog(format!(
                        "combination [{label}] needs at least one component"
                    )));
                }
                None if set.len() < 2 => {
                    return Err(SpinboxError::Catalog(format!(
                        "combination [{label}] needs at least two distinct components"
                    )));
                }
                _ => {}
            }
            if combinations
                .iter()
                .any(|c| c.components == set && c.profile == entry.profile)
            {
                return Err(SpinboxError::Catalog(format!("duplicate combination [{label}]")));
            }
            let owner = AssetOwner::Combination {
                components: set.clone(),
                profile: entry.profile.clone(),
            };
            let examples = entry
                .examples
                .into_iter()
                .map(|e| e.into_asset(owner.clone()))
                .collect();
            combinations.push(Combination {
                components: set,
                profile: entry.profile,
                examples,
            });
        }

        Ok(Self {
            components,
            combinations,
            profiles,
            templates,
            assets: Box::new(assets),
        })
    }

    // -----------------------------------------------------------------------
    // Dependencies
    // -----------------------------------------------------------------------

    /// Dependencies `component` contributes to `ecosystem`. Empty when it has none.
    pub fn lookup_dependencies(&self, component: Component, ecosystem: Ecosystem) -> &[DependencySpec] {
        self.components
            .get(&component)
            .and_then(|d| d.dependencies.get(&ecosystem))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn template(&self, name: &str) -> Result<&RequirementsTemplate> {
        self.templates
            .get(name)
            .ok_or_else(|| SpinboxError::UnknownTemplate(name.to_string()))
    }

    pub fn templates(&self) -> impl Iterator<Item = &RequirementsTemplate> {
        self.templates.values()
    }

    // -----------------------------------------------------------------------
    // Profiles
    // -----------------------------------------------------------------------

    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| SpinboxError::UnknownProfile(name.to_string()))
    }

    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }

    // -----------------------------------------------------------------------
    // Examples
    // -----------------------------------------------------------------------

    pub fn component_examples(&self, component: Component) -> &[ExampleAsset] {
        self.components
            .get(&component)
            .map(|d| d.examples.as_slice())
            .unwrap_or(&[])
    }

    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    /// Every example that applies to `query`, in staging order:
    /// single-component assets of the requested components, applicable
    /// combination assets, then the profile bundle. Not de-duplicated.
    pub fn lookup_examples(&self, query: &ExampleQuery<'_>) -> Vec<ExampleAsset> {
        let mut out: Vec<ExampleAsset> = query
            .requested
            .iter()
            .flat_map(|c| self.component_examples(*c).iter().cloned())
            .collect();
        for combo in self.combinations.iter().filter(|c| c.applies_to(query)) {
            out.extend(combo.examples.iter().cloned());
        }
        if let Some(p) = query.bundle {
            out.extend(p.examples.iter().cloned());
        }
        out
    }

    /// Raw bytes of an example source, if present in the asset tree.
    pub fn asset_content(&self, source: &str) -> Option<Vec<u8>> {
        self.assets.get(source)
    }
}

fn parse_catalog_component(name: &str, context: &str) -> Result<Component> {
    Component::from_str(name)
        .map_err(|_| SpinboxError::Catalog(format!("unknown component '{name}' in {context}")))
}

impl PackageFile {
    fn into_spec(self, source: DependencySource, ecosystem: Ecosystem) -> DependencySpec {
        DependencySpec {
            source,
            ecosystem,
            constraint: VersionConstraint::parse(&self.version),
            name: self.name,
            class: self.class,
        }
    }
}

impl ExampleFile {
    fn into_asset(self, owner: AssetOwner) -> ExampleAsset {
        ExampleAsset {
            owner,
            path: self.path,
            source: self.source,
            description: self.description,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;

    fn set(items: &[Component]) -> BTreeSet<Component> {
        items.iter().copied().collect()
    }

    #[test]
    fn builtin_catalog_loads() {
        let store = TemplateStore::builtin().unwrap();
        assert!(store.profile("web-app").is_ok());
        assert!(store.profile("ai-llm").is_ok());
        assert!(store.template("data-science").is_ok());
        assert!(!store.lookup_dependencies(Component::Fastapi, Ecosystem::Python).is_empty());
    }

    #[test]
    fn builtin_example_sources_exist() {
        let store = TemplateStore::builtin().unwrap();
        let all = set(Component::all());
        for p in store.profiles() {
            for asset in store.lookup_examples(&ExampleQuery::fresh(&all, Some(p))) {
                assert!(
                    store.asset_content(&asset.source).is_some(),
                    "missing asset {} for {}",
                    asset.source,
                    asset.owner
                );
            }
        }
    }

    #[test]
    fn builtin_has_three_way_combination() {
        let store = TemplateStore::builtin().unwrap();
        assert!(store.combinations().iter().any(|c| c.components.len() >= 3));
    }

    #[test]
    fn python_components_have_no_node_dependencies() {
        let store = TemplateStore::builtin().unwrap();
        assert!(store.lookup_dependencies(Component::Fastapi, Ecosystem::Node).is_empty());
        assert!(store.lookup_dependencies(Component::Nextjs, Ecosystem::Python).is_empty());
    }

    #[test]
    fn unknown_profile_and_template() {
        let store = TemplateStore::builtin().unwrap();
        assert!(matches!(
            store.profile("nope"),
            Err(SpinboxError::UnknownProfile(_))
        ));
        assert!(matches!(
            store.template("nope"),
            Err(SpinboxError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn lookup_examples_includes_subset_combinations_only() {
        let store = TemplateStore::builtin().unwrap();
        let members = set(&[Component::Fastapi, Component::Postgresql]);
        let assets = store.lookup_examples(&ExampleQuery::fresh(&members, None));
        let owners: BTreeSet<String> = assets.iter().map(|a| a.owner.to_string()).collect();
        assert!(owners.contains("fastapi"));
        assert!(owners.contains("postgresql"));
        assert!(owners.contains("fastapi+postgresql"));
        assert!(!owners.contains("fastapi+redis"));
        assert!(!owners.contains("fastapi+postgresql+redis"));
    }

    #[test]
    fn rejects_unknown_component_key() {
        let yaml = "version: 1\ncomponents:\n  django: {}\n";
        let err = TemplateStore::from_yaml(yaml, MemoryAssets::new()).err().unwrap();
        assert!(err.to_string().contains("unknown component 'django'"));
    }

    #[test]
    fn rejects_single_component_combination() {
        let yaml = "version: 1\ncombinations:\n  - components: [fastapi, fastapi]\n";
        let err = TemplateStore::from_yaml(yaml, MemoryAssets::new()).err().unwrap();
        assert!(err.to_string().contains("at least two"));
    }

    #[test]
    fn profile_combination_needs_matching_profile() {
        let store = TemplateStore::builtin().unwrap();
        let members = set(&[Component::Fastapi]);
        let plain = store.lookup_examples(&ExampleQuery::fresh(&members, None));
        assert!(!plain.iter().any(|a| a.path == "fastapi/example-chat-api.py"));

        let ai = store.profile("ai-llm").unwrap();
        let query = ExampleQuery {
            requested: &members,
            effective: &members,
            project_profile: Some("ai-llm"),
            bundle: None,
        };
        let staged = store.lookup_examples(&query);
        let chat = staged
            .iter()
            .find(|a| a.path == "fastapi/example-chat-api.py")
            .unwrap();
        assert_eq!(chat.owner.to_string(), "fastapi+profile:ai-llm");
        assert!(staged.iter().any(|a| a.path == "fastapi/example-rag-system.py"));
        assert!(!staged.iter().any(|a| a.path == "fastapi/example-data-analysis-api.py"));
        // no bundle requested, so no provider examples
        assert!(!staged.iter().any(|a| a.owner == AssetOwner::Profile(ai.name.clone())));
    }

    #[test]
    fn single_component_combination_with_profile_is_allowed() {
        let yaml = "\
version: 1
profiles:
  p:
    components: [python]
combinations:
  - components: [fastapi]
    profile: p
";
        let store = TemplateStore::from_yaml(yaml, MemoryAssets::new()).unwrap();
        assert_eq!(store.combinations()[0].profile.as_deref(), Some("p"));
    }

    #[test]
    fn rejects_combination_with_unknown_profile() {
        let yaml = "version: 1\ncombinations:\n  - components: [fastapi]\n    profile: ghost\n";
        let err = TemplateStore::from_yaml(yaml, MemoryAssets::new()).err().unwrap();
        assert!(err.to_string().contains("unknown profile 'ghost'"));
    }

    #[test]
    fn rejects_profile_with_unknown_template() {
        let yaml = "version: 1\nprofiles:\n  p:\n    components: [python]\n    template: nope\n";
        let err = TemplateStore::from_yaml(yaml, MemoryAssets::new()).err().unwrap();
        assert!(err.to_string().contains("unknown template 'nope'"));
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = TemplateStore::from_yaml("version: 9\n", MemoryAssets::new()).err().unwrap();
        assert!(err.to_string().contains("unsupported catalog version 9"));
    }

    #[test]
    fn dependency_source_display() {
        assert_eq!(DependencySource::Component(Component::Redis).to_string(), "redis");
        assert_eq!(
            DependencySource::Template("ai-llm".to_string()).to_string(),
            "template:ai-llm"
        );
    }
}
