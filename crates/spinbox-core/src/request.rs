use crate::catalog::TemplateStore;
use crate::error::{Result, SpinboxError};
use crate::types::Component;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Create,
    Add,
}

/// One scaffolding invocation: what to resolve and where to write it.
///
/// Built through [`RequestBuilder::build`], which validates every name
/// against the template store before anything touches the filesystem.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectRequest {
    target: PathBuf,
    mode: Mode,
    components: BTreeSet<Component>,
    existing: BTreeSet<Component>,
    profile: Option<String>,
    recorded_profile: Option<String>,
    template: Option<String>,
    with_deps: bool,
    with_examples: bool,
}

impl ProjectRequest {
    pub fn builder(target: impl Into<PathBuf>, mode: Mode) -> RequestBuilder {
        RequestBuilder {
            target: target.into(),
            mode,
            components: BTreeSet::new(),
            names: Vec::new(),
            profile: None,
            template: None,
            with_deps: false,
            with_examples: false,
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Components requested by this invocation, profile members included.
    pub fn components(&self) -> &BTreeSet<Component> {
        &self.components
    }

    /// Components the project already had before this invocation.
    pub fn existing(&self) -> &BTreeSet<Component> {
        &self.existing
    }

    /// Requested ∪ existing.
    pub fn effective_components(&self) -> BTreeSet<Component> {
        self.components.union(&self.existing).copied().collect()
    }

    /// Profile named by this invocation.
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Profile the project is built from: this invocation's, else the one
    /// recorded when the project was created.
    pub fn project_profile(&self) -> Option<&str> {
        self.profile.as_deref().or(self.recorded_profile.as_deref())
    }

    /// Explicit template, else the profile's default.
    pub fn template_name<'a>(&'a self, store: &'a TemplateStore) -> Option<&'a str> {
        if let Some(t) = self.template.as_deref() {
            return Some(t);
        }
        self.profile
            .as_deref()
            .and_then(|p| store.profile(p).ok())
            .and_then(|p| p.template.as_deref())
    }

    pub fn with_deps(&self) -> bool {
        self.with_deps
    }

    pub fn with_examples(&self) -> bool {
        self.with_examples
    }

    /// Attach the components recorded for an existing project.
    pub fn with_existing(mut self, existing: BTreeSet<Component>) -> Self {
        self.existing = existing;
        self
    }

    /// Attach the profile recorded for an existing project.
    pub fn with_recorded_profile(mut self, profile: Option<String>) -> Self {
        self.recorded_profile = profile;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RequestBuilder {
    target: PathBuf,
    mode: Mode,
    components: BTreeSet<Component>,
    names: Vec<String>,
    profile: Option<String>,
    template: Option<String>,
    with_deps: bool,
    with_examples: bool,
}

impl RequestBuilder {
    pub fn component(mut self, component: Component) -> Self {
        self.components.insert(component);
        self
    }

    pub fn components(mut self, components: impl IntoIterator<Item = Component>) -> Self {
        self.components.extend(components);
        self
    }

    /// Add a component by name; unknown names fail at [`RequestBuilder::build`].
    pub fn component_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    pub fn template(mut self, template: Option<String>) -> Self {
        self.template = template;
        self
    }

    pub fn with_deps(mut self, on: bool) -> Self {
        self.with_deps = on;
        self
    }

    pub fn with_examples(mut self, on: bool) -> Self {
        self.with_examples = on;
        self
    }

    /// Validate names against `store` and expand the profile into components.
    pub fn build(self, store: &TemplateStore) -> Result<ProjectRequest> {
        let mut components = self.components;
        for name in &self.names {
            components.insert(Component::from_str(name)?);
        }
        if let Some(p) = self.profile.as_deref() {
            components.extend(store.profile(p)?.components.iter().copied());
        }
        if let Some(t) = self.template.as_deref() {
            store.template(t)?;
        }
        if components.is_empty() {
            return Err(SpinboxError::EmptyRequest);
        }
        Ok(ProjectRequest {
            target: self.target,
            mode: self.mode,
            components,
            existing: BTreeSet::new(),
            profile: self.profile,
            recorded_profile: None,
            template: self.template,
            with_deps: self.with_deps,
            with_examples: self.with_examples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TemplateStore {
        TemplateStore::builtin().unwrap()
    }

    #[test]
    fn profile_expands_into_components() {
        let req = ProjectRequest::builder("/tmp/p", Mode::Create)
            .profile(Some("api-only".to_string()))
            .build(&store())
            .unwrap();
        let expected: BTreeSet<Component> =
            [Component::Fastapi, Component::Postgresql, Component::Redis].into();
        assert_eq!(req.components(), &expected);
        assert_eq!(req.template_name(&store()), Some("api-development"));
    }

    #[test]
    fn explicit_template_overrides_profile_default() {
        let s = store();
        let req = ProjectRequest::builder("/tmp/p", Mode::Create)
            .profile(Some("ai-llm".to_string()))
            .template(Some("web-scraping".to_string()))
            .build(&s)
            .unwrap();
        assert_eq!(req.template_name(&s), Some("web-scraping"));
    }

    #[test]
    fn unknown_component_name_fails() {
        let err = ProjectRequest::builder("/tmp/p", Mode::Create)
            .component_name("unknown-component")
            .build(&store())
            .unwrap_err();
        assert!(matches!(err, SpinboxError::UnknownComponent(ref n) if n == "unknown-component"));
        assert!(err.is_configuration());
    }

    #[test]
    fn unknown_profile_fails() {
        let err = ProjectRequest::builder("/tmp/p", Mode::Create)
            .profile(Some("mystery".to_string()))
            .build(&store())
            .unwrap_err();
        assert!(matches!(err, SpinboxError::UnknownProfile(_)));
    }

    #[test]
    fn unknown_template_fails() {
        let err = ProjectRequest::builder("/tmp/p", Mode::Create)
            .component(Component::Python)
            .template(Some("nope".to_string()))
            .build(&store())
            .unwrap_err();
        assert!(matches!(err, SpinboxError::UnknownTemplate(_)));
    }

    #[test]
    fn empty_request_fails() {
        let err = ProjectRequest::builder("/tmp/p", Mode::Add)
            .build(&store())
            .unwrap_err();
        assert!(matches!(err, SpinboxError::EmptyRequest));
    }

    #[test]
    fn effective_components_include_existing() {
        let req = ProjectRequest::builder("/tmp/p", Mode::Add)
            .component(Component::Redis)
            .build(&store())
            .unwrap()
            .with_existing([Component::Fastapi].into());
        let eff = req.effective_components();
        assert!(eff.contains(&Component::Redis));
        assert!(eff.contains(&Component::Fastapi));
        assert_eq!(req.components().len(), 1);
    }
}
