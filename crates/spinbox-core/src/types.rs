use crate::error::SpinboxError;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Ecosystem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Python,
    Node,
}

impl Ecosystem {
    pub fn all() -> &'static [Ecosystem] {
        &[Ecosystem::Python, Ecosystem::Node]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Ecosystem::Python => "python",
            Ecosystem::Node => "node",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Ecosystem::Python => "Python",
            Ecosystem::Node => "Node.js",
        }
    }

    pub fn manifest_file(self) -> &'static str {
        match self {
            Ecosystem::Python => paths::REQUIREMENTS_TXT,
            Ecosystem::Node => paths::PACKAGE_JSON,
        }
    }

    pub fn setup_script(self) -> &'static str {
        match self {
            Ecosystem::Python => paths::SETUP_PYTHON_DEPS,
            Ecosystem::Node => paths::SETUP_NODEJS_DEPS,
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A selectable unit of project functionality.
///
/// Variants are declared in alphabetical order so the derived `Ord` is the
/// lexical order of component names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Chroma,
    Fastapi,
    Mongodb,
    Nextjs,
    Node,
    Postgresql,
    Python,
    Redis,
}

impl Component {
    pub fn all() -> &'static [Component] {
        &[
            Component::Chroma,
            Component::Fastapi,
            Component::Mongodb,
            Component::Nextjs,
            Component::Node,
            Component::Postgresql,
            Component::Python,
            Component::Redis,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Component::Chroma => "chroma",
            Component::Fastapi => "fastapi",
            Component::Mongodb => "mongodb",
            Component::Nextjs => "nextjs",
            Component::Node => "node",
            Component::Postgresql => "postgresql",
            Component::Python => "python",
            Component::Redis => "redis",
        }
    }

    /// Language ecosystem the component belongs to. `None` for service
    /// components (databases, caches) that serve whichever languages are present.
    pub fn ecosystem(self) -> Option<Ecosystem> {
        match self {
            Component::Python | Component::Fastapi => Some(Ecosystem::Python),
            Component::Node | Component::Nextjs => Some(Ecosystem::Node),
            Component::Postgresql | Component::Mongodb | Component::Redis | Component::Chroma => {
                None
            }
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Component::Chroma => "Chroma vector database",
            Component::Fastapi => "FastAPI backend",
            Component::Mongodb => "MongoDB document database",
            Component::Nextjs => "Next.js frontend",
            Component::Node => "Node.js base environment",
            Component::Postgresql => "PostgreSQL database",
            Component::Python => "Python base environment",
            Component::Redis => "Redis cache and queue",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Component {
    type Err = SpinboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chroma" => Ok(Component::Chroma),
            "fastapi" => Ok(Component::Fastapi),
            "mongodb" => Ok(Component::Mongodb),
            "nextjs" => Ok(Component::Nextjs),
            "node" => Ok(Component::Node),
            "postgresql" => Ok(Component::Postgresql),
            "python" => Ok(Component::Python),
            "redis" => Ok(Component::Redis),
            _ => Err(SpinboxError::UnknownComponent(s.to_string())),
        }
    }
}

/// Join a component set as `a, b, c` for display.
pub fn join_components(set: &BTreeSet<Component>) -> String {
    set.iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// DependencyClass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyClass {
    #[default]
    Runtime,
    Dev,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
