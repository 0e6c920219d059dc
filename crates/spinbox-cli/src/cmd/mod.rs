pub mod add;
pub mod config;
pub mod create;
pub mod profiles;
pub mod status;

use anyhow::Context;
use clap::Args;
use spinbox_core::config::GlobalConfig;
use spinbox_core::scaffold::ScaffoldOptions;
use spinbox_core::{paths, Component, TemplateStore};
use std::path::PathBuf;

/// Global options shared by every command.
pub struct CliContext {
    pub root: PathBuf,
    pub config_dir: Option<PathBuf>,
    pub json: bool,
}

impl CliContext {
    pub fn user_dir(&self) -> anyhow::Result<PathBuf> {
        Ok(paths::user_dir(self.config_dir.as_deref())?)
    }

    pub fn global_config(&self) -> anyhow::Result<GlobalConfig> {
        let dir = self.user_dir()?;
        GlobalConfig::load(&dir)
            .with_context(|| format!("failed to load {}", paths::global_config_path(&dir).display()))
    }
}

pub fn load_store() -> anyhow::Result<TemplateStore> {
    TemplateStore::builtin().context("failed to load built-in catalog")
}

pub fn scaffold_options(cfg: &GlobalConfig) -> ScaffoldOptions {
    ScaffoldOptions {
        python_version: cfg.python_version.clone(),
        node_version: cfg.node_version.clone(),
    }
}

// ---------------------------------------------------------------------------
// Shared flag groups
// ---------------------------------------------------------------------------

#[derive(Args, Debug, Default)]
pub struct ComponentFlags {
    /// Python base environment
    #[arg(long)]
    pub python: bool,
    /// Node.js base environment
    #[arg(long)]
    pub node: bool,
    /// FastAPI backend
    #[arg(long)]
    pub fastapi: bool,
    /// Next.js frontend
    #[arg(long)]
    pub nextjs: bool,
    /// PostgreSQL database
    #[arg(long)]
    pub postgresql: bool,
    /// MongoDB database
    #[arg(long)]
    pub mongodb: bool,
    /// Redis cache
    #[arg(long)]
    pub redis: bool,
    /// Chroma vector database
    #[arg(long)]
    pub chroma: bool,
    /// Component by name (repeatable)
    #[arg(long = "component", value_name = "NAME")]
    pub names: Vec<String>,
}

impl ComponentFlags {
    pub fn selected(&self) -> Vec<Component> {
        [
            (self.chroma, Component::Chroma),
            (self.fastapi, Component::Fastapi),
            (self.mongodb, Component::Mongodb),
            (self.nextjs, Component::Nextjs),
            (self.node, Component::Node),
            (self.postgresql, Component::Postgresql),
            (self.python, Component::Python),
            (self.redis, Component::Redis),
        ]
        .into_iter()
        .filter_map(|(on, c)| on.then_some(c))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.selected().is_empty() && self.names.is_empty()
    }
}

#[derive(Args, Debug, Default)]
pub struct GenerateFlags {
    /// Write requirements.txt / package.json and install scripts
    #[arg(long)]
    pub with_deps: bool,
    /// Copy example code for the selected components
    #[arg(long)]
    pub with_examples: bool,
}

impl GenerateFlags {
    /// Flags OR'd with the user's configured defaults.
    pub fn resolve(&self, cfg: &GlobalConfig) -> (bool, bool) {
        (
            self.with_deps || cfg.with_deps,
            self.with_examples || cfg.with_examples,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_is_lexical() {
        let flags = ComponentFlags {
            redis: true,
            fastapi: true,
            ..Default::default()
        };
        assert_eq!(flags.selected(), vec![Component::Fastapi, Component::Redis]);
        assert!(!flags.is_empty());
        assert!(ComponentFlags::default().is_empty());
    }

    #[test]
    fn config_defaults_enable_generation() {
        let cfg = GlobalConfig {
            with_examples: true,
            ..Default::default()
        };
        assert_eq!(GenerateFlags::default().resolve(&cfg), (false, true));
    }
}
