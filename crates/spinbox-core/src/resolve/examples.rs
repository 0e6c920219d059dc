use crate::catalog::{AssetOwner, ExampleAsset, ExampleQuery, TemplateStore};
use crate::request::ProjectRequest;
use serde::Serialize;
use std::collections::BTreeMap;

/// A non-fatal problem found while staging example assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionWarning {
    pub owner: AssetOwner,
    pub source: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExampleResolution {
    /// Staged assets, unique by destination path, sorted by path.
    pub assets: Vec<ExampleAsset>,
    pub warnings: Vec<ResolutionWarning>,
}

impl ExampleResolution {
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Stage the example assets for `request`.
///
/// Single-component assets come from the requested components. Combination
/// assets apply when every member is in the effective set and at least one
/// member was requested now, so `add` picks up combinations it completes.
/// Profile-gated combinations also need the project's profile to match.
/// Profile assets are staged last and win destination collisions.
pub fn resolve_examples(store: &TemplateStore, request: &ProjectRequest) -> ExampleResolution {
    let mut resolution = ExampleResolution::default();
    if !request.with_examples() {
        return resolution;
    }

    let effective = request.effective_components();
    let query = ExampleQuery {
        requested: request.components(),
        effective: &effective,
        project_profile: request.project_profile(),
        bundle: request.profile().and_then(|p| store.profile(p).ok()),
    };
    let staged = store.lookup_examples(&query);

    let mut by_path: BTreeMap<String, ExampleAsset> = BTreeMap::new();
    for asset in staged {
        if store.asset_content(&asset.source).is_none() {
            tracing::warn!(
                owner = %asset.owner,
                source = %asset.source,
                "example asset missing from template store, skipping"
            );
            resolution.warnings.push(ResolutionWarning {
                message: format!("asset '{}' not found", asset.source),
                owner: asset.owner,
                source: asset.source,
            });
            continue;
        }
        if let Some(prev) = by_path.get(&asset.path) {
            tracing::debug!(
                path = %asset.path,
                replaced = %prev.owner,
                by = %asset.owner,
                "example path collision"
            );
        }
        by_path.insert(asset.path.clone(), asset);
    }
    resolution.assets = by_path.into_values().collect();
    resolution
}
