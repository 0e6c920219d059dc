use rust_embed::Embed;
use std::collections::BTreeMap;

/// Path of the catalog inside the built-in asset tree.
pub const CATALOG_PATH: &str = "catalog.yaml";

#[derive(Embed)]
#[folder = "templates/"]
struct BuiltinAssets;

/// Read-only source of catalog and example-template bytes.
pub trait AssetSource: Send + Sync {
    fn get(&self, path: &str) -> Option<Vec<u8>>;
}

/// Assets compiled into the binary from `crates/spinbox-core/templates/`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedAssets;

impl AssetSource for EmbeddedAssets {
    fn get(&self, path: &str) -> Option<Vec<u8>> {
        <BuiltinAssets as Embed>::get(path).map(|f| f.data.into_owned())
    }
}

/// In-memory assets, keyed by relative path.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssets {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

impl AssetSource for MemoryAssets {
    fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_present() {
        let data = EmbeddedAssets.get(CATALOG_PATH).expect("catalog embedded");
        assert!(!data.is_empty());
    }

    #[test]
    fn embedded_missing_is_none() {
        assert!(EmbeddedAssets.get("does/not/exist.py").is_none());
    }

    #[test]
    fn memory_assets_lookup() {
        let assets = MemoryAssets::new().with("a.py", "print(1)");
        assert_eq!(assets.get("a.py").unwrap(), b"print(1)");
        assert!(assets.get("b.py").is_none());
    }
}
