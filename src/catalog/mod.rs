pub mod defs;
pub mod loader;

use std::collections::BTreeMap;
use std::path::PathBuf;

pub use defs::{FEATURE_COUNT, FeatureKey, Quantity, Variant};

use defs::{builtin_fallbacks, feature_order};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Builtin,
    File(PathBuf),
}

/// Ordered model features and the fallback registered for each of them.
///
/// The order never changes; only the fallback table can be swapped out at startup.
#[derive(Debug, Clone)]
pub struct FeatureCatalog {
    entries: [FeatureKey; FEATURE_COUNT],
    fallbacks: BTreeMap<FeatureKey, f64>,
    source: CatalogSource,
}

impl FeatureCatalog {
    pub fn builtin() -> Self {
        let mut fallbacks = BTreeMap::new();
        for def in builtin_fallbacks() {
            for variant in Variant::ALL {
                fallbacks.insert(
                    FeatureKey::new(def.quantity, variant),
                    def.values[variant.index()],
                );
            }
        }
        Self::with_fallbacks(fallbacks, CatalogSource::Builtin)
    }

    pub fn with_fallbacks(fallbacks: BTreeMap<FeatureKey, f64>, source: CatalogSource) -> Self {
        Self {
            entries: feature_order(),
            fallbacks,
            source,
        }
    }

    pub fn entries(&self) -> &[FeatureKey] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn fallback(&self, key: FeatureKey) -> Option<f64> {
        self.fallbacks.get(&key).copied()
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Features that have no registered fallback, in catalog order.
    pub fn missing_fallbacks(&self) -> Vec<FeatureKey> {
        self.entries
            .iter()
            .copied()
            .filter(|key| !self.fallbacks.contains_key(key))
            .collect()
    }

    /// Effective catalog as `name<TAB>fallback` lines; missing fallbacks print as `NA`.
    pub fn render_tsv(&self) -> String {
        let mut out = String::from("feature\tfallback\n");
        for key in &self.entries {
            match self.fallback(*key) {
                Some(v) => out.push_str(&format!("{}\t{}\n", key, v)),
                None => out.push_str(&format!("{}\tNA\n", key)),
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/catalog/tests.rs"]
mod tests;
