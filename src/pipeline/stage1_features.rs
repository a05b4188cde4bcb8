use crate::catalog::{FeatureCatalog, FeatureKey};
use crate::input::Readings;
use crate::pipeline::PredictError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    User,
    Fallback,
}

/// Model input aligned to catalog order. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    keys: Vec<FeatureKey>,
    values: Vec<f64>,
    sources: Vec<ValueSource>,
}

impl FeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, f64, ValueSource)> + '_ {
        self.keys
            .iter()
            .zip(self.values.iter())
            .zip(self.sources.iter())
            .map(|((k, v), s)| (*k, *v, *s))
    }
}

/// One user reading stands in for all four variants of its quantity; anything not
/// entered takes the catalog fallback of that exact feature.
pub fn build_feature_vector(
    readings: &Readings,
    catalog: &FeatureCatalog,
) -> Result<FeatureVector, PredictError> {
    let n = catalog.len();
    let mut keys = Vec::with_capacity(n);
    let mut values = Vec::with_capacity(n);
    let mut sources = Vec::with_capacity(n);

    for &key in catalog.entries() {
        let (value, source) = match readings.get(key.quantity) {
            Some(v) => (v, ValueSource::User),
            None => match catalog.fallback(key) {
                Some(v) => (v, ValueSource::Fallback),
                None => return Err(PredictError::MissingFeatureFallback(key)),
            },
        };
        keys.push(key);
        values.push(value);
        sources.push(source);
    }

    Ok(FeatureVector {
        keys,
        values,
        sources,
    })
}
