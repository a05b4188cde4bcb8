use crate::catalog::FEATURE_COUNT;
use crate::model::{InferenceError, Predictor};

/// Raw value returned when no trained model is available.
pub const STUB_PREDICTION: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StubModel {
    pub value: f64,
    pub n_features_in: usize,
}

impl Default for StubModel {
    fn default() -> Self {
        Self {
            value: STUB_PREDICTION,
            n_features_in: FEATURE_COUNT,
        }
    }
}

impl Predictor for StubModel {
    fn expected_feature_count(&self) -> Option<usize> {
        Some(self.n_features_in)
    }

    fn predict(&self, _features: &[f64]) -> Result<f64, InferenceError> {
        Ok(self.value)
    }
}
