pub mod stage1_features;
pub mod stage2_predict;
pub mod stage3_scale;
pub mod stage4_report;

use crate::catalog::{FeatureCatalog, FeatureKey};
use crate::input::Readings;
use crate::model::{InferenceError, ModelMode, Regressor};

use stage1_features::{FeatureVector, build_feature_vector};
use stage2_predict::predict_checked;
use stage3_scale::scale_result;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    #[error("feature {0} was not entered and has no fallback value")]
    MissingFeatureFallback(FeatureKey),
    #[error("feature count does not match the model: expected {expected}, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}

#[derive(Debug, Clone)]
pub struct Prediction {
    pub readings: Readings,
    pub features: FeatureVector,
    pub raw: f64,
    pub scaled: f64,
    pub mode: ModelMode,
}

pub fn run_prediction(
    readings: &Readings,
    catalog: &FeatureCatalog,
    regressor: &Regressor,
) -> Result<Prediction, PredictError> {
    let features = build_feature_vector(readings, catalog)?;
    let raw = predict_checked(regressor, &features)?;
    let scaled = scale_result(raw);
    let mode = regressor.mode();

    tracing::info!(
        mode = mode.as_str(),
        supplied = readings.supplied_count(),
        raw,
        scaled,
        "prediction complete"
    );

    Ok(Prediction {
        readings: *readings,
        features,
        raw,
        scaled,
        mode,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/tests.rs"]
mod tests;
