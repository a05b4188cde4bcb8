use crate::model::Predictor;
use crate::pipeline::PredictError;
use crate::pipeline::stage1_features::FeatureVector;

/// Runs inference after checking the vector against the width the model declares.
/// On a width mismatch the model is never called.
pub fn predict_checked<P: Predictor + ?Sized>(
    predictor: &P,
    features: &FeatureVector,
) -> Result<f64, PredictError> {
    let actual = features.len();
    if let Some(expected) = predictor.expected_feature_count() {
        if expected != actual {
            return Err(PredictError::FeatureCountMismatch { expected, actual });
        }
    }
    let raw = predictor.predict(features.values())?;
    tracing::debug!(raw, width = actual, "model inference complete");
    Ok(raw)
}
