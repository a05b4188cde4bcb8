use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

pub mod gbrt;
pub mod stub;

pub use gbrt::GradientBoostingModel;
pub use stub::{STUB_PREDICTION, StubModel};

pub const DEFAULT_MODEL_PATH: &str = "trained_gradient_boosting_model.json";

/// Inference capability of a regression model.
pub trait Predictor {
    /// Input width the model was trained with, when it declares one.
    fn expected_feature_count(&self) -> Option<usize>;

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("model reads feature {feature} but the vector has {len} values")]
    FeatureOutOfRange { feature: usize, len: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model file not found: {}", .0.display())]
    Unavailable(PathBuf),
    #[error("IO error reading model: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed model artifact: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelMode {
    Real,
    Stub,
}

impl ModelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelMode::Real => "real",
            ModelMode::Stub => "stub",
        }
    }
}

/// The model in use for the process lifetime: either the trained artifact or the stub
/// standing in for it.
#[derive(Debug, Clone)]
pub enum Regressor {
    Real {
        model: GradientBoostingModel,
        source: PathBuf,
    },
    Stub {
        model: StubModel,
        reason: String,
    },
}

impl Regressor {
    pub fn stub(reason: impl Into<String>) -> Self {
        Regressor::Stub {
            model: StubModel::default(),
            reason: reason.into(),
        }
    }

    pub fn mode(&self) -> ModelMode {
        match self {
            Regressor::Real { .. } => ModelMode::Real,
            Regressor::Stub { .. } => ModelMode::Stub,
        }
    }

    pub fn describe_source(&self) -> String {
        match self {
            Regressor::Real { source, .. } => source.display().to_string(),
            Regressor::Stub { reason, .. } => format!("stub ({})", reason),
        }
    }
}

impl Predictor for Regressor {
    fn expected_feature_count(&self) -> Option<usize> {
        match self {
            Regressor::Real { model, .. } => model.expected_feature_count(),
            Regressor::Stub { model, .. } => model.expected_feature_count(),
        }
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        match self {
            Regressor::Real { model, .. } => model.predict(features),
            Regressor::Stub { model, .. } => model.predict(features),
        }
    }
}

pub fn load_model(path: &Path) -> Result<GradientBoostingModel, ModelError> {
    if !path.exists() {
        return Err(ModelError::Unavailable(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    let model: GradientBoostingModel = serde_json::from_reader(BufReader::new(reader))?;
    Ok(model)
}

/// Loads the trained model once at startup. A missing artifact degrades to the stub;
/// any other failure is returned.
pub fn load_regressor(path: &Path) -> Result<Regressor, ModelError> {
    match load_model(path) {
        Ok(model) => {
            tracing::info!(
                path = %path.display(),
                trees = model.n_trees(),
                width = ?model.expected_feature_count(),
                "loaded trained model"
            );
            Ok(Regressor::Real {
                model,
                source: path.to_path_buf(),
            })
        }
        Err(err @ ModelError::Unavailable(_)) => {
            tracing::warn!(
                "{}; falling back to stub model returning {:.1}",
                err,
                STUB_PREDICTION
            );
            Ok(Regressor::stub(err.to_string()))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/tests.rs"]
mod tests;
