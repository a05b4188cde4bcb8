pub mod json;
pub mod text;

use crate::model::{ModelMode, Regressor};
use crate::pipeline::Prediction;

pub const YIELD_UNIT: &str = "kg";

#[derive(Debug, Clone)]
pub struct ReportData<'a> {
    pub tool_name: String,
    pub tool_version: String,
    pub prediction: &'a Prediction,
    pub model_source: String,
    pub stub_reason: Option<String>,
}

impl<'a> ReportData<'a> {
    pub fn new(prediction: &'a Prediction, regressor: &Regressor) -> Self {
        let stub_reason = match regressor {
            Regressor::Stub { reason, .. } => Some(reason.clone()),
            Regressor::Real { .. } => None,
        };
        Self {
            tool_name: "kira-yield".to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            prediction,
            model_source: regressor.describe_source(),
            stub_reason,
        }
    }

    pub fn is_stub(&self) -> bool {
        self.prediction.mode == ModelMode::Stub
    }
}

/// One decimal place with the yield unit, e.g. `125.0 kg`.
pub fn format_yield(v: f64) -> String {
    format!("{:.1} {}", v, YIELD_UNIT)
}

pub fn format_reading(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{} {}", v, unit),
        None => "not entered".to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
