use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::stage1_features::{ValueSource, build_feature_vector};
use super::stage2_predict::predict_checked;
use super::stage3_scale::{YIELD_MULTIPLIER, scale_result};
use super::stage4_report::{REPORT_JSON_FILE, REPORT_TEXT_FILE, write_reports};
use super::*;
use crate::catalog::{CatalogSource, FEATURE_COUNT, Quantity, Variant};
use crate::model::{ModelMode, Predictor, STUB_PREDICTION};
use crate::report::{ReportData, format_yield};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> std::path::PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_yield_pipeline_test_{}_{}", std::process::id(), id));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

struct CountingPredictor {
    width: Option<usize>,
    value: f64,
    calls: Cell<usize>,
}

impl CountingPredictor {
    fn new(width: Option<usize>, value: f64) -> Self {
        Self {
            width,
            value,
            calls: Cell::new(0),
        }
    }
}

impl Predictor for CountingPredictor {
    fn expected_feature_count(&self) -> Option<usize> {
        self.width
    }

    fn predict(&self, _features: &[f64]) -> Result<f64, InferenceError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.value)
    }
}

fn fallback_vector(catalog: &FeatureCatalog) -> Vec<f64> {
    catalog
        .entries()
        .iter()
        .map(|k| catalog.fallback(*k).unwrap())
        .collect()
}

#[test]
fn test_all_absent_uses_full_fallback_vector() {
    let catalog = FeatureCatalog::builtin();
    let features = build_feature_vector(&Readings::default(), &catalog).unwrap();
    assert_eq!(features.len(), FEATURE_COUNT);
    assert_eq!(features.values(), fallback_vector(&catalog).as_slice());
    assert!(features.iter().all(|(_, _, s)| s == ValueSource::Fallback));
}

#[test]
fn test_single_reading_broadcasts_to_its_variants() {
    let catalog = FeatureCatalog::builtin();
    let mut readings = Readings::default();
    readings.set(Quantity::Sunlight, Some(0.5));

    let features = build_feature_vector(&readings, &catalog).unwrap();
    assert_eq!(features.len(), FEATURE_COUNT);
    for (key, value, source) in features.iter() {
        if key.quantity == Quantity::Sunlight {
            assert_eq!(value, 0.5);
            assert_eq!(source, ValueSource::User);
        } else {
            assert_eq!(Some(value), catalog.fallback(key));
            assert_eq!(source, ValueSource::Fallback);
        }
    }
    assert_eq!(&features.values()[..4], &[0.5, 0.5, 0.5, 0.5]);
}

#[test]
fn test_every_supplied_quantity_broadcasts() {
    let catalog = FeatureCatalog::builtin();
    let mut readings = Readings::default();
    for (i, q) in Quantity::ALL.into_iter().enumerate() {
        readings.set(q, Some(i as f64 * 10.0 - 5.0));
    }
    let features = build_feature_vector(&readings, &catalog).unwrap();
    for (key, value, _) in features.iter() {
        assert_eq!(Some(value), readings.get(key.quantity));
    }
}

#[test]
fn test_vector_is_deterministic() {
    let catalog = FeatureCatalog::builtin();
    let mut readings = Readings::default();
    readings.set(Quantity::Co2, Some(420.0));
    readings.set(Quantity::Humidity, Some(75.0));
    let a = build_feature_vector(&readings, &catalog).unwrap();
    let b = build_feature_vector(&readings, &catalog).unwrap();
    assert_eq!(a, b);
    let names_a: Vec<String> = a.iter().map(|(k, _, _)| k.to_string()).collect();
    let names_b: Vec<String> = b.iter().map(|(k, _, _)| k.to_string()).collect();
    assert_eq!(names_a, names_b);
}

#[test]
fn test_missing_fallback_names_the_feature() {
    let builtin = FeatureCatalog::builtin();
    let gap = FeatureKey::new(Quantity::Humidity, Variant::CurrentStd);
    let fallbacks: BTreeMap<FeatureKey, f64> = builtin
        .entries()
        .iter()
        .filter(|k| **k != gap)
        .map(|k| (*k, builtin.fallback(*k).unwrap()))
        .collect();
    let catalog = FeatureCatalog::with_fallbacks(fallbacks, CatalogSource::Builtin);

    let err = build_feature_vector(&Readings::default(), &catalog).unwrap_err();
    assert_eq!(err, PredictError::MissingFeatureFallback(gap));
    assert!(err.to_string().contains("humidity_current_std"));

    let mut readings = Readings::default();
    readings.set(Quantity::Humidity, Some(90.0));
    assert!(build_feature_vector(&readings, &catalog).is_ok());
}

#[test]
fn test_width_mismatch_never_calls_model() {
    let catalog = FeatureCatalog::builtin();
    let features = build_feature_vector(&Readings::default(), &catalog).unwrap();
    let predictor = CountingPredictor::new(Some(19), 1.0);

    let err = predict_checked(&predictor, &features).unwrap_err();
    assert_eq!(
        err,
        PredictError::FeatureCountMismatch {
            expected: 19,
            actual: 20
        }
    );
    assert_eq!(predictor.calls.get(), 0);
}

#[test]
fn test_matching_or_undeclared_width_calls_model_once() {
    let catalog = FeatureCatalog::builtin();
    let features = build_feature_vector(&Readings::default(), &catalog).unwrap();

    let declared = CountingPredictor::new(Some(20), 3.5);
    assert_eq!(predict_checked(&declared, &features).unwrap(), 3.5);
    assert_eq!(declared.calls.get(), 1);

    let undeclared = CountingPredictor::new(None, -2.0);
    assert_eq!(predict_checked(&undeclared, &features).unwrap(), -2.0);
    assert_eq!(undeclared.calls.get(), 1);
}

#[test]
fn test_scaling_is_linear() {
    assert_eq!(YIELD_MULTIPLIER, 5.0);
    for raw in [0.0, 25.0, -4.0, 0.1, 1e6] {
        assert_eq!(scale_result(raw), 5.0 * raw);
    }
}

#[test]
fn test_stub_prediction_with_no_readings() {
    let catalog = FeatureCatalog::builtin();
    let regressor = Regressor::stub("model file not found");
    let prediction = run_prediction(&Readings::default(), &catalog, &regressor).unwrap();
    assert_eq!(prediction.mode, ModelMode::Stub);
    assert_eq!(prediction.raw, STUB_PREDICTION);
    assert_eq!(prediction.scaled, 125.0);
    assert_eq!(format_yield(prediction.scaled), "125.0 kg");
    assert_eq!(prediction.features.values(), fallback_vector(&catalog).as_slice());
}

#[test]
fn test_write_reports_creates_both_files() {
    let catalog = FeatureCatalog::builtin();
    let regressor = Regressor::stub("model file not found");
    let prediction = run_prediction(&Readings::default(), &catalog, &regressor).unwrap();
    let data = ReportData::new(&prediction, &regressor);

    let dir = make_temp_dir().join("out");
    write_reports(&data, &dir).unwrap();

    let text = std::fs::read_to_string(dir.join(REPORT_TEXT_FILE)).unwrap();
    assert!(text.contains("Stub model prediction: 125.0 kg"));
    let json = std::fs::read_to_string(dir.join(REPORT_JSON_FILE)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["result"]["scaled"], 125.0);
}
