use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::Compression;
use flate2::write::GzEncoder;

use super::gbrt::{RegressionTree, TreeNode};
use super::*;
use crate::catalog::FEATURE_COUNT;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_yield_model_test_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

const SPLIT_MODEL: &str = r#"{
  "n_features_in": 20,
  "init": 10.0,
  "learning_rate": 0.5,
  "trees": [
    {"nodes": [
      {"feature": 0, "threshold": 0.3, "left": 1, "right": 2},
      {"value": 2.0},
      {"value": 4.0}
    ]},
    {"nodes": [{"value": -1.0}]}
  ]
}"#;

fn features_with_first(x0: f64) -> Vec<f64> {
    let mut v = vec![0.0; FEATURE_COUNT];
    v[0] = x0;
    v
}

#[test]
fn test_missing_artifact_selects_stub() {
    let dir = make_temp_dir();
    let regressor = load_regressor(&dir.join("absent.json")).unwrap();
    assert_eq!(regressor.mode(), ModelMode::Stub);
    assert_eq!(regressor.expected_feature_count(), Some(FEATURE_COUNT));
    assert_eq!(regressor.predict(&features_with_first(9.0)).unwrap(), STUB_PREDICTION);
    assert!(regressor.describe_source().starts_with("stub ("));
}

#[test]
fn test_load_json_artifact_and_predict() {
    let dir = make_temp_dir();
    let path = dir.join("model.json");
    fs::write(&path, SPLIT_MODEL).unwrap();

    let regressor = load_regressor(&path).unwrap();
    assert_eq!(regressor.mode(), ModelMode::Real);
    assert_eq!(regressor.expected_feature_count(), Some(20));
    // 10 + 0.5 * (2 - 1)
    assert_eq!(regressor.predict(&features_with_first(0.1)).unwrap(), 10.5);
    // threshold is inclusive on the left branch
    assert_eq!(regressor.predict(&features_with_first(0.3)).unwrap(), 10.5);
    // 10 + 0.5 * (4 - 1)
    assert_eq!(regressor.predict(&features_with_first(0.9)).unwrap(), 11.5);
}

#[test]
fn test_load_gz_artifact() {
    let dir = make_temp_dir();
    let path = dir.join("model.json.gz");
    let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    enc.write_all(SPLIT_MODEL.as_bytes()).unwrap();
    enc.finish().unwrap();

    let model = load_model(&path).unwrap();
    assert_eq!(model.n_trees(), 2);
}

#[test]
fn test_malformed_artifact_is_an_error_not_a_stub() {
    let dir = make_temp_dir();
    let path = dir.join("broken.json");
    fs::write(&path, "{\"init\": 1.0").unwrap();
    let err = load_regressor(&path).unwrap_err();
    assert!(matches!(err, ModelError::Json(_)));
}

#[test]
fn test_backward_child_rejected_on_load() {
    let dir = make_temp_dir();
    let path = dir.join("cycle.json");
    fs::write(
        &path,
        r#"{"init": 0.0, "learning_rate": 0.1, "trees": [{"nodes": [
            {"feature": 0, "threshold": 1.0, "left": 0, "right": 1},
            {"value": 1.0}
        ]}]}"#,
    )
    .unwrap();
    assert!(load_model(&path).is_err());
}

#[test]
fn test_tree_validation() {
    let cyclic = RegressionTree {
        nodes: vec![
            TreeNode::Split {
                feature: 0,
                threshold: 1.0,
                left: 1,
                right: 0,
            },
            TreeNode::Leaf { value: 1.0 },
        ],
    };
    assert!(matches!(
        GradientBoostingModel::new(None, 0.0, 0.1, vec![cyclic]),
        Err(ModelError::Invalid(_))
    ));

    let wide = RegressionTree {
        nodes: vec![
            TreeNode::Split {
                feature: 5,
                threshold: 1.0,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { value: 1.0 },
            TreeNode::Leaf { value: 2.0 },
        ],
    };
    assert!(GradientBoostingModel::new(Some(5), 0.0, 0.1, vec![wide.clone()]).is_err());
    assert!(GradientBoostingModel::new(Some(6), 0.0, 0.1, vec![wide]).is_ok());

    let empty = RegressionTree { nodes: vec![] };
    assert!(GradientBoostingModel::new(None, 0.0, 0.1, vec![empty]).is_err());
    assert!(GradientBoostingModel::new(None, f64::NAN, 0.1, vec![]).is_err());
}

#[test]
fn test_undeclared_width_reports_short_vector() {
    let tree = RegressionTree {
        nodes: vec![
            TreeNode::Split {
                feature: 3,
                threshold: 0.0,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { value: 1.0 },
            TreeNode::Leaf { value: 2.0 },
        ],
    };
    let model = GradientBoostingModel::new(None, 0.0, 1.0, vec![tree]).unwrap();
    assert_eq!(model.expected_feature_count(), None);
    assert_eq!(
        model.predict(&[0.0, 0.0]),
        Err(InferenceError::FeatureOutOfRange { feature: 3, len: 2 })
    );
    assert_eq!(model.predict(&[0.0, 0.0, 0.0, 1.0]).unwrap(), 2.0);
}
