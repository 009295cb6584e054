//! Integration tests for the native engine through the `BoostingEngine` API

use anyhow::{anyhow, Result};
use boostlab_engine::{BoostingEngine, EngineResult, InfoField, NativeEngine};
use tempfile::tempdir;

fn check<T>(engine: &NativeEngine, result: EngineResult<T>) -> Result<T> {
    result.map_err(|status| anyhow!("{status}: {}", engine.last_error()))
}

/// Three well separated clusters on one feature.
fn cluster_data() -> (Vec<f32>, Vec<f32>) {
    let mut features = Vec::new();
    let mut labels = Vec::new();
    for class in 0..3 {
        for i in 0..6 {
            features.push(class as f32 * 10.0 + i as f32 * 0.1);
            features.push(1.0);
            labels.push(class as f32);
        }
    }
    (features, labels)
}

#[test]
fn test_multiclass_training_separates_clusters() -> Result<()> {
    let engine = NativeEngine::new();
    let (features, labels) = cluster_data();

    let mut train = check(&engine, engine.matrix_from_dense(&features, 18, 2, f32::NAN))?;
    check(&engine, engine.set_float_info(&mut train, InfoField::Label, &labels))?;

    let mut booster = check(&engine, engine.create_booster(&[&train]))?;
    for (key, value) in [
        ("objective", "multi:softmax"),
        ("num_class", "3"),
        ("max_depth", "3"),
        ("eta", "0.5"),
        ("min_child_weight", "0"),
    ] {
        check(&engine, engine.set_param(&mut booster, key, value))?;
    }

    for i in 0..10 {
        check(&engine, engine.update_one_iter(&mut booster, i, &train))?;
    }

    let preds = check(&engine, engine.predict(&booster, &train))?;
    assert_eq!(preds, labels);
    Ok(())
}

#[test]
fn test_saved_model_reloads_with_identical_predictions() -> Result<()> {
    let engine = NativeEngine::new();
    let dir = tempdir()?;
    let path = dir.path().join("reg.model");

    let features: Vec<f32> = (0..20).map(|i| i as f32).collect();
    let labels: Vec<f32> = (0..20).map(|i| (i * 3) as f32).collect();

    let mut train = check(&engine, engine.matrix_from_dense(&features, 20, 1, f32::NAN))?;
    check(&engine, engine.set_float_info(&mut train, InfoField::Label, &labels))?;
    let mut booster = check(&engine, engine.create_booster(&[&train]))?;
    check(&engine, engine.set_param(&mut booster, "max_depth", "3"))?;
    for i in 0..4 {
        check(&engine, engine.update_one_iter(&mut booster, i, &train))?;
    }
    check(&engine, engine.save_model(&booster, &path))?;

    let mut loaded = check(&engine, engine.create_booster(&[]))?;
    check(&engine, engine.load_model(&mut loaded, &path))?;

    assert_eq!(
        check(&engine, engine.predict(&booster, &train))?,
        check(&engine, engine.predict(&loaded, &train))?
    );
    Ok(())
}

#[test]
fn test_loading_missing_file_reports_error() -> Result<()> {
    let engine = NativeEngine::new();
    let dir = tempdir()?;
    let mut booster = check(&engine, engine.create_booster(&[]))?;

    assert!(engine
        .load_model(&mut booster, &dir.path().join("absent.model"))
        .is_err());
    assert!(engine.last_error().starts_with("I/O error"));
    Ok(())
}

#[test]
fn test_feature_count_mismatch_on_predict() -> Result<()> {
    let engine = NativeEngine::new();
    let mut train = check(&engine, engine.matrix_from_dense(&[1.0, 2.0, 3.0, 4.0], 2, 2, f32::NAN))?;
    check(&engine, engine.set_float_info(&mut train, InfoField::Label, &[0.0, 1.0]))?;
    let mut booster = check(&engine, engine.create_booster(&[&train]))?;
    check(&engine, engine.update_one_iter(&mut booster, 0, &train))?;

    let narrow = check(&engine, engine.matrix_from_dense(&[1.0], 1, 1, f32::NAN))?;
    assert!(engine.predict(&booster, &narrow).is_err());
    assert!(engine.last_error().contains("expects 2 features"));
    Ok(())
}
