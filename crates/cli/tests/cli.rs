//! Runs the `boostlab` binary end to end

use std::path::Path;
use std::process::{Command, Output};

fn boostlab(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_boostlab"))
        .args(args)
        .env_remove("BOOSTLAB_LOG_LEVEL")
        .env_remove("BOOSTLAB_SEED")
        .env_remove("BOOSTLAB_NUM_BOOST_ROUND")
        .output()
        .expect("failed to run boostlab")
}

fn write_dataset(dir: &Path) -> String {
    let mut csv = String::from("a,b,label\n");
    for (class, label) in [1.0, 4.0].iter().enumerate() {
        for i in 0..12 {
            csv.push_str(&format!("{},{},{label}\n", class as f64 * 5.0 + i as f64 * 0.1, i % 2));
        }
    }
    let path = dir.join("data.csv");
    std::fs::write(&path, csv).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_train_then_predict_with_saved_model() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());
    let model = dir.path().join("model.json");
    let train_preds = dir.path().join("train_preds.csv");
    let predict_preds = dir.path().join("predict_preds.csv");

    let out = boostlab(&[
        "train",
        "-i",
        &data,
        "-f",
        "a,b",
        "-t",
        "label",
        "--task",
        "classification",
        "--seed",
        "11",
        "--rounds",
        "5",
        "-m",
        model.to_str().unwrap(),
        "-p",
        train_preds.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(model.exists());

    let out = boostlab(&[
        "predict",
        "-i",
        &data,
        "-f",
        "a,b",
        "-t",
        "label",
        "--task",
        "classification",
        "--seed",
        "11",
        "-m",
        model.to_str().unwrap(),
        "-p",
        predict_preds.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    // Same seed, same split, same model.
    let trained = std::fs::read_to_string(&train_preds).unwrap();
    let predicted = std::fs::read_to_string(&predict_preds).unwrap();
    assert!(trained.starts_with("y_true,y_pred\n"));
    assert_eq!(trained, predicted);
}

#[test]
fn test_unknown_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());

    let out = boostlab(&["train", "-i", &data, "-f", "a,missing", "-t", "label"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing"));
}

#[test]
fn test_inspect_reports_columns() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path());

    let out = boostlab(&["inspect", "-i", &data]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("24 rows, 3 columns"));
    assert!(stdout.contains("label: min=1, max=4"));
}
