//! Canonical JSON model files
//!
//! A model file is a JSON envelope holding the ensemble, the booster's raw
//! parameters and a BLAKE3 hash of their canonical serialization (sorted
//! keys, no whitespace). The hash is recomputed and compared on load.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::booster::Ensemble;
use crate::errors::EngineError;

/// Format tag written into every model file.
pub const MODEL_FORMAT: &str = "boostlab-gbdt";
pub const MODEL_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ModelBody {
    format: String,
    version: u32,
    params: BTreeMap<String, String>,
    model: Ensemble,
}

#[derive(Debug, Serialize, Deserialize)]
struct ModelFile {
    hash: String,
    body: ModelBody,
}

/// Serialize a value to canonical JSON (sorted keys, no whitespace).
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let canonical = canonicalize(serde_json::to_value(value)?);
    serde_json::to_string(&canonical)
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(elements) => Value::Array(elements.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// BLAKE3 hash of the canonical JSON form, hex encoded.
pub fn hash_canonical_hex<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = to_canonical_json(value)?;
    Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
}

pub fn save_model(
    path: &Path,
    model: &Ensemble,
    params: &BTreeMap<String, String>,
) -> Result<(), EngineError> {
    let body = ModelBody {
        format: MODEL_FORMAT.to_string(),
        version: MODEL_VERSION,
        params: params.clone(),
        model: model.clone(),
    };
    let file = ModelFile {
        hash: hash_canonical_hex(&body)?,
        body,
    };

    fs::write(path, to_canonical_json(&file)?)?;
    tracing::info!(
        "saved model with {} trees to {}",
        model.trees.len(),
        path.display()
    );
    Ok(())
}

pub fn load_model(path: &Path) -> Result<(Ensemble, BTreeMap<String, String>), EngineError> {
    let json = fs::read_to_string(path)?;
    let file: ModelFile = serde_json::from_str(&json)?;

    if file.body.format != MODEL_FORMAT || file.body.version != MODEL_VERSION {
        return Err(EngineError::UnsupportedFormat(format!(
            "{} v{}",
            file.body.format, file.body.version
        )));
    }

    let actual = hash_canonical_hex(&file.body)?;
    if actual != file.hash {
        return Err(EngineError::HashMismatch {
            expected: file.hash,
            actual,
        });
    }

    file.body.model.validate()?;
    Ok((file.body.model, file.body.params))
}
