//! Booster parameters parsed from string key/value pairs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::errors::EngineError;
use crate::objective::Objective;

/// Typed view of the parameters a native booster understands.
///
/// Unknown keys are accepted and ignored so drivers can pass their own
/// bookkeeping keys (such as `num_boost_round`) straight through.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoosterParams {
    pub objective: Objective,
    pub num_class: usize,
    pub max_depth: usize,
    pub eta: f64,
    pub lambda: f64,
    pub min_child_weight: f64,
    pub base_score: f64,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self {
            objective: Objective::SquaredError,
            num_class: 1,
            max_depth: 6,
            eta: 0.3,
            lambda: 1.0,
            min_child_weight: 1.0,
            base_score: 0.5,
        }
    }
}

impl BoosterParams {
    pub fn from_map(raw: &BTreeMap<String, String>) -> Result<Self, EngineError> {
        let mut params = Self::default();
        for (key, value) in raw {
            params.apply(key, value)?;
        }

        if params.objective.is_multiclass() && params.num_class == 0 {
            return Err(EngineError::InvalidParameter {
                key: "num_class".to_string(),
                value: "0".to_string(),
            });
        }
        if !params.objective.is_multiclass() {
            params.num_class = 1;
        }
        Ok(params)
    }

    /// Validate and apply a single key. Unknown keys are ignored.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), EngineError> {
        match key {
            "objective" => self.objective = value.parse()?,
            "num_class" => self.num_class = parse(key, value)?,
            "max_depth" => self.max_depth = parse(key, value)?,
            "eta" | "learning_rate" => self.eta = parse_non_negative(key, value)?,
            "lambda" | "reg_lambda" => self.lambda = parse_non_negative(key, value)?,
            "min_child_weight" => self.min_child_weight = parse_non_negative(key, value)?,
            "base_score" => self.base_score = parse(key, value)?,
            _ => tracing::trace!("ignoring unrecognised booster parameter `{}`", key),
        }
        Ok(())
    }

    /// Number of output groups (trees grown per round).
    pub fn groups(&self) -> usize {
        if self.objective.is_multiclass() {
            self.num_class
        } else {
            1
        }
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, EngineError> {
    value.trim().parse().map_err(|_| EngineError::InvalidParameter {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_non_negative(key: &str, value: &str) -> Result<f64, EngineError> {
    let parsed: f64 = parse(key, value)?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(EngineError::InvalidParameter {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_known_keys() {
        let params = BoosterParams::from_map(&map(&[
            ("objective", "multi:softmax"),
            ("num_class", "3"),
            ("max_depth", "4"),
            ("eta", "0.05"),
            ("lambda", "2"),
            ("num_boost_round", "25"),
        ]))
        .unwrap();

        assert_eq!(params.objective, Objective::Softmax);
        assert_eq!(params.groups(), 3);
        assert_eq!(params.max_depth, 4);
        assert_eq!(params.eta, 0.05);
        assert_eq!(params.lambda, 2.0);
    }

    #[test]
    fn test_regression_has_single_group() {
        let params = BoosterParams::from_map(&map(&[("num_class", "4")])).unwrap();
        assert_eq!(params.groups(), 1);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(BoosterParams::from_map(&map(&[("max_depth", "deep")])).is_err());
        assert!(BoosterParams::from_map(&map(&[("eta", "-0.1")])).is_err());
        assert!(BoosterParams::from_map(&map(&[("objective", "multi:softmax")])).is_ok());
        assert!(BoosterParams::from_map(&map(&[
            ("objective", "multi:softmax"),
            ("num_class", "0")
        ]))
        .is_err());
    }
}
