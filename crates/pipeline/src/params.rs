//! Boosting hyperparameters

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::errors::{PipelineError, Result};

/// Hyperparameters exposed to the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostParams {
    /// Number of boosting rounds
    pub num_boost_round: usize,
    pub max_depth: usize,
    /// Learning rate
    pub eta: f64,
    /// L2 regularization on leaf weights
    pub lambda: f64,
    /// Additional engine parameters passed through verbatim
    pub extra: BTreeMap<String, String>,
}

impl Default for BoostParams {
    fn default() -> Self {
        Self {
            num_boost_round: 10,
            max_depth: 3,
            eta: 0.1,
            lambda: 1.0,
            extra: BTreeMap::new(),
        }
    }
}

impl BoostParams {
    /// Build from string key/value pairs; unrecognised keys go to `extra`.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            params.set(key, value)?;
        }
        Ok(params)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "num_boost_round" => self.num_boost_round = parse(key, value)?,
            "max_depth" => self.max_depth = parse(key, value)?,
            "eta" => self.eta = parse(key, value)?,
            "lambda" => self.lambda = parse(key, value)?,
            "objective" | "num_class" => {
                return Err(PipelineError::InvalidParameter {
                    key: key.to_string(),
                    value: format!("{value} (set from the task kind)"),
                })
            }
            _ => {
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, value: String| {
            Err(PipelineError::InvalidParameter {
                key: key.to_string(),
                value,
            })
        };

        if self.num_boost_round == 0 {
            return invalid("num_boost_round", "0".to_string());
        }
        if self.max_depth == 0 {
            return invalid("max_depth", "0".to_string());
        }
        if !(self.eta.is_finite() && self.eta > 0.0) {
            return invalid("eta", self.eta.to_string());
        }
        if !(self.lambda.is_finite() && self.lambda >= 0.0) {
            return invalid("lambda", self.lambda.to_string());
        }
        Ok(())
    }

    /// Ordered key/value list to set on a booster.
    pub fn to_engine_params(&self, objective: &str, num_class: Option<usize>) -> Vec<(String, String)> {
        let mut out = vec![
            ("num_boost_round".to_string(), self.num_boost_round.to_string()),
            ("max_depth".to_string(), self.max_depth.to_string()),
            ("eta".to_string(), self.eta.to_string()),
            ("lambda".to_string(), self.lambda.to_string()),
        ];
        out.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        out.push(("objective".to_string(), objective.to_string()));
        if let Some(num_class) = num_class {
            out.push(("num_class".to_string(), num_class.to_string()));
        }
        out
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| PipelineError::InvalidParameter {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = BoostParams::default();
        assert_eq!(params.num_boost_round, 10);
        assert_eq!(params.max_depth, 3);
        assert_eq!(params.eta, 0.1);
        assert_eq!(params.lambda, 1.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_from_pairs() -> anyhow::Result<()> {
        let params = BoostParams::from_pairs([
            ("num_boost_round", "25"),
            ("eta", "0.3"),
            ("min_child_weight", "2"),
        ])?;
        assert_eq!(params.num_boost_round, 25);
        assert_eq!(params.eta, 0.3);
        assert_eq!(params.extra.get("min_child_weight").map(String::as_str), Some("2"));
        Ok(())
    }

    #[test]
    fn test_invalid_values() {
        assert!(BoostParams::from_pairs([("max_depth", "three")]).is_err());
        assert!(BoostParams::from_pairs([("objective", "multi:softmax")]).is_err());

        let zero_rounds = BoostParams {
            num_boost_round: 0,
            ..BoostParams::default()
        };
        assert!(zero_rounds.validate().is_err());

        let negative_lambda = BoostParams {
            lambda: -1.0,
            ..BoostParams::default()
        };
        assert!(negative_lambda.validate().is_err());
    }

    #[test]
    fn test_engine_params_inject_objective() {
        let pairs = BoostParams::default().to_engine_params("multi:softmax", Some(3));
        let last_two: Vec<_> = pairs[pairs.len() - 2..]
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        assert_eq!(last_two, vec!["objective=multi:softmax", "num_class=3"]);
        assert!(pairs.contains(&("max_depth".to_string(), "3".to_string())));
    }
}
