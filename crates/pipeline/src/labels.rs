//! Class label codec
//!
//! Maps arbitrary numeric class labels to dense codes `0..K` in order of
//! first appearance, and maps predicted codes back to labels.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bijection between class labels and dense codes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelCodec {
    classes: Vec<f64>,
    #[serde(skip)]
    index: HashMap<u64, usize>,
}

/// Hash key for exact label equality; `-0.0` and `0.0` share a key.
fn label_key(label: f64) -> u64 {
    if label == 0.0 {
        0.0f64.to_bits()
    } else {
        label.to_bits()
    }
}

impl LabelCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from an ordered class list, e.g. after deserialization.
    pub fn from_classes(classes: Vec<f64>) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(i, &label)| (label_key(label), i))
            .collect();
        Self { classes, index }
    }

    /// Reset the codec and encode `labels`, assigning codes in order of
    /// first appearance.
    pub fn encode(&mut self, labels: &[f64]) -> Vec<f32> {
        self.classes.clear();
        self.index.clear();

        labels
            .iter()
            .map(|&label| {
                let next = self.classes.len();
                let code = *self.index.entry(label_key(label)).or_insert(next);
                if code == next {
                    self.classes.push(label);
                }
                code as f32
            })
            .collect()
    }

    /// Map predicted codes back to labels.
    ///
    /// Codes are rounded to the nearest integer; a code that is not finite
    /// or falls outside `0..K` after rounding decodes to `None`.
    /// Must be called on a codec populated by [`encode`](Self::encode) or
    /// restored with [`from_classes`](Self::from_classes); an empty codec
    /// decodes everything to `None`.
    pub fn decode(&self, codes: &[f32]) -> Vec<Option<f64>> {
        codes.iter().map(|&code| self.decode_one(code)).collect()
    }

    fn decode_one(&self, code: f32) -> Option<f64> {
        if !code.is_finite() {
            return None;
        }
        let rounded = code.round();
        if rounded < 0.0 {
            return None;
        }
        self.classes.get(rounded as usize).copied()
    }

    /// Original labels, indexed by code.
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_first_seen_order() {
        let mut codec = LabelCodec::new();
        let codes = codec.encode(&[5.0, 7.0, 5.0, 9.0]);

        assert_eq!(codes, vec![0.0, 1.0, 0.0, 2.0]);
        assert_eq!(codec.classes(), &[5.0, 7.0, 9.0]);
        assert_eq!(codec.decode(&[0.0, 2.0, 1.0]), vec![Some(5.0), Some(9.0), Some(7.0)]);
    }

    #[test]
    fn test_decode_rounds_to_nearest() {
        let mut codec = LabelCodec::new();
        codec.encode(&[3.0, 4.0]);
        assert_eq!(codec.decode(&[0.4, 0.6, 1.49]), vec![Some(3.0), Some(4.0), Some(4.0)]);
    }

    #[test]
    fn test_decode_out_of_range_is_unknown() {
        let mut codec = LabelCodec::new();
        codec.encode(&[1.0, 2.0]);
        assert_eq!(
            codec.decode(&[-1.0, 2.0, 7.6, f32::NAN, f32::INFINITY, -0.4]),
            vec![None, None, None, None, None, Some(1.0)]
        );
    }

    #[test]
    fn test_sentinel_like_label_is_a_normal_class() {
        let mut codec = LabelCodec::new();
        codec.encode(&[-999.0, 1.0]);
        assert_eq!(codec.decode(&[0.0, 5.0]), vec![Some(-999.0), None]);
    }

    #[test]
    fn test_negative_zero_matches_zero() {
        let mut codec = LabelCodec::new();
        assert_eq!(codec.encode(&[0.0, -0.0, 1.0]), vec![0.0, 0.0, 1.0]);
        assert_eq!(codec.num_classes(), 2);
    }

    #[test]
    fn test_reencode_replaces_state() {
        let mut codec = LabelCodec::new();
        codec.encode(&[1.0, 2.0, 3.0]);
        codec.encode(&[8.0]);
        assert_eq!(codec.classes(), &[8.0]);
        assert_eq!(codec.decode(&[1.0]), vec![None]);
    }

    #[test]
    fn test_empty_codec_decodes_unknown() {
        assert_eq!(LabelCodec::new().decode(&[0.0]), vec![None]);
    }

    #[test]
    fn test_serde_restores_index() -> anyhow::Result<()> {
        let mut codec = LabelCodec::new();
        codec.encode(&[2.5, -1.0]);

        let json = serde_json::to_string(&codec)?;
        let restored: LabelCodec = serde_json::from_str(&json)?;
        let restored = LabelCodec::from_classes(restored.classes().to_vec());

        assert_eq!(restored, codec);
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_round_trip(labels in proptest::collection::vec(-50i32..50, 0..100)) {
            let labels: Vec<f64> = labels.into_iter().map(|l| l as f64 * 0.5).collect();
            let mut codec = LabelCodec::new();
            let codes = codec.encode(&labels);
            let decoded: Vec<f64> = codec.decode(&codes).into_iter().map(|d| d.unwrap()).collect();
            prop_assert_eq!(decoded, labels);
        }
    }
}
