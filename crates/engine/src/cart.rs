//! CART (Classification and Regression Tree) builder
//!
//! Exact-greedy second-order tree construction: every distinct feature value
//! is a split candidate, scored by `G^2 / (H + lambda)`.

use crate::matrix::DenseMatrix;
use crate::tree::{Node, Tree};

const MIN_SPLIT_GAIN: f64 = 1e-10;

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_child_weight: f64,
    pub lambda: f64,
    pub eta: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_child_weight: 1.0,
            lambda: 1.0,
            eta: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f32,
    gain: f64,
}

/// Build a regression tree over gradient statistics using exact-greedy CART.
pub struct CartBuilder<'a> {
    matrix: &'a DenseMatrix,
    gradients: &'a [f64],
    hessians: &'a [f64],
    config: TreeConfig,
}

impl<'a> CartBuilder<'a> {
    pub fn new(
        matrix: &'a DenseMatrix,
        gradients: &'a [f64],
        hessians: &'a [f64],
        config: TreeConfig,
    ) -> Self {
        debug_assert_eq!(matrix.rows(), gradients.len());
        debug_assert_eq!(matrix.rows(), hessians.len());

        Self {
            matrix,
            gradients,
            hessians,
            config,
        }
    }

    /// Build a tree for output group `group`.
    pub fn build(&self, group: usize) -> Tree {
        let mut nodes = Vec::new();
        let indices: Vec<usize> = (0..self.matrix.rows()).collect();

        self.build_node(&indices, 0, &mut nodes);

        Tree::new(nodes, group)
    }

    fn build_node(&self, indices: &[usize], depth: usize, nodes: &mut Vec<Node>) -> i32 {
        let current_idx = nodes.len() as i32;
        let (sum_g, sum_h) = self.sum_gradients_hessians(indices);

        let split = if depth < self.config.max_depth && indices.len() >= 2 {
            self.find_best_split(indices, sum_g, sum_h)
        } else {
            None
        };

        let Some(split) = split else {
            nodes.push(Node::leaf(current_idx, self.leaf_value(sum_g, sum_h)));
            return current_idx;
        };

        let (left_indices, right_indices) = self.split_samples(indices, split.feature_idx, split.threshold);

        // Reserve the slot; children are patched in once built.
        nodes.push(Node::internal(
            current_idx,
            split.feature_idx as i32,
            split.threshold,
            -1,
            -1,
        ));

        let left_idx = self.build_node(&left_indices, depth + 1, nodes);
        let right_idx = self.build_node(&right_indices, depth + 1, nodes);

        let node = &mut nodes[current_idx as usize];
        node.left = left_idx;
        node.right = right_idx;

        current_idx
    }

    fn find_best_split(&self, indices: &[usize], sum_g: f64, sum_h: f64) -> Option<SplitCandidate> {
        let parent_score = self.score(sum_g, sum_h);
        let mut best: Option<SplitCandidate> = None;

        for feature_idx in 0..self.matrix.cols() {
            let mut present: Vec<(f32, usize)> = Vec::with_capacity(indices.len());
            let (mut missing_g, mut missing_h) = (0.0, 0.0);

            for &idx in indices {
                let value = self.matrix.value(idx, feature_idx);
                if value.is_nan() {
                    missing_g += self.gradients[idx];
                    missing_h += self.hessians[idx];
                } else {
                    present.push((value, idx));
                }
            }
            present.sort_by(|a, b| a.0.total_cmp(&b.0));

            // Missing values always travel left.
            let (mut left_g, mut left_h) = (missing_g, missing_h);

            for pair in present.windows(2) {
                let (value, idx) = pair[0];
                let next_value = pair[1].0;
                left_g += self.gradients[idx];
                left_h += self.hessians[idx];

                if value == next_value {
                    continue;
                }

                let right_g = sum_g - left_g;
                let right_h = sum_h - left_h;
                if left_h < self.config.min_child_weight || right_h < self.config.min_child_weight {
                    continue;
                }

                let gain = self.score(left_g, left_h) + self.score(right_g, right_h) - parent_score;
                if gain <= MIN_SPLIT_GAIN {
                    continue;
                }

                // First candidate wins ties, so splits are stable across runs.
                if best.map_or(true, |b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold: midpoint(value, next_value),
                        gain,
                    });
                }
            }
        }

        best
    }

    fn split_samples(&self, indices: &[usize], feature_idx: usize, threshold: f32) -> (Vec<usize>, Vec<usize>) {
        indices.iter().partition(|&&idx| {
            let value = self.matrix.value(idx, feature_idx);
            value.is_nan() || value <= threshold
        })
    }

    fn score(&self, g: f64, h: f64) -> f64 {
        let denom = h + self.config.lambda;
        if denom <= 0.0 {
            0.0
        } else {
            g * g / denom
        }
    }

    fn sum_gradients_hessians(&self, indices: &[usize]) -> (f64, f64) {
        indices.iter().fold((0.0, 0.0), |(g, h), &idx| {
            (g + self.gradients[idx], h + self.hessians[idx])
        })
    }

    /// Optimal leaf weight `-G / (H + lambda)`, shrunk by the learning rate.
    fn leaf_value(&self, sum_g: f64, sum_h: f64) -> f32 {
        let denom = sum_h + self.config.lambda;
        if denom <= 0.0 {
            return 0.0;
        }
        (-sum_g / denom * self.config.eta) as f32
    }
}

/// Split point between two sorted distinct values, kept strictly below `hi`.
fn midpoint(lo: f32, hi: f32) -> f32 {
    let mid = lo + (hi - lo) / 2.0;
    if mid >= hi || !mid.is_finite() {
        lo
    } else {
        mid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[f32]]) -> DenseMatrix {
        let cols = rows[0].len();
        let flat: Vec<f32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        DenseMatrix::from_dense(&flat, rows.len(), cols, f32::NAN).unwrap()
    }

    #[test]
    fn test_simple_tree() {
        let m = matrix(&[&[1.0, 10.0], &[2.0, 10.0], &[3.0, 10.0], &[4.0, 10.0]]);
        let gradients = vec![-1.0, -1.0, 1.0, 1.0];
        let hessians = vec![1.0; 4];
        let config = TreeConfig {
            max_depth: 1,
            min_child_weight: 1.0,
            lambda: 0.0,
            eta: 1.0,
        };

        let tree = CartBuilder::new(&m, &gradients, &hessians, config).build(0);

        assert!(tree.validate().is_ok());
        assert_eq!(tree.nodes[0].feature_idx, 0);
        assert_eq!(tree.nodes[0].threshold, 2.5);
        assert_eq!(tree.evaluate(&[1.5, 10.0]), 1.0);
        assert_eq!(tree.evaluate(&[3.5, 10.0]), -1.0);
    }

    #[test]
    fn test_leaf_only_tree() {
        let m = matrix(&[&[1.0]]);
        let tree = CartBuilder::new(&m, &[-2.0], &[1.0], TreeConfig::default()).build(0);

        assert_eq!(tree.nodes.len(), 1);
        // -(-2) / (1 + 1) * 0.3
        assert!((tree.nodes[0].leaf.unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_min_child_weight_blocks_split() {
        let m = matrix(&[&[1.0], &[2.0]]);
        let config = TreeConfig {
            min_child_weight: 5.0,
            ..TreeConfig::default()
        };
        let tree = CartBuilder::new(&m, &[-1.0, 1.0], &[1.0, 1.0], config).build(0);
        assert_eq!(tree.nodes.len(), 1);
    }

    #[test]
    fn test_missing_values_go_left() {
        let m = matrix(&[&[f32::NAN], &[1.0], &[5.0], &[6.0]]);
        let config = TreeConfig {
            max_depth: 1,
            min_child_weight: 0.0,
            lambda: 0.0,
            eta: 1.0,
        };
        let tree = CartBuilder::new(&m, &[-1.0, -1.0, 1.0, 1.0], &[1.0; 4], config).build(2);

        assert_eq!(tree.group, 2);
        assert_eq!(tree.evaluate(&[f32::NAN]), 1.0);
        assert_eq!(tree.evaluate(&[5.5]), -1.0);
    }

    #[test]
    fn test_midpoint_stays_below_upper_bound() {
        assert_eq!(midpoint(1.0, 3.0), 2.0);
        let lo = 1.0f32;
        let hi = f32::from_bits(lo.to_bits() + 1);
        assert_eq!(midpoint(lo, hi), lo);
    }
}
