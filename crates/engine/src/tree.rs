//! Decision tree structures
//!
//! Trees are stored as flat node arrays with node 0 as the root. Internal
//! nodes send a row left when its feature value is `<= threshold` or missing.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// For internal nodes `feature_idx >= 0`, `left` and `right` index into the
/// tree's node array and `leaf` is `None`. Leaves have `feature_idx == -1`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: i32,
    pub left: i32,
    pub right: i32,
    pub feature_idx: i32,
    pub threshold: f32,
    pub leaf: Option<f32>,
}

impl Node {
    pub fn internal(id: i32, feature_idx: i32, threshold: f32, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    pub fn leaf(id: i32, value: f32) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            leaf: Some(value),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }
}

/// A single regression tree contributing to one output group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
    /// Output group (class index for multi-class objectives, 0 otherwise).
    pub group: usize,
}

impl Tree {
    pub fn new(nodes: Vec<Node>, group: usize) -> Self {
        Self { nodes, group }
    }

    /// Evaluate this tree on one feature row.
    pub fn evaluate(&self, features: &[f32]) -> f32 {
        let mut idx = 0usize;

        loop {
            let Some(node) = self.nodes.get(idx) else {
                return 0.0;
            };

            if node.is_leaf() {
                return node.leaf.unwrap_or(0.0);
            }

            let value = features
                .get(node.feature_idx as usize)
                .copied()
                .unwrap_or(f32::NAN);

            let next = if value.is_nan() || value <= node.threshold {
                node.left
            } else {
                node.right
            };
            if next < 0 {
                return 0.0;
            }
            idx = next as usize;
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(node) if !node.is_leaf() => {
                    1 + walk(nodes, node.left as usize).max(walk(nodes, node.right as usize))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    /// Validate tree structure
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                match node.leaf {
                    Some(v) if v.is_finite() => {}
                    _ => return Err(format!("Leaf node {i} has no finite leaf value")),
                }
                continue;
            }

            // Children are always emitted after their parent.
            for (side, child) in [("left", node.left), ("right", node.right)] {
                if child <= i as i32 || child as usize >= self.nodes.len() {
                    return Err(format!("Node {i} has invalid {side} child: {child}"));
                }
            }
            if node.feature_idx < 0 {
                return Err(format!(
                    "Internal node {} has invalid feature index: {}",
                    i, node.feature_idx
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> Tree {
        // if feature[0] <= 50 then 1.5 else -0.5
        Tree::new(
            vec![
                Node::internal(0, 0, 50.0, 1, 2),
                Node::leaf(1, 1.5),
                Node::leaf(2, -0.5),
            ],
            0,
        )
    }

    #[test]
    fn test_node_creation() {
        let internal = Node::internal(0, 3, 12.5, 1, 2);
        assert_eq!(internal.feature_idx, 3);
        assert!(!internal.is_leaf());

        let leaf = Node::leaf(1, -0.25);
        assert_eq!(leaf.feature_idx, -1);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.leaf, Some(-0.25));
    }

    #[test]
    fn test_tree_evaluation() {
        let tree = stump();
        assert_eq!(tree.evaluate(&[30.0]), 1.5);
        assert_eq!(tree.evaluate(&[50.0]), 1.5); // equal goes left
        assert_eq!(tree.evaluate(&[60.0]), -0.5);
        assert_eq!(tree.evaluate(&[f32::NAN]), 1.5); // missing goes left
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_tree_validation() {
        assert!(stump().validate().is_ok());

        let invalid = Tree::new(
            vec![
                Node::internal(0, 0, 50.0, 5, 2),
                Node::leaf(1, 1.0),
                Node::leaf(2, 2.0),
            ],
            0,
        );
        assert!(invalid.validate().is_err());
        assert!(Tree::new(Vec::new(), 0).validate().is_err());
    }
}
