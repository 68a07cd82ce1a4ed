//! Regression tree structures for ensemble inference
//!
//! Nodes are stored flat; node 0 is the root and children are referenced by
//! index. Traversal goes left when `feature <= threshold`.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// For internal nodes:
/// - `feature_idx >= 0`: index into feature vector
/// - `left` and `right` point to child node indices
/// - `leaf` is `None`
///
/// For leaf nodes:
/// - `feature_idx == -1`
/// - `leaf` contains the prediction value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Node ID (for reference, not used in traversal)
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    pub feature_idx: i32,

    /// Split threshold
    pub threshold: f64,

    /// Leaf value (Some for leaf nodes, None for internal nodes)
    pub leaf: Option<f64>,
}

impl Node {
    /// Create a new internal (split) node
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    /// Create a new leaf node
    pub fn leaf(id: i32, value: f64) -> Self {
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

    pub fn leaf_value(&self) -> Option<f64> {
        self.leaf
    }
}

/// A single regression tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,

    /// Multiplier applied to this tree's leaf value in the ensemble
    pub weight: f64,
}

impl Tree {
    pub fn new(nodes: Vec<Node>, weight: f64) -> Self {
        Self { nodes, weight }
    }

    /// Evaluate this tree on a feature vector.
    ///
    /// Returns the raw (unweighted) leaf value. Structural problems that
    /// `validate` would reject evaluate to 0.0.
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;

        // A valid tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..self.nodes.len() {
            let Some(node) = self.nodes.get(idx) else {
                return 0.0;
            };

            if node.is_leaf() {
                return node.leaf_value().unwrap_or(0.0);
            }

            let Some(&value) = features.get(node.feature_idx as usize) else {
                return 0.0;
            };

            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            if next < 0 {
                return 0.0;
            }
            idx = next as usize;
        }

        0.0
    }

    /// Validate tree structure against the model's input width
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        if !self.weight.is_finite() {
            return Err(format!("Tree weight {} is not finite", self.weight));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if !node.is_leaf() {
                if node.left <= i as i32 || node.left as usize >= self.nodes.len() {
                    return Err(format!("Node {} has invalid left child: {}", i, node.left));
                }

                if node.right <= i as i32 || node.right as usize >= self.nodes.len() {
                    return Err(format!(
                        "Node {} has invalid right child: {}",
                        i, node.right
                    ));
                }

                if node.feature_idx < 0 || node.feature_idx as usize >= n_features {
                    return Err(format!(
                        "Internal node {} has invalid feature index: {}",
                        i, node.feature_idx
                    ));
                }

                if node.threshold.is_nan() {
                    return Err(format!("Internal node {i} has a NaN threshold"));
                }
            } else {
                match node.leaf {
                    None => return Err(format!("Leaf node {i} has no leaf value")),
                    Some(v) if !v.is_finite() => {
                        return Err(format!("Leaf node {i} has non-finite value {v}"))
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> Tree {
        // if feature[0] <= 50 return 100, else return 200
        Tree::new(
            vec![
                Node::internal(0, 0, 50.0, 1, 2),
                Node::leaf(1, 100.0),
                Node::leaf(2, 200.0),
            ],
            1.0,
        )
    }

    #[test]
    fn test_node_creation() {
        let internal = Node::internal(0, 3, 12.5, 1, 2);
        assert_eq!(internal.feature_idx, 3);
        assert_eq!(internal.threshold, 12.5);
        assert!(!internal.is_leaf());

        let leaf = Node::leaf(1, -0.25);
        assert_eq!(leaf.feature_idx, -1);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.leaf_value(), Some(-0.25));
    }

    #[test]
    fn test_tree_evaluation() {
        let tree = stump();
        assert_eq!(tree.evaluate(&[30.0]), 100.0);
        assert_eq!(tree.evaluate(&[50.0]), 100.0); // Equal goes left
        assert_eq!(tree.evaluate(&[60.0]), 200.0);
    }

    #[test]
    fn test_tree_validation() {
        assert!(stump().validate(1).is_ok());

        // Feature index beyond the model width
        assert!(stump().validate(0).is_err());

        let invalid_tree = Tree::new(
            vec![
                Node::internal(0, 0, 50.0, 5, 2),
                Node::leaf(1, 100.0),
                Node::leaf(2, 200.0),
            ],
            1.0,
        );
        assert!(invalid_tree.validate(1).is_err());
    }

    #[test]
    fn test_cycle_rejected_and_terminates() {
        let cyclic = Tree::new(
            vec![
                Node::internal(0, 0, 50.0, 1, 1),
                Node::internal(1, 0, 50.0, 0, 0),
            ],
            1.0,
        );
        assert!(cyclic.validate(1).is_err());
        assert_eq!(cyclic.evaluate(&[10.0]), 0.0);
    }

    #[test]
    fn test_nan_feature_goes_right() {
        assert_eq!(stump().evaluate(&[f64::NAN]), 200.0);
    }
}
