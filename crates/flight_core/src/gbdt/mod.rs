//! Tree-ensemble regression model
//!
//! The price model is a plain JSON tree ensemble:
//!
//! ```json
//! {
//!   "version": 1,
//!   "n_features": 14,
//!   "aggregation": "sum",
//!   "bias": 8.51,
//!   "trees": [
//!     {
//!       "nodes": [
//!         {"id":0,"left":1,"right":2,"feature_idx":0,"threshold":125.0,"leaf":null},
//!         {"id":1,"left":-1,"right":-1,"feature_idx":-1,"threshold":0.0,"leaf":-0.12},
//!         {"id":2,"left":-1,"right":-1,"feature_idx":-1,"threshold":0.0,"leaf":0.31}
//!       ],
//!       "weight": 1.0
//!     }
//!   ],
//!   "layout": { "version": 1, "airlines": ["..."], "...": "..." }
//! }
//! ```
//!
//! `layout` is optional; when present it pins the category order of the
//! one-hot blocks to the order used at training time.

pub mod model;
pub mod tree;

pub use model::{hash_path_for, Aggregation, Model, ModelError, MODEL_VERSION};
pub use tree::{Node, Tree};

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_two_tree_forest() {
        let tree1 = Tree::new(
            vec![
                Node::internal(0, 0, 120.0, 1, 2),
                Node::leaf(1, 8.0),
                Node::leaf(2, 9.0),
            ],
            1.0,
        );
        let tree2 = Tree::new(
            vec![
                Node::internal(0, 1, 0.5, 1, 2),
                Node::leaf(1, 8.2),
                Node::leaf(2, 10.2),
            ],
            1.0,
        );
        let model = Model::new(vec![tree1, tree2], 0.0, 2).with_aggregation(Aggregation::Mean);

        // (8.0 + 8.2) / 2
        let short_economy = model.score(&[90.0, 0.0]).unwrap();
        assert!((short_economy - 8.1).abs() < 1e-12);

        // (9.0 + 10.2) / 2
        let long_business = model.score(&[240.0, 1.0]).unwrap();
        assert!((long_business - 9.6).abs() < 1e-12);
    }

    #[test]
    fn test_parse_artifact_without_aggregation() {
        let json = r#"{
            "version": 1,
            "n_features": 1,
            "bias": 0.5,
            "trees": [{"nodes": [
                {"id":0,"left":1,"right":2,"feature_idx":0,"threshold":1.0,"leaf":null},
                {"id":1,"left":-1,"right":-1,"feature_idx":-1,"threshold":0.0,"leaf":1.0},
                {"id":2,"left":-1,"right":-1,"feature_idx":-1,"threshold":0.0,"leaf":2.0}
            ], "weight": 1.0}]
        }"#;
        let model: Model = serde_json::from_str(json).unwrap();
        assert!(model.validate().is_ok());
        assert_eq!(model.aggregation, Aggregation::Sum);
        assert_eq!(model.score(&[3.0]).unwrap(), 2.5);
    }
}
