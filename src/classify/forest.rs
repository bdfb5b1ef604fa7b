//! Decision-tree ensemble over flattened sequences.
//!
//! Each `(length, dim)` sequence is flattened row-major into `length * dim`
//! features. Every tree routes the features to a leaf holding a class
//! distribution; the forest averages those distributions.

use crate::{
    classify::{vote::argmax, Classifier, Predictions},
    error::Error,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayView3, Axis};
use num_traits::cast::ToPrimitive;
use std::convert::TryFrom;

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(untagged)]
pub(crate) enum NodeSpec {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f32>,
    },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub(crate) struct TreeSpec {
    pub(crate) nodes: Vec<NodeSpec>,
}

/// On-disk layout of a forest's `model.json`.
#[derive(Debug, Clone, serde::Deserialize)]
pub(crate) struct ForestSpec {
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) trees: Vec<TreeSpec>,
}

#[derive(Debug)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    /// Normalized class distribution.
    Leaf(Array1<f32>),
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Validate and normalize one tree. Every node must be reachable from the
    /// root exactly once.
    fn build(
        tree_i: usize,
        spec: TreeSpec,
        n_features: usize,
        n_classes: usize,
    ) -> Result<Self, Error> {
        let node_count = spec.nodes.len();
        if node_count == 0 {
            return Err(Error::MalformedTree(tree_i, 0, "tree has no nodes"));
        }

        let mut nodes = Vec::with_capacity(node_count);
        for (node_i, node) in spec.nodes.into_iter().enumerate() {
            let malformed = |reason| Error::MalformedTree(tree_i, node_i, reason);
            nodes.push(match node {
                NodeSpec::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(malformed("split feature out of range"));
                    }
                    if left >= node_count || right >= node_count {
                        return Err(malformed("child index out of range"));
                    }
                    if threshold.is_nan() {
                        return Err(malformed("threshold is NaN"));
                    }
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    }
                }
                NodeSpec::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(malformed("leaf width differs from class count"));
                    }
                    if value.iter().any(|&w| !w.is_finite() || w < 0.0) {
                        return Err(malformed("leaf weights must be finite and non-negative"));
                    }
                    let total: f32 = value.iter().sum();
                    if !(total > 0.0) {
                        return Err(malformed("leaf has no weight"));
                    }
                    Node::Leaf(Array1::from(value) / total)
                }
            });
        }

        let mut seen = vec![false; node_count];
        let mut stack = vec![0_usize];
        while let Some(node_i) = stack.pop() {
            if seen[node_i] {
                return Err(Error::MalformedTree(
                    tree_i,
                    node_i,
                    "node is reached more than once",
                ));
            }
            seen[node_i] = true;
            if let Node::Split { left, right, .. } = nodes[node_i] {
                stack.push(left);
                stack.push(right);
            }
        }

        Ok(Self { nodes })
    }

    fn leaf(&self, features: ArrayView1<f32>) -> &Array1<f32> {
        let mut node_i = 0;
        loop {
            match &self.nodes[node_i] {
                &Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node_i = if features[feature] <= threshold {
                        left
                    } else {
                        right
                    };
                }
                Node::Leaf(distribution) => return distribution,
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct Forest {
    n_features: usize,
    n_classes: usize,
    trees: Vec<Tree>,
}

impl TryFrom<ForestSpec> for Forest {
    type Error = Error;

    fn try_from(spec: ForestSpec) -> Result<Self, Self::Error> {
        if spec.trees.is_empty() {
            return Err(Error::EmptyForest);
        }
        let ForestSpec {
            n_features,
            n_classes,
            trees,
        } = spec;
        let trees = trees
            .into_iter()
            .enumerate()
            .map(|(tree_i, tree)| Tree::build(tree_i, tree, n_features, n_classes))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            n_features,
            n_classes,
            trees,
        })
    }
}

impl Forest {
    pub(crate) fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Mean leaf distribution for every row of `features`.
    pub(crate) fn predict_proba(&self, features: ArrayView2<f32>) -> Result<Array2<f32>, Error> {
        let (rows, width) = features.dim();
        if width != self.n_features {
            return Err(Error::FeatureCount(self.n_features, width));
        }
        let mut probabilities = Array2::zeros((rows, self.n_classes));
        for (mut out, row) in probabilities
            .outer_iter_mut()
            .zip(features.axis_iter(Axis(0)))
        {
            for tree in &self.trees {
                out += tree.leaf(row);
            }
        }
        probabilities /= self.trees.len().to_f32().ok_or(Error::ConvertToF32)?;
        Ok(probabilities)
    }

    fn flat_probabilities(&self, sequences: ArrayView3<f32>) -> Result<Array2<f32>, Error> {
        let (count, length, dim) = sequences.dim();
        let flat = sequences
            .as_standard_layout()
            .into_shape((count, length * dim))
            .map_err(Error::ReshapeSequences)?;
        self.predict_proba(flat.view())
    }
}

fn arg_maxes(probabilities: &Array2<f32>) -> Result<Array1<usize>, Error> {
    probabilities
        .outer_iter()
        .map(argmax)
        .collect::<Result<Vec<_>, _>>()
        .map(Array1::from)
}

impl Classifier for Forest {
    fn classify(&self, sequences: ArrayView3<f32>) -> Result<Array1<usize>, Error> {
        arg_maxes(&self.flat_probabilities(sequences)?)
    }

    fn class_probabilities(
        &self,
        sequences: ArrayView3<f32>,
    ) -> Result<Option<Array2<f32>>, Error> {
        self.flat_probabilities(sequences).map(Some)
    }

    fn predict(&self, sequences: ArrayView3<f32>) -> Result<Predictions, Error> {
        let probabilities = self.flat_probabilities(sequences)?;
        Ok(Predictions {
            classes: arg_maxes(&probabilities)?,
            probabilities: Some(probabilities),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{Forest, ForestSpec};
    use std::convert::TryFrom;

    /// Two-class stump: class 1 with certainty when feature 0 is at most 0.5,
    /// otherwise an even split.
    pub(crate) const STUMP: &str = r#"{
        "n_features": 2,
        "n_classes": 2,
        "trees": [{"nodes": [
            {"feature": 0, "threshold": 0.5, "left": 1, "right": 2},
            {"value": [0.0, 4.0]},
            {"value": [3.0, 3.0]}
        ]}]
    }"#;

    pub(crate) fn stump() -> Forest {
        let spec: ForestSpec = serde_json::from_str(STUMP).unwrap();
        Forest::try_from(spec).unwrap()
    }
}
