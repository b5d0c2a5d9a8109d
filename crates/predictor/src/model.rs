//! Local regression models loaded from an exported artifact.
//!
//! The rating model is trained elsewhere and exported to JSON. Two export
//! shapes are understood, tagged by `kind`:
//!
//! ```json
//! { "kind": "linear", "intercept": 3.9, "coefficients": { "skin_type_dry": 0.12 } }
//! { "kind": "forest", "trees": [ { "nodes": [
//!     { "feature": "skin_tone_tan", "threshold": 0.5, "left": 1, "right": 2 },
//!     { "value": 4.1 },
//!     { "value": 4.4 }
//! ] } ] }
//! ```
//!
//! Trees use the scikit-learn convention: go left when `x <= threshold`.
//! A forest predicts the mean of its trees.

use crate::schema::{column_index, FeatureVector, FEATURE_COUNT};
use crate::{Predictor, PredictorError};
use data_loader::{DataLoadError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

// =============================================================================
// Artifact format
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ModelArtifact {
    Linear(LinearArtifact),
    Forest(ForestArtifact),
}

#[derive(Debug, Deserialize)]
struct LinearArtifact {
    intercept: f32,
    #[serde(default)]
    coefficients: BTreeMap<String, f32>,
}

#[derive(Debug, Deserialize)]
struct ForestArtifact {
    trees: Vec<TreeArtifact>,
}

#[derive(Debug, Deserialize)]
struct TreeArtifact {
    nodes: Vec<NodeArtifact>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeArtifact {
    Split {
        feature: String,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f32,
    },
}

// =============================================================================
// Compiled models
// =============================================================================

/// `intercept + Σ weight × feature`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub intercept: f32,
    pub weights: [f32; FEATURE_COUNT],
}

impl LinearModel {
    pub fn predict_row(&self, features: &FeatureVector) -> f32 {
        self.intercept
            + self
                .weights
                .iter()
                .zip(features.as_slice())
                .map(|(w, x)| w * x)
                .sum::<f32>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf(f32),
}

/// A single regression tree with nodes stored in an array.
///
/// Children always sit after their parent, so walking from the root
/// terminates.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    pub fn predict_row(&self, features: &FeatureVector) -> f32 {
        let x = features.as_array();
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if x[feature] <= threshold { left } else { right },
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Averaging ensemble of regression trees
#[derive(Debug, Clone, PartialEq)]
pub struct ForestModel {
    trees: Vec<RegressionTree>,
}

impl ForestModel {
    pub fn predict_row(&self, features: &FeatureVector) -> f32 {
        let total: f32 = self.trees.iter().map(|t| t.predict_row(features)).sum();
        total / self.trees.len() as f32
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

/// A model loaded from disk, ready to serve as a `Predictor`
#[derive(Debug, Clone, PartialEq)]
pub enum RegressionModel {
    Linear(LinearModel),
    Forest(ForestModel),
}

impl RegressionModel {
    /// Load a model artifact from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading model artifact from {:?}", path);

        if !path.is_file() {
            return Err(DataLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let model = Self::parse(&content).map_err(|reason| DataLoadError::InvalidArtifact {
            path: path.display().to_string(),
            reason,
        })?;
        info!("Loaded {} model", model.kind());
        Ok(model)
    }

    /// Build a model from JSON text already in memory
    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::parse(content).map_err(|reason| DataLoadError::InvalidArtifact {
            path: "<memory>".to_string(),
            reason,
        })
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        let artifact: ModelArtifact =
            serde_json::from_str(content).map_err(|e| e.to_string())?;
        match artifact {
            ModelArtifact::Linear(linear) => compile_linear(linear).map(RegressionModel::Linear),
            ModelArtifact::Forest(forest) => compile_forest(forest).map(RegressionModel::Forest),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RegressionModel::Linear(_) => "linear",
            RegressionModel::Forest(_) => "forest",
        }
    }

    pub fn predict_row(&self, features: &FeatureVector) -> f32 {
        match self {
            RegressionModel::Linear(model) => model.predict_row(features),
            RegressionModel::Forest(model) => model.predict_row(features),
        }
    }
}

impl Predictor for RegressionModel {
    fn name(&self) -> &str {
        self.kind()
    }

    fn predict(&self, rows: &[FeatureVector]) -> std::result::Result<Vec<f32>, PredictorError> {
        Ok(rows.iter().map(|row| self.predict_row(row)).collect())
    }
}

fn resolve_column(name: &str) -> std::result::Result<usize, String> {
    column_index(name).ok_or_else(|| format!("Unknown feature column: {}", name))
}

fn compile_linear(artifact: LinearArtifact) -> std::result::Result<LinearModel, String> {
    let mut weights = [0.0; FEATURE_COUNT];
    for (column, weight) in artifact.coefficients {
        weights[resolve_column(&column)?] = weight;
    }
    Ok(LinearModel {
        intercept: artifact.intercept,
        weights,
    })
}

fn compile_forest(artifact: ForestArtifact) -> std::result::Result<ForestModel, String> {
    if artifact.trees.is_empty() {
        return Err("Forest has no trees".to_string());
    }

    let mut trees = Vec::with_capacity(artifact.trees.len());
    for (tree_idx, tree) in artifact.trees.into_iter().enumerate() {
        let len = tree.nodes.len();
        if len == 0 {
            return Err(format!("Tree {} has no nodes", tree_idx));
        }

        let mut nodes = Vec::with_capacity(len);
        for (node_idx, node) in tree.nodes.into_iter().enumerate() {
            let node = match node {
                NodeArtifact::Leaf { value } => Node::Leaf(value),
                NodeArtifact::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    for child in [left, right] {
                        if child <= node_idx || child >= len {
                            return Err(format!(
                                "Tree {} node {} points to invalid child {}",
                                tree_idx, node_idx, child
                            ));
                        }
                    }
                    Node::Split {
                        feature: resolve_column(&feature)?,
                        threshold,
                        left,
                        right,
                    }
                }
            };
            nodes.push(node);
        }
        trees.push(RegressionTree { nodes });
    }
    Ok(ForestModel { trees })
}
