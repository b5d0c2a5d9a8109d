//! Rating predictor for the recommendation pipeline.
//!
//! The model itself is an opaque, externally trained artifact. This crate:
//! - Defines the fixed 20-column feature schema the model expects
//! - Defines the `Predictor` trait so any scorer can be plugged in
//! - Loads exported regression models (linear or tree forest) from disk
//! - Wraps a predictor in a `ScoringAdapter` that checks the output shape

pub mod model;
pub mod schema;

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

pub use model::{ForestModel, LinearModel, RegressionModel, RegressionTree};
pub use schema::{column_index, FeatureGroup, FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};

/// Errors that can occur while scoring a batch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictorError {
    /// The predictor returned a different number of scores than rows sent
    #[error("Predictor returned {found} scores for {expected} rows")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("Predictor returned non-finite score {score} for row {row}")]
    InvalidScore { row: usize, score: f32 },

    /// The model itself failed
    #[error("Model failed: {0}")]
    Model(String),
}

/// Anything that can turn feature rows into predicted ratings.
///
/// Implementations must return one score per row, in row order.
pub trait Predictor: Send + Sync {
    /// Returns the name of this predictor (for logging/debugging)
    fn name(&self) -> &str;

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f32>, PredictorError>;
}

/// Adapts a plain function or closure into a `Predictor`.
///
/// Handy for stubbing the model in tests and benchmarks.
pub struct FnPredictor<F> {
    name: String,
    func: F,
}

impl<F> FnPredictor<F>
where
    F: Fn(&[FeatureVector]) -> Result<Vec<f32>, PredictorError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Predictor for FnPredictor<F>
where
    F: Fn(&[FeatureVector]) -> Result<Vec<f32>, PredictorError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<f32>, PredictorError> {
        (self.func)(rows)
    }
}

/// Calls a shared predictor and validates what comes back.
///
/// One call per batch, no retries: a failure here is fatal to the current
/// request only.
#[derive(Clone)]
pub struct ScoringAdapter {
    predictor: Arc<dyn Predictor>,
}

impl ScoringAdapter {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self { predictor }
    }

    /// Score a batch of rows.
    ///
    /// # Returns
    /// One finite score per row, in the same order as `rows`
    pub fn score(&self, rows: &[FeatureVector]) -> Result<Vec<f32>, PredictorError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let expected = rows.len();
        debug!("Scoring {} rows with predictor '{}'", expected, self.predictor.name());

        let scores = self.predictor.predict(rows)?;

        if scores.len() != expected {
            error!(
                "Mismatch in number of scores returned: expected {}, got {}",
                expected,
                scores.len()
            );
            return Err(PredictorError::ShapeMismatch {
                expected,
                found: scores.len(),
            });
        }

        if let Some((row, &score)) = scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
            error!("Predictor returned non-finite score {} for row {}", score, row);
            return Err(PredictorError::InvalidScore { row, score });
        }

        Ok(scores)
    }

    /// Name of the wrapped predictor
    pub fn predictor_name(&self) -> &str {
        self.predictor.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<FeatureVector> {
        vec![FeatureVector::zeros(); n]
    }

    #[test]
    fn test_score_passes_through_scores() {
        let adapter = ScoringAdapter::new(Arc::new(FnPredictor::new("fixed", |rows: &[FeatureVector]| {
            Ok((0..rows.len()).map(|i| i as f32).collect())
        })));

        assert_eq!(adapter.score(&rows(3)).unwrap(), vec![0.0, 1.0, 2.0]);
        assert_eq!(adapter.predictor_name(), "fixed");
    }

    #[test]
    fn test_short_output_is_a_shape_error() {
        let adapter = ScoringAdapter::new(Arc::new(FnPredictor::new("short", |_: &[FeatureVector]| {
            Ok(vec![1.0])
        })));

        let err = adapter.score(&rows(2)).unwrap_err();
        assert_eq!(err, PredictorError::ShapeMismatch { expected: 2, found: 1 });
    }

    #[test]
    fn test_long_output_is_a_shape_error() {
        let adapter = ScoringAdapter::new(Arc::new(FnPredictor::new("long", |_: &[FeatureVector]| {
            Ok(vec![1.0, 2.0, 3.0])
        })));

        assert!(matches!(
            adapter.score(&rows(2)),
            Err(PredictorError::ShapeMismatch { expected: 2, found: 3 })
        ));
    }

    #[test]
    fn test_nan_score_is_rejected() {
        let adapter = ScoringAdapter::new(Arc::new(FnPredictor::new("nan", |_: &[FeatureVector]| {
            Ok(vec![4.0, f32::NAN])
        })));

        assert!(matches!(
            adapter.score(&rows(2)),
            Err(PredictorError::InvalidScore { row: 1, .. })
        ));
    }

    #[test]
    fn test_model_error_is_propagated() {
        let adapter = ScoringAdapter::new(Arc::new(FnPredictor::new("broken", |_: &[FeatureVector]| {
            Err(PredictorError::Model("weights missing".into()))
        })));

        let err = adapter.score(&rows(1)).unwrap_err();
        assert_eq!(err.to_string(), "Model failed: weights missing");
    }

    #[test]
    fn test_empty_batch_skips_predictor() {
        let adapter = ScoringAdapter::new(Arc::new(FnPredictor::new("panics", |_: &[FeatureVector]| {
            panic!("should not be called")
        })));

        assert!(adapter.score(&[]).unwrap().is_empty());
    }
}
