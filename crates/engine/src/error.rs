//! Per-request failure type.

use predictor::PredictorError;
use std::time::Duration;
use thiserror::Error;

/// Why a single recommendation request failed.
///
/// Never fatal to the process: the orchestrator hands it back inside
/// `RecommendationResult::Failure` for the caller to display.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendationError {
    #[error("prediction failed: {0}")]
    Prediction(#[from] PredictorError),

    #[error("prediction timed out after {0:?}")]
    Timeout(Duration),

    /// The scoring task panicked or was cancelled
    #[error("prediction task failed: {0}")]
    TaskFailed(String),
}
