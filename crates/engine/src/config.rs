//! Startup configuration for the recommendation engine.

use std::path::PathBuf;
use std::time::Duration;

use pipeline::DEFAULT_TOP_K;

pub const DEFAULT_CATALOG_PATH: &str = "data/skincare_df.csv";
pub const DEFAULT_MODEL_PATH: &str = "data/sephora_model.json";
pub const DEFAULT_PREDICT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where to load the catalog and model from, and how requests behave
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub catalog_path: PathBuf,
    pub model_path: PathBuf,
    /// Number of recommendations per request
    pub top_k: usize,
    /// Upper bound on one predictor call; `None` waits indefinitely
    pub predict_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            top_k: DEFAULT_TOP_K,
            predict_timeout: Some(DEFAULT_PREDICT_TIMEOUT),
        }
    }
}
