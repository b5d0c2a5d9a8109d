//! # Recommendation Orchestrator
//!
//! This module coordinates one recommendation request end to end:
//! 1. Filter the catalog by skin type and budget
//! 2. Encode one feature row per remaining product
//! 3. Score all rows in a single predictor call
//! 4. Rank by predicted rating and keep the top K
//!
//! The catalog and predictor are loaded once and shared read-only, so any
//! number of requests can run against the same orchestrator concurrently.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, instrument, warn, Span};

use data_loader::{Catalog, DataLoadError, PriceCategory, ProductRecord, SkinType};
use pipeline::{
    rank, FeatureEncoder, FilterPipeline, RankStatus, ScoredCandidate, UserSelection, DEFAULT_TOP_K,
};
use predictor::{FeatureVector, Predictor, RegressionModel, ScoringAdapter};

use crate::config::{EngineConfig, DEFAULT_PREDICT_TIMEOUT};
use crate::error::RecommendationError;

/// One recommended product as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecommendation {
    /// 1-based rank
    pub rank: usize,
    /// Row position in the catalog
    pub position: usize,
    pub product_name: String,
    pub predicted_rating: f32,
    pub skin_type: Option<SkinType>,
    pub price_category: Option<PriceCategory>,
    /// Whether the catalog records this product for the requested tone.
    /// The model scores it as if it did either way.
    pub suits_tone: bool,
}

/// Outcome of a single request. Requests never return `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationResult {
    /// Up to `top_k` products, best first
    Success(Vec<ProductRecommendation>),
    /// Nothing in the catalog matches the skin type and budget
    NoMatch,
    Failure(RecommendationError),
}

impl RecommendationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The recommendations, or an empty slice for `NoMatch` and `Failure`
    pub fn recommendations(&self) -> &[ProductRecommendation] {
        match self {
            Self::Success(recs) => recs,
            _ => &[],
        }
    }

    /// Machine-readable name of the outcome
    pub fn status(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::NoMatch => "no_match",
            Self::Failure(_) => "failure",
        }
    }

    pub fn report(&self) -> RecommendationReport<'_> {
        RecommendationReport {
            status: self.status(),
            recommendations: self.recommendations(),
            error: match self {
                Self::Failure(e) => Some(e.to_string()),
                _ => None,
            },
        }
    }
}

/// Serializable form of a `RecommendationResult`.
///
/// `status` keeps a `NoMatch` or a `Failure` apart from a successful but
/// empty top-K.
#[derive(Debug, Serialize)]
pub struct RecommendationReport<'a> {
    pub status: &'static str,
    pub recommendations: &'a [ProductRecommendation],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Main orchestrator that coordinates the recommendation pipeline
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    catalog: Arc<Catalog>,
    filter_pipeline: Arc<FilterPipeline>,
    encoder: FeatureEncoder,
    scorer: ScoringAdapter,
    top_k: usize,
    predict_timeout: Option<Duration>,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator over a loaded catalog and predictor
    ///
    /// Uses the standard skin type + budget filters, `DEFAULT_TOP_K` and a
    /// 5 second prediction timeout.
    pub fn new(catalog: Arc<Catalog>, predictor: Arc<dyn Predictor>) -> Self {
        Self {
            catalog,
            filter_pipeline: Arc::new(FilterPipeline::standard()),
            encoder: FeatureEncoder::new(),
            scorer: ScoringAdapter::new(predictor),
            top_k: DEFAULT_TOP_K,
            predict_timeout: Some(DEFAULT_PREDICT_TIMEOUT),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Replace the standard skin type + budget filters
    pub fn with_filter_pipeline(mut self, filter_pipeline: FilterPipeline) -> Self {
        self.filter_pipeline = Arc::new(filter_pipeline);
        self
    }

    /// Bound each predictor call; `None` waits indefinitely
    pub fn with_predict_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.predict_timeout = timeout;
        self
    }

    /// Load the catalog and model named in `config` and build an orchestrator.
    ///
    /// Both files are loaded in parallel. Any failure here is a startup
    /// failure; nothing is retried.
    pub fn from_config(config: &EngineConfig) -> Result<Self, DataLoadError> {
        let start_time = Instant::now();

        let (catalog, model) = rayon::join(
            || Catalog::load_from_file(&config.catalog_path),
            || RegressionModel::load(&config.model_path),
        );
        let catalog = catalog?;
        let model = model?;

        info!(
            "Engine ready: {} products, {} model, loaded in {:.2?}",
            catalog.len(),
            model.kind(),
            start_time.elapsed()
        );

        Ok(Self::new(Arc::new(catalog), Arc::new(model))
            .with_top_k(config.top_k)
            .with_predict_timeout(config.predict_timeout))
    }

    /// Convenience wrapper over `from_config` with default settings
    pub fn load(catalog_path: &Path, model_path: &Path) -> Result<Self, DataLoadError> {
        Self::from_config(&EngineConfig {
            catalog_path: catalog_path.to_path_buf(),
            model_path: model_path.to_path_buf(),
            ..EngineConfig::default()
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn predictor_name(&self) -> &str {
        self.scorer.predictor_name()
    }

    /// Main entry point: recommend products for one selection
    ///
    /// # Returns
    /// `Success` with up to `top_k` products sorted by predicted rating,
    /// `NoMatch` when no product has the selected skin type and budget, or
    /// `Failure` when scoring failed
    #[instrument(skip(self), fields(predictor = self.scorer.predictor_name()))]
    pub async fn recommend(&self, selection: &UserSelection) -> RecommendationResult {
        let start_time = Instant::now();

        let (positions, features) = match self.prepare_candidates(selection).await {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!("Recommendation failed after {:.2?}: {}", start_time.elapsed(), e);
                return RecommendationResult::Failure(e);
            }
        };
        if positions.is_empty() {
            warn!(
                "No products match skin type {} and budget {}",
                selection.skin_type, selection.budget
            );
            return RecommendationResult::NoMatch;
        }

        let scores = match self.score_with_model(features).await {
            Ok(scores) => scores,
            Err(e) => {
                warn!("Recommendation failed after {:.2?}: {}", start_time.elapsed(), e);
                return RecommendationResult::Failure(e);
            }
        };
        debug!("Scored {} candidates", scores.len());

        let products: Vec<&ProductRecord> = positions
            .iter()
            .filter_map(|&position| self.catalog.get(position))
            .collect();
        let result = self.rank_and_select(products, scores, selection);

        info!(
            "Produced {} recommendations in {:.2?}",
            result.recommendations().len(),
            start_time.elapsed()
        );
        result
    }

    /// Filter and encode on the blocking pool.
    ///
    /// # Returns
    /// Catalog positions of the matching products and one feature row per
    /// position, in catalog order
    async fn prepare_candidates(
        &self,
        selection: &UserSelection,
    ) -> Result<(Vec<usize>, Vec<FeatureVector>), RecommendationError> {
        let catalog = self.catalog.clone();
        let filter_pipeline = self.filter_pipeline.clone();
        let encoder = self.encoder;
        let selection = *selection;
        let span = Span::current();

        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let products = Self::apply_filters(&catalog, &filter_pipeline, &selection);
            let features = Self::compute_features(&encoder, &products, &selection);
            let positions: Vec<usize> = products.iter().map(|p| p.position).collect();
            (positions, features)
        })
        .await
        .map_err(|e| RecommendationError::TaskFailed(e.to_string()))
    }

    /// Apply the filter pipeline to the whole catalog
    fn apply_filters<'a>(
        catalog: &'a Catalog,
        filter_pipeline: &FilterPipeline,
        selection: &UserSelection,
    ) -> Vec<&'a ProductRecord> {
        let products = filter_pipeline.apply_to_catalog(catalog, selection);
        debug!(
            "Filtering complete, {} of {} products remain",
            products.len(),
            catalog.len()
        );
        products
    }

    fn compute_features(
        encoder: &FeatureEncoder,
        products: &[&ProductRecord],
        selection: &UserSelection,
    ) -> Vec<FeatureVector> {
        let features = encoder.encode_batch(products, selection);
        debug!("Computed features for {} products", features.len());
        features
    }

    /// Score all rows in one predictor call on the blocking pool
    async fn score_with_model(
        &self,
        features: Vec<FeatureVector>,
    ) -> Result<Vec<f32>, RecommendationError> {
        let scorer = self.scorer.clone();
        let task = tokio::task::spawn_blocking(move || scorer.score(&features));

        let joined = match self.predict_timeout {
            Some(limit) => tokio::time::timeout(limit, task)
                .await
                .map_err(|_| RecommendationError::Timeout(limit))?,
            None => task.await,
        };

        let scores = joined.map_err(|e| RecommendationError::TaskFailed(e.to_string()))??;
        Ok(scores)
    }

    /// Rank scored products and convert the top K into recommendations
    fn rank_and_select(
        &self,
        products: Vec<&ProductRecord>,
        scores: Vec<f32>,
        selection: &UserSelection,
    ) -> RecommendationResult {
        let top = rank(ScoredCandidate::zip_scores(products, scores), self.top_k);
        if top.status == RankStatus::NoCandidates {
            return RecommendationResult::NoMatch;
        }

        let recommendations = top
            .candidates
            .into_iter()
            .enumerate()
            .map(|(i, candidate)| ProductRecommendation {
                rank: i + 1,
                position: candidate.product.position,
                product_name: candidate.product.name.clone(),
                predicted_rating: candidate.predicted_rating,
                skin_type: candidate.product.skin_type,
                price_category: candidate.product.price_category,
                suits_tone: candidate.product.suits_tone(selection.skin_tone),
            })
            .collect();

        RecommendationResult::Success(recommendations)
    }
}
