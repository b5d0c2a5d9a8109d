//! Pipeline for filtering, encoding and ranking skincare products.
//!
//! This crate provides:
//! - Filter trait and implementations for narrowing the catalog
//! - FilterPipeline for composing filters
//! - FeatureEncoder for building model input rows
//! - `rank` for turning scored candidates into a top-K list
//!
//! ## Architecture
//! The pipeline processes a request in stages:
//! 1. Filters keep products matching the user's skin type and budget
//! 2. FeatureEncoder builds one feature row per remaining product
//! 3. Rows are scored by the predictor (see the `predictor` crate)
//! 4. `rank` sorts by predicted rating and keeps the best K
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{rank, FeatureEncoder, FilterPipeline, ScoredCandidate, UserSelection};
//!
//! let selection = UserSelection::new(SkinType::Oily, SkinTone::Tan, PriceCategory::Low);
//! let products = FilterPipeline::standard().apply_to_catalog(&catalog, &selection);
//!
//! let rows = FeatureEncoder::new().encode_batch(&products, &selection);
//! let scores = adapter.score(&rows)?;
//!
//! let top = rank(ScoredCandidate::zip_scores(products, scores), 3);
//! ```

pub mod types;
pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod features;
pub mod ranking;

// Re-export main types
pub use types::{ScoredCandidate, UserSelection};
pub use traits::Filter;
pub use filter_pipeline::{filter_catalog, FilterPipeline};
pub use features::FeatureEncoder;
pub use ranking::{rank, RankStatus, TopK, DEFAULT_TOP_K};
