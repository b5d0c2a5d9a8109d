//! Engine crate for the SkinSync recommender.
//!
//! This crate contains the orchestrator that coordinates all components
//! of the recommendation pipeline, its configuration, and the per-request
//! error type.

pub mod config;
pub mod error;
pub mod orchestrator;

pub use config::EngineConfig;
pub use error::RecommendationError;
pub use orchestrator::{
    ProductRecommendation, RecommendationOrchestrator, RecommendationReport, RecommendationResult,
};
