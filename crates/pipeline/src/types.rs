//! Request-scoped types that flow through the pipeline.

use data_loader::{PriceCategory, ProductRecord, SkinTone, SkinType};
use serde::{Deserialize, Serialize};

/// What the user picked on the form.
///
/// Built fresh for every request and passed by value; nothing in the
/// pipeline keeps selection state between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserSelection {
    pub skin_type: SkinType,
    pub skin_tone: SkinTone,
    pub budget: PriceCategory,
}

impl UserSelection {
    pub fn new(skin_type: SkinType, skin_tone: SkinTone, budget: PriceCategory) -> Self {
        Self {
            skin_type,
            skin_tone,
            budget,
        }
    }
}

impl Default for UserSelection {
    /// The form's initial state: combination skin, medium tone, low budget
    fn default() -> Self {
        Self::new(SkinType::Combination, SkinTone::Medium, PriceCategory::Low)
    }
}

/// A catalog product together with its predicted rating
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub product: &'a ProductRecord,
    pub predicted_rating: f32,
}

impl<'a> ScoredCandidate<'a> {
    pub fn new(product: &'a ProductRecord, predicted_rating: f32) -> Self {
        Self {
            product,
            predicted_rating,
        }
    }

    /// Pair products with scores positionally.
    ///
    /// Callers must pass equally long inputs (the scoring adapter checks
    /// this); extra elements on either side are dropped.
    pub fn zip_scores(products: Vec<&'a ProductRecord>, scores: Vec<f32>) -> Vec<Self> {
        products
            .into_iter()
            .zip(scores)
            .map(|(product, score)| Self::new(product, score))
            .collect()
    }
}
