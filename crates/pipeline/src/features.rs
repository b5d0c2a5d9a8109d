//! Feature encoding for candidate scoring.
//!
//! Turns a (product, user selection) pair into the fixed-schema row the
//! rating model expects.

use crate::types::UserSelection;
use data_loader::ProductRecord;
use predictor::FeatureVector;
use rayon::prelude::*;
use tracing::trace;

/// Encodes products into model input rows.
///
/// Every one-hot group is driven by the **user's** selection:
/// - skin type from the selected skin type (already equal to the product's,
///   since filtering ran first)
/// - price category from the selected budget
/// - skin tone from the selected tone, with every other tone zeroed
///
/// The product's own recorded tone flags are deliberately not used, so the
/// model scores "this product as if it applied to the user's tone". This
/// matches how the model is served today; whether it is the intended
/// behaviour is unverified, so it is kept as is rather than changed here.
/// `ProductRecord::suits_tone` exposes the recorded flags to callers that
/// want them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEncoder;

impl FeatureEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a single product.
    pub fn encode(&self, product: &ProductRecord, selection: &UserSelection) -> FeatureVector {
        if !product.suits_tone(selection.skin_tone) {
            trace!(
                "Product '{}' is not recorded for tone {}; encoding it as if it were",
                product.name,
                selection.skin_tone
            );
        }

        let mut features = FeatureVector::zeros();
        features.set_skin_type(selection.skin_type);
        features.set_price_category(selection.budget);
        features.set_skin_tone(selection.skin_tone);
        features
    }

    /// Encode products in parallel.
    ///
    /// # Returns
    /// One row per product, in the same order
    pub fn encode_batch(
        &self,
        products: &[&ProductRecord],
        selection: &UserSelection,
    ) -> Vec<FeatureVector> {
        products
            .par_iter()
            .map(|product| self.encode(product, selection))
            .collect()
    }
}
