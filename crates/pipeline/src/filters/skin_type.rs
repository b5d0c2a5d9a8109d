//! Filter to keep only products stored with the user's skin type.

use crate::traits::Filter;
use crate::types::UserSelection;
use data_loader::ProductRecord;

/// Keeps products whose `skin_type` column equals the selected skin type.
///
/// Products with an unrecognized skin type never pass.
pub struct SkinTypeFilter;

impl Filter for SkinTypeFilter {
    fn name(&self) -> &str {
        "SkinTypeFilter"
    }

    fn apply<'a>(
        &self,
        products: Vec<&'a ProductRecord>,
        selection: &UserSelection,
    ) -> Vec<&'a ProductRecord> {
        products
            .into_iter()
            .filter(|product| product.skin_type == Some(selection.skin_type))
            .collect()
    }
}
