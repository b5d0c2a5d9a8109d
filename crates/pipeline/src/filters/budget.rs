//! Filter to keep only products in the user's budget category.

use crate::traits::Filter;
use crate::types::UserSelection;
use data_loader::ProductRecord;

/// Keeps products whose `price_category` column equals the selected budget.
///
/// This is an exact category match, not a price ceiling: a "High" budget
/// does not include "Low" products.
pub struct BudgetFilter;

impl Filter for BudgetFilter {
    fn name(&self) -> &str {
        "BudgetFilter"
    }

    fn apply<'a>(
        &self,
        products: Vec<&'a ProductRecord>,
        selection: &UserSelection,
    ) -> Vec<&'a ProductRecord> {
        products
            .into_iter()
            .filter(|product| product.price_category == Some(selection.budget))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Catalog, PriceCategory, SkinTone, SkinType};

    #[test]
    fn test_budget_filter_is_exact_match() {
        let catalog = Catalog::from_csv_str(
            "product_name,price_category,skin_type\nA,Low,Oily\nB,Medium,Oily\nC,High,Dry\n",
        )
        .unwrap();
        let selection = UserSelection::new(SkinType::Dry, SkinTone::Olive, PriceCategory::High);

        let filtered = BudgetFilter.apply(catalog.products().iter().collect(), &selection);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "C");
    }
}
