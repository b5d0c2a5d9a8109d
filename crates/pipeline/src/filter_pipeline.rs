//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern, plus
//! `filter_catalog` for the standard skin type + budget narrowing.

use crate::filters::{BudgetFilter, SkinTypeFilter};
use crate::traits::Filter;
use crate::types::UserSelection;
use data_loader::{Catalog, PriceCategory, ProductRecord, SkinTone, SkinType};
use tracing;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(SkinTypeFilter)
///     .add_filter(BudgetFilter);
///
/// let matches = pipeline.apply(catalog.products().iter().collect(), &selection);
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The pipeline every recommendation runs: skin type, then budget.
    pub fn standard() -> Self {
        Self::new().add_filter(SkinTypeFilter).add_filter(BudgetFilter)
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Names of the filters in application order
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Apply all filters in sequence.
    ///
    /// Stops early once nothing is left; the remaining filters could only
    /// return an empty set as well.
    pub fn apply<'a>(
        &self,
        products: Vec<&'a ProductRecord>,
        selection: &UserSelection,
    ) -> Vec<&'a ProductRecord> {
        let mut current = products;
        for filter in &self.filters {
            if current.is_empty() {
                break;
            }
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, selection);
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        current
    }

    /// Run the pipeline over every product in the catalog
    pub fn apply_to_catalog<'a>(
        &self,
        catalog: &'a Catalog,
        selection: &UserSelection,
    ) -> Vec<&'a ProductRecord> {
        self.apply(catalog.products().iter().collect(), selection)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Products stored with exactly this skin type and price category, in
/// catalog order. An empty result is a normal outcome.
pub fn filter_catalog(
    catalog: &Catalog,
    skin_type: SkinType,
    budget: PriceCategory,
) -> Vec<&ProductRecord> {
    // Tone plays no part in filtering
    let selection = UserSelection::new(skin_type, SkinTone::NotSure, budget);
    FilterPipeline::standard().apply_to_catalog(catalog, &selection)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_catalog() -> Catalog {
        Catalog::from_csv_str(
            "product_name,price_category,skin_type\n\
             A,Low,Oily\n\
             B,High,Oily\n\
             C,Low,Dry\n\
             D,Low,Oily\n\
             E,Medium,Combination\n",
        )
        .unwrap()
    }

    #[test]
    fn test_empty_pipeline() {
        let catalog = test_catalog();
        let pipeline = FilterPipeline::new();

        let filtered = pipeline.apply_to_catalog(&catalog, &UserSelection::default());
        assert_eq!(filtered.len(), 5);
    }

    #[test]
    fn test_single_filter() {
        let catalog = test_catalog();
        let pipeline = FilterPipeline::new().add_filter(BudgetFilter);
        let selection = UserSelection::new(SkinType::Dry, SkinTone::Tan, PriceCategory::Low);

        let filtered = pipeline.apply_to_catalog(&catalog, &selection);
        let names: Vec<&str> = filtered.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "D"]);
    }

    #[test]
    fn test_standard_pipeline_order() {
        assert_eq!(
            FilterPipeline::standard().filter_names(),
            vec!["SkinTypeFilter", "BudgetFilter"]
        );
    }

    #[test]
    fn test_filter_catalog() {
        let catalog = test_catalog();

        let filtered = filter_catalog(&catalog, SkinType::Oily, PriceCategory::Low);
        let names: Vec<&str> = filtered.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "D"]);

        assert!(filter_catalog(&catalog, SkinType::Dry, PriceCategory::High).is_empty());
    }

    #[test]
    fn test_filter_ignores_differently_spelled_labels() {
        let catalog = Catalog::from_csv_str(
            "product_name,price_category,skin_type\nA,Low,Oily\nB,low,oily\nC, LOW ,O-i_l y\n",
        )
        .unwrap();

        let filtered = filter_catalog(&catalog, SkinType::Oily, PriceCategory::Low);
        let names: Vec<&str> = filtered.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A"]);
    }

    #[test]
    fn test_filter_only_returns_exact_matches() {
        let catalog = test_catalog();
        for skin_type in SkinType::ALL {
            for budget in PriceCategory::ALL {
                let filtered = filter_catalog(&catalog, skin_type, budget);
                assert!(filtered.len() <= catalog.len());
                assert_eq!(filtered.len(), catalog.count_matching(skin_type, budget));
                for product in filtered {
                    assert_eq!(product.skin_type, Some(skin_type));
                    assert_eq!(product.price_category, Some(budget));
                }
            }
        }
        // Filtering leaves the catalog untouched
        assert_eq!(catalog.len(), 5);
    }
}
