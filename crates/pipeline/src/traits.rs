//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to the catalog.

use crate::types::UserSelection;
use data_loader::ProductRecord;

/// Core trait for filtering catalog products.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared across requests
/// - Filters borrow products from the catalog and never modify them
/// - An empty result is a normal outcome, so filters cannot fail
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Keep the products that pass this filter, preserving their order.
    fn apply<'a>(
        &self,
        products: Vec<&'a ProductRecord>,
        selection: &UserSelection,
    ) -> Vec<&'a ProductRecord>;
}
