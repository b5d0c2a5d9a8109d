//! Filter implementations for the catalog pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod budget;
pub mod skin_type;

// Re-export for convenience
pub use budget::BudgetFilter;
pub use skin_type::SkinTypeFilter;
