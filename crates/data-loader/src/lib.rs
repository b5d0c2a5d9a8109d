//! # Data Loader Crate
//!
//! This crate loads the skincare product catalog and defines the categorical
//! vocabulary (skin type, skin tone, budget) shared by the whole workspace.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (SkinType, SkinTone, PriceCategory, ProductRecord, Catalog)
//! - **parser**: Split CSV text into records and parse product rows
//! - **index**: Build the catalog and its lookup indices
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Catalog, PriceCategory, SkinType};
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_file(Path::new("data/skincare_df.csv"))?;
//!
//! let oily_low = catalog.count_matching(SkinType::Oily, PriceCategory::Low);
//! println!("{} of {} products fit oily skin on a low budget", oily_low, catalog.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{Catalog, PriceCategory, ProductRecord, SkinTone, SkinToneSet, SkinType};
