//! Catalog building and indexing logic.
//!
//! This module builds the `Catalog` from a CSV source:
//! - Parse the header and resolve the column layout
//! - Parse product rows in parallel (order preserved)
//! - Build the column and segment indices
//! - Validate the result

use crate::error::{DataLoadError, Result};
use crate::parser::{self, ColumnLayout};
use crate::types::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

impl Catalog {
    /// Load the catalog from a CSV file.
    ///
    /// This is the main entry point, called once at startup.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading product catalog from {:?}", path);

        if !path.is_file() {
            return Err(DataLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        // Invalid UTF-8 surfaces as an `InvalidData` I/O error
        let content = std::fs::read_to_string(path)?;

        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let catalog = Self::parse(&content, &file)?;
        info!(
            "Loaded {} products with {} columns",
            catalog.len(),
            catalog.headers.len()
        );
        Ok(catalog)
    }

    /// Build a catalog from CSV text already in memory
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::parse(content, "<memory>")
    }

    fn parse(content: &str, file: &str) -> Result<Self> {
        let mut records = parser::split_records(content, file)?.into_iter();

        let header = records.next().ok_or_else(|| DataLoadError::ParseError {
            file: file.to_string(),
            line: 1,
            reason: "Missing header row".to_string(),
        })?;
        let headers = dedupe_headers(header.fields.iter().map(|h| h.trim().to_string()));
        let layout = ColumnLayout::from_headers(&headers)?;

        let missing_tones: Vec<&str> = SkinTone::ALL
            .iter()
            .filter(|tone| layout.skin_tones[tone.index()].is_none())
            .map(|tone| tone.feature_column())
            .collect();
        if !missing_tones.is_empty() {
            debug!("Skin tone columns absent, reading as 0: {:?}", missing_tones);
        }

        // Rayon keeps the input order when collecting an indexed iterator
        let products = records
            .collect::<Vec<_>>()
            .into_par_iter()
            .enumerate()
            .map(|(position, record)| parser::parse_product(record, position, &layout))
            .collect::<Result<Vec<ProductRecord>>>()?;

        let mut catalog = Catalog {
            headers,
            products,
            column_index: HashMap::new(),
            segment_index: HashMap::new(),
        };
        catalog.build_indices()?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Build the column-name and (skin type, price category) lookups
    pub(crate) fn build_indices(&mut self) -> Result<()> {
        for (idx, header) in self.headers.iter().enumerate() {
            if self.column_index.insert(header.clone(), idx).is_some() {
                return Err(DataLoadError::ValidationError(format!(
                    "Duplicate column after renaming: {}",
                    header
                )));
            }
        }

        for product in &self.products {
            if let (Some(skin_type), Some(budget)) = (product.skin_type, product.price_category) {
                self.segment_index
                    .entry((skin_type, budget))
                    .or_default()
                    .push(product.position);
            }
        }
        Ok(())
    }

    /// Validate catalog integrity
    ///
    /// Check that:
    /// - Positions match row order
    /// - Every row is as wide as the header
    pub fn validate(&self) -> Result<()> {
        for (idx, product) in self.products.iter().enumerate() {
            if product.position != idx {
                return Err(DataLoadError::ValidationError(format!(
                    "Product '{}' has position {} but sits at row {}",
                    product.name, product.position, idx
                )));
            }
            if product.fields.len() != self.headers.len() {
                return Err(DataLoadError::ValidationError(format!(
                    "Product '{}' has {} fields, header has {}",
                    product.name,
                    product.fields.len(),
                    self.headers.len()
                )));
            }
        }

        let unclassified = self
            .products
            .iter()
            .filter(|p| p.skin_type.is_none() || p.price_category.is_none())
            .count();
        if unclassified > 0 {
            debug!(
                "{} products have an unrecognized skin type or price category and will never match",
                unclassified
            );
        }
        Ok(())
    }
}

/// Rename repeated header names the way dataframe exports read them back:
/// the second `brand` becomes `brand.1`, the third `brand.2`, skipping any
/// name already taken. The first occurrence keeps its name.
fn dedupe_headers(headers: impl Iterator<Item = String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut renamed = Vec::new();

    for header in headers {
        let mut name = header.clone();
        let mut count = counts.get(&name).copied().unwrap_or(0);
        while count > 0 {
            counts.insert(name.clone(), count + 1);
            name = format!("{}.{}", name, count);
            count = counts.get(&name).copied().unwrap_or(0);
        }
        if name != header {
            debug!("Renamed duplicate column {} to {}", header, name);
        }
        counts.insert(name.clone(), count + 1);
        renamed.push(name);
    }
    renamed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
product_name,brand,price_category,skin_type,skin_tone_medium,skin_tone_tan
Hydra Gel,Acme,Low,Oily,1,0
\"Barrier Cream, Rich\",Acme,High,Dry,0,1
Clay Mask,Other,Low,Oily,True,False
Mystery Oil,Other,,Normal,0,0
";

    #[test]
    fn test_from_csv_str() {
        let catalog = Catalog::from_csv_str(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.headers().len(), 6);

        let cream = catalog.get(1).unwrap();
        assert_eq!(cream.name, "Barrier Cream, Rich");
        assert_eq!(cream.skin_type, Some(SkinType::Dry));
        assert!(cream.suits_tone(SkinTone::Tan));

        assert_eq!(catalog.count_matching(SkinType::Oily, PriceCategory::Low), 2);
        assert_eq!(catalog.count_matching(SkinType::Dry, PriceCategory::Low), 0);
    }

    #[test]
    fn test_column_lookup() {
        let catalog = Catalog::from_csv_str(SAMPLE).unwrap();
        let brands: Vec<&str> = catalog.column("brand").unwrap().collect();
        assert_eq!(brands, vec!["Acme", "Acme", "Other", "Other"]);
        assert!(catalog.column("ingredients").is_none());

        let first = catalog.get(0).unwrap();
        assert_eq!(catalog.field(first, "brand"), Some("Acme"));
        assert_eq!(catalog.field(first, "nope"), None);
    }

    #[test]
    fn test_unclassified_rows_are_kept() {
        let catalog = Catalog::from_csv_str(SAMPLE).unwrap();
        let mystery = catalog.get(3).unwrap();
        assert_eq!(mystery.skin_type, None);
        assert_eq!(mystery.price_category, None);
    }

    #[test]
    fn test_missing_required_column() {
        let err = Catalog::from_csv_str("product_name,skin_type\nA,Oily\n").unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn { .. }));
    }

    #[test]
    fn test_missing_tone_columns_read_as_zero() {
        let catalog =
            Catalog::from_csv_str("product_name,price_category,skin_type\nA,Low,Oily\n").unwrap();
        assert!(catalog.get(0).unwrap().skin_tones.is_empty());
    }

    #[test]
    fn test_bad_tone_flag_reads_as_zero() {
        let catalog = Catalog::from_csv_str(
            "product_name,price_category,skin_type,skin_tone_tan,skin_tone_fair\nA,Low,Oily,yes,1\n",
        )
        .unwrap();
        let product = catalog.get(0).unwrap();
        assert!(!product.suits_tone(SkinTone::Tan));
        assert!(product.suits_tone(SkinTone::Fair));
        assert_eq!(catalog.field(product, "skin_tone_tan"), Some("yes"));
    }

    #[test]
    fn test_duplicate_columns_are_renamed() {
        let catalog = Catalog::from_csv_str(
            "product_name,price_category,skin_type,brand,brand,brand.1,brand\nA,Low,Oily,x,y,z,w\n",
        )
        .unwrap();
        assert_eq!(
            catalog.headers(),
            ["product_name", "price_category", "skin_type", "brand", "brand.1", "brand.1.1", "brand.2"]
        );

        let product = catalog.get(0).unwrap();
        assert_eq!(catalog.field(product, "brand"), Some("x"));
        assert_eq!(catalog.field(product, "brand.1"), Some("y"));
        assert_eq!(catalog.field(product, "brand.1.1"), Some("z"));
        assert_eq!(catalog.field(product, "brand.2"), Some("w"));
    }

    #[test]
    fn test_stored_labels_must_match_exactly() {
        let catalog = Catalog::from_csv_str(
            "product_name,price_category,skin_type\nA,Low,Oily\nB,low,oily\nC, LOW ,O-i_l y\n",
        )
        .unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.count_matching(SkinType::Oily, PriceCategory::Low), 1);
        for position in [1, 2] {
            let product = catalog.get(position).unwrap();
            assert_eq!(product.skin_type, None);
            assert_eq!(product.price_category, None);
        }
    }

    #[test]
    fn test_empty_source() {
        let err = Catalog::from_csv_str("").unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let catalog = Catalog::load_from_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_load_rejects_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"product_name,price_category,skin_type\nCr\xe8me,Low,Oily\n").unwrap();

        let err = Catalog::load_from_file(file.path()).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::IoError(ref e) if e.kind() == std::io::ErrorKind::InvalidData
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Catalog::load_from_file(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
