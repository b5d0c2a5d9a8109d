//! Core domain types for the skincare product catalog.
//!
//! This module defines the categorical attributes a user picks on the form
//! (skin type, skin tone, budget), the product record loaded from the
//! catalog file, and the `Catalog` itself.

use crate::error::DataLoadError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Label normalization
// =============================================================================

/// Lowercase a user supplied label and drop separators, so that
/// "Fair-Light", "fair_light" and "fairLight" all compare equal.
///
/// Only used by `FromStr`. Catalog cells are classified with an exact match
/// (see `SkinType::from_catalog_value`).
fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

// =============================================================================
// Skin type
// =============================================================================

/// Skin type, both as stored on a product and as chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkinType {
    Combination,
    Dry,
    Oily,
}

impl SkinType {
    /// All skin types in feature-schema order
    pub const ALL: [SkinType; 3] = [SkinType::Combination, SkinType::Dry, SkinType::Oily];

    /// Label as it appears in the catalog's `skin_type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            SkinType::Combination => "Combination",
            SkinType::Dry => "Dry",
            SkinType::Oily => "Oily",
        }
    }

    /// Classify a raw `skin_type` cell. The cell must equal `as_str()`
    /// exactly; anything else leaves the product unclassified.
    pub fn from_catalog_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    /// Name of the one-hot feature column for this skin type
    pub fn feature_column(&self) -> &'static str {
        match self {
            SkinType::Combination => "skin_type_combination",
            SkinType::Dry => "skin_type_dry",
            SkinType::Oily => "skin_type_oily",
        }
    }

    /// Short explanation shown to users who are unsure of their type
    pub fn description(&self) -> &'static str {
        match self {
            SkinType::Combination => {
                "Mixed skin with oily areas (typically T-zone) and normal or dry areas elsewhere."
            }
            SkinType::Dry => {
                "Skin that feels tight, may flake, and lacks natural moisture. Often feels rough or itchy."
            }
            SkinType::Oily => {
                "Skin that produces excess sebum, appears shiny, and may be prone to enlarged pores and acne."
            }
        }
    }
}

impl Default for SkinType {
    fn default() -> Self {
        SkinType::Combination
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkinType {
    type Err = DataLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "combination" => Ok(SkinType::Combination),
            "dry" => Ok(SkinType::Dry),
            "oily" => Ok(SkinType::Oily),
            _ => Err(DataLoadError::InvalidValue {
                field: "skin_type".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Price category
// =============================================================================

/// Budget bucket of a product, and the budget a user is shopping in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceCategory {
    Low,
    Medium,
    High,
}

impl PriceCategory {
    /// All price categories in feature-schema order
    pub const ALL: [PriceCategory; 3] = [
        PriceCategory::Low,
        PriceCategory::Medium,
        PriceCategory::High,
    ];

    /// Label as it appears in the catalog's `price_category` column
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceCategory::Low => "Low",
            PriceCategory::Medium => "Medium",
            PriceCategory::High => "High",
        }
    }

    /// Classify a raw `price_category` cell; exact match on `as_str()`
    pub fn from_catalog_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    /// Name of the one-hot feature column for this category
    pub fn feature_column(&self) -> &'static str {
        match self {
            PriceCategory::Low => "price_category_low",
            PriceCategory::Medium => "price_category_medium",
            PriceCategory::High => "price_category_high",
        }
    }
}

impl fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceCategory {
    type Err = DataLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "low" => Ok(PriceCategory::Low),
            "medium" => Ok(PriceCategory::Medium),
            "high" => Ok(PriceCategory::High),
            _ => Err(DataLoadError::InvalidValue {
                field: "price_category".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Skin tone
// =============================================================================

/// The 14 skin tones recognized by the catalog and the model.
///
/// Variant order follows the feature schema, which sorts the tone columns
/// alphabetically by their catalog key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkinTone {
    Dark,
    Deep,
    Ebony,
    Fair,
    FairLight,
    Light,
    LightMedium,
    Medium,
    MediumTan,
    /// "Not sure" sentinel; still a real column in the schema
    NotSure,
    Olive,
    Porcelain,
    Rich,
    Tan,
}

impl SkinTone {
    pub const ALL: [SkinTone; 14] = [
        SkinTone::Dark,
        SkinTone::Deep,
        SkinTone::Ebony,
        SkinTone::Fair,
        SkinTone::FairLight,
        SkinTone::Light,
        SkinTone::LightMedium,
        SkinTone::Medium,
        SkinTone::MediumTan,
        SkinTone::NotSure,
        SkinTone::Olive,
        SkinTone::Porcelain,
        SkinTone::Rich,
        SkinTone::Tan,
    ];

    /// Position of this tone inside the tone group (0..14)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Key used in catalog column names (`skin_tone_<key>`)
    pub fn key(&self) -> &'static str {
        match self {
            SkinTone::Dark => "dark",
            SkinTone::Deep => "deep",
            SkinTone::Ebony => "ebony",
            SkinTone::Fair => "fair",
            SkinTone::FairLight => "fairLight",
            SkinTone::Light => "light",
            SkinTone::LightMedium => "lightMedium",
            SkinTone::Medium => "medium",
            SkinTone::MediumTan => "mediumTan",
            SkinTone::NotSure => "notSureST",
            SkinTone::Olive => "olive",
            SkinTone::Porcelain => "porcelain",
            SkinTone::Rich => "rich",
            SkinTone::Tan => "tan",
        }
    }

    /// Name of the one-hot feature column for this tone
    pub fn feature_column(&self) -> &'static str {
        match self {
            SkinTone::Dark => "skin_tone_dark",
            SkinTone::Deep => "skin_tone_deep",
            SkinTone::Ebony => "skin_tone_ebony",
            SkinTone::Fair => "skin_tone_fair",
            SkinTone::FairLight => "skin_tone_fairLight",
            SkinTone::Light => "skin_tone_light",
            SkinTone::LightMedium => "skin_tone_lightMedium",
            SkinTone::Medium => "skin_tone_medium",
            SkinTone::MediumTan => "skin_tone_mediumTan",
            SkinTone::NotSure => "skin_tone_notSureST",
            SkinTone::Olive => "skin_tone_olive",
            SkinTone::Porcelain => "skin_tone_porcelain",
            SkinTone::Rich => "skin_tone_rich",
            SkinTone::Tan => "skin_tone_tan",
        }
    }

    /// Human-facing label
    pub fn display_name(&self) -> &'static str {
        match self {
            SkinTone::Dark => "Dark",
            SkinTone::Deep => "Deep",
            SkinTone::Ebony => "Ebony",
            SkinTone::Fair => "Fair",
            SkinTone::FairLight => "Fair-Light",
            SkinTone::Light => "Light",
            SkinTone::LightMedium => "Light-Medium",
            SkinTone::Medium => "Medium",
            SkinTone::MediumTan => "Medium-Tan",
            SkinTone::NotSure => "Not Sure",
            SkinTone::Olive => "Olive",
            SkinTone::Porcelain => "Porcelain",
            SkinTone::Rich => "Rich",
            SkinTone::Tan => "Tan",
        }
    }

    /// Marker shown when no swatch image is available
    pub fn emoji(&self) -> &'static str {
        match self {
            SkinTone::Fair | SkinTone::Porcelain | SkinTone::FairLight | SkinTone::Light => "⚪️",
            SkinTone::LightMedium | SkinTone::Medium | SkinTone::MediumTan => "🟡",
            SkinTone::Olive | SkinTone::Tan => "🟠",
            SkinTone::Deep | SkinTone::Dark | SkinTone::Ebony | SkinTone::Rich => "🟤",
            SkinTone::NotSure => "❓",
        }
    }
}

impl Default for SkinTone {
    fn default() -> Self {
        SkinTone::Medium
    }
}

impl fmt::Display for SkinTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SkinTone {
    type Err = DataLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_label(s);
        if matches!(normalized.as_str(), "notsure" | "notsurest") {
            return Ok(SkinTone::NotSure);
        }
        SkinTone::ALL
            .into_iter()
            .find(|tone| normalize_label(tone.key()) == normalized)
            .ok_or_else(|| DataLoadError::InvalidValue {
                field: "skin_tone".to_string(),
                value: s.to_string(),
            })
    }
}

/// Compact set of skin tones a product is recorded as suitable for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkinToneSet(u16);

impl SkinToneSet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, tone: SkinTone) {
        self.0 |= 1 << tone.index();
    }

    pub fn contains(&self, tone: SkinTone) -> bool {
        self.0 & (1 << tone.index()) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Tones in schema order
    pub fn iter(&self) -> impl Iterator<Item = SkinTone> + '_ {
        SkinTone::ALL.into_iter().filter(|tone| self.contains(*tone))
    }
}

impl FromIterator<SkinTone> for SkinToneSet {
    fn from_iter<I: IntoIterator<Item = SkinTone>>(iter: I) -> Self {
        let mut set = SkinToneSet::new();
        for tone in iter {
            set.insert(tone);
        }
        set
    }
}

// =============================================================================
// Product records
// =============================================================================

/// One row of the catalog.
///
/// The typed fields are parsed once at load time. `fields` keeps every raw
/// value of the row, aligned with `Catalog::headers`, so descriptive columns
/// pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Zero-based row position in the catalog file (header excluded)
    pub position: usize,
    pub name: String,
    /// `None` when the row's value is not one of Low/Medium/High
    pub price_category: Option<PriceCategory>,
    /// `None` when the row's value is not one of Combination/Dry/Oily
    pub skin_type: Option<SkinType>,
    pub skin_tones: SkinToneSet,
    pub fields: Vec<String>,
}

impl ProductRecord {
    /// True when the stored skin type and price category both equal the inputs
    pub fn matches(&self, skin_type: SkinType, budget: PriceCategory) -> bool {
        self.skin_type == Some(skin_type) && self.price_category == Some(budget)
    }

    /// Whether the catalog recorded this product as suitable for `tone`
    pub fn suits_tone(&self, tone: SkinTone) -> bool {
        self.skin_tones.contains(tone)
    }
}

// =============================================================================
// Catalog - the in-memory product store
// =============================================================================

/// The static, read-only product catalog.
///
/// Built once by the loader (see `index.rs`); there is no mutation API
/// afterwards. Products keep their file order, which ranking relies on for
/// tie-breaking.
#[derive(Debug, Default)]
pub struct Catalog {
    pub(crate) headers: Vec<String>,
    pub(crate) products: Vec<ProductRecord>,
    /// Header name -> column index
    pub(crate) column_index: HashMap<String, usize>,
    /// Product positions grouped by (skin type, price category)
    pub(crate) segment_index: HashMap<(SkinType, PriceCategory), Vec<usize>>,
}

impl Catalog {
    /// All products in catalog order
    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    /// Get a product by its position
    pub fn get(&self, position: usize) -> Option<&ProductRecord> {
        self.products.get(position)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Column names in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    /// Raw values of one column for every product, or `None` if the column
    /// does not exist
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let idx = *self.column_index.get(name)?;
        Some(
            self.products
                .iter()
                .map(move |p| p.fields.get(idx).map(String::as_str).unwrap_or("")),
        )
    }

    /// Raw value of a single cell
    pub fn field<'a>(&self, product: &'a ProductRecord, name: &str) -> Option<&'a str> {
        let idx = *self.column_index.get(name)?;
        product.fields.get(idx).map(String::as_str)
    }

    /// Number of products stored with this skin type and price category
    pub fn count_matching(&self, skin_type: SkinType, budget: PriceCategory) -> usize {
        self.segment_index
            .get(&(skin_type, budget))
            .map(Vec::len)
            .unwrap_or(0)
    }
}
