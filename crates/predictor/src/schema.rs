//! The fixed feature schema the model was trained against.
//!
//! Column names and order must match the training data exactly. The schema
//! is three one-hot groups laid out back to back: skin type, price category,
//! skin tone.

use data_loader::{PriceCategory, SkinTone, SkinType};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Number of columns in every feature vector
pub const FEATURE_COUNT: usize = 20;

/// Column names in model input order
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "skin_type_combination",
    "skin_type_dry",
    "skin_type_oily",
    "price_category_low",
    "price_category_medium",
    "price_category_high",
    "skin_tone_dark",
    "skin_tone_deep",
    "skin_tone_ebony",
    "skin_tone_fair",
    "skin_tone_fairLight",
    "skin_tone_light",
    "skin_tone_lightMedium",
    "skin_tone_medium",
    "skin_tone_mediumTan",
    "skin_tone_notSureST",
    "skin_tone_olive",
    "skin_tone_porcelain",
    "skin_tone_rich",
    "skin_tone_tan",
];

/// Position of a column name in the schema
pub fn column_index(name: &str) -> Option<usize> {
    FEATURE_COLUMNS.iter().position(|c| *c == name)
}

/// The three one-hot groups of the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureGroup {
    SkinType,
    PriceCategory,
    SkinTone,
}

impl FeatureGroup {
    pub const ALL: [FeatureGroup; 3] = [
        FeatureGroup::SkinType,
        FeatureGroup::PriceCategory,
        FeatureGroup::SkinTone,
    ];

    /// Column range covered by this group
    pub fn range(&self) -> Range<usize> {
        match self {
            FeatureGroup::SkinType => 0..3,
            FeatureGroup::PriceCategory => 3..6,
            FeatureGroup::SkinTone => 6..FEATURE_COUNT,
        }
    }
}

/// One row of model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    /// All columns zero
    pub fn zeros() -> Self {
        Self([0.0; FEATURE_COUNT])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.0
    }

    /// Value of a named column, `None` for names outside the schema
    pub fn get(&self, column: &str) -> Option<f32> {
        column_index(column).map(|idx| self.0[idx])
    }

    /// Zero a whole group, then set exactly one member to 1
    fn set_one_hot(&mut self, group: FeatureGroup, member: usize) {
        let range = group.range();
        debug_assert!(member < range.len());
        self.0[range.clone()].fill(0.0);
        self.0[range.start + member] = 1.0;
    }

    pub fn set_skin_type(&mut self, skin_type: SkinType) {
        self.set_one_hot(FeatureGroup::SkinType, skin_type as usize);
    }

    pub fn set_price_category(&mut self, budget: PriceCategory) {
        self.set_one_hot(FeatureGroup::PriceCategory, budget as usize);
    }

    pub fn set_skin_tone(&mut self, tone: SkinTone) {
        self.set_one_hot(FeatureGroup::SkinTone, tone.index());
    }

    /// Sum of a group's columns; 1.0 for a well-formed vector
    pub fn group_sum(&self, group: FeatureGroup) -> f32 {
        self.0[group.range()].iter().sum()
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_agrees_with_domain_columns() {
        for skin_type in SkinType::ALL {
            let idx = FeatureGroup::SkinType.range().start + skin_type as usize;
            assert_eq!(FEATURE_COLUMNS[idx], skin_type.feature_column());
        }
        for budget in PriceCategory::ALL {
            let idx = FeatureGroup::PriceCategory.range().start + budget as usize;
            assert_eq!(FEATURE_COLUMNS[idx], budget.feature_column());
        }
        for tone in SkinTone::ALL {
            let idx = FeatureGroup::SkinTone.range().start + tone.index();
            assert_eq!(FEATURE_COLUMNS[idx], tone.feature_column());
        }
    }

    #[test]
    fn test_groups_cover_schema() {
        let covered: usize = FeatureGroup::ALL.iter().map(|g| g.range().len()).sum();
        assert_eq!(covered, FEATURE_COUNT);
    }

    #[test]
    fn test_set_one_hot_replaces_previous_member() {
        let mut features = FeatureVector::zeros();
        features.set_skin_tone(SkinTone::Fair);
        features.set_skin_tone(SkinTone::Rich);

        assert_eq!(features.group_sum(FeatureGroup::SkinTone), 1.0);
        assert_eq!(features.get("skin_tone_rich"), Some(1.0));
        assert_eq!(features.get("skin_tone_fair"), Some(0.0));
        assert_eq!(features.get("not_a_column"), None);
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("skin_type_combination"), Some(0));
        assert_eq!(column_index("skin_tone_tan"), Some(19));
        assert_eq!(column_index("skin_tone_beige"), None);
    }
}
