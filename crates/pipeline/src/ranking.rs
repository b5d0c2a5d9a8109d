//! Ranking scored candidates into a top-K list.

use crate::types::ScoredCandidate;
use std::cmp::Ordering;

/// Number of recommendations shown to the user
pub const DEFAULT_TOP_K: usize = 3;

/// Whether ranking had anything to work with.
///
/// Lets callers tell "no candidates at all" apart from a top-K that is
/// empty only because `k == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankStatus {
    Ranked,
    NoCandidates,
}

/// The ranked head of a candidate list
#[derive(Debug, Clone, PartialEq)]
pub struct TopK<'a> {
    pub status: RankStatus,
    pub candidates: Vec<ScoredCandidate<'a>>,
}

impl<'a> TopK<'a> {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Highest predicted rating first; equal ratings keep catalog order.
/// NaN ratings sort after every real rating.
fn by_rating_desc(a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
    let (x, y) = (a.predicted_rating, b.predicted_rating);
    let by_rating = match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
    };
    by_rating.then_with(|| a.product.position.cmp(&b.product.position))
}

/// Sort candidates by predicted rating and keep the best `k`.
///
/// Returns exactly `min(k, candidates.len())` entries. Ranking an already
/// ranked list leaves it unchanged.
pub fn rank<'a>(mut candidates: Vec<ScoredCandidate<'a>>, k: usize) -> TopK<'a> {
    if candidates.is_empty() {
        return TopK {
            status: RankStatus::NoCandidates,
            candidates,
        };
    }

    candidates.sort_by(by_rating_desc);
    candidates.truncate(k);

    TopK {
        status: RankStatus::Ranked,
        candidates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Catalog, ProductRecord};

    fn test_catalog() -> Catalog {
        Catalog::from_csv_str(
            "product_name,price_category,skin_type\nA,Low,Oily\nB,Low,Oily\nC,Low,Oily\nD,Low,Oily\nE,Low,Oily\n",
        )
        .unwrap()
    }

    fn scored<'a>(catalog: &'a Catalog, scores: &[f32]) -> Vec<ScoredCandidate<'a>> {
        let products: Vec<&ProductRecord> = catalog.products().iter().collect();
        ScoredCandidate::zip_scores(products, scores.to_vec())
    }

    fn names(top: &TopK<'_>) -> Vec<String> {
        top.candidates.iter().map(|c| c.product.name.clone()).collect()
    }

    #[test]
    fn test_rank_sorts_by_rating_descending() {
        let catalog = test_catalog();
        let top = rank(scored(&catalog, &[0.2, 0.9, 0.5, 0.1, 0.4]), 10);

        assert_eq!(top.status, RankStatus::Ranked);
        assert_eq!(names(&top), vec!["B", "C", "E", "A", "D"]);
    }

    #[test]
    fn test_rank_truncates_to_k() {
        let catalog = test_catalog();
        let top = rank(scored(&catalog, &[0.1, 0.2, 0.3, 0.4, 0.5]), DEFAULT_TOP_K);

        assert_eq!(top.len(), 3);
        assert_eq!(names(&top), vec!["E", "D", "C"]);
    }

    #[test]
    fn test_rank_returns_min_of_k_and_len() {
        let catalog = test_catalog();
        for n in 0..=5 {
            let scores: Vec<f32> = (0..n).map(|i| i as f32).collect();
            for k in 0..=6 {
                let top = rank(scored(&catalog, &scores), k);
                assert_eq!(top.len(), k.min(n));
            }
        }
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = test_catalog();
        let mut candidates = scored(&catalog, &[4.0, 4.5, 4.0, 4.5, 4.0]);
        candidates.reverse();

        let top = rank(candidates, 5);
        assert_eq!(names(&top), vec!["B", "D", "A", "C", "E"]);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let catalog = test_catalog();
        let once = rank(scored(&catalog, &[3.0, 4.0, 3.0, 5.0, 1.0]), 4);
        let twice = rank(once.candidates.clone(), 4);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input_is_flagged() {
        let top = rank(Vec::new(), 3);
        assert_eq!(top.status, RankStatus::NoCandidates);
        assert!(top.is_empty());
    }

    #[test]
    fn test_zero_k_is_not_no_candidates() {
        let catalog = test_catalog();
        let top = rank(scored(&catalog, &[1.0]), 0);
        assert_eq!(top.status, RankStatus::Ranked);
        assert!(top.is_empty());
    }

    #[test]
    fn test_nan_sorts_last() {
        let catalog = test_catalog();
        let top = rank(scored(&catalog, &[f32::NAN, 0.8, 0.3]), 3);
        assert_eq!(names(&top), vec!["B", "C", "A"]);
    }
}
