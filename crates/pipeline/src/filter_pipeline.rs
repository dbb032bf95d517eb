//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::traits::Filter;
use anyhow::Result;
use sources::Candidate;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(AlreadyRatedFilter::new(profile.rated_recipes.clone()))
///     .add_filter(MinimumRatingFilter::new(3.5));
///
/// let filtered = pipeline.apply(candidates)?;
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

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Number of filters in the pipeline
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the candidates.
    ///
    /// ## Algorithm
    /// 1. Start with the input candidates
    /// 2. For each filter in order:
    ///    a. Log filter name and input count
    ///    b. Apply the filter
    ///    c. Log output count
    /// 3. Return final filtered set
    ///
    /// Stops early once no candidates remain.
    pub fn apply(&self, candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
        let mut current = candidates;
        for filter in &self.filters {
            if current.is_empty() {
                break;
            }
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{AlreadyRatedFilter, MinimumRatingFilter};
    use anyhow::anyhow;
    use data_loader::Recipe;
    use sources::CandidateSource;
    use std::collections::HashSet;

    fn candidate(id: u64, rating: Option<f64>) -> Candidate {
        let mut recipe = Recipe::new(id, format!("recipe {}", id));
        if let Some(rating) = rating {
            recipe = recipe.with_rating(rating, 10);
        }
        Candidate::new(recipe, CandidateSource::Personalized, 1.0)
    }

    struct FailingFilter;

    impl Filter for FailingFilter {
        fn name(&self) -> &str {
            "FailingFilter"
        }

        fn apply(&self, _candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
            Err(anyhow!("boom"))
        }
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        assert!(pipeline.is_empty());

        let candidates = vec![candidate(1, None), candidate(2, None)];
        let filtered = pipeline.apply(candidates).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filters_run_in_order() {
        let pipeline = FilterPipeline::new()
            .add_filter(AlreadyRatedFilter::new(HashSet::from([1])))
            .add_filter(MinimumRatingFilter::new(3.5));
        assert_eq!(pipeline.len(), 2);

        let candidates = vec![
            candidate(1, Some(5.0)),
            candidate(2, Some(3.0)),
            candidate(3, Some(4.0)),
            candidate(4, None),
        ];

        let filtered = pipeline.apply(candidates).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].recipe_id(), 3);
    }

    #[test]
    fn test_filter_error_propagates() {
        let pipeline = FilterPipeline::new().add_filter(FailingFilter);
        assert!(pipeline.apply(vec![candidate(1, None)]).is_err());
    }

    #[test]
    fn test_empty_input_skips_filters() {
        let pipeline = FilterPipeline::new().add_filter(FailingFilter);
        assert!(pipeline.apply(Vec::new()).unwrap().is_empty());
    }
}
