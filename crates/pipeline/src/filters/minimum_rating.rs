//! Rating floor for recommendation candidates.

use crate::traits::Filter;
use anyhow::Result;
use sources::Candidate;

/// Removes candidates below a minimum avg_rating. Unrated recipes never
/// pass.
pub struct MinimumRatingFilter {
    min_rating: f64,
}

impl MinimumRatingFilter {
    /// Create a new MinimumRatingFilter (typically 3.5)
    pub fn new(min_rating: f64) -> Self {
        Self { min_rating }
    }
}

impl Filter for MinimumRatingFilter {
    fn name(&self) -> &str {
        "MinimumRatingFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
        Ok(candidates
            .into_iter()
            .filter(|c| c.recipe.avg_rating.is_some_and(|r| r >= self.min_rating))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Recipe;
    use sources::CandidateSource;

    fn candidate(recipe: Recipe) -> Candidate {
        Candidate::new(recipe, CandidateSource::Personalized, 0.0)
    }

    #[test]
    fn test_minimum_rating_filter() {
        let filter = MinimumRatingFilter::new(3.5);

        let candidates = vec![
            candidate(Recipe::new(1, "good").with_rating(4.5, 20)),
            candidate(Recipe::new(2, "bad").with_rating(2.0, 20)),
            candidate(Recipe::new(3, "boundary").with_rating(3.5, 1)),
            candidate(Recipe::new(4, "unrated")),
        ];

        let filtered = filter.apply(candidates).unwrap();
        let ids: Vec<_> = filtered.iter().map(|c| c.recipe_id()).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
