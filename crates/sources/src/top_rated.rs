//! Top-Rated Source - the global fallback list
//!
//! Recipes with a high average over enough reviews, best first. Used when a
//! user has no usable history, and whenever the personalized path fails.

use crate::types::{Candidate, CandidateSource};
use data_loader::{Direction, RecipeFilter, RecipeQuery, RecipeStore, SortField, StoreResult};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct TopRatedSource {
    store: Arc<dyn RecipeStore>,

    /// Minimum avg_rating to qualify
    min_avg_rating: f64,

    /// Minimum review_count to qualify
    min_review_count: u32,
}

impl TopRatedSource {
    /// Create a source with the default thresholds (avg >= 4.0, >= 10 reviews)
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self {
            store,
            min_avg_rating: 4.0,
            min_review_count: 10,
        }
    }

    /// Configure the minimum average rating (default: 4.0)
    pub fn with_min_avg_rating(mut self, min: f64) -> Self {
        self.min_avg_rating = min;
        self
    }

    /// Configure the minimum number of reviews (default: 10)
    pub fn with_min_review_count(mut self, min: u32) -> Self {
        self.min_review_count = min;
        self
    }

    /// Best-rated qualifying recipes: avg_rating desc, then review_count
    /// desc, then id. `base_score` is the recipe's avg_rating.
    #[instrument(skip(self))]
    pub fn get_candidates(&self, limit: usize) -> StoreResult<Vec<Candidate>> {
        let query = RecipeQuery::new()
            .filter(RecipeFilter::AvgRatingAtLeast(self.min_avg_rating))
            .filter(RecipeFilter::ReviewCountAtLeast(self.min_review_count))
            .sort_by(SortField::AvgRating, Direction::Descending)
            .sort_by(SortField::ReviewCount, Direction::Descending)
            .limit(limit);

        let candidates: Vec<Candidate> = self
            .store
            .find_recipes(&query)?
            .into_iter()
            .map(|recipe| {
                let score = recipe.avg_rating.unwrap_or_default();
                Candidate::new(recipe, CandidateSource::TopRated, score)
            })
            .collect();

        debug!("Generated {} top-rated candidates", candidates.len());
        Ok(candidates)
    }
}
