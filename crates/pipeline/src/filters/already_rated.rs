//! Filter to remove recipes the user has already reviewed.
//!
//! This is typically the first filter in the pipeline, as there's no
//! point in recommending a recipe the user has already rated.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::RecipeId;
use sources::Candidate;
use std::collections::HashSet;

/// Removes candidates that the user has already rated.
///
/// ## Algorithm
/// Holds the user's rated set (from `TasteProfile::rated_recipes`) for O(1)
/// lookups.
pub struct AlreadyRatedFilter {
    rated: HashSet<RecipeId>,
}

impl AlreadyRatedFilter {
    pub fn new(rated: HashSet<RecipeId>) -> Self {
        Self { rated }
    }
}

impl Filter for AlreadyRatedFilter {
    fn name(&self) -> &str {
        "AlreadyRatedFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| !self.rated.contains(&candidate.recipe_id()))
            .collect();
        Ok(filtered)
    }
}
