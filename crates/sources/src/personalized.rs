//! Personalized Source - taste-overlap candidate generation
//!
//! Proposes recipes that share something with what the user liked:
//! "You liked garlic and weeknight dinners, here are more of those"
//!
//! ## Algorithm
//! 1. Take the profile's liked ingredients and liked tags
//! 2. Ask the store for every recipe containing any liked ingredient OR
//!    carrying any liked tag (the store narrows this through its
//!    ingredient/tag indices)
//! 3. Score each by its raw overlap: shared ingredients + shared tags
//!
//! Already-rated and low-rated recipes are NOT removed here; that is the
//! filter pipeline's job. The source only answers "what overlaps".

use crate::types::{Candidate, CandidateSource, TasteProfile};
use data_loader::{RecipeFilter, RecipeQuery, RecipeStore, StoreResult, intersection_size};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

/// Personalized source generates candidates from a user's taste profile
#[derive(Clone)]
pub struct PersonalizedSource {
    /// Shared store handle (read-only, so no Mutex needed)
    store: Arc<dyn RecipeStore>,
}

impl PersonalizedSource {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self { store }
    }

    /// Generate candidates for a profile.
    ///
    /// The store query aborts with `StoreError::DeadlineExceeded` once
    /// `deadline` passes. A profile with no liked ingredients or tags yields
    /// no candidates.
    #[instrument(skip(self, profile), fields(user_id = profile.user_id))]
    pub fn get_candidates(
        &self,
        profile: &TasteProfile,
        deadline: Option<Instant>,
    ) -> StoreResult<Vec<Candidate>> {
        if profile.liked_ingredients.is_empty() && profile.liked_tags.is_empty() {
            return Ok(Vec::new());
        }

        let ingredients = profile.ingredient_set();
        let tags = profile.tag_set();

        let mut query = RecipeQuery::new().filter(RecipeFilter::Or(vec![
            RecipeFilter::AnyIngredient(ingredients.clone()),
            RecipeFilter::AnyTag(tags.clone()),
        ]));
        if let Some(deadline) = deadline {
            query = query.deadline(deadline);
        }

        let recipes = self.store.find_recipes(&query)?;
        debug!(
            "Matched {} recipes against {} ingredients / {} tags",
            recipes.len(),
            ingredients.len(),
            tags.len()
        );

        let candidates: Vec<Candidate> = recipes
            .into_par_iter()
            .map(|recipe| {
                let overlap = intersection_size(&recipe.ingredients, &ingredients)
                    + intersection_size(&recipe.tags, &tags);
                Candidate::new(recipe, CandidateSource::Personalized, overlap as f64)
            })
            .collect();

        debug!("Generated {} personalized candidates", candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Recipe, RecipeIndex, StoreError};
    use std::time::Duration;

    fn create_test_index() -> RecipeIndex {
        let mut index = RecipeIndex::new();
        index.insert_recipe(
            Recipe::new(1, "tomato pasta")
                .with_ingredients(["tomato", "pasta", "basil"])
                .with_tags(["italian"]),
        );
        index.insert_recipe(
            Recipe::new(2, "caprese")
                .with_ingredients(["tomato", "mozzarella", "basil"])
                .with_tags(["salads"]),
        );
        index.insert_recipe(
            Recipe::new(3, "risotto")
                .with_ingredients(["rice", "stock"])
                .with_tags(["italian"]),
        );
        index.insert_recipe(
            Recipe::new(4, "pancakes")
                .with_ingredients(["flour", "milk"])
                .with_tags(["breakfast"]),
        );
        index
    }

    fn profile() -> TasteProfile {
        let mut profile = TasteProfile::new(1);
        profile.liked_ingredients = vec!["tomato".into(), "basil".into()];
        profile.liked_tags = vec!["italian".into()];
        profile
    }

    #[test]
    fn test_overlap_by_ingredient_or_tag() {
        let source = PersonalizedSource::new(Arc::new(create_test_index()));
        let mut candidates = source.get_candidates(&profile(), None).unwrap();
        candidates.sort_by_key(|c| c.recipe_id());

        let ids: Vec<_> = candidates.iter().map(|c| c.recipe_id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        // tomato + basil + italian
        assert_eq!(candidates[0].base_score, 3.0);
        // italian only
        assert_eq!(candidates[2].base_score, 1.0);
    }

    #[test]
    fn test_empty_profile_has_no_candidates() {
        let source = PersonalizedSource::new(Arc::new(create_test_index()));
        let candidates = source.get_candidates(&TasteProfile::new(1), None).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_expired_deadline() {
        let source = PersonalizedSource::new(Arc::new(create_test_index()));
        let past = Instant::now() - Duration::from_millis(1);
        let result = source.get_candidates(&profile(), Some(past));
        assert!(matches!(result, Err(StoreError::DeadlineExceeded)));
    }
}
