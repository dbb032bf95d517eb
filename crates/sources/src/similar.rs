//! Similar Source - ingredient-overlap similarity
//!
//! "Recipes that share the most ingredients with this one"
//!
//! ## Algorithm
//! 1. Candidates = every recipe except the target that contains at least one
//!    of the target's ingredients (via the ingredient index)
//! 2. overlap = |ingredients(target) ∩ ingredients(candidate)|, compared as a
//!    set of exact strings
//! 3. Order by overlap desc, then avg_rating desc (missing lowest), then id
//! 4. Keep the first `limit`

use crate::types::{Candidate, CandidateSource};
use data_loader::{
    Recipe, RecipeFilter, RecipeQuery, RecipeStore, StoreResult, compare_ratings,
    intersection_size,
};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct SimilarSource {
    store: Arc<dyn RecipeStore>,
}

impl SimilarSource {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self { store }
    }

    /// Rank recipes by ingredient overlap with `target`.
    ///
    /// `base_score` of each candidate is its overlap count. The target itself
    /// is never returned, and neither is any recipe sharing nothing with it.
    #[instrument(skip(self, target), fields(recipe_id = target.id))]
    pub fn get_candidates(&self, target: &Recipe, limit: usize) -> StoreResult<Vec<Candidate>> {
        if limit == 0 || target.ingredients.is_empty() {
            return Ok(Vec::new());
        }

        let target_ingredients: HashSet<String> = target.ingredients.iter().cloned().collect();
        let query = RecipeQuery::new()
            .filter(RecipeFilter::AnyIngredient(target_ingredients.clone()))
            .filter(RecipeFilter::IdNotIn(HashSet::from([target.id])));

        let recipes = self.store.find_recipes(&query)?;
        debug!("Scoring {} recipes sharing an ingredient", recipes.len());

        let mut scored: Vec<(Recipe, usize)> = recipes
            .into_par_iter()
            .map(|recipe| {
                let overlap = intersection_size(&recipe.ingredients, &target_ingredients);
                (recipe, overlap)
            })
            .filter(|(_, overlap)| *overlap > 0)
            .collect();

        scored.sort_by(|(a, a_overlap), (b, b_overlap)| {
            b_overlap
                .cmp(a_overlap)
                .then_with(|| compare_ratings(b.avg_rating, a.avg_rating))
                .then_with(|| a.id.cmp(&b.id))
        });
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(recipe, overlap)| Candidate::new(recipe, CandidateSource::Similar, overlap as f64))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::RecipeIndex;

    /// R1 = {a,b,c}, R2 = {b,c,d}, R3 = {x}
    fn create_test_index() -> Arc<RecipeIndex> {
        let mut index = RecipeIndex::new();
        index.insert_recipe(Recipe::new(1, "r1").with_ingredients(["a", "b", "c"]));
        index.insert_recipe(Recipe::new(2, "r2").with_ingredients(["b", "c", "d"]));
        index.insert_recipe(Recipe::new(3, "r3").with_ingredients(["x"]));
        Arc::new(index)
    }

    #[test]
    fn test_overlap_and_exclusion() {
        let index = create_test_index();
        let source = SimilarSource::new(index.clone());

        let target = index.get_recipe(1).unwrap().clone();
        let candidates = source.get_candidates(&target, 10).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].recipe_id(), 2);
        assert_eq!(candidates[0].base_score, 2.0);
    }

    #[test]
    fn test_no_shared_ingredients() {
        let index = create_test_index();
        let source = SimilarSource::new(index.clone());

        let target = index.get_recipe(3).unwrap().clone();
        assert!(source.get_candidates(&target, 10).unwrap().is_empty());
    }

    #[test]
    fn test_ordering_and_limit() {
        let mut index = RecipeIndex::new();
        index.insert_recipe(Recipe::new(1, "target").with_ingredients(["egg", "milk", "flour"]));
        index.insert_recipe(Recipe::new(2, "low").with_ingredients(["egg"]).with_rating(5.0, 3));
        index.insert_recipe(
            Recipe::new(3, "unrated").with_ingredients(["egg", "milk"]),
        );
        index.insert_recipe(
            Recipe::new(4, "rated").with_ingredients(["egg", "milk", "salt"]).with_rating(4.0, 8),
        );
        let index = Arc::new(index);
        let source = SimilarSource::new(index.clone());
        let target = index.get_recipe(1).unwrap().clone();

        let ids: Vec<_> = source
            .get_candidates(&target, 10)
            .unwrap()
            .iter()
            .map(|c| c.recipe_id())
            .collect();
        // Equal overlap: rated beats unrated
        assert_eq!(ids, vec![4, 3, 2]);

        assert_eq!(source.get_candidates(&target, 2).unwrap().len(), 2);
        assert!(source.get_candidates(&target, 0).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_ingredients_count_once() {
        let mut index = RecipeIndex::new();
        index.insert_recipe(Recipe::new(1, "target").with_ingredients(["salt", "salt", "oil"]));
        index.insert_recipe(Recipe::new(2, "other").with_ingredients(["salt", "salt"]));
        let index = Arc::new(index);
        let source = SimilarSource::new(index.clone());

        let target = index.get_recipe(1).unwrap().clone();
        assert_eq!(source.get_candidates(&target, 5).unwrap()[0].base_score, 1.0);
    }
}
