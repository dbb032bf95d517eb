//! RecipeIndex loading, validation and derived statistics.
//!
//! - Load both collections from a data directory (in parallel)
//! - Validate references and the rating invariants at the store boundary
//! - Recompute avg_rating / review_count / ratings_distribution from reviews

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

/// File names expected inside a data directory
pub const RECIPES_FILE: &str = "recipes.jsonl";
pub const REVIEWS_FILE: &str = "reviews.jsonl";

impl RecipeIndex {
    /// Load the dataset from a directory containing `recipes.jsonl` and
    /// `reviews.jsonl`.
    ///
    /// Steps:
    /// 1. Parse both files in parallel
    /// 2. Insert recipes, then reviews (indices are built on insert)
    /// 3. Validate data integrity
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading recipe dataset from {:?}", data_dir);

        let recipes_path = data_dir.join(RECIPES_FILE);
        let reviews_path = data_dir.join(REVIEWS_FILE);

        // Rayon's `join` runs both parsers in parallel
        let (recipes, reviews) = rayon::join(
            || parser::parse_recipes(&recipes_path),
            || parser::parse_reviews(&reviews_path),
        );
        let recipes = recipes?;
        let reviews = reviews?;

        info!("Parsed {} recipes, {} reviews", recipes.len(), reviews.len());

        let index = Self::from_records(recipes, reviews)?;
        info!("RecipeIndex built and validated");
        Ok(index)
    }

    /// Build and validate an index from already-parsed records
    pub fn from_records(recipes: Vec<Recipe>, reviews: Vec<Review>) -> Result<Self> {
        let mut seen_ids = HashSet::new();
        let mut seen_source_ids = HashSet::new();
        for recipe in &recipes {
            if !seen_ids.insert(recipe.id) {
                return Err(DataLoadError::ValidationError(format!(
                    "duplicate recipe id {}",
                    recipe.id
                )));
            }
            if !seen_source_ids.insert(recipe.original_id) {
                return Err(DataLoadError::ValidationError(format!(
                    "duplicate original_id {}",
                    recipe.original_id
                )));
            }
        }

        let mut index = RecipeIndex::new();
        for recipe in recipes {
            index.insert_recipe(recipe);
        }
        for review in reviews {
            index.insert_review(review);
        }

        index.validate()?;
        Ok(index)
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Every review references an existing recipe
    /// - Every review rating is within 1..=5
    /// - A recipe with avg_rating also has a positive review_count
    pub fn validate(&self) -> Result<()> {
        for review in &self.reviews {
            if !self.recipes.contains_key(&review.recipe_id) {
                return Err(DataLoadError::MissingReference {
                    entity: "Recipe".to_string(),
                    id: review.recipe_id,
                });
            }
            if !(1..=5).contains(&review.rating) {
                return Err(DataLoadError::InvalidValue {
                    field: "rating".to_string(),
                    value: review.rating.to_string(),
                });
            }
        }

        for recipe in self.recipes.values() {
            if recipe.avg_rating.is_some() && !recipe.review_count.is_some_and(|c| c > 0) {
                return Err(DataLoadError::ValidationError(format!(
                    "recipe {} has avg_rating but no review_count",
                    recipe.id
                )));
            }
        }
        Ok(())
    }

    /// Recompute the derived rating fields of every reviewed recipe.
    ///
    /// This is the out-of-band batch job's work; engine queries never call
    /// it. Recipes without reviews keep whatever values they had.
    pub fn refresh_recipe_stats(&mut self) {
        let stats: Vec<(RecipeId, RecipeStats)> = self
            .recipe_reviews
            .par_iter()
            .map(|(&recipe_id, positions)| {
                let ratings: Vec<u8> = positions.iter().map(|&i| self.reviews[i].rating).collect();
                (recipe_id, compute_recipe_stats(&ratings))
            })
            .collect();

        let mut updated = 0;
        for (recipe_id, stats) in stats {
            if let Some(recipe) = self.recipes.get_mut(&recipe_id) {
                recipe.avg_rating = Some(stats.avg_rating);
                recipe.review_count = Some(stats.review_count);
                recipe.ratings_distribution = stats.ratings_distribution;
                updated += 1;
            }
        }
        info!("Refreshed rating stats for {} recipes", updated);
    }
}

/// Aggregates derived from one recipe's reviews
#[derive(Debug, Clone, PartialEq)]
struct RecipeStats {
    avg_rating: f64,
    review_count: u32,
    ratings_distribution: BTreeMap<String, u32>,
}

/// Average, count and per-star histogram ("1".."5", zero-filled)
fn compute_recipe_stats(ratings: &[u8]) -> RecipeStats {
    let review_count = ratings.len() as u32;
    let total: u32 = ratings.iter().map(|&r| r as u32).sum();
    let ratings_distribution = (1..=5u8)
        .map(|star| {
            let count = ratings.iter().filter(|&&r| r == star).count() as u32;
            (star.to_string(), count)
        })
        .collect();

    RecipeStats {
        avg_rating: if review_count > 0 {
            total as f64 / review_count as f64
        } else {
            0.0
        },
        review_count,
        ratings_distribution,
    }
}
