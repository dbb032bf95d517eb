//! Build a `TasteProfile` from the store for a given user.
//!
//! The profile is gathered once, before candidate generation, so the
//! sources never have to query reviews themselves.

use crate::types::TasteProfile;
use anyhow::{Context, Result};
use data_loader::{RecipeStore, ReviewQuery, UserId};
use std::collections::HashSet;
use tracing::debug;

/// Limits applied while building a profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TasteSettings {
    /// Minimum rating for a review to count as "liked"
    pub like_threshold: u8,
    /// Maximum number of distinct liked ingredients kept
    pub max_ingredients: usize,
    /// Maximum number of distinct liked tags kept
    pub max_tags: usize,
}

impl Default for TasteSettings {
    fn default() -> Self {
        Self {
            like_threshold: 4,
            max_ingredients: 50,
            max_tags: 20,
        }
    }
}

/// Build a TasteProfile for `user_id`.
///
/// Steps:
/// 1. Fetch every review by the user (all of them are "rated")
/// 2. Keep the ones at or above the like threshold
/// 3. Join the liked reviews to their recipes in one batch lookup
/// 4. Collect distinct ingredients and tags in first-seen order, up to the caps
///
/// A user without reviews gets an empty profile, not an error; the caller
/// decides what an empty profile means.
pub fn build_taste_profile(
    store: &dyn RecipeStore,
    user_id: UserId,
    settings: &TasteSettings,
) -> Result<TasteProfile> {
    let mut profile = TasteProfile::new(user_id);

    let reviews = store
        .find_reviews(&ReviewQuery::by_user(user_id))
        .with_context(|| format!("fetching reviews of user {}", user_id))?;

    for review in &reviews {
        profile.rated_recipes.insert(review.recipe_id);
        if review.rating >= settings.like_threshold && !profile.liked_recipes.contains(&review.recipe_id) {
            profile.liked_recipes.push(review.recipe_id);
        }
    }

    if profile.liked_recipes.is_empty() {
        debug!(user_id, reviews = reviews.len(), "no liked reviews");
        return Ok(profile);
    }

    let liked = store
        .recipes_by_ids(&profile.liked_recipes)
        .context("joining liked reviews to recipes")?;

    let mut seen_ingredients = HashSet::new();
    let mut seen_tags = HashSet::new();
    // Walk in review order so the caps keep the earliest values
    for recipe in profile.liked_recipes.iter().filter_map(|id| liked.get(id)) {
        collect_distinct(
            &recipe.ingredients,
            &mut profile.liked_ingredients,
            &mut seen_ingredients,
            settings.max_ingredients,
        );
        collect_distinct(
            &recipe.tags,
            &mut profile.liked_tags,
            &mut seen_tags,
            settings.max_tags,
        );
    }

    debug!(
        user_id,
        rated = profile.rated_recipes.len(),
        liked = profile.liked_recipes.len(),
        ingredients = profile.liked_ingredients.len(),
        tags = profile.liked_tags.len(),
        "built taste profile"
    );
    Ok(profile)
}

/// Append values not seen before until `out` holds `cap` entries
fn collect_distinct(values: &[String], out: &mut Vec<String>, seen: &mut HashSet<String>, cap: usize) {
    for value in values {
        if out.len() >= cap {
            return;
        }
        if seen.insert(value.clone()) {
            out.push(value.clone());
        }
    }
}
