//! Types shared by the candidate sources and the filter pipeline.
//!
//! - `Candidate`: a recipe proposed by some source, with that source's score
//! - `CandidateSource`: which strategy produced it
//! - `TasteProfile`: everything about a user the personalized path needs,
//!   gathered once up front

use data_loader::{Recipe, RecipeId, UserId};
use serde::Serialize;
use std::collections::HashSet;

/// Which strategy produced a candidate (or a whole recommendation list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Overlap with the user's liked ingredients and tags
    Personalized,
    /// Ingredient overlap with a target recipe
    Similar,
    /// Global top-rated list, used as the recommendation fallback
    TopRated,
    /// A plain catalog query, such as a diet listing
    Catalog,
}

/// A recipe proposed by a source.
///
/// Candidates own a copy of their recipe so later stages (filters, scoring,
/// output) never have to go back to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub recipe: Recipe,
    pub source: CandidateSource,
    /// Score assigned by the source: shared ingredient/tag count for
    /// personalized and similar candidates, avg_rating for top-rated ones
    pub base_score: f64,
}

impl Candidate {
    pub fn new(recipe: Recipe, source: CandidateSource, base_score: f64) -> Self {
        Self {
            recipe,
            source,
            base_score,
        }
    }

    pub fn recipe_id(&self) -> RecipeId {
        self.recipe.id
    }
}

/// A user's taste, derived from their reviews.
///
/// `liked_ingredients` and `liked_tags` keep first-seen order (review order,
/// then ingredient/tag order inside each recipe) and hold distinct values
/// only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TasteProfile {
    pub user_id: UserId,
    /// Every recipe the user reviewed, whatever the rating
    pub rated_recipes: HashSet<RecipeId>,
    /// Recipes the user rated at or above the like threshold, in review order
    pub liked_recipes: Vec<RecipeId>,
    pub liked_ingredients: Vec<String>,
    pub liked_tags: Vec<String>,
}

impl TasteProfile {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// True when the user has reviewed anything at all
    pub fn has_history(&self) -> bool {
        !self.rated_recipes.is_empty()
    }

    /// True when at least one review reached the like threshold
    pub fn has_likes(&self) -> bool {
        !self.liked_recipes.is_empty()
    }

    pub fn ingredient_set(&self) -> HashSet<String> {
        self.liked_ingredients.iter().cloned().collect()
    }

    pub fn tag_set(&self) -> HashSet<String> {
        self.liked_tags.iter().cloned().collect()
    }
}
