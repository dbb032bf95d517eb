//! Core domain types for the recipe/review dataset.
//!
//! This module defines the fundamental data structures used throughout the system.
//! Key Rust concepts demonstrated here:
//! - Type aliases for domain clarity (RecipeId, UserId)
//! - `Option<T>` for fields the dataset may omit
//! - Serde derives so records can be read straight from JSON lines
//! - HashMap and BTreeMap for efficient lookups

use crate::error::DataLoadError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Internal identifier of a recipe inside the store
pub type RecipeId = u64;

/// Identifier the recipe carried in the source dataset (`original_id`)
pub type SourceRecipeId = i64;

/// Identifier of a reviewing user
pub type UserId = i64;

// =============================================================================
// Nutrition
// =============================================================================

/// Per-serving nutrition facts of a recipe.
///
/// Values other than calories are "percent daily value" figures as found in
/// the source dataset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub total_fat: f64,
    pub sugar: f64,
    pub sodium: f64,
    pub protein: f64,
    pub saturated_fat: f64,
    pub carbohydrates: f64,
}

impl Nutrition {
    /// Read one nutrient by name
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::TotalFat => self.total_fat,
            Nutrient::Sugar => self.sugar,
            Nutrient::Sodium => self.sodium,
            Nutrient::Protein => self.protein,
            Nutrient::SaturatedFat => self.saturated_fat,
            Nutrient::Carbohydrates => self.carbohydrates,
        }
    }
}

/// The seven nutrition fields a query can address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calories,
    TotalFat,
    Sugar,
    Sodium,
    Protein,
    SaturatedFat,
    Carbohydrates,
}

impl Nutrient {
    pub const ALL: [Nutrient; 7] = [
        Nutrient::Calories,
        Nutrient::TotalFat,
        Nutrient::Sugar,
        Nutrient::Sodium,
        Nutrient::Protein,
        Nutrient::SaturatedFat,
        Nutrient::Carbohydrates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::TotalFat => "total_fat",
            Nutrient::Sugar => "sugar",
            Nutrient::Sodium => "sodium",
            Nutrient::Protein => "protein",
            Nutrient::SaturatedFat => "saturated_fat",
            Nutrient::Carbohydrates => "carbohydrates",
        }
    }
}

/// Parse a nutrient name such as "protein" or "total_fat"
///
/// Rust concept: implementing `FromStr` lets callers write `"sugar".parse::<Nutrient>()`
impl FromStr for Nutrient {
    type Err = DataLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Nutrient::ALL
            .into_iter()
            .find(|n| n.as_str() == wanted)
            .ok_or_else(|| DataLoadError::InvalidValue {
                field: "nutrient".to_string(),
                value: s.to_string(),
            })
    }
}

// =============================================================================
// Recipe
// =============================================================================

/// Represents a recipe document in the store
///
/// `avg_rating`, `review_count` and `ratings_distribution` are derived from
/// reviews by a batch job and may be stale or missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub original_id: SourceRecipeId,
    pub name: String,
    /// Ingredient strings in source order; overlap math treats them as a set
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub nutrition: Option<Nutrition>,
    #[serde(default)]
    pub avg_rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    /// Star value ("1".."5") to number of reviews with that rating
    #[serde(default)]
    pub ratings_distribution: BTreeMap<String, u32>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub n_steps: Option<u32>,
    #[serde(default)]
    pub n_ingredients: Option<u32>,
    #[serde(default)]
    pub source_dataset: Option<String>,
}

impl Recipe {
    /// Create a recipe with only its identity set.
    ///
    /// The source id defaults to the internal id; use the `with_*` methods
    /// to fill in the rest.
    pub fn new(id: RecipeId, name: impl Into<String>) -> Self {
        Self {
            id,
            original_id: id as SourceRecipeId,
            name: name.into(),
            ingredients: Vec::new(),
            tags: Vec::new(),
            minutes: 0,
            nutrition: None,
            avg_rating: None,
            review_count: None,
            ratings_distribution: BTreeMap::new(),
            steps: Vec::new(),
            n_steps: None,
            n_ingredients: None,
            source_dataset: None,
        }
    }

    pub fn with_original_id(mut self, original_id: SourceRecipeId) -> Self {
        self.original_id = original_id;
        self
    }

    pub fn with_ingredients<S: Into<String>>(mut self, ingredients: impl IntoIterator<Item = S>) -> Self {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self.n_ingredients = Some(self.ingredients.len() as u32);
        self
    }

    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_minutes(mut self, minutes: u32) -> Self {
        self.minutes = minutes;
        self
    }

    pub fn with_nutrition(mut self, nutrition: Nutrition) -> Self {
        self.nutrition = Some(nutrition);
        self
    }

    /// Set the derived rating aggregates (avg_rating + review_count)
    pub fn with_rating(mut self, avg_rating: f64, review_count: u32) -> Self {
        self.avg_rating = Some(avg_rating);
        self.review_count = Some(review_count);
        self
    }

    /// Calories, when nutrition is known
    pub fn calories(&self) -> Option<f64> {
        self.nutrition.map(|n| n.calories)
    }

    /// First `n` tags, in stored order
    pub fn top_tags(&self, n: usize) -> Vec<String> {
        self.tags.iter().take(n).cloned().collect()
    }
}

// =============================================================================
// Review
// =============================================================================

/// A single review left by a user on a recipe
///
/// The recipe is referenced by id only; a review never owns its recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub recipe_id: RecipeId,
    pub user_id: UserId,
    pub date: NaiveDate,
    /// Star rating, 1 to 5
    pub rating: u8,
    /// Free-text body; the dataset has plenty of rating-only reviews
    #[serde(default)]
    pub review: Option<String>,
}

impl Review {
    pub fn new(recipe_id: RecipeId, user_id: UserId, date: NaiveDate, rating: u8) -> Self {
        Self {
            recipe_id,
            user_id,
            date,
            rating,
            review: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.review = Some(text.into());
        self
    }

    /// The review body, if it has any non-blank content
    pub fn text(&self) -> Option<&str> {
        self.review
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

// =============================================================================
// RecipeIndex - The In-Memory Store
// =============================================================================

/// In-memory document store holding both collections plus secondary indices.
///
/// Reviews live once in `reviews`; every index holds positions into it.
/// All indices are maintained by `insert_recipe` / `insert_review`, so an
/// index built by hand in a test is immediately queryable.
#[derive(Debug, Default)]
pub struct RecipeIndex {
    // Primary data stores
    pub(crate) recipes: HashMap<RecipeId, Recipe>,
    pub(crate) reviews: Vec<Review>,

    /// Source dataset id -> internal id
    pub(crate) source_ids: HashMap<SourceRecipeId, RecipeId>,

    // Review indices (positions into `reviews`)
    pub(crate) user_reviews: HashMap<UserId, Vec<usize>>,
    pub(crate) recipe_reviews: HashMap<RecipeId, Vec<usize>>,
    pub(crate) date_index: BTreeMap<NaiveDate, Vec<usize>>,

    // Secondary recipe indices
    pub(crate) tag_index: HashMap<String, Vec<RecipeId>>,
    pub(crate) ingredient_index: HashMap<String, Vec<RecipeId>>,
}

impl RecipeIndex {
    /// Creates a new, empty RecipeIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a recipe by internal id
    pub fn get_recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(&id)
    }

    /// Get a recipe by its source dataset id
    pub fn get_recipe_by_source_id(&self, original_id: SourceRecipeId) -> Option<&Recipe> {
        self.source_ids
            .get(&original_id)
            .and_then(|id| self.recipes.get(id))
    }

    /// All reviews written by a user, in insertion order
    pub fn get_user_reviews(&self, user_id: UserId) -> Vec<&Review> {
        self.positions_to_reviews(self.user_reviews.get(&user_id))
    }

    /// All reviews of a recipe, in insertion order
    pub fn get_recipe_reviews(&self, recipe_id: RecipeId) -> Vec<&Review> {
        self.positions_to_reviews(self.recipe_reviews.get(&recipe_id))
    }

    fn positions_to_reviews(&self, positions: Option<&Vec<usize>>) -> Vec<&Review> {
        positions
            .map(|p| p.iter().map(|&i| &self.reviews[i]).collect())
            .unwrap_or_default()
    }

    /// Recipe ids carrying exactly this tag
    pub fn get_recipes_by_tag(&self, tag: &str) -> &[RecipeId] {
        self.tag_index.get(tag).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Recipe ids using exactly this ingredient
    pub fn get_recipes_by_ingredient(&self, ingredient: &str) -> &[RecipeId] {
        self.ingredient_index
            .get(ingredient)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Insert a recipe and index its tags and ingredients.
    ///
    /// Re-inserting an id replaces the previous document and its index entries.
    pub fn insert_recipe(&mut self, recipe: Recipe) {
        if let Some(previous) = self.recipes.remove(&recipe.id) {
            self.unindex_recipe(&previous);
        }

        for tag in distinct(&recipe.tags) {
            self.tag_index.entry(tag.clone()).or_default().push(recipe.id);
        }
        for ingredient in distinct(&recipe.ingredients) {
            self.ingredient_index
                .entry(ingredient.clone())
                .or_default()
                .push(recipe.id);
        }
        self.source_ids.insert(recipe.original_id, recipe.id);
        self.recipes.insert(recipe.id, recipe);
    }

    fn unindex_recipe(&mut self, recipe: &Recipe) {
        for tag in &recipe.tags {
            if let Some(ids) = self.tag_index.get_mut(tag) {
                ids.retain(|&id| id != recipe.id);
            }
        }
        for ingredient in &recipe.ingredients {
            if let Some(ids) = self.ingredient_index.get_mut(ingredient) {
                ids.retain(|&id| id != recipe.id);
            }
        }
        if self.source_ids.get(&recipe.original_id) == Some(&recipe.id) {
            self.source_ids.remove(&recipe.original_id);
        }
    }

    /// Insert a review and update the user, recipe and date indices
    pub fn insert_review(&mut self, review: Review) {
        let position = self.reviews.len();
        self.user_reviews.entry(review.user_id).or_default().push(position);
        self.recipe_reviews
            .entry(review.recipe_id)
            .or_default()
            .push(position);
        self.date_index.entry(review.date).or_default().push(position);
        self.reviews.push(review);
    }

    /// Get counts for debugging/validation: (recipes, reviews)
    pub fn counts(&self) -> (usize, usize) {
        (self.recipes.len(), self.reviews.len())
    }
}

/// Distinct values in first-seen order
fn distinct(values: &[String]) -> Vec<&String> {
    let mut seen = std::collections::HashSet::new();
    values.iter().filter(|v| seen.insert(v.as_str())).collect()
}
