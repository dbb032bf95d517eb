//! The `RecipeStore` capability interface.
//!
//! Engine components never touch a concrete store. They speak to this trait,
//! which exposes the document-store capabilities the analytics need:
//! - filtered, multi-key sorted, limited recipe queries
//! - id lookups and a batch "join" from review ids to recipes
//! - full-text search over name and ingredients
//! - review queries plus grouping with avg/count aggregates
//! - numeric bucketing with explicit boundaries and an overflow bucket
//!
//! `RecipeIndex` (see `query.rs`) is the in-memory implementation.

use crate::error::StoreResult;
use crate::types::{Nutrient, Recipe, RecipeId, Review, SourceRecipeId, UserId};
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// Read-only access to the `recipes` and `reviews` collections.
///
/// `Send + Sync` so a single handle can be shared (`Arc<dyn RecipeStore>`)
/// by concurrent callers without locking.
pub trait RecipeStore: Send + Sync {
    /// Look up a recipe by internal id
    fn recipe(&self, id: RecipeId) -> StoreResult<Option<Recipe>>;

    /// Look up a recipe by its source dataset id
    fn recipe_by_source_id(&self, original_id: SourceRecipeId) -> StoreResult<Option<Recipe>>;

    /// Foreign-key join: resolve many ids at once. Unknown ids are absent
    /// from the returned map.
    fn recipes_by_ids(&self, ids: &[RecipeId]) -> StoreResult<HashMap<RecipeId, Recipe>>;

    /// Run a filtered, sorted, limited recipe query
    fn find_recipes(&self, query: &RecipeQuery) -> StoreResult<Vec<Recipe>>;

    /// Full-text search over recipe name and ingredients.
    ///
    /// Returns each match with the number of query terms it matched.
    fn text_search(&self, text: &str, limit: usize) -> StoreResult<Vec<(Recipe, usize)>>;

    /// Fetch reviews matching all set fields of the query
    fn find_reviews(&self, query: &ReviewQuery) -> StoreResult<Vec<Review>>;

    /// Group reviews and compute average rating and count per group.
    ///
    /// Groups with fewer than `min_count` reviews are dropped. Output is
    /// ordered by (avg desc, count desc, recipe id asc, month asc).
    fn group_reviews(
        &self,
        query: &ReviewQuery,
        grouping: ReviewGrouping,
        min_count: u32,
    ) -> StoreResult<Vec<ReviewGroup>>;

    /// Partition matching recipes into numeric buckets.
    ///
    /// `boundaries` must be strictly increasing. Bucket `i` covers
    /// `[boundaries[i], boundaries[i + 1])`; the last boundary opens an
    /// overflow bucket `[last, ∞)`. Values below the first boundary, and
    /// recipes without the field, land in no bucket. Only non-empty buckets
    /// are returned, in ascending order.
    fn bucket_recipes(
        &self,
        query: &RecipeQuery,
        field: NumericField,
        boundaries: &[f64],
    ) -> StoreResult<Vec<Bucket>>;
}

// =============================================================================
// Recipe queries
// =============================================================================

/// One predicate over a recipe document
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeFilter {
    /// `_id $in [...]`
    IdIn(HashSet<RecipeId>),
    /// `_id $nin [...]`
    IdNotIn(HashSet<RecipeId>),
    /// avg_rating present and >= value
    AvgRatingAtLeast(f64),
    /// review_count present and >= value
    ReviewCountAtLeast(u32),
    MinutesAtMost(u32),
    /// Nutrition present and the nutrient <= value
    NutrientAtMost(Nutrient, f64),
    /// Nutrition present and the nutrient >= value
    NutrientAtLeast(Nutrient, f64),
    HasNutrition,
    /// Case-insensitive substring of the name (needle stored lowercased)
    NameContains(String),
    /// Case-insensitive substring of any tag (needle stored lowercased)
    TagContains(String),
    /// At least one ingredient equal to a member of the set
    AnyIngredient(HashSet<String>),
    /// At least one tag equal to a member of the set
    AnyTag(HashSet<String>),
    Or(Vec<RecipeFilter>),
    Not(Box<RecipeFilter>),
}

impl RecipeFilter {
    pub fn name_contains(needle: &str) -> Self {
        Self::NameContains(needle.to_lowercase())
    }

    pub fn tag_contains(needle: &str) -> Self {
        Self::TagContains(needle.to_lowercase())
    }

    /// Evaluate the predicate against one recipe
    pub fn matches(&self, recipe: &Recipe) -> bool {
        match self {
            Self::IdIn(ids) => ids.contains(&recipe.id),
            Self::IdNotIn(ids) => !ids.contains(&recipe.id),
            Self::AvgRatingAtLeast(min) => recipe.avg_rating.is_some_and(|r| r >= *min),
            Self::ReviewCountAtLeast(min) => recipe.review_count.is_some_and(|c| c >= *min),
            Self::MinutesAtMost(max) => recipe.minutes <= *max,
            Self::NutrientAtMost(nutrient, max) => {
                recipe.nutrition.is_some_and(|n| n.get(*nutrient) <= *max)
            }
            Self::NutrientAtLeast(nutrient, min) => {
                recipe.nutrition.is_some_and(|n| n.get(*nutrient) >= *min)
            }
            Self::HasNutrition => recipe.nutrition.is_some(),
            Self::NameContains(needle) => recipe.name.to_lowercase().contains(needle),
            Self::TagContains(needle) => recipe
                .tags
                .iter()
                .any(|t| t.to_lowercase().contains(needle)),
            Self::AnyIngredient(set) => recipe.ingredients.iter().any(|i| set.contains(i)),
            Self::AnyTag(set) => recipe.tags.iter().any(|t| set.contains(t)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(recipe)),
            Self::Not(filter) => !filter.matches(recipe),
        }
    }
}

/// Fields a query can sort on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    AvgRating,
    ReviewCount,
    Minutes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: Direction,
}

impl SortKey {
    /// Compare two recipes on this key. Missing values sort lowest, so they
    /// come last in a descending sort.
    pub fn compare(&self, a: &Recipe, b: &Recipe) -> Ordering {
        let ordering = match self.field {
            SortField::AvgRating => compare_ratings(a.avg_rating, b.avg_rating),
            SortField::ReviewCount => a.review_count.cmp(&b.review_count),
            SortField::Minutes => a.minutes.cmp(&b.minutes),
        };
        match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// A filtered, sorted, limited recipe query (builder pattern).
///
/// Filters are AND-ed. Ties left by the sort keys are broken by internal id
/// ascending, so every query has a deterministic order.
///
/// ```ignore
/// let query = RecipeQuery::new()
///     .filter(RecipeFilter::AvgRatingAtLeast(4.0))
///     .sort_by(SortField::AvgRating, Direction::Descending)
///     .limit(5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecipeQuery {
    pub filters: Vec<RecipeFilter>,
    pub sort: Vec<SortKey>,
    pub limit: Option<usize>,
    /// Abort with `StoreError::DeadlineExceeded` once this instant passes
    pub deadline: Option<Instant>,
}

impl RecipeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: RecipeFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort_by(mut self, field: SortField, direction: Direction) -> Self {
        self.sort.push(SortKey { field, direction });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// True when every filter accepts the recipe
    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.filters.iter().all(|f| f.matches(recipe))
    }

    /// Order two recipes by the sort keys, then by id
    pub fn compare(&self, a: &Recipe, b: &Recipe) -> Ordering {
        self.sort
            .iter()
            .map(|key| key.compare(a, b))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }
}

// =============================================================================
// Review queries, grouping and bucketing
// =============================================================================

/// Review selection; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewQuery {
    pub user_id: Option<UserId>,
    pub recipe_id: Option<RecipeId>,
    /// Only reviews dated on or after this day
    pub since: Option<NaiveDate>,
}

impl ReviewQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn for_recipe(recipe_id: RecipeId) -> Self {
        Self {
            recipe_id: Some(recipe_id),
            ..Self::default()
        }
    }

    pub fn since(date: NaiveDate) -> Self {
        Self {
            since: Some(date),
            ..Self::default()
        }
    }

    pub fn matches(&self, review: &Review) -> bool {
        self.user_id.is_none_or(|u| review.user_id == u)
            && self.recipe_id.is_none_or(|r| review.recipe_id == r)
            && self.since.is_none_or(|d| review.date >= d)
    }
}

/// How `group_reviews` keys its groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewGrouping {
    /// One group per recipe
    Recipe,
    /// One group per (recipe, calendar month of the review date)
    RecipeAndMonth,
}

/// Aggregate over one group of reviews
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewGroup {
    pub recipe_id: RecipeId,
    /// Calendar month 1..=12, set only for `RecipeAndMonth`
    pub month: Option<u32>,
    pub avg_rating: f64,
    pub count: u32,
}

/// Numeric recipe fields that can be bucketed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Nutrient(Nutrient),
    Minutes,
}

impl NumericField {
    pub fn value(&self, recipe: &Recipe) -> Option<f64> {
        match self {
            NumericField::Nutrient(n) => recipe.nutrition.map(|nutrition| nutrition.get(*n)),
            NumericField::Minutes => Some(recipe.minutes as f64),
        }
    }
}

/// One populated bucket: `[lower, upper)`, or `[lower, ∞)` when `upper` is None
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub lower: f64,
    pub upper: Option<f64>,
    pub count: u32,
    /// Mean avg_rating of members that have one
    pub avg_rating: Option<f64>,
}

impl Bucket {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && self.upper.is_none_or(|upper| value < upper)
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Order two optional ratings, treating a missing rating as the lowest
pub fn compare_ratings(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Size of the set intersection of `values` and `set` (duplicates in
/// `values` count once)
pub fn intersection_size(values: &[String], set: &HashSet<String>) -> usize {
    values
        .iter()
        .map(String::as_str)
        .collect::<HashSet<&str>>()
        .into_iter()
        .filter(|v| set.contains(*v))
        .count()
}

/// Number of distinct ingredient strings two recipes share
pub fn ingredient_overlap(a: &Recipe, b: &Recipe) -> usize {
    let other: HashSet<String> = b.ingredients.iter().cloned().collect();
    intersection_size(&a.ingredients, &other)
}

/// Split text into lowercase alphanumeric terms for text search
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Nutrition;

    #[test]
    fn test_missing_rating_sorts_last_when_descending() {
        let rated = Recipe::new(1, "rated").with_rating(3.0, 4);
        let unrated = Recipe::new(2, "unrated");

        let query = RecipeQuery::new().sort_by(SortField::AvgRating, Direction::Descending);
        assert_eq!(query.compare(&rated, &unrated), Ordering::Less);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let a = Recipe::new(7, "a").with_rating(4.0, 10);
        let b = Recipe::new(3, "b").with_rating(4.0, 10);

        let query = RecipeQuery::new().sort_by(SortField::AvgRating, Direction::Descending);
        assert_eq!(query.compare(&b, &a), Ordering::Less);
    }

    #[test]
    fn test_case_insensitive_filters() {
        let recipe = Recipe::new(1, "Spicy Thai Curry").with_tags(["Asian", "main-dish"]);

        assert!(RecipeFilter::name_contains("thai").matches(&recipe));
        assert!(RecipeFilter::tag_contains("ASIAN").matches(&recipe));
        assert!(!RecipeFilter::tag_contains("italian").matches(&recipe));
    }

    #[test]
    fn test_nutrient_filters_require_nutrition() {
        let without = Recipe::new(1, "plain");
        let with = Recipe::new(2, "salad").with_nutrition(Nutrition {
            calories: 120.0,
            protein: 25.0,
            ..Nutrition::default()
        });

        let low_cal = RecipeFilter::NutrientAtMost(Nutrient::Calories, 300.0);
        assert!(!low_cal.matches(&without));
        assert!(low_cal.matches(&with));
        assert!(RecipeFilter::NutrientAtLeast(Nutrient::Protein, 20.0).matches(&with));
    }

    #[test]
    fn test_intersection_counts_distinct_values() {
        let set: HashSet<String> = ["egg", "flour"].iter().map(|s| s.to_string()).collect();
        let values = vec!["egg".to_string(), "egg".to_string(), "milk".to_string()];
        assert_eq!(intersection_size(&values, &set), 1);
    }

    #[test]
    fn test_ingredient_overlap_is_symmetric() {
        let a = Recipe::new(1, "a").with_ingredients(["flour", "egg", "tomato"]);
        let b = Recipe::new(2, "b").with_ingredients(["flour", "egg", "basil"]);
        assert_eq!(ingredient_overlap(&a, &b), 2);
        assert_eq!(ingredient_overlap(&b, &a), 2);
    }

    #[test]
    fn test_bucket_bounds() {
        let bucket = Bucket {
            lower: 300.0,
            upper: Some(600.0),
            count: 0,
            avg_rating: None,
        };
        assert!(bucket.contains(300.0));
        assert!(!bucket.contains(600.0));
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Chicken, Rice & peas!"), vec!["chicken", "rice", "peas"]);
        assert!(tokenize("  ").is_empty());
    }
}
