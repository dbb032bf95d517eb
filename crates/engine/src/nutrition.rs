//! NutritionAnalyzer: nutrition statistics over all recipes or over the
//! recipes one user has reviewed.
//!
//! The report has three parts:
//! - overall averages (calories, protein, fat, carbohydrates)
//! - a calorie histogram with fixed, left-inclusive buckets
//! - small samples of low-calorie and high-protein recipes
//!
//! A malformed user id or a user without reviews yields the empty report,
//! not an error.

use crate::config::NutritionConfig;
use crate::error::{Result, parse_id};
use crate::store::blocking;
use data_loader::{
    Direction, Nutrient, NumericField, Recipe, RecipeFilter, RecipeQuery, RecipeStore,
    ReviewQuery, SortField, UserId,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionStats {
    pub avg_calories: f64,
    pub avg_protein: f64,
    pub avg_total_fat: f64,
    pub avg_carbohydrates: f64,
    /// Recipes in scope that have nutrition data
    pub recipe_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalorieBucket {
    pub label: String,
    pub lower: f64,
    /// None for the open-ended top bucket
    pub upper: Option<f64>,
    pub count: u32,
    /// Mean avg_rating of the members that have one
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NutritionSamples {
    pub low_calorie: Vec<Recipe>,
    pub high_protein: Vec<Recipe>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NutritionReport {
    pub overall_stats: Option<NutritionStats>,
    pub calorie_distribution: Vec<CalorieBucket>,
    pub sample_recipes: NutritionSamples,
}

impl NutritionReport {
    /// The report for "no nutrition data in scope"
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.overall_stats.is_none()
    }
}

#[derive(Clone)]
pub struct NutritionAnalyzer {
    store: Arc<dyn RecipeStore>,
    config: NutritionConfig,
}

impl NutritionAnalyzer {
    pub fn new(store: Arc<dyn RecipeStore>, config: NutritionConfig) -> Self {
        Self { store, config }
    }

    /// Analyze nutrition over all recipes, or over the recipes reviewed by
    /// `user_id`
    pub async fn nutrition_patterns(&self, user_id: Option<&str>) -> Result<NutritionReport> {
        let user_id: Option<UserId> = match user_id {
            None => None,
            Some(raw) => match parse_id("user_id", raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!("Invalid user id {:?}; returning empty nutrition report", raw);
                    return Ok(NutritionReport::empty());
                }
            },
        };

        let analyzer = self.clone();
        blocking(move || {
            let Some(scope) = analyzer.scope(user_id)? else {
                return Ok(NutritionReport::empty());
            };
            analyzer.analyze(&scope)
        })
        .await
    }

    /// Base query for the recipes in scope, or None when a user has no reviews
    fn scope(&self, user_id: Option<UserId>) -> Result<Option<RecipeQuery>> {
        let Some(user_id) = user_id else {
            return Ok(Some(RecipeQuery::new()));
        };

        let reviews = self.store.find_reviews(&ReviewQuery::by_user(user_id))?;
        if reviews.is_empty() {
            warn!("User {} has no reviews; returning empty nutrition report", user_id);
            return Ok(None);
        }

        let ids: HashSet<_> = reviews.iter().map(|r| r.recipe_id).collect();
        debug!("User {} has reviewed {} recipes", user_id, ids.len());
        Ok(Some(RecipeQuery::new().filter(RecipeFilter::IdIn(ids))))
    }

    fn analyze(&self, scope: &RecipeQuery) -> Result<NutritionReport> {
        let with_nutrition = self
            .store
            .find_recipes(&scope.clone().filter(RecipeFilter::HasNutrition))?;
        let Some(overall_stats) = overall_stats(&with_nutrition) else {
            info!("No recipes with nutrition data in scope");
            return Ok(NutritionReport::empty());
        };

        let calorie_distribution = self.calorie_distribution(scope)?;
        let sample_recipes = NutritionSamples {
            low_calorie: self.sample(
                scope,
                RecipeFilter::NutrientAtMost(Nutrient::Calories, self.config.low_calorie_max),
            )?,
            high_protein: self.sample(
                scope,
                RecipeFilter::NutrientAtLeast(Nutrient::Protein, self.config.high_protein_min),
            )?,
        };

        info!(
            "Nutrition stats over {} recipes, {} calorie buckets",
            overall_stats.recipe_count,
            calorie_distribution.len()
        );
        Ok(NutritionReport {
            overall_stats: Some(overall_stats),
            calorie_distribution,
            sample_recipes,
        })
    }

    fn calorie_distribution(&self, scope: &RecipeQuery) -> Result<Vec<CalorieBucket>> {
        let boundaries = &self.config.calorie_boundaries;
        let buckets = self.store.bucket_recipes(
            scope,
            NumericField::Nutrient(Nutrient::Calories),
            boundaries,
        )?;

        Ok(buckets
            .into_iter()
            .map(|bucket| {
                let label = boundaries
                    .iter()
                    .position(|b| *b == bucket.lower)
                    .and_then(|i| self.config.calorie_labels.get(i))
                    .cloned()
                    .unwrap_or_else(|| format!("{}+", bucket.lower));
                CalorieBucket {
                    label,
                    lower: bucket.lower,
                    upper: bucket.upper,
                    count: bucket.count,
                    avg_rating: bucket.avg_rating,
                }
            })
            .collect())
    }

    fn sample(&self, scope: &RecipeQuery, filter: RecipeFilter) -> Result<Vec<Recipe>> {
        let query = scope
            .clone()
            .filter(filter)
            .sort_by(SortField::AvgRating, Direction::Descending)
            .limit(self.config.sample_size);
        Ok(self.store.find_recipes(&query)?)
    }
}

/// Averages over recipes that have nutrition; None when there are none
fn overall_stats(recipes: &[Recipe]) -> Option<NutritionStats> {
    let facts: Vec<_> = recipes.iter().filter_map(|r| r.nutrition).collect();
    if facts.is_empty() {
        return None;
    }
    let n = facts.len() as f64;
    let mean = |nutrient: Nutrient| facts.iter().map(|f| f.get(nutrient)).sum::<f64>() / n;

    Some(NutritionStats {
        avg_calories: mean(Nutrient::Calories),
        avg_protein: mean(Nutrient::Protein),
        avg_total_fat: mean(Nutrient::TotalFat),
        avg_carbohydrates: mean(Nutrient::Carbohydrates),
        recipe_count: facts.len(),
    })
}
