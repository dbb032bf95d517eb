//! Basic catalog queries: text search, cooking time, cuisine, nutrient
//! ceiling and the global top-rated list.

use crate::error::{EngineError, Result};
use crate::store::blocking;
use data_loader::{
    Direction, Nutrient, Recipe, RecipeFilter, RecipeQuery, RecipeStore, SortField,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Minimum review_count for the top-rated listing
pub const TOP_RATED_MIN_REVIEWS: u32 = 10;

/// A text search hit and how many query terms it matched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub recipe: Recipe,
    pub matched_terms: usize,
}

#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn RecipeStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self { store }
    }

    /// Full-text search over recipe names and ingredients
    pub async fn search(&self, text: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let store = self.store.clone();
        let text = text.to_string();
        blocking(move || {
            let hits = store.text_search(&text, limit)?;
            debug!("Search {:?} matched {} recipes", text, hits.len());
            Ok(hits
                .into_iter()
                .map(|(recipe, matched_terms)| SearchHit {
                    recipe,
                    matched_terms,
                })
                .collect())
        })
        .await
    }

    /// Recipes ready in at most `max_minutes`, longest first
    pub async fn by_cooking_time(&self, max_minutes: u32, limit: usize) -> Result<Vec<Recipe>> {
        let query = RecipeQuery::new()
            .filter(RecipeFilter::MinutesAtMost(max_minutes))
            .sort_by(SortField::Minutes, Direction::Descending)
            .sort_by(SortField::AvgRating, Direction::Descending)
            .limit(limit);
        self.run(query).await
    }

    /// Recipes with a tag containing `cuisine`, ignoring case
    pub async fn by_cuisine(&self, cuisine: &str, limit: usize) -> Result<Vec<Recipe>> {
        let query = RecipeQuery::new()
            .filter(RecipeFilter::tag_contains(cuisine.trim()))
            .sort_by(SortField::AvgRating, Direction::Descending)
            .limit(limit);
        self.run(query).await
    }

    /// Recipes whose `nutrient` is at most `max_value`.
    ///
    /// An unknown nutrient name is an `InvalidArgument`.
    pub async fn by_nutrition(
        &self,
        nutrient: &str,
        max_value: f64,
        limit: usize,
    ) -> Result<Vec<Recipe>> {
        let parsed: Nutrient = nutrient
            .parse()
            .map_err(|_| EngineError::invalid_argument("nutrient", nutrient))?;
        let query = RecipeQuery::new()
            .filter(RecipeFilter::NutrientAtMost(parsed, max_value))
            .sort_by(SortField::AvgRating, Direction::Descending)
            .limit(limit);
        self.run(query).await
    }

    /// Recipes with at least ten reviews, best rated first
    pub async fn top_rated(&self, limit: usize) -> Result<Vec<Recipe>> {
        let query = RecipeQuery::new()
            .filter(RecipeFilter::ReviewCountAtLeast(TOP_RATED_MIN_REVIEWS))
            .sort_by(SortField::AvgRating, Direction::Descending)
            .sort_by(SortField::ReviewCount, Direction::Descending)
            .limit(limit);
        self.run(query).await
    }

    async fn run(&self, query: RecipeQuery) -> Result<Vec<Recipe>> {
        let store = self.store.clone();
        blocking(move || Ok(store.find_recipes(&query)?)).await
    }
}
