//! TrendAnalyzer: recently popular recipes and month-by-month patterns.
//!
//! - **Trending**: reviews inside the window, grouped per recipe, groups with
//!   too few reviews dropped, best recent average first, top N joined to
//!   their recipes.
//! - **Seasonal**: all reviews grouped per (recipe, calendar month). Months
//!   with at least one qualifying group get an average over their groups and
//!   their top recipes.
//!
//! "Now" is fixed per call: `trends` reads the local clock once,
//! `trends_at` takes it from the caller.

use crate::config::TrendsConfig;
use crate::error::Result;
use crate::store::blocking;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use data_loader::{RecipeId, RecipeStore, ReviewGroup, ReviewGrouping, ReviewQuery};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingRecipe {
    pub recipe_id: RecipeId,
    pub name: String,
    pub recent_avg_rating: f64,
    pub review_count: u32,
    /// First few tags of the recipe
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalRecipe {
    pub recipe_id: RecipeId,
    pub name: String,
    pub avg_rating: f64,
    pub review_count: u32,
}

/// Aggregate for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthPattern {
    /// Month name, January..December
    pub month: String,
    /// Mean of the qualifying groups' average ratings
    pub avg_rating: f64,
    /// Number of qualifying (recipe, month) groups
    pub recipe_count: usize,
    pub top_recipes: Vec<SeasonalRecipe>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub window_days: u32,
    pub trending_recipes: Vec<TrendingRecipe>,
    /// Months with at least one qualifying group, in calendar order
    pub seasonal_patterns: Vec<MonthPattern>,
}

impl TrendReport {
    /// Look up a month's pattern by name (case-insensitive)
    pub fn month(&self, name: &str) -> Option<&MonthPattern> {
        self.seasonal_patterns
            .iter()
            .find(|p| p.month.eq_ignore_ascii_case(name))
    }
}

/// First calendar day inside a window of `days` ending at `now`.
///
/// A review dated D counts as midnight of D, so it is inside the window when
/// that midnight is at or after `now - days`.
pub fn window_start(now: NaiveDateTime, days: u32) -> NaiveDate {
    let Some(cutoff) = now.checked_sub_signed(Duration::days(days as i64)) else {
        return NaiveDate::MIN;
    };
    if cutoff.date().and_hms_opt(0, 0, 0) == Some(cutoff) {
        cutoff.date()
    } else {
        cutoff.date().succ_opt().unwrap_or(cutoff.date())
    }
}

#[derive(Clone)]
pub struct TrendAnalyzer {
    store: Arc<dyn RecipeStore>,
    config: TrendsConfig,
}

impl TrendAnalyzer {
    pub fn new(store: Arc<dyn RecipeStore>, config: TrendsConfig) -> Self {
        Self { store, config }
    }

    /// Trends as of the local clock; `None` uses the configured window
    pub async fn trends(&self, window_days: Option<u32>) -> Result<TrendReport> {
        let window_days = window_days.unwrap_or(self.config.window_days);
        self.trends_at(Local::now().naive_local(), window_days).await
    }

    /// Trends as of a fixed `now`
    pub async fn trends_at(&self, now: NaiveDateTime, window_days: u32) -> Result<TrendReport> {
        let analyzer = self.clone();
        blocking(move || {
            let since = window_start(now, window_days);
            let trending_recipes = analyzer.trending(since)?;
            let seasonal_patterns = analyzer.seasonal()?;
            info!(
                "Trends since {}: {} trending recipes, {} active months",
                since,
                trending_recipes.len(),
                seasonal_patterns.len()
            );
            Ok(TrendReport {
                window_days,
                trending_recipes,
                seasonal_patterns,
            })
        })
        .await
    }

    fn trending(&self, since: NaiveDate) -> Result<Vec<TrendingRecipe>> {
        let mut groups = self.store.group_reviews(
            &ReviewQuery::since(since),
            ReviewGrouping::Recipe,
            self.config.min_reviews,
        )?;
        // The limit applies before the join, so vanished recipes shrink the list
        groups.truncate(self.config.trending_limit);

        let ids: Vec<RecipeId> = groups.iter().map(|g| g.recipe_id).collect();
        let recipes = self.store.recipes_by_ids(&ids)?;

        Ok(groups
            .into_iter()
            .filter_map(|group| {
                let recipe = recipes.get(&group.recipe_id)?;
                Some(TrendingRecipe {
                    recipe_id: group.recipe_id,
                    name: recipe.name.clone(),
                    recent_avg_rating: group.avg_rating,
                    review_count: group.count,
                    tags: recipe.top_tags(self.config.top_tags),
                })
            })
            .collect())
    }

    fn seasonal(&self) -> Result<Vec<MonthPattern>> {
        let groups = self.store.group_reviews(
            &ReviewQuery::all(),
            ReviewGrouping::RecipeAndMonth,
            self.config.min_reviews,
        )?;

        let mut ids: Vec<RecipeId> = groups.iter().map(|g| g.recipe_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let recipes = self.store.recipes_by_ids(&ids)?;

        // Groups arrive ordered by (avg desc, count desc), so each month's
        // list is already in ranking order
        let mut by_month: HashMap<u32, Vec<&ReviewGroup>> = HashMap::new();
        for group in groups.iter().filter(|g| recipes.contains_key(&g.recipe_id)) {
            if let Some(month) = group.month {
                by_month.entry(month).or_default().push(group);
            }
        }
        debug!("{} months with qualifying review groups", by_month.len());

        let mut patterns = Vec::new();
        for (index, name) in MONTH_NAMES.iter().enumerate() {
            let Some(month_groups) = by_month.get(&(index as u32 + 1)) else {
                continue;
            };
            let avg_rating =
                month_groups.iter().map(|g| g.avg_rating).sum::<f64>() / month_groups.len() as f64;
            let top_recipes = month_groups
                .iter()
                .take(self.config.seasonal_top)
                .filter_map(|g| {
                    recipes.get(&g.recipe_id).map(|recipe| SeasonalRecipe {
                        recipe_id: g.recipe_id,
                        name: recipe.name.clone(),
                        avg_rating: g.avg_rating,
                        review_count: g.count,
                    })
                })
                .collect();

            patterns.push(MonthPattern {
                month: name.to_string(),
                avg_rating,
                recipe_count: month_groups.len(),
                top_recipes,
            });
        }
        Ok(patterns)
    }
}
