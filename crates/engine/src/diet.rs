//! DietFilter: recipes fitting a named dietary restriction.

use crate::error::{EngineError, Result};
use crate::store::blocking;
use anyhow::Context;
use data_loader::{Direction, Recipe, RecipeFilter, RecipeQuery, RecipeStore, SortField};
use pipeline::FilterPipeline;
use pipeline::filters::{DietRule, DietRuleFilter};
use sources::{Candidate, CandidateSource};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct DietFilter {
    store: Arc<dyn RecipeStore>,
    /// Restriction name (lowercase) -> rule; fixed after construction
    rules: Arc<BTreeMap<String, DietRule>>,
}

impl DietFilter {
    pub fn new(store: Arc<dyn RecipeStore>, rules: BTreeMap<String, DietRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|(name, rule)| (name.to_lowercase(), rule))
            .collect();
        Self {
            store,
            rules: Arc::new(rules),
        }
    }

    /// Names of the known restrictions, sorted
    pub fn restrictions(&self) -> Vec<&str> {
        self.rules.keys().map(String::as_str).collect()
    }

    pub fn rule(&self, restriction: &str) -> Option<&DietRule> {
        self.rules.get(&restriction.trim().to_lowercase())
    }

    /// Up to `limit` recipes satisfying `restriction`, best rated first.
    ///
    /// An unknown restriction gives an empty list.
    pub async fn by_diet(&self, restriction: &str, limit: usize) -> Result<Vec<Recipe>> {
        let name = restriction.trim().to_lowercase();
        let Some(rule) = self.rules.get(&name).cloned() else {
            info!("Unknown dietary restriction {:?}", restriction);
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let store = self.store.clone();
        blocking(move || {
            let mut query =
                RecipeQuery::new().sort_by(SortField::AvgRating, Direction::Descending);
            if !rule.include_tags.is_empty() {
                let tags: HashSet<String> = rule.include_tags.iter().cloned().collect();
                query = query.filter(RecipeFilter::AnyTag(tags));
            }
            let tagged = store.find_recipes(&query)?;
            debug!("{} recipes carry a {} inclusion tag", tagged.len(), name);

            // Exclusion terms are substring matches, which the store can't
            // express, so they run as a filter stage over the tagged recipes
            let candidates = tagged
                .into_iter()
                .map(|recipe| {
                    let score = recipe.avg_rating.unwrap_or(0.0);
                    Candidate::new(recipe, CandidateSource::Catalog, score)
                })
                .collect();
            let pipeline = FilterPipeline::new().add_filter(DietRuleFilter::new(&name, rule));
            let mut kept = pipeline
                .apply(candidates)
                .with_context(|| format!("Failed to apply {} diet rule", name))
                .map_err(EngineError::Pipeline)?;
            kept.truncate(limit);

            info!("{} recipes fit the {} diet", kept.len(), name);
            Ok(kept.into_iter().map(|c| c.recipe).collect())
        })
        .await
    }
}
