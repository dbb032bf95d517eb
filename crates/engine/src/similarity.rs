//! SimilarityEngine: recipes sharing the most ingredients with a given one.

use crate::error::{Result, parse_id};
use crate::store::blocking;
use data_loader::{Recipe, RecipeStore, SourceRecipeId};
use serde::Serialize;
use sources::SimilarSource;
use std::sync::Arc;
use tracing::{debug, info};

/// A recipe and the number of distinct ingredients it shares with the target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarRecipe {
    pub recipe: Recipe,
    pub overlap_score: usize,
}

#[derive(Clone)]
pub struct SimilarityEngine {
    store: Arc<dyn RecipeStore>,
    source: SimilarSource,
}

impl SimilarityEngine {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self {
            source: SimilarSource::new(store.clone()),
            store,
        }
    }

    /// Find up to `limit` recipes similar to the one with source id
    /// `recipe_id`.
    ///
    /// A non-numeric id is an `InvalidArgument`; an id that resolves to no
    /// recipe gives an empty list.
    pub async fn find_similar(&self, recipe_id: &str, limit: usize) -> Result<Vec<SimilarRecipe>> {
        let original_id: SourceRecipeId = parse_id("recipe_id", recipe_id)?;
        let engine = self.clone();

        blocking(move || {
            let Some(target) = engine.store.recipe_by_source_id(original_id)? else {
                info!("Recipe {} not found; no similar recipes", original_id);
                return Ok(Vec::new());
            };

            let candidates = engine.source.get_candidates(&target, limit)?;
            debug!(
                "Found {} recipes similar to {} ({})",
                candidates.len(),
                original_id,
                target.name
            );

            Ok(candidates
                .into_iter()
                .map(|c| SimilarRecipe {
                    overlap_score: c.base_score as usize,
                    recipe: c.recipe,
                })
                .collect())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use data_loader::RecipeIndex;

    /// R1 = [flour, egg, tomato], R2 = [flour, egg, basil], R3 = [rice]
    fn create_engine() -> SimilarityEngine {
        let mut index = RecipeIndex::new();
        index.insert_recipe(
            Recipe::new(1, "R1").with_original_id(101).with_ingredients(["flour", "egg", "tomato"]),
        );
        index.insert_recipe(
            Recipe::new(2, "R2").with_original_id(102).with_ingredients(["flour", "egg", "basil"]),
        );
        index.insert_recipe(Recipe::new(3, "R3").with_original_id(103).with_ingredients(["rice"]));
        SimilarityEngine::new(Arc::new(index))
    }

    #[tokio::test]
    async fn test_find_similar() {
        let engine = create_engine();
        let similar = engine.find_similar("101", 5).await.unwrap();

        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].recipe.name, "R2");
        assert_eq!(similar[0].overlap_score, 2);
    }

    #[tokio::test]
    async fn test_overlap_is_symmetric() {
        let engine = create_engine();
        let forward = engine.find_similar("101", 5).await.unwrap();
        let backward = engine.find_similar("102", 5).await.unwrap();
        assert_eq!(forward[0].overlap_score, backward[0].overlap_score);
        assert_eq!(backward[0].recipe.original_id, 101);
    }

    #[tokio::test]
    async fn test_unknown_recipe_is_empty() {
        let engine = create_engine();
        assert!(engine.find_similar("999", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_id() {
        let engine = create_engine();
        let result = engine.find_similar("R1", 5).await;
        assert!(matches!(result, Err(EngineError::InvalidArgument { .. })));
    }
}
