//! # Sources Crate
//!
//! This crate implements candidate generation for recipe recommendation and
//! similarity.
//!
//! ## Components
//!
//! ### Personalized Source
//! Taste-overlap candidates for a user:
//! - "You liked these ingredients and tags, here is more of that"
//! - Built from a `TasteProfile` (liked ingredients capped at 50, tags at 20)
//!
//! ### Similar Source
//! Ingredient-overlap neighbours of one recipe.
//!
//! ### Top-Rated Source
//! The global fallback: high average over many reviews.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{PersonalizedSource, TopRatedSource, taste_profile::{build_taste_profile, TasteSettings}};
//! use data_loader::{RecipeIndex, RecipeStore};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn RecipeStore> = Arc::new(RecipeIndex::load_from_dir(dir)?);
//!
//! let profile = build_taste_profile(store.as_ref(), user_id, &TasteSettings::default())?;
//! let candidates = PersonalizedSource::new(store.clone()).get_candidates(&profile, None)?;
//! let fallback = TopRatedSource::new(store.clone()).get_candidates(5)?;
//! ```

// Public modules
pub mod types;
pub mod taste_profile;
pub mod personalized;
pub mod similar;
pub mod top_rated;

// Re-export commonly used types
pub use types::{Candidate, CandidateSource, TasteProfile};
pub use taste_profile::{TasteSettings, build_taste_profile};
pub use personalized::PersonalizedSource;
pub use similar::SimilarSource;
pub use top_rated::TopRatedSource;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use data_loader::{Recipe, RecipeIndex, RecipeStore, Review};
    use std::sync::Arc;

    fn create_test_index() -> RecipeIndex {
        let mut index = RecipeIndex::new();
        index.insert_recipe(
            Recipe::new(1, "liked stew")
                .with_ingredients(["beef", "carrot"])
                .with_tags(["stews"]),
        );
        index.insert_recipe(
            Recipe::new(2, "carrot cake")
                .with_ingredients(["carrot", "flour"])
                .with_tags(["desserts"])
                .with_rating(4.8, 12),
        );

        let date = NaiveDate::from_ymd_opt(2010, 2, 2).unwrap();
        index.insert_review(Review::new(1, 5, date, 5));
        index
    }

    #[test]
    fn test_profile_feeds_personalized_source() {
        let store: Arc<dyn RecipeStore> = Arc::new(create_test_index());
        let profile = build_taste_profile(store.as_ref(), 5, &TasteSettings::default()).unwrap();

        let candidates = PersonalizedSource::new(store.clone())
            .get_candidates(&profile, None)
            .unwrap();

        // The liked recipe itself overlaps too; removing it is the pipeline's job
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.source == CandidateSource::Personalized));
    }

    #[test]
    fn test_sources_share_one_store() {
        let store: Arc<dyn RecipeStore> = Arc::new(create_test_index());
        let _similar = SimilarSource::new(store.clone());
        let top = TopRatedSource::new(store.clone()).get_candidates(5).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].recipe_id(), 2);
    }
}
