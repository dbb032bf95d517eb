//! Feature computation and scoring for recommendation candidates.
//!
//! Every candidate gets a `MatchFeatures` row:
//! - ingredient_match: |ingredients(c) ∩ liked_ingredients|
//! - tag_match: |tags(c) ∩ liked_tags|
//! - rating: avg_rating(c), or a neutral default when missing
//!
//! and a rule-based score:
//! `match_score = ingredient_match + 2 * tag_match + 2 * rating`
//!
//! Raising any of the three inputs (all else equal) never lowers the score.

use data_loader::{RecipeId, intersection_size};
use rayon::prelude::*;
use serde::Serialize;
use sources::{Candidate, TasteProfile};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Rating assumed for a recipe without avg_rating
pub const DEFAULT_RATING: f64 = 3.5;

const TAG_WEIGHT: f64 = 2.0;
const RATING_WEIGHT: f64 = 2.0;

/// Features computed for each candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchFeatures {
    pub recipe_id: RecipeId,
    pub ingredient_match: usize,
    pub tag_match: usize,
    pub rating: f64,
    pub match_score: f64,
}

/// Computes match features for candidates in parallel.
///
/// The liked sets are built once from the profile and shared by every
/// rayon worker.
#[derive(Debug, Clone)]
pub struct MatchScorer {
    liked_ingredients: HashSet<String>,
    liked_tags: HashSet<String>,
}

impl MatchScorer {
    pub fn new(liked_ingredients: HashSet<String>, liked_tags: HashSet<String>) -> Self {
        Self {
            liked_ingredients,
            liked_tags,
        }
    }

    pub fn from_profile(profile: &TasteProfile) -> Self {
        Self::new(profile.ingredient_set(), profile.tag_set())
    }

    /// Compute features for all candidates in parallel.
    ///
    /// # Returns
    /// Vec of MatchFeatures, one per candidate, in the same order
    pub fn compute_features(&self, candidates: &[Candidate]) -> Vec<MatchFeatures> {
        candidates
            .par_iter()
            .map(|candidate| self.compute_single(candidate))
            .collect()
    }

    fn compute_single(&self, candidate: &Candidate) -> MatchFeatures {
        let recipe = &candidate.recipe;
        let ingredient_match = intersection_size(&recipe.ingredients, &self.liked_ingredients);
        let tag_match = intersection_size(&recipe.tags, &self.liked_tags);
        let rating = recipe.avg_rating.unwrap_or(DEFAULT_RATING);

        MatchFeatures {
            recipe_id: recipe.id,
            ingredient_match,
            tag_match,
            rating,
            match_score: match_score(ingredient_match, tag_match, rating),
        }
    }

    /// Score candidates and return the best `limit`, highest score first.
    ///
    /// Equal scores are ordered by recipe id ascending.
    pub fn rank(&self, candidates: Vec<Candidate>, limit: usize) -> Vec<(Candidate, MatchFeatures)> {
        let features = self.compute_features(&candidates);
        let mut ranked: Vec<(Candidate, MatchFeatures)> =
            candidates.into_iter().zip(features).collect();

        ranked.sort_by(|(_, a), (_, b)| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.recipe_id.cmp(&b.recipe_id))
        });
        ranked.truncate(limit);
        ranked
    }
}

/// `ingredient_match + 2 * tag_match + 2 * rating`
pub fn match_score(ingredient_match: usize, tag_match: usize, rating: f64) -> f64 {
    ingredient_match as f64 + TAG_WEIGHT * tag_match as f64 + RATING_WEIGHT * rating
}
