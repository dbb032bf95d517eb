//! # Recommendation Engine
//!
//! This module coordinates personalized recommendation:
//! 1. Build the user's taste profile (rated set, liked ingredients/tags)
//! 2. Generate overlap candidates from the store
//! 3. Apply filters (already rated, minimum rating)
//! 4. Score with `MatchScorer` and keep the top N
//!
//! Steps 1-4 run as one blocking task under a time budget. A user without
//! reviews or without liked reviews, a blown budget, or any failure along
//! the way routes to the global top-rated list instead. The fallback itself
//! only fails when the store is unavailable.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, bail};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RecommendationConfig;
use crate::error::{Result, parse_id};
use crate::store::blocking;
use data_loader::{Recipe, RecipeStore, UserId};
use pipeline::filters::{AlreadyRatedFilter, MinimumRatingFilter};
use pipeline::{FilterPipeline, MatchScorer};
use sources::{CandidateSource, PersonalizedSource, TopRatedSource, build_taste_profile};

/// One recommended recipe. Top-rated fallback items carry no match score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub recipe: Recipe,
    pub match_score: Option<f64>,
}

/// A recommendation list and the strategy that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub source: CandidateSource,
    pub items: Vec<Recommendation>,
}

impl Recommendations {
    pub fn is_fallback(&self) -> bool {
        self.source == CandidateSource::TopRated
    }
}

/// Main engine that coordinates the recommendation pipeline
#[derive(Clone)]
pub struct RecommendationEngine {
    store: Arc<dyn RecipeStore>,
    personalized: PersonalizedSource,
    top_rated: TopRatedSource,
    config: RecommendationConfig,
}

impl RecommendationEngine {
    pub fn new(store: Arc<dyn RecipeStore>, config: RecommendationConfig) -> Self {
        let top_rated = TopRatedSource::new(store.clone())
            .with_min_avg_rating(config.fallback_min_rating)
            .with_min_review_count(config.fallback_min_reviews);
        Self {
            personalized: PersonalizedSource::new(store.clone()),
            top_rated,
            store,
            config,
        }
    }

    /// Main entry point: recommendations for `user_id`
    ///
    /// # Returns
    /// Up to `limit` recipes, best first, tagged with the source that
    /// produced them. Fails only on a malformed user id or an unavailable
    /// store.
    pub async fn recommend(&self, user_id: &str, limit: usize) -> Result<Recommendations> {
        let start_time = Instant::now();
        let user_id: UserId = parse_id("user_id", user_id)?;

        let personalized = match self.personalized(user_id, limit).await {
            Ok(Some(items)) => Some(items),
            Ok(None) => {
                info!("No liked reviews for user {}; showing top-rated recipes", user_id);
                None
            }
            Err(e) => {
                warn!(
                    "Personalized recommendation for user {} failed: {:#}; showing top-rated recipes",
                    user_id, e
                );
                None
            }
        };

        let recommendations = match personalized {
            Some(items) => Recommendations {
                source: CandidateSource::Personalized,
                items,
            },
            None => self.top_rated(limit).await?,
        };

        info!(
            "Recommended {} recipes ({:?}) for user {} in {:.2?}",
            recommendations.items.len(),
            recommendations.source,
            user_id,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// The global top-rated list, without match scores
    pub async fn top_rated(&self, limit: usize) -> Result<Recommendations> {
        let source = self.top_rated.clone();
        let items = blocking(move || {
            Ok(source
                .get_candidates(limit)?
                .into_iter()
                .map(|c| Recommendation {
                    recipe: c.recipe,
                    match_score: None,
                })
                .collect())
        })
        .await?;

        Ok(Recommendations {
            source: CandidateSource::TopRated,
            items,
        })
    }

    /// Run the personalized path under the time budget.
    ///
    /// `Ok(None)` means the user has no usable history. The blocking task
    /// also receives the deadline, so it stops on its own once the budget is
    /// spent even though `timeout` has already given up on it.
    async fn personalized(&self, user_id: UserId, limit: usize) -> anyhow::Result<Option<Vec<Recommendation>>> {
        let budget = self.config.time_budget();
        let deadline = Instant::now() + budget;

        let engine = self.clone();
        let task = tokio::task::spawn_blocking(move || engine.personalized_blocking(user_id, limit, deadline));

        match tokio::time::timeout(budget, task).await {
            Ok(joined) => joined.context("recommendation task panicked")?,
            Err(_) => bail!("exceeded time budget of {:?}", budget),
        }
    }

    fn personalized_blocking(
        &self,
        user_id: UserId,
        limit: usize,
        deadline: Instant,
    ) -> anyhow::Result<Option<Vec<Recommendation>>> {
        let profile = build_taste_profile(self.store.as_ref(), user_id, &self.config.taste_settings())
            .context("Failed to build taste profile")?;

        if !profile.has_history() {
            debug!("User {} has no reviews", user_id);
            return Ok(None);
        }
        if !profile.has_likes() {
            debug!("User {} has reviews but none rated {}+", user_id, self.config.like_threshold);
            return Ok(None);
        }

        let candidates = self
            .personalized
            .get_candidates(&profile, Some(deadline))
            .context("Failed to generate candidates")?;
        debug!("Generated {} candidates for user {}", candidates.len(), user_id);

        let pipeline = FilterPipeline::new()
            .add_filter(AlreadyRatedFilter::new(profile.rated_recipes.clone()))
            .add_filter(MinimumRatingFilter::new(self.config.min_candidate_rating));
        let filtered = pipeline.apply(candidates).context("Failed to apply filters")?;

        if Instant::now() >= deadline {
            bail!("deadline passed after filtering {} candidates", filtered.len());
        }

        let ranked = MatchScorer::from_profile(&profile).rank(filtered, limit);
        Ok(Some(
            ranked
                .into_iter()
                .map(|(candidate, features)| Recommendation {
                    recipe: candidate.recipe,
                    match_score: Some(features.match_score),
                })
                .collect(),
        ))
    }
}
