//! # Engine Crate
//!
//! The RecipeHub analytics and recommendation engine. Every component reads
//! from a shared `Arc<dyn RecipeStore>` and computes a derived view; none of
//! them mutate data or hold locks.
//!
//! ## Components
//!
//! - **similarity**: recipes sharing ingredients with a given one
//! - **recommend**: personalized recommendations with a top-rated fallback
//! - **trends**: trending recipes and seasonal rating patterns
//! - **nutrition**: nutrition statistics and calorie distribution
//! - **review_sentiment**: sentiment of a recipe's written reviews
//! - **diet**: recipes fitting a dietary restriction
//! - **queries**: search, cooking time, cuisine, nutrient ceiling, top rated
//!
//! `RecipeEngine` bundles them all over one store.
//!
//! ```ignore
//! let config = EngineConfig::load(None)?;
//! let engine = RecipeEngine::open(&config, false).await?;
//! let recs = engine.recommendations.recommend("38094", 5).await?;
//! ```

pub mod config;
pub mod diet;
pub mod error;
pub mod nutrition;
pub mod queries;
pub mod recommend;
pub mod review_sentiment;
pub mod similarity;
pub mod store;
pub mod trends;

pub use config::{
    CONFIG_ENV_VAR, EngineConfig, NutritionConfig, RecommendationConfig, RetryPolicy,
    TrendsConfig,
};
pub use diet::DietFilter;
pub use error::{EngineError, Result};
pub use nutrition::{CalorieBucket, NutritionAnalyzer, NutritionReport, NutritionStats};
pub use queries::{QueryEngine, SearchHit};
pub use recommend::{Recommendation, RecommendationEngine, Recommendations};
pub use review_sentiment::{DetailedSentiment, SentimentAnalyzer, SentimentDistribution};
pub use similarity::{SimilarRecipe, SimilarityEngine};
pub use store::open_store;
pub use trends::{MonthPattern, TrendAnalyzer, TrendReport, TrendingRecipe};

use ::sentiment::{LexiconScorer, SentimentScorer};
use data_loader::RecipeStore;
use std::sync::Arc;
use tracing::info;

/// All engine components over one shared store
#[derive(Clone)]
pub struct RecipeEngine {
    pub similarity: SimilarityEngine,
    pub recommendations: RecommendationEngine,
    pub trends: TrendAnalyzer,
    pub nutrition: NutritionAnalyzer,
    pub sentiment: SentimentAnalyzer,
    pub diet: DietFilter,
    pub queries: QueryEngine,
}

impl RecipeEngine {
    /// Build every component over `store`, scoring review text with the
    /// built-in lexicon
    pub fn new(store: Arc<dyn RecipeStore>, config: &EngineConfig) -> Self {
        Self::with_scorer(store, config, Arc::new(LexiconScorer::new()))
    }

    pub fn with_scorer(
        store: Arc<dyn RecipeStore>,
        config: &EngineConfig,
        scorer: Arc<dyn SentimentScorer>,
    ) -> Self {
        Self {
            similarity: SimilarityEngine::new(store.clone()),
            recommendations: RecommendationEngine::new(
                store.clone(),
                config.recommendation.clone(),
            ),
            trends: TrendAnalyzer::new(store.clone(), config.trends.clone()),
            nutrition: NutritionAnalyzer::new(store.clone(), config.nutrition.clone()),
            sentiment: SentimentAnalyzer::new(store.clone(), scorer),
            diet: DietFilter::new(store.clone(), config.diet.clone()),
            queries: QueryEngine::new(store),
        }
    }

    /// Validate `config`, open the store in its `data_dir` and build the engine
    pub async fn open(config: &EngineConfig, refresh_stats: bool) -> Result<Self> {
        config.validate()?;
        let store = open_store(&config.data_dir, &config.store, refresh_stats).await?;
        info!("Engine ready over {:?}", config.data_dir);
        Ok(Self::new(store, config))
    }
}
