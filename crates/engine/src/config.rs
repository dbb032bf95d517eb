//! Engine configuration.
//!
//! Read once at startup from a TOML file; every section and field is
//! optional and falls back to the defaults below. Example:
//!
//! ```toml
//! data_dir = "data/recipehub"
//! default_limit = 5
//!
//! [recommendation]
//! time_budget_ms = 5000
//!
//! [store]
//! max_attempts = 3
//! initial_backoff_ms = 100
//!
//! [diet.pescatarian]
//! include_tags = ["pescatarian"]
//! exclude_terms = ["chicken", "beef", "pork"]
//! ```
//!
//! `[diet.<name>]` tables extend the built-in rule table; a table with a
//! built-in name replaces that rule.

use crate::error::{EngineError, Result};
use pipeline::filters::DietRule;
use serde::{Deserialize, Deserializer, Serialize};
use sources::TasteSettings;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "RECIPE_HUB_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding recipes.jsonl and reviews.jsonl
    pub data_dir: PathBuf,
    /// Result size used when the caller gives none
    pub default_limit: usize,
    pub recommendation: RecommendationConfig,
    pub trends: TrendsConfig,
    pub nutrition: NutritionConfig,
    pub store: RetryPolicy,
    #[serde(deserialize_with = "merge_with_default_rules")]
    pub diet: BTreeMap<String, DietRule>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/recipehub"),
            default_limit: 5,
            recommendation: RecommendationConfig::default(),
            trends: TrendsConfig::default(),
            nutrition: NutritionConfig::default(),
            store: RetryPolicy::default(),
            diet: default_diet_rules(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` if given, otherwise use the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject settings no operation could run with
    pub fn validate(&self) -> Result<()> {
        let boundaries = &self.nutrition.calorie_boundaries;
        if boundaries.is_empty() || boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(EngineError::Config(
                "nutrition.calorie_boundaries must be non-empty and strictly increasing".into(),
            ));
        }
        if self.nutrition.calorie_labels.len() != boundaries.len() {
            return Err(EngineError::Config(format!(
                "nutrition.calorie_labels needs {} entries, found {}",
                boundaries.len(),
                self.nutrition.calorie_labels.len()
            )));
        }
        if self.store.max_attempts == 0 {
            return Err(EngineError::Config("store.max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Budget for the personalized aggregation before falling back
    pub time_budget_ms: u64,
    /// Minimum rating for a review to count as liked
    pub like_threshold: u8,
    pub max_liked_ingredients: usize,
    pub max_liked_tags: usize,
    /// Minimum avg_rating of a personalized candidate
    pub min_candidate_rating: f64,
    pub fallback_min_rating: f64,
    pub fallback_min_reviews: u32,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            time_budget_ms: 5000,
            like_threshold: 4,
            max_liked_ingredients: 50,
            max_liked_tags: 20,
            min_candidate_rating: 3.5,
            fallback_min_rating: 4.0,
            fallback_min_reviews: 10,
        }
    }
}

impl RecommendationConfig {
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    pub fn taste_settings(&self) -> TasteSettings {
        TasteSettings {
            like_threshold: self.like_threshold,
            max_ingredients: self.max_liked_ingredients,
            max_tags: self.max_liked_tags,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendsConfig {
    /// Window used when the caller gives none
    pub window_days: u32,
    /// Groups with fewer reviews are ignored (trending and seasonal)
    pub min_reviews: u32,
    pub trending_limit: usize,
    /// Top recipes listed per month
    pub seasonal_top: usize,
    /// Tags shown per trending recipe
    pub top_tags: usize,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            window_days: 30,
            min_reviews: 5,
            trending_limit: 10,
            seasonal_top: 5,
            top_tags: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionConfig {
    /// Lower bounds of the calorie buckets; the last bucket is open-ended
    pub calorie_boundaries: Vec<f64>,
    /// One label per bucket
    pub calorie_labels: Vec<String>,
    /// Recipes per sample list
    pub sample_size: usize,
    pub low_calorie_max: f64,
    pub high_protein_min: f64,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            calorie_boundaries: vec![0.0, 300.0, 600.0, 1000.0, 2000.0],
            calorie_labels: [
                "Low Calorie",
                "Medium Calorie",
                "High Calorie",
                "Very High Calorie",
                "Extremely High Calorie",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            sample_size: 3,
            low_calorie_max: 300.0,
            high_protein_min: 20.0,
        }
    }
}

/// Bounded retry with exponential backoff, used only when opening the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 100,
            multiplier: 2.0,
            max_backoff_ms: 5000,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(retry.saturating_sub(1) as i32);
        let millis = (self.initial_backoff_ms as f64 * factor).min(self.max_backoff_ms as f64);
        Duration::from_millis(millis as u64)
    }
}

/// The built-in dietary restriction table
pub fn default_diet_rules() -> BTreeMap<String, DietRule> {
    BTreeMap::from([
        (
            "vegetarian".to_string(),
            DietRule::new(vec!["vegetarian"], vec!["chicken", "beef", "pork", "fish"]),
        ),
        (
            "vegan".to_string(),
            DietRule::new(vec!["vegan"], vec!["meat", "egg", "dairy", "cheese"]),
        ),
        (
            "gluten-free".to_string(),
            DietRule::new(vec!["gluten-free"], vec!["wheat", "flour"]),
        ),
        (
            "keto".to_string(),
            DietRule::new(vec!["keto", "low-carb"], Vec::<&str>::new()),
        ),
        (
            "paleo".to_string(),
            DietRule::new(vec!["paleo"], vec!["grain", "dairy"]),
        ),
        (
            "dairy-free".to_string(),
            DietRule::new(vec!["dairy-free"], vec!["milk", "cheese", "cream"]),
        ),
    ])
}

fn merge_with_default_rules<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, DietRule>, D::Error>
where
    D: Deserializer<'de>,
{
    let configured = BTreeMap::<String, DietRule>::deserialize(deserializer)?;
    let mut rules = default_diet_rules();
    rules.extend(
        configured
            .into_iter()
            .map(|(name, rule)| (name.to_lowercase(), rule)),
    );
    Ok(rules)
}
