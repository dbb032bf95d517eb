//! SentimentAnalyzer: sentiment of the written reviews of one recipe.

use crate::error::Result;
use crate::store::blocking;
use chrono::NaiveDate;
use data_loader::{RecipeFilter, RecipeQuery, RecipeStore, ReviewQuery};
use sentiment::{Sentiment, SentimentScorer};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Reviews kept in the sample of strongest opinions
pub const SAMPLE_SIZE: usize = 5;

/// Partition of the scored reviews by polarity sign
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentDistribution {
    fn record(&mut self, polarity: f64) {
        if polarity > 0.0 {
            self.positive += 1;
        } else if polarity < 0.0 {
            self.negative += 1;
        } else {
            self.neutral += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredReview {
    pub user_id: i64,
    pub date: NaiveDate,
    pub rating: u8,
    pub text: String,
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedSentiment {
    pub recipe_name: String,
    pub avg_rating: Option<f64>,
    /// Every review of the recipe, with or without text
    pub review_count: usize,
    /// Reviews that had text and were scored
    pub scored_count: usize,
    pub avg_sentiment: f64,
    pub avg_subjectivity: f64,
    pub sentiment_distribution: SentimentDistribution,
    pub sample_reviews: Vec<ScoredReview>,
}

#[derive(Clone)]
pub struct SentimentAnalyzer {
    store: Arc<dyn RecipeStore>,
    scorer: Arc<dyn SentimentScorer>,
}

impl SentimentAnalyzer {
    pub fn new(store: Arc<dyn RecipeStore>, scorer: Arc<dyn SentimentScorer>) -> Self {
        Self { store, scorer }
    }

    /// Analyze the reviews of the first recipe (lowest id) whose name
    /// contains `recipe_name`, ignoring case.
    ///
    /// None when the query is blank, nothing matches, or the recipe has no
    /// review text to score.
    pub async fn sentiment(&self, recipe_name: &str) -> Result<Option<DetailedSentiment>> {
        let needle = recipe_name.trim().to_string();
        if needle.is_empty() {
            return Ok(None);
        }

        let analyzer = self.clone();
        blocking(move || analyzer.analyze(&needle)).await
    }

    fn analyze(&self, needle: &str) -> Result<Option<DetailedSentiment>> {
        let query = RecipeQuery::new()
            .filter(RecipeFilter::name_contains(needle))
            .limit(1);
        let Some(recipe) = self.store.find_recipes(&query)?.into_iter().next() else {
            info!("No recipe matching {:?}", needle);
            return Ok(None);
        };

        let reviews = self.store.find_reviews(&ReviewQuery::for_recipe(recipe.id))?;
        let review_count = reviews.len();

        let mut scored: Vec<ScoredReview> = reviews
            .iter()
            .filter_map(|review| {
                let text = review.text()?;
                Some(ScoredReview {
                    user_id: review.user_id,
                    date: review.date,
                    rating: review.rating,
                    text: text.to_string(),
                    sentiment: self.scorer.score(text),
                })
            })
            .collect();

        if scored.is_empty() {
            info!("Recipe {:?} has no review text to score", recipe.name);
            return Ok(None);
        }
        debug!(
            "Scoring {} of {} reviews for {:?}",
            scored.len(),
            review_count,
            recipe.name
        );

        let n = scored.len() as f64;
        let mut distribution = SentimentDistribution::default();
        let mut polarity_sum = 0.0;
        let mut subjectivity_sum = 0.0;
        for review in &scored {
            distribution.record(review.sentiment.polarity);
            polarity_sum += review.sentiment.polarity;
            subjectivity_sum += review.sentiment.subjectivity;
        }
        let scored_count = scored.len();

        // Stable: equal magnitudes keep review order
        scored.sort_by(|a, b| {
            b.sentiment
                .polarity
                .abs()
                .total_cmp(&a.sentiment.polarity.abs())
        });
        scored.truncate(SAMPLE_SIZE);

        Ok(Some(DetailedSentiment {
            recipe_name: recipe.name,
            avg_rating: recipe.avg_rating,
            review_count,
            scored_count,
            avg_sentiment: polarity_sum / n,
            avg_subjectivity: subjectivity_sum / n,
            sentiment_distribution: distribution,
            sample_reviews: scored,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Recipe, RecipeIndex, Review};
    use sentiment::LexiconScorer;
    use std::collections::HashMap;

    /// Scores a fixed polarity per exact text
    struct FixedScorer(HashMap<&'static str, f64>);

    impl SentimentScorer for FixedScorer {
        fn score(&self, text: &str) -> Sentiment {
            Sentiment {
                polarity: self.0.get(text).copied().unwrap_or(0.0),
                subjectivity: 0.5,
            }
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2011, 4, d).unwrap()
    }

    fn create_test_index() -> RecipeIndex {
        let mut index = RecipeIndex::new();
        index.insert_recipe(Recipe::new(1, "Chocolate Cake").with_rating(4.2, 5));
        index.insert_recipe(Recipe::new(2, "Chocolate Chip Cookies"));
        index.insert_recipe(Recipe::new(3, "Plain Toast").with_rating(3.0, 1));

        let texts = ["a", "b", "c", "d", "e", "f"];
        for (i, text) in texts.iter().enumerate() {
            index.insert_review(Review::new(1, i as i64, day(i as u32 + 1), 4).with_text(*text));
        }
        index.insert_review(Review::new(1, 50, day(20), 5));
        index.insert_review(Review::new(1, 51, day(21), 5).with_text("   "));
        index.insert_review(Review::new(3, 60, day(2), 3));
        index
    }

    fn analyzer() -> SentimentAnalyzer {
        let scorer = FixedScorer(HashMap::from([
            ("a", 0.2),
            ("b", -0.8),
            ("c", 0.0),
            ("d", 0.8),
            ("e", 0.5),
            ("f", -0.1),
        ]));
        SentimentAnalyzer::new(Arc::new(create_test_index()), Arc::new(scorer))
    }

    #[tokio::test]
    async fn test_sentiment_report() {
        let report = analyzer().sentiment("chocolate").await.unwrap().unwrap();

        // Lowest id wins among "Chocolate Cake" and "Chocolate Chip Cookies"
        assert_eq!(report.recipe_name, "Chocolate Cake");
        assert_eq!(report.avg_rating, Some(4.2));
        assert_eq!(report.review_count, 8);
        assert_eq!(report.scored_count, 6);
        assert!((report.avg_sentiment - 0.1).abs() < 1e-9);
        assert!((report.avg_subjectivity - 0.5).abs() < 1e-9);
        assert_eq!(
            report.sentiment_distribution,
            SentimentDistribution { positive: 3, neutral: 1, negative: 2 }
        );
        assert_eq!(report.sentiment_distribution.total(), report.scored_count);
    }

    #[tokio::test]
    async fn test_sample_is_stable_by_magnitude() {
        let report = analyzer().sentiment("CAKE").await.unwrap().unwrap();
        let sample: Vec<_> = report.sample_reviews.iter().map(|r| r.text.as_str()).collect();

        // b and d tie at 0.8 and keep review order
        assert_eq!(sample, vec!["b", "d", "e", "a", "f"]);
    }

    #[tokio::test]
    async fn test_none_cases() {
        let analyzer = analyzer();
        assert!(analyzer.sentiment("lasagna").await.unwrap().is_none());
        assert!(analyzer.sentiment("  ").await.unwrap().is_none());
        // Only a textless review
        assert!(analyzer.sentiment("toast").await.unwrap().is_none());
        // No reviews at all
        assert!(analyzer.sentiment("cookies").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_with_lexicon_scorer() {
        let mut index = RecipeIndex::new();
        index.insert_recipe(Recipe::new(1, "Beef Stew"));
        index.insert_review(Review::new(1, 1, day(1), 5).with_text("Delicious and easy!"));
        index.insert_review(Review::new(1, 2, day(2), 1).with_text("Bland and terrible."));
        index.insert_review(Review::new(1, 3, day(3), 3).with_text("I added carrots."));

        let analyzer = SentimentAnalyzer::new(Arc::new(index), Arc::new(LexiconScorer::new()));
        let report = analyzer.sentiment("stew").await.unwrap().unwrap();

        assert_eq!(
            report.sentiment_distribution,
            SentimentDistribution { positive: 1, neutral: 1, negative: 1 }
        );
        // -0.75 outweighs 0.715
        assert_eq!(report.sample_reviews[0].text, "Bland and terrible.");
    }
}
