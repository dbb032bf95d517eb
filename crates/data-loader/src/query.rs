//! `RecipeStore` implementation for the in-memory `RecipeIndex`.
//!
//! Queries narrow the scan with the secondary indices where a top-level
//! filter allows it (`IdIn`, `AnyIngredient`, `AnyTag`, or an `Or` made only
//! of those), then evaluate every filter on the narrowed set.

use crate::error::{StoreError, StoreResult};
use crate::store::*;
use crate::types::*;
use chrono::Datelike;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// How many recipes to scan between deadline checks
const DEADLINE_CHECK_INTERVAL: usize = 1024;

impl RecipeIndex {
    /// Candidate ids implied by one filter, or None if it can't use an index
    fn indexed_ids(&self, filter: &RecipeFilter) -> Option<HashSet<RecipeId>> {
        match filter {
            RecipeFilter::IdIn(ids) => Some(ids.clone()),
            RecipeFilter::AnyIngredient(set) => Some(
                set.iter()
                    .flat_map(|i| self.get_recipes_by_ingredient(i).iter().copied())
                    .collect(),
            ),
            RecipeFilter::AnyTag(set) => Some(
                set.iter()
                    .flat_map(|t| self.get_recipes_by_tag(t).iter().copied())
                    .collect(),
            ),
            RecipeFilter::Or(filters) => {
                let mut ids = HashSet::new();
                for f in filters {
                    ids.extend(self.indexed_ids(f)?);
                }
                Some(ids)
            }
            _ => None,
        }
    }

    /// Recipes worth evaluating for the query, narrowed by an index if possible
    fn scan_set(&self, query: &RecipeQuery) -> Vec<&Recipe> {
        let narrowed = query
            .filters
            .iter()
            .filter_map(|f| self.indexed_ids(f))
            .min_by_key(|ids| ids.len());

        match narrowed {
            Some(ids) => ids.iter().filter_map(|id| self.recipes.get(id)).collect(),
            None => self.recipes.values().collect(),
        }
    }

    fn reviews_matching<'a>(&'a self, query: &'a ReviewQuery) -> Box<dyn Iterator<Item = &'a Review> + 'a> {
        // Pick the most selective index available
        let positions: Box<dyn Iterator<Item = usize> + 'a> = if let Some(user_id) = query.user_id {
            Box::new(self.user_reviews.get(&user_id).into_iter().flatten().copied())
        } else if let Some(recipe_id) = query.recipe_id {
            Box::new(self.recipe_reviews.get(&recipe_id).into_iter().flatten().copied())
        } else if let Some(since) = query.since {
            Box::new(self.date_index.range(since..).flat_map(|(_, p)| p.iter().copied()))
        } else {
            Box::new(0..self.reviews.len())
        };

        Box::new(
            positions
                .map(move |i| &self.reviews[i])
                .filter(move |r| query.matches(r)),
        )
    }
}

impl RecipeStore for RecipeIndex {
    fn recipe(&self, id: RecipeId) -> StoreResult<Option<Recipe>> {
        Ok(self.get_recipe(id).cloned())
    }

    fn recipe_by_source_id(&self, original_id: SourceRecipeId) -> StoreResult<Option<Recipe>> {
        Ok(self.get_recipe_by_source_id(original_id).cloned())
    }

    fn recipes_by_ids(&self, ids: &[RecipeId]) -> StoreResult<HashMap<RecipeId, Recipe>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.recipes.get(id).map(|r| (*id, r.clone())))
            .collect())
    }

    fn find_recipes(&self, query: &RecipeQuery) -> StoreResult<Vec<Recipe>> {
        let mut matched: Vec<&Recipe> = Vec::new();
        for (i, recipe) in self.scan_set(query).into_iter().enumerate() {
            if i % DEADLINE_CHECK_INTERVAL == 0 {
                if let Some(deadline) = query.deadline {
                    if Instant::now() >= deadline {
                        return Err(StoreError::DeadlineExceeded);
                    }
                }
            }
            if query.matches(recipe) {
                matched.push(recipe);
            }
        }

        matched.sort_by(|a, b| query.compare(a, b));
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        Ok(matched.into_iter().cloned().collect())
    }

    fn text_search(&self, text: &str, limit: usize) -> StoreResult<Vec<(Recipe, usize)>> {
        let terms: HashSet<String> = tokenize(text).into_iter().collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<(&Recipe, usize)> = self
            .recipes
            .values()
            .filter_map(|recipe| {
                let mut tokens: HashSet<String> = tokenize(&recipe.name).into_iter().collect();
                for ingredient in &recipe.ingredients {
                    tokens.extend(tokenize(ingredient));
                }
                let matched = terms.iter().filter(|t| tokens.contains(*t)).count();
                (matched > 0).then_some((recipe, matched))
            })
            .collect();

        hits.sort_by(|(a, a_hits), (b, b_hits)| {
            b_hits
                .cmp(a_hits)
                .then_with(|| compare_ratings(b.avg_rating, a.avg_rating))
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(limit);
        Ok(hits.into_iter().map(|(r, n)| (r.clone(), n)).collect())
    }

    fn find_reviews(&self, query: &ReviewQuery) -> StoreResult<Vec<Review>> {
        Ok(self.reviews_matching(query).cloned().collect())
    }

    fn group_reviews(
        &self,
        query: &ReviewQuery,
        grouping: ReviewGrouping,
        min_count: u32,
    ) -> StoreResult<Vec<ReviewGroup>> {
        // (recipe, month) -> (rating sum, count)
        let mut totals: HashMap<(RecipeId, Option<u32>), (u64, u32)> = HashMap::new();
        for review in self.reviews_matching(query) {
            let month = match grouping {
                ReviewGrouping::Recipe => None,
                ReviewGrouping::RecipeAndMonth => Some(review.date.month()),
            };
            let entry = totals.entry((review.recipe_id, month)).or_insert((0, 0));
            entry.0 += review.rating as u64;
            entry.1 += 1;
        }

        let mut groups: Vec<ReviewGroup> = totals
            .into_iter()
            .filter(|(_, (_, count))| *count >= min_count)
            .map(|((recipe_id, month), (sum, count))| ReviewGroup {
                recipe_id,
                month,
                avg_rating: sum as f64 / count as f64,
                count,
            })
            .collect();

        groups.sort_by(|a, b| {
            compare_ratings(Some(b.avg_rating), Some(a.avg_rating))
                .then_with(|| b.count.cmp(&a.count))
                .then_with(|| a.recipe_id.cmp(&b.recipe_id))
                .then_with(|| a.month.cmp(&b.month))
        });
        Ok(groups)
    }

    fn bucket_recipes(
        &self,
        query: &RecipeQuery,
        field: NumericField,
        boundaries: &[f64],
    ) -> StoreResult<Vec<Bucket>> {
        if boundaries.is_empty() || boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(StoreError::InvalidQuery(format!(
                "bucket boundaries must be non-empty and strictly increasing: {:?}",
                boundaries
            )));
        }

        // Per bucket: (count, rating sum, rated members)
        let mut totals = vec![(0u32, 0.0f64, 0u32); boundaries.len()];
        for recipe in self.scan_set(query) {
            if !query.matches(recipe) {
                continue;
            }
            let Some(value) = field.value(recipe) else {
                continue;
            };
            if value < boundaries[0] {
                continue;
            }
            // Index of the last boundary <= value; the final slot is the overflow bucket
            let slot = boundaries.partition_point(|b| *b <= value) - 1;
            let entry = &mut totals[slot];
            entry.0 += 1;
            if let Some(rating) = recipe.avg_rating {
                entry.1 += rating;
                entry.2 += 1;
            }
        }

        Ok(totals
            .into_iter()
            .enumerate()
            .filter(|(_, (count, _, _))| *count > 0)
            .map(|(i, (count, sum, rated))| Bucket {
                lower: boundaries[i],
                upper: boundaries.get(i + 1).copied(),
                count,
                avg_rating: (rated > 0).then(|| sum / rated as f64),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_index() -> RecipeIndex {
        let mut index = RecipeIndex::new();
        index.insert_recipe(
            Recipe::new(1, "Tomato Pasta")
                .with_ingredients(["pasta", "tomato", "garlic"])
                .with_tags(["italian", "main-dish"])
                .with_minutes(25)
                .with_rating(4.5, 12),
        );
        index.insert_recipe(
            Recipe::new(2, "Garlic Bread")
                .with_ingredients(["bread", "garlic", "butter"])
                .with_tags(["italian", "side-dish"])
                .with_minutes(10)
                .with_rating(3.8, 4),
        );
        index.insert_recipe(
            Recipe::new(3, "Fried Rice")
                .with_ingredients(["rice", "egg", "soy sauce"])
                .with_tags(["asian"])
                .with_minutes(15),
        );
        index
    }

    #[test]
    fn test_find_recipes_filters_sorts_and_limits() {
        let index = create_test_index();
        let query = RecipeQuery::new()
            .filter(RecipeFilter::MinutesAtMost(20))
            .sort_by(SortField::AvgRating, Direction::Descending);

        let found = index.find_recipes(&query).unwrap();
        let ids: Vec<RecipeId> = found.iter().map(|r| r.id).collect();
        // Unrated recipe 3 sorts last
        assert_eq!(ids, vec![2, 3]);

        let limited = index.find_recipes(&query.limit(1)).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_any_ingredient_uses_index_and_still_filters() {
        let index = create_test_index();
        let garlic: HashSet<String> = ["garlic".to_string()].into_iter().collect();
        let query = RecipeQuery::new()
            .filter(RecipeFilter::AnyIngredient(garlic))
            .filter(RecipeFilter::IdNotIn([1].into_iter().collect()));

        let found = index.find_recipes(&query).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[test]
    fn test_expired_deadline() {
        let index = create_test_index();
        let query = RecipeQuery::new().deadline(Instant::now());
        assert_eq!(index.find_recipes(&query), Err(StoreError::DeadlineExceeded));
    }

    #[test]
    fn test_text_search_ranks_by_matched_terms() {
        let index = create_test_index();
        let hits = index.text_search("garlic tomato", 10).unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0.id, 1);
        assert_eq!(hits[0].1, 2);
        assert_eq!(hits[1].0.id, 2);
    }

    #[test]
    fn test_group_reviews_by_month() {
        let mut index = create_test_index();
        for day in 1..=5 {
            index.insert_review(Review::new(1, day, date(2020, 3, day as u32), 5));
        }
        index.insert_review(Review::new(1, 9, date(2021, 3, 1), 3));
        index.insert_review(Review::new(1, 9, date(2021, 4, 1), 3));

        let groups = index
            .group_reviews(&ReviewQuery::all(), ReviewGrouping::RecipeAndMonth, 5)
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].month, Some(3));
        assert_eq!(groups[0].count, 6);
        assert!((groups[0].avg_rating - 28.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_reviews_since_uses_date_index() {
        let mut index = create_test_index();
        index.insert_review(Review::new(1, 1, date(2020, 1, 1), 4));
        index.insert_review(Review::new(2, 1, date(2020, 2, 1), 4));

        let recent = index.find_reviews(&ReviewQuery::since(date(2020, 2, 1))).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].recipe_id, 2);
    }

    #[test]
    fn test_bucket_boundaries_are_left_inclusive() {
        let mut index = RecipeIndex::new();
        for (id, calories) in [(1, 0.0), (2, 299.9), (3, 300.0), (4, 2000.0), (5, -5.0)] {
            index.insert_recipe(Recipe::new(id, "r").with_nutrition(Nutrition {
                calories,
                ..Nutrition::default()
            }));
        }

        let buckets = index
            .bucket_recipes(
                &RecipeQuery::new(),
                NumericField::Nutrient(Nutrient::Calories),
                &[0.0, 300.0, 600.0, 1000.0, 2000.0],
            )
            .unwrap();

        assert_eq!(buckets.len(), 3);
        assert_eq!((buckets[0].lower, buckets[0].upper, buckets[0].count), (0.0, Some(300.0), 2));
        assert_eq!((buckets[1].lower, buckets[1].count), (300.0, 1));
        assert_eq!((buckets[2].lower, buckets[2].upper, buckets[2].count), (2000.0, None, 1));
    }

    #[test]
    fn test_bucket_rejects_unsorted_boundaries() {
        let index = RecipeIndex::new();
        let result = index.bucket_recipes(&RecipeQuery::new(), NumericField::Minutes, &[10.0, 5.0]);
        assert!(matches!(result, Err(StoreError::InvalidQuery(_))));
    }
}
