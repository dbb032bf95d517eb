//! Benchmarks for candidate generation
//!
//! Run with: cargo bench --package sources
//!
//! Uses a synthetic in-memory dataset so the benchmark needs no data files.

use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use data_loader::{Recipe, RecipeIndex, RecipeStore, Review};
use sources::{PersonalizedSource, SimilarSource, TasteSettings, TopRatedSource, build_taste_profile};
use std::sync::Arc;

const RECIPES: u64 = 20_000;
const USERS: i64 = 2_000;

fn build_test_data() -> Arc<dyn RecipeStore> {
    let mut index = RecipeIndex::new();
    let date = NaiveDate::from_ymd_opt(2015, 1, 1).expect("valid date");

    for id in 1..=RECIPES {
        let ingredients: Vec<String> = (0..8).map(|k| format!("ingredient-{}", (id * 7 + k * 13) % 400)).collect();
        let tags: Vec<String> = (0..4).map(|k| format!("tag-{}", (id + k * 31) % 120)).collect();
        index.insert_recipe(
            Recipe::new(id, format!("recipe {}", id))
                .with_ingredients(ingredients)
                .with_tags(tags)
                .with_rating(3.0 + (id % 21) as f64 / 10.0, 5 + (id % 40) as u32),
        );
    }
    for user in 1..=USERS {
        for k in 0..15u64 {
            let recipe_id = (user as u64 * 97 + k * 389) % RECIPES + 1;
            index.insert_review(Review::new(recipe_id, user, date, 1 + ((user as u64 + k) % 5) as u8));
        }
    }
    Arc::new(index)
}

fn bench_personalized_candidates(c: &mut Criterion) {
    let store = build_test_data();
    let source = PersonalizedSource::new(store.clone());
    let profile = build_taste_profile(store.as_ref(), 1, &TasteSettings::default())
        .expect("Failed to build taste profile");

    c.bench_function("personalized_get_candidates", |b| {
        b.iter(|| {
            let candidates = source.get_candidates(black_box(&profile), None);
            black_box(candidates)
        })
    });
}

fn bench_similar_candidates(c: &mut Criterion) {
    let store = build_test_data();
    let source = SimilarSource::new(store.clone());
    let target = store.recipe(1).ok().flatten().expect("recipe 1 exists");

    c.bench_function("similar_get_candidates", |b| {
        b.iter(|| {
            let candidates = source.get_candidates(black_box(&target), black_box(10));
            black_box(candidates)
        })
    });
}

fn bench_top_rated(c: &mut Criterion) {
    let store = build_test_data();
    let source = TopRatedSource::new(store.clone());

    c.bench_function("top_rated_get_candidates", |b| {
        b.iter(|| black_box(source.get_candidates(black_box(10))))
    });
}

fn bench_build_taste_profile(c: &mut Criterion) {
    let store = build_test_data();

    c.bench_function("build_taste_profile", |b| {
        b.iter(|| {
            let profile = build_taste_profile(store.as_ref(), black_box(1), &TasteSettings::default());
            black_box(profile)
        })
    });
}

criterion_group!(
    benches,
    bench_personalized_candidates,
    bench_similar_candidates,
    bench_top_rated,
    bench_build_taste_profile
);
criterion_main!(benches);
