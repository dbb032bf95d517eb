//! Text formatting for command results.

use colored::Colorize;
use data_loader::Recipe;
use engine::{
    DetailedSentiment, NutritionReport, Recommendations, SearchHit, SimilarRecipe, TrendReport,
};

fn header(title: &str) {
    println!("{}", title.bold().blue());
}

fn rating(recipe: &Recipe) -> String {
    match (recipe.avg_rating, recipe.review_count) {
        (Some(avg), Some(count)) => format!("{:.2} ({} reviews)", avg, count),
        (Some(avg), None) => format!("{:.2}", avg),
        _ => "unrated".dimmed().to_string(),
    }
}

/// One numbered line per recipe, with an optional suffix
fn print_recipe_line(rank: usize, recipe: &Recipe, extra: &str) {
    println!(
        "{}. {} [{} min] {}{}",
        rank.to_string().green(),
        recipe.name,
        recipe.minutes,
        rating(recipe),
        extra
    );
}

fn print_empty(what: &str) {
    println!("  {}", format!("No {} found", what).yellow());
}

pub fn print_recipes(title: &str, recipes: &[Recipe]) {
    header(&format!("{}:", title));
    if recipes.is_empty() {
        print_empty("recipes");
    }
    for (i, recipe) in recipes.iter().enumerate() {
        print_recipe_line(i + 1, recipe, "");
    }
}

pub fn print_search(query: &str, hits: &[SearchHit]) {
    header(&format!("Search results for '{}':", query));
    if hits.is_empty() {
        print_empty("recipes");
    }
    for (i, hit) in hits.iter().enumerate() {
        let extra = format!(" - {} terms matched", hit.matched_terms);
        print_recipe_line(i + 1, &hit.recipe, &extra);
    }
}

pub fn print_similar(recipe_id: &str, similar: &[SimilarRecipe]) {
    header(&format!("Recipes similar to {}:", recipe_id));
    if similar.is_empty() {
        print_empty("similar recipes");
    }
    for (i, item) in similar.iter().enumerate() {
        let extra = format!(" - {} shared ingredients", item.overlap_score);
        print_recipe_line(i + 1, &item.recipe, &extra);
    }
}

pub fn print_recommendations(user_id: &str, recs: &Recommendations) {
    header(&format!("Recommendations for user {}:", user_id));
    if recs.is_fallback() {
        println!("  {}", "Not enough history; showing top rated recipes".yellow());
    }
    if recs.items.is_empty() {
        print_empty("recommendations");
    }
    for (i, rec) in recs.items.iter().enumerate() {
        let extra = rec
            .match_score
            .map(|score| format!(" - Score: {:.2}", score))
            .unwrap_or_default();
        print_recipe_line(i + 1, &rec.recipe, &extra);
    }
}

pub fn print_trends(report: &TrendReport, limit: usize) {
    header(&format!("Trending over the last {} days:", report.window_days));
    if report.trending_recipes.is_empty() {
        print_empty("trending recipes");
    }
    for (i, trending) in report.trending_recipes.iter().take(limit).enumerate() {
        println!(
            "{}. {} - {:.2} from {} recent reviews [{}]",
            (i + 1).to_string().green(),
            trending.name,
            trending.recent_avg_rating,
            trending.review_count,
            trending.tags.join(", ")
        );
    }

    println!();
    header("Seasonal patterns:");
    if report.seasonal_patterns.is_empty() {
        print_empty("seasonal patterns");
    }
    for pattern in &report.seasonal_patterns {
        println!(
            "{} avg {:.2} across {} recipes",
            format!("{}:", pattern.month).bold(),
            pattern.avg_rating,
            pattern.recipe_count
        );
        for recipe in pattern.top_recipes.iter().take(limit) {
            println!(
                "  - {} ({:.2}, {} reviews)",
                recipe.name, recipe.avg_rating, recipe.review_count
            );
        }
    }
}

pub fn print_nutrition(user_id: Option<&str>, report: &NutritionReport, limit: usize) {
    match user_id {
        Some(user_id) => header(&format!("Nutrition of recipes reviewed by user {}:", user_id)),
        None => header("Nutrition across all recipes:"),
    }
    let Some(stats) = &report.overall_stats else {
        print_empty("nutrition data");
        return;
    };

    println!("{}Recipes: {}", "• ".cyan(), stats.recipe_count);
    println!("{}Calories: {:.1}", "• ".cyan(), stats.avg_calories);
    println!("{}Protein: {:.1}", "• ".cyan(), stats.avg_protein);
    println!("{}Total fat: {:.1}", "• ".cyan(), stats.avg_total_fat);
    println!("{}Carbohydrates: {:.1}", "• ".cyan(), stats.avg_carbohydrates);

    println!();
    header("Calorie distribution:");
    for bucket in &report.calorie_distribution {
        let range = match bucket.upper {
            Some(upper) => format!("{}-{}", bucket.lower, upper),
            None => format!("{}+", bucket.lower),
        };
        let avg = bucket
            .avg_rating
            .map(|r| format!("{:.2}", r))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<24} {:>10}  {:>6} recipes  avg rating {}",
            bucket.label, range, bucket.count, avg
        );
    }

    let samples = [
        ("Low calorie picks:", &report.sample_recipes.low_calorie),
        ("High protein picks:", &report.sample_recipes.high_protein),
    ];
    for (title, recipes) in samples {
        println!();
        header(title);
        if recipes.is_empty() {
            print_empty("recipes");
        }
        for (i, recipe) in recipes.iter().take(limit).enumerate() {
            print_recipe_line(i + 1, recipe, "");
        }
    }
}

pub fn print_sentiment(query: &str, report: Option<&DetailedSentiment>, limit: usize) {
    let Some(report) = report else {
        header(&format!("Sentiment for '{}':", query));
        print_empty("reviews to analyze");
        return;
    };

    header(&format!("Sentiment for {}:", report.recipe_name));
    let avg = report
        .avg_rating
        .map(|r| format!("{:.2}", r))
        .unwrap_or_else(|| "unrated".to_string());
    println!("{}Average rating: {}", "• ".cyan(), avg);
    println!(
        "{}Reviews: {} ({} with text)",
        "• ".cyan(),
        report.review_count,
        report.scored_count
    );
    println!("{}Polarity: {:.3}", "• ".cyan(), report.avg_sentiment);
    println!("{}Subjectivity: {:.3}", "• ".cyan(), report.avg_subjectivity);

    let dist = &report.sentiment_distribution;
    println!(
        "{}Positive {}  Neutral {}  Negative {}",
        "• ".cyan(),
        dist.positive.to_string().green(),
        dist.neutral,
        dist.negative.to_string().red()
    );

    println!();
    header("Strongest opinions:");
    for review in report.sample_reviews.iter().take(limit) {
        let polarity = format!("{:+.2}", review.sentiment.polarity);
        let polarity = if review.sentiment.polarity < 0.0 {
            polarity.red()
        } else {
            polarity.green()
        };
        println!("  [{}] {}★ {}", polarity, review.rating, review.text);
    }
}

pub fn print_diet(restriction: &str, known: &[&str], recipes: &[Recipe]) {
    if !known.contains(&restriction.trim().to_lowercase().as_str()) {
        println!(
            "{} Unknown restriction '{}'. Known: {}",
            "!".yellow(),
            restriction,
            known.join(", ")
        );
        return;
    }
    print_recipes(&format!("{} recipes", restriction), recipes);
}
