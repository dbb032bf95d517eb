use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use engine::{CONFIG_ENV_VAR, EngineConfig, RecipeEngine};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

mod output;

/// RecipeHub - recipe analytics and recommendations
#[derive(Parser)]
#[command(name = "recipe-hub")]
#[command(about = "Recipe search, analytics and recommendations over a recipe/review dataset", long_about = None)]
struct Cli {
    /// Directory holding recipes.jsonl and reviews.jsonl (overrides the config file)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Recompute rating statistics from the reviews after loading
    #[arg(long)]
    refresh_stats: bool,

    /// Print results as JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full-text search over recipe names and ingredients
    Search {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Recipes ready within a number of minutes
    Time {
        minutes: u32,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Recipes tagged with a cuisine
    Cuisine {
        cuisine: String,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Recipes with a nutrient at or below a value
    Nutrition {
        /// calories, total_fat, sugar, sodium, protein, saturated_fat or carbohydrates
        nutrient: String,
        max_value: f64,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Nutrition statistics over all recipes or one user's reviewed recipes
    AnalyzeNutrition {
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Recipes sharing the most ingredients with a recipe
    Similar {
        /// Source recipe id
        recipe_id: String,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Personalized recommendations for a user
    Recommend {
        user_id: String,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Trending recipes and seasonal rating patterns
    Trends {
        /// Trending window in days
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Sentiment analysis of a recipe's reviews
    Sentiment {
        /// Case-insensitive part of the recipe name
        recipe_name: String,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Recipes fitting a dietary restriction
    Diet {
        restriction: String,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Best-rated recipes with at least ten reviews
    TopRated {
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = EngineConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    debug!("Using configuration {:?}", config);

    let start = Instant::now();
    let engine = RecipeEngine::open(&config, cli.refresh_stats)
        .await
        .with_context(|| format!("Failed to open dataset in {}", config.data_dir.display()))?;
    if !cli.json {
        println!("{} Loaded dataset in {:.2?}", "✓".green(), start.elapsed());
    }

    let out = Output {
        json: cli.json,
        default_limit: config.default_limit,
    };

    // Dispatch to the matching engine operation
    match cli.command {
        Commands::Search { query, limit } => {
            let hits = engine.queries.search(&query, out.limit(limit)).await?;
            out.emit(&hits, || output::print_search(&query, &hits))?;
        }
        Commands::Time { minutes, limit } => {
            let recipes = engine.queries.by_cooking_time(minutes, out.limit(limit)).await?;
            out.emit(&recipes, || {
                output::print_recipes(&format!("Recipes ready in {} minutes or less", minutes), &recipes)
            })?;
        }
        Commands::Cuisine { cuisine, limit } => {
            let recipes = engine.queries.by_cuisine(&cuisine, out.limit(limit)).await?;
            out.emit(&recipes, || {
                output::print_recipes(&format!("{} recipes", cuisine), &recipes)
            })?;
        }
        Commands::Nutrition { nutrient, max_value, limit } => {
            let recipes = engine
                .queries
                .by_nutrition(&nutrient, max_value, out.limit(limit))
                .await?;
            out.emit(&recipes, || {
                output::print_recipes(&format!("Recipes with {} <= {}", nutrient, max_value), &recipes)
            })?;
        }
        Commands::AnalyzeNutrition { user_id, limit } => {
            let report = engine.nutrition.nutrition_patterns(user_id.as_deref()).await?;
            out.emit(&report, || {
                output::print_nutrition(user_id.as_deref(), &report, out.limit(limit))
            })?;
        }
        Commands::Similar { recipe_id, limit } => {
            let similar = engine.similarity.find_similar(&recipe_id, out.limit(limit)).await?;
            out.emit(&similar, || output::print_similar(&recipe_id, &similar))?;
        }
        Commands::Recommend { user_id, limit } => {
            let recs = engine.recommendations.recommend(&user_id, out.limit(limit)).await?;
            out.emit(&recs, || output::print_recommendations(&user_id, &recs))?;
        }
        Commands::Trends { days, limit } => {
            let report = engine.trends.trends(days).await?;
            out.emit(&report, || output::print_trends(&report, out.limit(limit)))?;
        }
        Commands::Sentiment { recipe_name, limit } => {
            let report = engine.sentiment.sentiment(&recipe_name).await?;
            out.emit(&report, || {
                output::print_sentiment(&recipe_name, report.as_ref(), out.limit(limit))
            })?;
        }
        Commands::Diet { restriction, limit } => {
            let recipes = engine.diet.by_diet(&restriction, out.limit(limit)).await?;
            let known = engine.diet.restrictions();
            out.emit(&recipes, || output::print_diet(&restriction, &known, &recipes))?;
        }
        Commands::TopRated { limit } => {
            let recipes = engine.queries.top_rated(out.limit(limit)).await?;
            out.emit(&recipes, || output::print_recipes("Top rated recipes", &recipes))?;
        }
    }

    Ok(())
}

/// How results are written to stdout
struct Output {
    json: bool,
    default_limit: usize,
}

impl Output {
    fn limit(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.default_limit)
    }

    /// Print `value` as JSON, or run the text formatter
    fn emit<T: Serialize>(&self, value: &T, print: impl FnOnce()) -> Result<()> {
        if self.json {
            let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
            println!("{}", json);
        } else {
            print();
        }
        Ok(())
    }
}
