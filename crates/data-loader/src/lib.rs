//! # Data Loader Crate
//!
//! This crate holds the recipe/review data model and the store the
//! analytics engine reads from.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Recipe, Review, Nutrition, RecipeIndex)
//! - **store**: The `RecipeStore` capability trait and its query types
//! - **query**: `RecipeStore` implementation for the in-memory `RecipeIndex`
//! - **parser**: Parse JSON-lines dataset files into Rust structs
//! - **index**: Loading, validation and derived rating statistics
//! - **error**: Error types for loading and querying
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{RecipeIndex, RecipeStore, ReviewQuery};
//! use std::path::Path;
//!
//! let index = RecipeIndex::load_from_dir(Path::new("data/recipehub"))?;
//!
//! let recipe = index.recipe_by_source_id(137739)?;
//! let reviews = index.find_reviews(&ReviewQuery::by_user(38094))?;
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod store;
pub mod query;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result, StoreError, StoreResult};
pub use index::{RECIPES_FILE, REVIEWS_FILE};
pub use store::{
    Bucket, Direction, NumericField, RecipeFilter, RecipeQuery, RecipeStore, ReviewGroup,
    ReviewGrouping, ReviewQuery, SortField, SortKey, compare_ratings, ingredient_overlap,
    intersection_size, tokenize,
};
pub use types::{
    // Type aliases
    RecipeId,
    SourceRecipeId,
    UserId,
    // Core types
    Nutrient,
    Nutrition,
    Recipe,
    RecipeIndex,
    Review,
};
