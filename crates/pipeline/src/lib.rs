//! Pipeline for filtering and scoring recipe candidates.
//!
//! This crate provides:
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//! - MatchScorer for the rule-based recommendation score
//!
//! ## Architecture
//! The pipeline processes candidates in stages:
//! 1. Filters remove unwanted candidates (already rated, low quality, diet)
//! 2. MatchScorer computes overlap features for the remaining candidates
//! 3. Candidates are ranked by match score and truncated
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterPipeline, MatchScorer};
//! use pipeline::filters::*;
//!
//! // Build the filter pipeline
//! let pipeline = FilterPipeline::new()
//!     .add_filter(AlreadyRatedFilter::new(profile.rated_recipes.clone()))
//!     .add_filter(MinimumRatingFilter::new(3.5));
//!
//! // Apply filters
//! let filtered = pipeline.apply(candidates)?;
//!
//! // Score and rank
//! let ranked = MatchScorer::from_profile(&profile).rank(filtered, 10);
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod features;

// Re-export main types
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
pub use features::{MatchFeatures, MatchScorer, match_score};
