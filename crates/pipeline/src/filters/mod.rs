//! Concrete `Filter` stages.

pub mod already_rated;
pub mod diet;
pub mod minimum_rating;

// Re-export for convenience
pub use already_rated::AlreadyRatedFilter;
pub use diet::{DietRule, DietRuleFilter};
pub use minimum_rating::MinimumRatingFilter;
